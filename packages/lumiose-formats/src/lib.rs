pub mod color;
pub mod container;
pub mod error;
pub mod hash;
pub mod io;
pub mod model;
pub mod pica;
pub mod section;
pub mod shader;

pub use color::Rgba;
pub use container::GfModelPack;
pub use error::{Error, Result};
pub use hash::{hash_str, Fnv1, HashName};
pub use model::{GfBone, GfMaterial, GfMesh, GfModel, GfMotion, GfTexture, PicaVertex};
pub use section::GfSection;
pub use shader::GfShader;
