//! 模型对象图: 骨架 + 材质 + 网格

pub mod bone;
pub mod material;
pub mod mesh;
pub mod motion;
pub mod texture;

use glam::Mat4;

pub use bone::GfBone;
pub use material::{GfMaterial, GfTextureCoord};
pub use mesh::{GfMesh, GfSubMesh, PicaVertex, Skinning};
pub use motion::GfMotion;
pub use texture::GfTexture;

use crate::error::{Error, Result};
use crate::io::{Reader, Writer};
use crate::section::GfSection;

const MAGIC: &str = "gfmodel";

/// 一个模型: 名字 + 骨架 + 材质 + 网格
#[derive(Debug, Clone, Default)]
pub struct GfModel {
    pub name: String,
    pub bones: Vec<GfBone>,
    pub materials: Vec<GfMaterial>,
    pub meshes: Vec<GfMesh>,
}

impl GfModel {
    pub fn read(r: &mut Reader) -> Result<Self> {
        let (section, start) = GfSection::expect(r, MAGIC)?;

        let name = r.read_padded_str(0x40)?;
        let bone_count = r.read_u32()?;
        let material_count = r.read_u32()?;
        let mesh_count = r.read_u32()?;
        r.read_u32()?; // 对齐

        let mut bones = Vec::with_capacity(bone_count as usize);
        for i in 0..bone_count {
            let bone = GfBone::read(r)?;
            // 父骨骼必须先于子骨骼出现
            if bone.parent_index >= i as i32 {
                return Err(Error::Malformed {
                    context: "骨骼父下标未先于子骨骼",
                });
            }
            bones.push(bone);
        }
        r.skip_padding()?;

        let mut materials = Vec::with_capacity(material_count as usize);
        for _ in 0..material_count {
            materials.push(GfMaterial::read(r)?);
        }

        let mut meshes = Vec::with_capacity(mesh_count as usize);
        for _ in 0..mesh_count {
            meshes.push(GfMesh::read(r)?);
        }

        section.finish(r, start)?;
        r.skip_padding()?;

        Ok(Self {
            name,
            bones,
            materials,
            meshes,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        let patch = GfSection::write_placeholder(w, MAGIC);
        let start = w.position();

        w.write_padded_str(&self.name, 0x40);
        w.write_u32(self.bones.len() as u32);
        w.write_u32(self.materials.len() as u32);
        w.write_u32(self.meshes.len() as u32);
        w.write_u32(0);

        for bone in &self.bones {
            bone.write(w);
        }
        w.write_padding();

        for material in &self.materials {
            material.write(w);
        }
        for mesh in &self.meshes {
            mesh.write(w);
        }

        GfSection::backpatch(w, patch, start);
        w.write_padding();
    }

    /// 每根骨骼的世界变换: 沿父链自上而下累乘 parent_world * local
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut world = Vec::with_capacity(self.bones.len());
        for bone in &self.bones {
            let local = bone.local_transform();
            let m = if bone.parent_index >= 0 {
                world[bone.parent_index as usize] * local
            } else {
                local
            };
            world.push(m);
        }
        world
    }

    pub fn world_transform(&self, bone_index: usize) -> Option<Mat4> {
        self.world_transforms().into_iter().nth(bone_index)
    }
}
