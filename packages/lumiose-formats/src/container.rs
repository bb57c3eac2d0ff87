//! 场景容器: 模型 + 纹理 + 两类动画的顶层打包

use crate::error::{Error, Result};
use crate::io::{Reader, Writer};
use crate::model::{GfModel, GfMotion, GfTexture};
use crate::section::GfSection;

pub const PACK_MAGIC: &str = "gfmodelp";

/// 顶层容器
#[derive(Debug, Clone, Default)]
pub struct GfModelPack {
    pub models: Vec<GfModel>,
    pub textures: Vec<GfTexture>,
    pub skeletal_motions: Vec<GfMotion>,
    pub material_motions: Vec<GfMotion>,
}

impl GfModelPack {
    /// 识别并完整解码一个容器; 不认识的开头直接报 UnrecognizedFormat,
    /// 批处理层据此跳过该文件
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);

        let (section, start) = match GfSection::read(&mut r) {
            Ok(pair) if pair.0.magic == PACK_MAGIC => pair,
            _ => return Err(Error::UnrecognizedFormat),
        };

        let model_count = r.read_u32()?;
        let texture_count = r.read_u32()?;
        let skeletal_count = r.read_u32()?;
        let material_count = r.read_u32()?;

        let mut pack = GfModelPack::default();
        for _ in 0..model_count {
            pack.models.push(GfModel::read(&mut r)?);
        }
        for _ in 0..texture_count {
            pack.textures.push(GfTexture::read(&mut r)?);
        }
        for _ in 0..skeletal_count {
            pack.skeletal_motions.push(GfMotion::read(&mut r)?);
        }
        for _ in 0..material_count {
            pack.material_motions.push(GfMotion::read(&mut r)?);
        }

        section.finish(&mut r, start)?;

        Ok(pack)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();

        let patch = GfSection::write_placeholder(&mut w, PACK_MAGIC);
        let start = w.position();

        w.write_u32(self.models.len() as u32);
        w.write_u32(self.textures.len() as u32);
        w.write_u32(self.skeletal_motions.len() as u32);
        w.write_u32(self.material_motions.len() as u32);

        for model in &self.models {
            model.write(&mut w);
        }
        for texture in &self.textures {
            texture.write(&mut w);
        }
        for motion in &self.skeletal_motions {
            motion.write(&mut w);
        }
        for motion in &self.material_motions {
            motion.write(&mut w);
        }

        GfSection::backpatch(&mut w, patch, start);
        w.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_bytes_are_unrecognized() {
        assert!(matches!(
            GfModelPack::from_bytes(b"RIFF\x00\x00\x00\x00xxxxxxxx"),
            Err(Error::UnrecognizedFormat)
        ));
        assert!(matches!(
            GfModelPack::from_bytes(&[]),
            Err(Error::UnrecognizedFormat)
        ));
    }

    #[test]
    fn empty_pack_roundtrip() {
        let pack = GfModelPack::default();
        let bytes = pack.to_bytes();
        let back = GfModelPack::from_bytes(&bytes).unwrap();
        assert!(back.models.is_empty());
        assert!(back.textures.is_empty());
    }
}
