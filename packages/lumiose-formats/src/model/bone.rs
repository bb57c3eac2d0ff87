//! 骨骼节点

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::error::Result;
use crate::io::{Reader, Writer};

/// 一根骨骼; 父骨骼在遍历序中必须先于子骨骼出现, 根骨骼 parent_index 为 -1
#[derive(Debug, Clone, PartialEq)]
pub struct GfBone {
    pub name: String,
    pub parent_index: i32,
    pub flags: u8,
    pub scale: Vec3,
    pub rotation: Vec3,
    pub translation: Vec3,
}

impl Default for GfBone {
    fn default() -> Self {
        Self {
            name: String::new(),
            parent_index: -1,
            flags: 0,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
            translation: Vec3::ZERO,
        }
    }
}

impl GfBone {
    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            name: r.read_short_str()?,
            parent_index: r.read_i32()?,
            flags: r.read_u8()?,
            scale: r.read_vec3()?,
            rotation: r.read_vec3()?,
            translation: r.read_vec3()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        w.write_short_str(&self.name);
        w.write_i32(self.parent_index);
        w.write_u8(self.flags);
        w.write_vec3(self.scale);
        w.write_vec3(self.rotation);
        w.write_vec3(self.translation);
    }

    /// 局部变换: 欧拉角按 Z-Y-X 顺序
    pub fn local_transform(&self) -> Mat4 {
        let rotation = Quat::from_euler(
            EulerRot::ZYX,
            self.rotation.z,
            self.rotation.y,
            self.rotation.x,
        );
        Mat4::from_scale_rotation_translation(self.scale, rotation, self.translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bone_roundtrip() {
        let bone = GfBone {
            name: "Waist".to_string(),
            parent_index: 0,
            flags: 1,
            scale: Vec3::ONE,
            rotation: Vec3::new(0.0, 0.5, 0.0),
            translation: Vec3::new(0.0, 1.2, 0.0),
        };
        let mut w = Writer::new();
        bone.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(GfBone::read(&mut r).unwrap(), bone);
    }

    #[test]
    fn local_transform_translates_origin() {
        let bone = GfBone {
            translation: Vec3::new(1.0, 2.0, 3.0),
            ..GfBone::default()
        };
        let p = bone.local_transform().transform_point3(Vec3::ZERO);
        assert_eq!(p, Vec3::new(1.0, 2.0, 3.0));
    }
}
