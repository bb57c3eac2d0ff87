//! 导出适配器: 解码结果到各工具链的文本产物
//!
//! 适配器只读取场景对象, 从不修改它; 所有生成器返回 String,
//! 落盘与否由批处理层决定。

pub mod blender;
pub mod material_dump;
pub mod max_script;
pub mod unity_anim;

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use lumiose_formats::model::{GfModel, GfSubMesh, Skinning};
use lumiose_formats::PicaVertex;

/// 可选的导出目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adapter {
    MaxScript,
    MaterialDump,
    Blender,
    UnityAnim,
}

impl Adapter {
    pub const ALL: [Adapter; 4] = [
        Adapter::MaxScript,
        Adapter::MaterialDump,
        Adapter::Blender,
        Adapter::UnityAnim,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "max" => Self::MaxScript,
            "dump" => Self::MaterialDump,
            "blender" => Self::Blender,
            "anim" => Self::UnityAnim,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::MaxScript => "max",
            Self::MaterialDump => "dump",
            Self::Blender => "blender",
            Self::UnityAnim => "anim",
        }
    }
}

/// 子网格索引展开成逐角位置, 刚性蒙皮施加绑定骨骼的世界变换;
/// 引用越界顶点的三角形整个丢弃 (损坏文件不允许让批处理崩溃)
pub(crate) fn triangle_positions(
    model: &GfModel,
    verts: &[PicaVertex],
    sub: &GfSubMesh,
    world: &[Mat4],
) -> Vec<Vec3> {
    let mut out = Vec::with_capacity(sub.indices.len());
    for tri in sub.indices.chunks_exact(3) {
        if tri.iter().any(|&i| i as usize >= verts.len()) {
            continue;
        }
        for &i in tri {
            let v = &verts[i as usize];
            let p = if sub.skinning == Skinning::Rigid && !world.is_empty() {
                let bone = sub.resolve_bone(v.bone_slots[0], model.bones.len());
                world[bone].transform_point3(v.position)
            } else {
                v.position
            };
            out.push(p);
        }
    }
    out
}

/// 按位置完全相等去重; 返回 (去重后的位置表, 原顶点 -> 新下标)
pub(crate) fn dedup_positions(positions: &[Vec3]) -> (Vec<Vec3>, Vec<usize>) {
    let mut unique = Vec::new();
    let mut remap = Vec::with_capacity(positions.len());
    let mut seen: HashMap<[u32; 3], usize> = HashMap::new();
    for &p in positions {
        let key = [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()];
        let index = *seen.entry(key).or_insert_with(|| {
            unique.push(p);
            unique.len() - 1
        });
        remap.push(index);
    }
    (unique, remap)
}
