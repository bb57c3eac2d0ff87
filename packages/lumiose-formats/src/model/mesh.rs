//! 网格: 交错顶点缓冲 + 子网格
//!
//! 顶点缓冲保持 GPU 原始布局, 属性表描述每个分量的用途/格式/缩放;
//! `vertices` 展平成统一的顶点记录供导出适配器使用。

use glam::{Vec2, Vec3, Vec4};

use crate::error::{Error, Result};
use crate::io::{Reader, Writer};
use crate::section::GfSection;

const MAGIC: &str = "mesh";

/// 顶点属性用途
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrName {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord0,
    TexCoord1,
    TexCoord2,
    BoneIndex,
    BoneWeight,
}

impl AttrName {
    fn from_raw(v: u8) -> Result<Self> {
        Ok(match v {
            0 => Self::Position,
            1 => Self::Normal,
            2 => Self::Tangent,
            3 => Self::Color,
            4 => Self::TexCoord0,
            5 => Self::TexCoord1,
            6 => Self::TexCoord2,
            7 => Self::BoneIndex,
            8 => Self::BoneWeight,
            _ => {
                return Err(Error::Malformed {
                    context: "未知的顶点属性用途",
                })
            }
        })
    }

    fn to_raw(self) -> u8 {
        self as u8
    }
}

/// 属性分量存储格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrFormat {
    I8,
    U8,
    I16,
    F32,
}

impl AttrFormat {
    fn from_raw(v: u8) -> Result<Self> {
        Ok(match v {
            0 => Self::I8,
            1 => Self::U8,
            2 => Self::I16,
            3 => Self::F32,
            _ => {
                return Err(Error::Malformed {
                    context: "未知的顶点属性格式",
                })
            }
        })
    }

    fn to_raw(self) -> u8 {
        self as u8
    }

    pub fn byte_size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 => 2,
            Self::F32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexAttr {
    pub name: AttrName,
    pub format: AttrFormat,
    pub elements: u8,
    pub scale: f32,
}

impl VertexAttr {
    fn read(r: &mut Reader) -> Result<Self> {
        let name = AttrName::from_raw(r.read_u8()?)?;
        let format = AttrFormat::from_raw(r.read_u8()?)?;
        let elements = r.read_u8()?;
        r.read_u8()?; // 对齐
        let scale = r.read_f32()?;
        Ok(Self {
            name,
            format,
            elements,
            scale,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_u8(self.name.to_raw());
        w.write_u8(self.format.to_raw());
        w.write_u8(self.elements);
        w.write_u8(0);
        w.write_f32(self.scale);
    }

    pub fn byte_size(&self) -> usize {
        self.format.byte_size() * self.elements as usize
    }
}

/// 蒙皮方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Skinning {
    /// 单骨骼刚性绑定
    #[default]
    Rigid,
    /// 最多 4 根加权骨骼
    Smooth,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GfSubMesh {
    pub indices: Vec<u16>,
    /// 缓冲内骨骼槽位 -> 骨架骨骼下标
    pub bone_indices: Vec<u8>,
    pub skinning: Skinning,
}

impl GfSubMesh {
    fn read(r: &mut Reader) -> Result<Self> {
        let index_count = r.read_u32()?;
        let bone_count = r.read_u32()?;
        let skinning = match r.read_u8()? {
            0 => Skinning::Rigid,
            _ => Skinning::Smooth,
        };
        r.skip(3)?;
        let mut indices = Vec::with_capacity(index_count as usize);
        for _ in 0..index_count {
            indices.push(r.read_u16()?);
        }
        let bone_indices = r.read_bytes(bone_count as usize)?.to_vec();
        Ok(Self {
            indices,
            bone_indices,
            skinning,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_u32(self.indices.len() as u32);
        w.write_u32(self.bone_indices.len() as u32);
        w.write_u8(match self.skinning {
            Skinning::Rigid => 0,
            Skinning::Smooth => 1,
        });
        w.write_u8(0);
        w.write_u8(0);
        w.write_u8(0);
        for &i in &self.indices {
            w.write_u16(i);
        }
        w.write_bytes(&self.bone_indices);
    }

    /// 缓冲内槽位映射到骨架下标; 越界一律回落到 0 号骨骼
    /// (参考文件里确实存在越界条目, 目标工具链照常加载)
    pub fn resolve_bone(&self, slot: u8, bone_count: usize) -> usize {
        let index = match self.bone_indices.get(slot as usize) {
            Some(&v) => v as usize,
            None => return 0,
        };
        if index < bone_count {
            index
        } else {
            0
        }
    }
}

/// 展平后的统一顶点记录
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PicaVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub color: Vec4,
    pub texcoords: [Vec2; 3],
    pub bone_slots: [u8; 4],
    pub weights: [f32; 4],
}

impl Default for PicaVertex {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            normal: Vec3::Z,
            color: Vec4::ONE,
            texcoords: [Vec2::ZERO; 3],
            bone_slots: [0; 4],
            weights: [1.0, 0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GfMesh {
    pub name: String,
    pub attributes: Vec<VertexAttr>,
    pub vertex_buffer: Vec<u8>,
    pub submeshes: Vec<GfSubMesh>,
}

impl GfMesh {
    pub fn read(r: &mut Reader) -> Result<Self> {
        let (section, start) = GfSection::expect(r, MAGIC)?;

        let name = r.read_padded_str(0x40)?;
        let attr_count = r.read_u32()?;
        let submesh_count = r.read_u32()?;
        let buffer_length = r.read_u32()?;

        let mut attributes = Vec::with_capacity(attr_count as usize);
        for _ in 0..attr_count {
            attributes.push(VertexAttr::read(r)?);
        }

        let vertex_buffer = r.read_bytes(buffer_length as usize)?.to_vec();

        let mut submeshes = Vec::with_capacity(submesh_count as usize);
        for _ in 0..submesh_count {
            submeshes.push(GfSubMesh::read(r)?);
        }

        section.finish(r, start)?;
        r.skip_padding()?;

        Ok(Self {
            name,
            attributes,
            vertex_buffer,
            submeshes,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        let patch = GfSection::write_placeholder(w, MAGIC);
        let start = w.position();

        w.write_padded_str(&self.name, 0x40);
        w.write_u32(self.attributes.len() as u32);
        w.write_u32(self.submeshes.len() as u32);
        w.write_u32(self.vertex_buffer.len() as u32);

        for attr in &self.attributes {
            attr.write(w);
        }
        w.write_bytes(&self.vertex_buffer);
        for sub in &self.submeshes {
            sub.write(w);
        }

        GfSection::backpatch(w, patch, start);
        w.write_padding();
    }

    /// 一个顶点占用的字节数
    pub fn vertex_stride(&self) -> usize {
        self.attributes.iter().map(VertexAttr::byte_size).sum()
    }

    pub fn vertex_count(&self) -> usize {
        let stride = self.vertex_stride();
        if stride == 0 {
            0
        } else {
            self.vertex_buffer.len() / stride
        }
    }

    /// 按属性表展平整个顶点缓冲
    pub fn vertices(&self) -> Result<Vec<PicaVertex>> {
        let stride = self.vertex_stride();
        let mut out = Vec::with_capacity(self.vertex_count());
        let mut r = Reader::new(&self.vertex_buffer);

        for _ in 0..self.vertex_count() {
            let base = r.position();
            let mut vertex = PicaVertex::default();

            for attr in &self.attributes {
                let mut raw = [0.0f32; 4];
                for v in raw.iter_mut().take(attr.elements as usize) {
                    *v = match attr.format {
                        AttrFormat::I8 => r.read_i8()? as f32,
                        AttrFormat::U8 => r.read_u8()? as f32,
                        AttrFormat::I16 => r.read_u16()? as i16 as f32,
                        AttrFormat::F32 => r.read_f32()?,
                    };
                }
                let values = raw.map(|v| v * attr.scale);
                match attr.name {
                    AttrName::Position => {
                        vertex.position = Vec3::new(values[0], values[1], values[2])
                    }
                    AttrName::Normal => vertex.normal = Vec3::new(values[0], values[1], values[2]),
                    AttrName::Tangent => {}
                    AttrName::Color => vertex.color = Vec4::from_array(values),
                    AttrName::TexCoord0 => vertex.texcoords[0] = Vec2::new(values[0], values[1]),
                    AttrName::TexCoord1 => vertex.texcoords[1] = Vec2::new(values[0], values[1]),
                    AttrName::TexCoord2 => vertex.texcoords[2] = Vec2::new(values[0], values[1]),
                    AttrName::BoneIndex => {
                        // 下标不缩放, 取原始值
                        for (slot, v) in vertex
                            .bone_slots
                            .iter_mut()
                            .zip(raw.iter())
                            .take(attr.elements as usize)
                        {
                            *slot = *v as u8;
                        }
                    }
                    AttrName::BoneWeight => {
                        vertex.weights = values;
                    }
                }
            }

            r.seek(base + stride)?;
            out.push(vertex);
        }

        Ok(out)
    }
}
