//! section 框架: 8 字节 magic + u32 长度 + 0xFFFFFFFF, 共 0x10 字节头部

use crate::error::{Error, Result};
use crate::io::{Reader, Writer};

/// section 头部长度
pub const HEADER_SIZE: usize = 0x10;

/// 带长度的命名 section
#[derive(Debug, Clone)]
pub struct GfSection {
    pub magic: String,
    pub length: u32,
}

impl GfSection {
    /// 读取头部, 返回 section 与内容起始位置
    pub fn read(r: &mut Reader) -> Result<(GfSection, usize)> {
        let magic = r.read_padded_str(8)?;
        let length = r.read_u32()?;
        r.read_u32()?; // 固定 0xFFFFFFFF
        Ok((GfSection { magic, length }, r.position()))
    }

    /// 读取头部并校验 magic
    pub fn expect(r: &mut Reader, magic: &str) -> Result<(GfSection, usize)> {
        let (section, start) = Self::read(r)?;
        if section.magic != magic {
            return Err(Error::InvalidMagic {
                expected: magic.to_string(),
                found: section.magic,
            });
        }
        Ok((section, start))
    }

    /// 写入占位头部, 返回长度字段的回填偏移
    pub fn write_placeholder(w: &mut Writer, magic: &str) -> usize {
        w.write_padded_str(magic, 8);
        let patch = w.position();
        w.write_u32(0);
        w.write_u32(0xFFFF_FFFF);
        patch
    }

    /// 内容写完后回填长度 (长度不含 0x10 字节头部)
    pub fn backpatch(w: &mut Writer, patch: usize, content_start: usize) {
        let length = (w.position() - content_start) as u32;
        w.backpatch_u32(patch, length);
    }

    /// 严格校验: 内容读取不能越过声明的终点, 然后跳到终点
    pub fn finish(&self, r: &mut Reader, start: usize) -> Result<()> {
        let end = start + self.length as usize;
        if r.position() > end {
            return Err(Error::SectionLengthMismatch {
                magic: self.magic.clone(),
                declared: self.length,
                actual: (r.position() - start) as u32,
            });
        }
        r.seek(end)
    }
}
