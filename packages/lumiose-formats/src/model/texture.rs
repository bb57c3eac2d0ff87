//! 纹理条目: 只携带尺寸/格式/原始纹素, 位图解码由外部协作方完成

use crate::error::Result;
use crate::io::{Reader, Writer};
use crate::section::GfSection;

const MAGIC: &str = "texture";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GfTexture {
    pub name: String,
    pub width: u16,
    pub height: u16,
    /// 硬件纹素格式编号, 不在此处解释
    pub format: u16,
    pub mipmap_count: u16,
    pub data: Vec<u8>,
}

impl GfTexture {
    pub fn read(r: &mut Reader) -> Result<Self> {
        let (section, start) = GfSection::expect(r, MAGIC)?;

        let name = r.read_padded_str(0x40)?;
        let width = r.read_u16()?;
        let height = r.read_u16()?;
        let format = r.read_u16()?;
        let mipmap_count = r.read_u16()?;
        let data_length = r.read_u32()?;
        let data = r.read_bytes(data_length as usize)?.to_vec();

        section.finish(r, start)?;
        r.skip_padding()?;

        Ok(Self {
            name,
            width,
            height,
            format,
            mipmap_count,
            data,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        let patch = GfSection::write_placeholder(w, MAGIC);
        let start = w.position();

        w.write_padded_str(&self.name, 0x40);
        w.write_u16(self.width);
        w.write_u16(self.height);
        w.write_u16(self.format);
        w.write_u16(self.mipmap_count);
        w.write_u32(self.data.len() as u32);
        w.write_bytes(&self.data);

        GfSection::backpatch(w, patch, start);
        w.write_padding();
    }
}
