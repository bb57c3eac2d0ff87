//! FNV-1 哈希与带哈希的名字
//!
//! 注意是 FNV-1 而非 FNV-1a (先乘后异或), 常数与目标引擎一致,
//! 材质/着色器头部的校验值依赖这一点。

use crate::error::Result;
use crate::io::{Reader, Writer};

const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 逐字节 FNV-1
#[derive(Clone, Copy)]
pub struct Fnv1 {
    state: u32,
}

impl Fnv1 {
    pub fn new() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }

    pub fn update(&mut self, byte: u8) {
        self.state = self.state.wrapping_mul(FNV_PRIME) ^ byte as u32;
    }

    pub fn update_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.update(b);
        }
    }

    pub fn finish(&self) -> u32 {
        self.state
    }
}

impl Default for Fnv1 {
    fn default() -> Self {
        Self::new()
    }
}

/// 计算字符串的 FNV-1 哈希
pub fn hash_str(s: &str) -> u32 {
    let mut h = Fnv1::new();
    h.update_bytes(s.as_bytes());
    h.finish()
}

/// 名字 + 哈希, 用于廉价比较的查找键
/// 磁盘布局: u32 哈希 + u8 长度前缀字符串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashName {
    pub name: String,
    pub hash: u32,
}

impl HashName {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            hash: hash_str(name),
        }
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        let hash = r.read_u32()?;
        let name = r.read_short_str()?;
        Ok(Self { name, hash })
    }

    /// 写入时哈希一律由名字重算
    pub fn write(w: &mut Writer, name: &str) {
        w.write_u32(hash_str(name));
        w.write_short_str(name);
    }
}
