//! PICA 24 位浮点: 1 符号 + 7 指数 (偏置 63) + 16 尾数

use glam::Vec4;

pub fn to_word24(value: f32) -> u32 {
    if value == 0.0 {
        return 0;
    }
    let bits = value.to_bits();
    let sign = bits >> 31;
    let exp = ((bits >> 23) & 0xFF) as i32 - 127 + 63;
    let mant = (bits >> 7) & 0xFFFF;
    if exp < 0 {
        // 下溢冲刷为 0
        0
    } else {
        mant | (exp as u32) << 16 | sign << 23
    }
}

pub fn from_word24(word: u32) -> f32 {
    let sign = (word >> 23) & 1;
    let exp = (word >> 16) & 0x7F;
    let mant = word & 0xFFFF;
    if exp == 0 && mant == 0 {
        return if sign != 0 { -0.0 } else { 0.0 };
    }
    f32::from_bits(sign << 31 | (exp + 127 - 63) << 23 | mant << 7)
}

/// 3 个字打包 1 个 vec4, 分量按硬件顺序 W 在最低位
pub fn unpack_vec4(words: [u32; 3]) -> Vec4 {
    let v = words[0] as u128 | (words[1] as u128) << 32 | (words[2] as u128) << 64;
    Vec4::new(
        from_word24((v >> 72) as u32 & 0xFF_FFFF),
        from_word24((v >> 48) as u32 & 0xFF_FFFF),
        from_word24((v >> 24) as u32 & 0xFF_FFFF),
        from_word24(v as u32 & 0xFF_FFFF),
    )
}

pub fn pack_vec4(v: Vec4) -> [u32; 3] {
    let packed = to_word24(v.w) as u128
        | (to_word24(v.z) as u128) << 24
        | (to_word24(v.y) as u128) << 48
        | (to_word24(v.x) as u128) << 72;
    [packed as u32, (packed >> 32) as u32, (packed >> 64) as u32]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word24_known_values() {
        assert_eq!(to_word24(0.0), 0);
        // -1.0: 符号 1, 指数 63, 尾数 0
        assert_eq!(to_word24(-1.0), 0x00BF_0000);
        assert_eq!(from_word24(0x00BF_0000), -1.0);
        assert_eq!(from_word24(to_word24(0.5)), 0.5);
        assert_eq!(from_word24(to_word24(2.0)), 2.0);
    }

    #[test]
    fn vec4_roundtrip() {
        let v = Vec4::new(1.0, -2.0, 0.25, 8.0);
        assert_eq!(unpack_vec4(pack_vec4(v)), v);
    }
}
