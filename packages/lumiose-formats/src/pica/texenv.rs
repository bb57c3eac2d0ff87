//! 固定功能纹理合成 (TexEnv) 阶段模型, 共 6 个阶段

use crate::color::Rgba;

/// 合成源
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CombinerSource {
    #[default]
    PrimaryColor,
    FragmentPrimaryColor,
    FragmentSecondaryColor,
    Texture0,
    Texture1,
    Texture2,
    Texture3,
    PreviousBuffer,
    Constant,
    Previous,
}

impl CombinerSource {
    pub fn from_raw(v: u32) -> Self {
        match v & 0xF {
            0 => Self::PrimaryColor,
            1 => Self::FragmentPrimaryColor,
            2 => Self::FragmentSecondaryColor,
            3 => Self::Texture0,
            4 => Self::Texture1,
            5 => Self::Texture2,
            6 => Self::Texture3,
            13 => Self::PreviousBuffer,
            14 => Self::Constant,
            15 => Self::Previous,
            _ => Self::PrimaryColor,
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            Self::PrimaryColor => 0,
            Self::FragmentPrimaryColor => 1,
            Self::FragmentSecondaryColor => 2,
            Self::Texture0 => 3,
            Self::Texture1 => 4,
            Self::Texture2 => 5,
            Self::Texture3 => 6,
            Self::PreviousBuffer => 13,
            Self::Constant => 14,
            Self::Previous => 15,
        }
    }
}

/// 颜色通道取数方式 (4 位)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorOperand {
    #[default]
    Color,
    OneMinusColor,
    Alpha,
    OneMinusAlpha,
    Red,
    OneMinusRed,
    Green,
    OneMinusGreen,
    Blue,
    OneMinusBlue,
}

impl ColorOperand {
    pub fn from_raw(v: u32) -> Self {
        match v & 0xF {
            0 => Self::Color,
            1 => Self::OneMinusColor,
            2 => Self::Alpha,
            3 => Self::OneMinusAlpha,
            4 => Self::Red,
            5 => Self::OneMinusRed,
            8 => Self::Green,
            9 => Self::OneMinusGreen,
            12 => Self::Blue,
            13 => Self::OneMinusBlue,
            _ => Self::Color,
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            Self::Color => 0,
            Self::OneMinusColor => 1,
            Self::Alpha => 2,
            Self::OneMinusAlpha => 3,
            Self::Red => 4,
            Self::OneMinusRed => 5,
            Self::Green => 8,
            Self::OneMinusGreen => 9,
            Self::Blue => 12,
            Self::OneMinusBlue => 13,
        }
    }
}

/// 透明通道取数方式 (3 位)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlphaOperand {
    #[default]
    Alpha,
    OneMinusAlpha,
    Red,
    OneMinusRed,
    Green,
    OneMinusGreen,
    Blue,
    OneMinusBlue,
}

impl AlphaOperand {
    pub fn from_raw(v: u32) -> Self {
        match v & 7 {
            0 => Self::Alpha,
            1 => Self::OneMinusAlpha,
            2 => Self::Red,
            3 => Self::OneMinusRed,
            4 => Self::Green,
            5 => Self::OneMinusGreen,
            6 => Self::Blue,
            _ => Self::OneMinusBlue,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

/// 合成模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CombinerMode {
    #[default]
    Replace,
    Modulate,
    Add,
    AddSigned,
    Interpolate,
    Subtract,
    DotProduct3Rgb,
    DotProduct3Rgba,
    MultAdd,
    AddMult,
}

impl CombinerMode {
    pub fn from_raw(v: u32) -> Self {
        match v & 0xF {
            0 => Self::Replace,
            1 => Self::Modulate,
            2 => Self::Add,
            3 => Self::AddSigned,
            4 => Self::Interpolate,
            5 => Self::Subtract,
            6 => Self::DotProduct3Rgb,
            7 => Self::DotProduct3Rgba,
            8 => Self::MultAdd,
            9 => Self::AddMult,
            _ => Self::Replace,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }

    /// 该模式实际使用的源数量
    pub fn source_count(self) -> usize {
        match self {
            Self::Replace => 1,
            Self::Modulate | Self::Add | Self::AddSigned | Self::Subtract => 2,
            _ => 3,
        }
    }
}

/// 结果缩放
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CombinerScale {
    #[default]
    One,
    Two,
    Four,
}

impl CombinerScale {
    pub fn from_raw(v: u32) -> Self {
        match v & 3 {
            1 => Self::Two,
            2 => Self::Four,
            _ => Self::One,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexEnvSource {
    pub color: [CombinerSource; 3],
    pub alpha: [CombinerSource; 3],
}

impl TexEnvSource {
    pub fn from_raw(p: u32) -> Self {
        Self {
            color: [
                CombinerSource::from_raw(p),
                CombinerSource::from_raw(p >> 4),
                CombinerSource::from_raw(p >> 8),
            ],
            alpha: [
                CombinerSource::from_raw(p >> 16),
                CombinerSource::from_raw(p >> 20),
                CombinerSource::from_raw(p >> 24),
            ],
        }
    }

    pub fn to_raw(self) -> u32 {
        self.color[0].to_raw()
            | self.color[1].to_raw() << 4
            | self.color[2].to_raw() << 8
            | self.alpha[0].to_raw() << 16
            | self.alpha[1].to_raw() << 20
            | self.alpha[2].to_raw() << 24
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexEnvOperand {
    pub color: [ColorOperand; 3],
    pub alpha: [AlphaOperand; 3],
}

impl TexEnvOperand {
    pub fn from_raw(p: u32) -> Self {
        Self {
            color: [
                ColorOperand::from_raw(p),
                ColorOperand::from_raw(p >> 4),
                ColorOperand::from_raw(p >> 8),
            ],
            alpha: [
                AlphaOperand::from_raw(p >> 12),
                AlphaOperand::from_raw(p >> 16),
                AlphaOperand::from_raw(p >> 20),
            ],
        }
    }

    pub fn to_raw(self) -> u32 {
        self.color[0].to_raw()
            | self.color[1].to_raw() << 4
            | self.color[2].to_raw() << 8
            | self.alpha[0].to_raw() << 12
            | self.alpha[1].to_raw() << 16
            | self.alpha[2].to_raw() << 20
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexEnvCombiner {
    pub color: CombinerMode,
    pub alpha: CombinerMode,
}

impl TexEnvCombiner {
    pub fn from_raw(p: u32) -> Self {
        Self {
            color: CombinerMode::from_raw(p),
            alpha: CombinerMode::from_raw(p >> 16),
        }
    }

    pub fn to_raw(self) -> u32 {
        self.color.to_raw() | self.alpha.to_raw() << 16
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexEnvScale {
    pub color: CombinerScale,
    pub alpha: CombinerScale,
}

impl TexEnvScale {
    pub fn from_raw(p: u32) -> Self {
        Self {
            color: CombinerScale::from_raw(p),
            alpha: CombinerScale::from_raw(p >> 16),
        }
    }

    pub fn to_raw(self) -> u32 {
        self.color.to_raw() | self.alpha.to_raw() << 16
    }
}

/// 一个 TexEnv 阶段的完整配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TexEnvStage {
    pub source: TexEnvSource,
    pub operand: TexEnvOperand,
    pub combiner: TexEnvCombiner,
    pub color: Rgba,
    pub scale: TexEnvScale,
    pub update_color_buffer: bool,
    pub update_alpha_buffer: bool,
}

impl TexEnvStage {
    /// 颜色通道是否为直通 (Previous 的 Replace)
    pub fn is_color_pass_through(&self) -> bool {
        self.combiner.color == CombinerMode::Replace
            && self.source.color[0] == CombinerSource::Previous
            && self.operand.color[0] == ColorOperand::Color
            && self.scale.color == CombinerScale::One
    }

    pub fn is_alpha_pass_through(&self) -> bool {
        self.combiner.alpha == CombinerMode::Replace
            && self.source.alpha[0] == CombinerSource::Previous
            && self.operand.alpha[0] == AlphaOperand::Alpha
            && self.scale.alpha == CombinerScale::One
    }

    /// 从 update-buffer 字展开各阶段标志 (仅阶段 1..=4 有位)
    pub fn set_update_buffer(stages: &mut [TexEnvStage; 6], param: u32) {
        for i in 1..=4usize {
            stages[i].update_color_buffer = param & (0x100 << (i - 1)) != 0;
            stages[i].update_alpha_buffer = param & (0x1000 << (i - 1)) != 0;
        }
    }

    pub fn get_update_buffer(stages: &[TexEnvStage; 6]) -> u32 {
        let mut param = 0;
        for i in 1..=4usize {
            if stages[i].update_color_buffer {
                param |= 0x100 << (i - 1);
            }
            if stages[i].update_alpha_buffer {
                param |= 0x1000 << (i - 1);
            }
        }
        param
    }
}

/// 阶段下标由寄存器编号推出: 步长 8, 高段 (>=6) 压回 4/5
pub fn stage_from_register(register: u16) -> usize {
    let stage = (register >> 3 & 7) as usize;
    if stage >= 6 {
        stage - 2
    } else {
        stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pica::registers as reg;

    #[test]
    fn stage_index_collapses_sparse_range() {
        assert_eq!(stage_from_register(reg::GPUREG_TEXENV0_SOURCE), 0);
        assert_eq!(stage_from_register(reg::GPUREG_TEXENV1_SOURCE), 1);
        assert_eq!(stage_from_register(reg::GPUREG_TEXENV2_SOURCE), 2);
        assert_eq!(stage_from_register(reg::GPUREG_TEXENV3_SOURCE), 3);
        assert_eq!(stage_from_register(reg::GPUREG_TEXENV4_SOURCE), 4);
        assert_eq!(stage_from_register(reg::GPUREG_TEXENV5_SOURCE), 5);
    }

    #[test]
    fn source_word_roundtrip() {
        let src = TexEnvSource {
            color: [
                CombinerSource::Texture0,
                CombinerSource::PrimaryColor,
                CombinerSource::Previous,
            ],
            alpha: [
                CombinerSource::Constant,
                CombinerSource::Texture1,
                CombinerSource::Previous,
            ],
        };
        assert_eq!(TexEnvSource::from_raw(src.to_raw()), src);
    }

    #[test]
    fn operand_word_roundtrip() {
        let op = TexEnvOperand {
            color: [
                ColorOperand::Alpha,
                ColorOperand::OneMinusBlue,
                ColorOperand::Color,
            ],
            alpha: [
                AlphaOperand::OneMinusGreen,
                AlphaOperand::Red,
                AlphaOperand::Alpha,
            ],
        };
        assert_eq!(TexEnvOperand::from_raw(op.to_raw()), op);
    }

    #[test]
    fn update_buffer_roundtrip() {
        let mut stages = [TexEnvStage::default(); 6];
        stages[2].update_color_buffer = true;
        stages[4].update_alpha_buffer = true;
        let word = TexEnvStage::get_update_buffer(&stages);
        let mut restored = [TexEnvStage::default(); 6];
        TexEnvStage::set_update_buffer(&mut restored, word);
        assert!(restored[2].update_color_buffer);
        assert!(restored[4].update_alpha_buffer);
        assert!(!restored[1].update_color_buffer);
    }
}
