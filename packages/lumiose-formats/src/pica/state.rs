//! 固定功能渲染状态的按位打包/解包
//!
//! 每个结构的 from_raw/to_raw 必须互逆: 材质的磁盘编码以命令流为准,
//! 这里的字段只是可读的投影, 写回时要逐位还原。

use crate::color::Rgba;

/// 片元输出模式 (低 2 位保留原值)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColorOperation {
    pub frag_op_mode: u8,
    /// false = 逻辑运算, true = 混合
    pub blend_mode: bool,
}

impl ColorOperation {
    /// 高 16 位的 0x00E4 为参考文件中的固定常数, 含义未知, 原样保留
    pub const FIXED_BITS: u32 = 0x00E4_0000;

    pub fn from_raw(p: u32) -> Self {
        Self {
            frag_op_mode: (p & 3) as u8,
            blend_mode: p >> 8 & 1 != 0,
        }
    }

    pub fn to_raw(self) -> u32 {
        Self::FIXED_BITS | self.frag_op_mode as u32 & 3 | (self.blend_mode as u32) << 8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlendEquation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

impl BlendEquation {
    pub fn from_raw(v: u32) -> Self {
        match v & 7 {
            1 => Self::Subtract,
            2 => Self::ReverseSubtract,
            3 => Self::Min,
            4 => Self::Max,
            _ => Self::Add,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFunc {
    Zero,
    One,
    SourceColor,
    OneMinusSourceColor,
    DestinationColor,
    OneMinusDestinationColor,
    SourceAlpha,
    OneMinusSourceAlpha,
    DestinationAlpha,
    OneMinusDestinationAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SourceAlphaSaturate,
}

impl BlendFunc {
    pub fn from_raw(v: u32) -> Self {
        match v & 0xF {
            0 => Self::Zero,
            1 => Self::One,
            2 => Self::SourceColor,
            3 => Self::OneMinusSourceColor,
            4 => Self::DestinationColor,
            5 => Self::OneMinusDestinationColor,
            6 => Self::SourceAlpha,
            7 => Self::OneMinusSourceAlpha,
            8 => Self::DestinationAlpha,
            9 => Self::OneMinusDestinationAlpha,
            10 => Self::ConstantColor,
            11 => Self::OneMinusConstantColor,
            12 => Self::ConstantAlpha,
            13 => Self::OneMinusConstantAlpha,
            _ => Self::SourceAlphaSaturate,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFunction {
    pub color_equation: BlendEquation,
    pub alpha_equation: BlendEquation,
    pub color_src: BlendFunc,
    pub color_dst: BlendFunc,
    pub alpha_src: BlendFunc,
    pub alpha_dst: BlendFunc,
}

impl Default for BlendFunction {
    fn default() -> Self {
        Self {
            color_equation: BlendEquation::Add,
            alpha_equation: BlendEquation::Add,
            color_src: BlendFunc::One,
            color_dst: BlendFunc::Zero,
            alpha_src: BlendFunc::One,
            alpha_dst: BlendFunc::Zero,
        }
    }
}

impl BlendFunction {
    pub fn from_raw(p: u32) -> Self {
        Self {
            color_equation: BlendEquation::from_raw(p),
            alpha_equation: BlendEquation::from_raw(p >> 8),
            color_src: BlendFunc::from_raw(p >> 16),
            color_dst: BlendFunc::from_raw(p >> 20),
            alpha_src: BlendFunc::from_raw(p >> 24),
            alpha_dst: BlendFunc::from_raw(p >> 28),
        }
    }

    pub fn to_raw(self) -> u32 {
        self.color_equation.to_raw()
            | self.alpha_equation.to_raw() << 8
            | self.color_src.to_raw() << 16
            | self.color_dst.to_raw() << 20
            | self.alpha_src.to_raw() << 24
            | self.alpha_dst.to_raw() << 28
    }

    /// One/Zero 恒等混合: 此时不写 logic-op 与 blend-color 命令
    pub fn is_identity(self) -> bool {
        self.color_src == BlendFunc::One
            && self.color_dst == BlendFunc::Zero
            && self.alpha_src == BlendFunc::One
            && self.alpha_dst == BlendFunc::Zero
    }
}

/// 逻辑运算 (低 4 位有效)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogicalOp {
    Clear,
    And,
    AndReverse,
    #[default]
    Copy,
    Set,
    CopyInverted,
    NoOp,
    Invert,
    Nand,
    Or,
    Nor,
    Xor,
    Equiv,
    AndInverted,
    OrReverse,
    OrInverted,
}

impl LogicalOp {
    pub fn from_raw(v: u32) -> Self {
        match v & 0xF {
            0 => Self::Clear,
            1 => Self::And,
            2 => Self::AndReverse,
            3 => Self::Copy,
            4 => Self::Set,
            5 => Self::CopyInverted,
            6 => Self::NoOp,
            7 => Self::Invert,
            8 => Self::Nand,
            9 => Self::Or,
            10 => Self::Nor,
            11 => Self::Xor,
            12 => Self::Equiv,
            13 => Self::AndInverted,
            14 => Self::OrReverse,
            _ => Self::OrInverted,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TestFunc {
    Never,
    #[default]
    Always,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl TestFunc {
    pub fn from_raw(v: u32) -> Self {
        match v & 7 {
            0 => Self::Never,
            1 => Self::Always,
            2 => Self::Equal,
            3 => Self::NotEqual,
            4 => Self::Less,
            5 => Self::LessOrEqual,
            6 => Self::Greater,
            _ => Self::GreaterOrEqual,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphaTest {
    pub enabled: bool,
    pub function: TestFunc,
    pub reference: u8,
}

impl AlphaTest {
    pub fn from_raw(p: u32) -> Self {
        Self {
            enabled: p & 1 != 0,
            function: TestFunc::from_raw(p >> 4),
            reference: (p >> 8) as u8,
        }
    }

    pub fn to_raw(self) -> u32 {
        self.enabled as u32 | self.function.to_raw() << 4 | (self.reference as u32) << 8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StencilTest {
    pub enabled: bool,
    pub function: TestFunc,
    pub buffer_mask: u8,
    pub reference: u8,
    pub mask: u8,
}

impl StencilTest {
    pub fn from_raw(p: u32) -> Self {
        Self {
            enabled: p & 1 != 0,
            function: TestFunc::from_raw(p >> 4),
            buffer_mask: (p >> 8) as u8,
            reference: (p >> 16) as u8,
            mask: (p >> 24) as u8,
        }
    }

    pub fn to_raw(self) -> u32 {
        self.enabled as u32
            | self.function.to_raw() << 4
            | (self.buffer_mask as u32) << 8
            | (self.reference as u32) << 16
            | (self.mask as u32) << 24
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Increment,
    Decrement,
    Invert,
    IncrementWrap,
    DecrementWrap,
}

impl StencilOp {
    pub fn from_raw(v: u32) -> Self {
        match v & 7 {
            0 => Self::Keep,
            1 => Self::Zero,
            2 => Self::Replace,
            3 => Self::Increment,
            4 => Self::Decrement,
            5 => Self::Invert,
            6 => Self::IncrementWrap,
            _ => Self::DecrementWrap,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StencilOperation {
    pub fail: StencilOp,
    pub z_fail: StencilOp,
    pub z_pass: StencilOp,
}

impl StencilOperation {
    pub fn from_raw(p: u32) -> Self {
        Self {
            fail: StencilOp::from_raw(p),
            z_fail: StencilOp::from_raw(p >> 4),
            z_pass: StencilOp::from_raw(p >> 8),
        }
    }

    pub fn to_raw(self) -> u32 {
        self.fail.to_raw() | self.z_fail.to_raw() << 4 | self.z_pass.to_raw() << 8
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DepthColorMask {
    pub enabled: bool,
    pub depth_func: TestFunc,
    pub red_write: bool,
    pub green_write: bool,
    pub blue_write: bool,
    pub alpha_write: bool,
    pub depth_write: bool,
}

impl DepthColorMask {
    pub fn from_raw(p: u32) -> Self {
        Self {
            enabled: p & 1 != 0,
            depth_func: TestFunc::from_raw(p >> 4),
            red_write: p >> 8 & 1 != 0,
            green_write: p >> 9 & 1 != 0,
            blue_write: p >> 10 & 1 != 0,
            alpha_write: p >> 11 & 1 != 0,
            depth_write: p >> 12 & 1 != 0,
        }
    }

    pub fn to_raw(self) -> u32 {
        self.enabled as u32
            | self.depth_func.to_raw() << 4
            | (self.red_write as u32) << 8
            | (self.green_write as u32) << 9
            | (self.blue_write as u32) << 10
            | (self.alpha_write as u32) << 11
            | (self.depth_write as u32) << 12
    }
}

/// 面剔除 (低 2 位有效)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FaceCulling {
    #[default]
    Never,
    FrontFace,
    BackFace,
}

impl FaceCulling {
    pub fn from_raw(v: u32) -> Self {
        match v & 3 {
            1 => Self::FrontFace,
            2 => Self::BackFace,
            _ => Self::Never,
        }
    }

    pub fn to_raw(self) -> u32 {
        self as u32
    }
}

/// 光照查表输入的绝对值开关, 7 条输入各占 4 位中的 1 位 (置位 = 关闭取绝对值)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LutInputAbs {
    pub abs: [bool; 7],
}

impl Default for LutInputAbs {
    fn default() -> Self {
        Self { abs: [true; 7] }
    }
}

impl LutInputAbs {
    pub fn from_raw(p: u32) -> Self {
        let mut abs = [true; 7];
        for (i, lane) in abs.iter_mut().enumerate() {
            *lane = p >> (i * 4 + 1) & 1 == 0;
        }
        Self { abs }
    }

    pub fn to_raw(self) -> u32 {
        let mut p = 0;
        for (i, lane) in self.abs.iter().enumerate() {
            if !lane {
                p |= 1 << (i * 4 + 1);
            }
        }
        p
    }
}

/// 光照查表输入选择, 7 条输入各 3 位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LutInputSelect {
    pub select: [u8; 7],
}

impl LutInputSelect {
    pub fn from_raw(p: u32) -> Self {
        let mut select = [0; 7];
        for (i, lane) in select.iter_mut().enumerate() {
            *lane = (p >> (i * 4) & 7) as u8;
        }
        Self { select }
    }

    pub fn to_raw(self) -> u32 {
        let mut p = 0;
        for (i, lane) in self.select.iter().enumerate() {
            p |= (*lane as u32 & 7) << (i * 4);
        }
        p
    }
}

/// 光照查表输出缩放, 7 条输入各 3 位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LutInputScale {
    pub scale: [u8; 7],
}

impl LutInputScale {
    pub fn from_raw(p: u32) -> Self {
        let mut scale = [0; 7];
        for (i, lane) in scale.iter_mut().enumerate() {
            *lane = (p >> (i * 4) & 7) as u8;
        }
        Self { scale }
    }

    pub fn to_raw(self) -> u32 {
        let mut p = 0;
        for (i, lane) in self.scale.iter().enumerate() {
            p |= (*lane as u32 & 7) << (i * 4);
        }
        p
    }
}

/// 混合颜色常量就是普通 RGBA 字
pub type BlendColor = Rgba;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_function_roundtrip() {
        let f = BlendFunction {
            color_equation: BlendEquation::ReverseSubtract,
            alpha_equation: BlendEquation::Max,
            color_src: BlendFunc::SourceAlpha,
            color_dst: BlendFunc::OneMinusSourceAlpha,
            alpha_src: BlendFunc::One,
            alpha_dst: BlendFunc::ConstantAlpha,
        };
        assert_eq!(BlendFunction::from_raw(f.to_raw()), f);
        assert!(!f.is_identity());
        assert!(BlendFunction::default().is_identity());
    }

    #[test]
    fn color_operation_keeps_fixed_bits() {
        let op = ColorOperation {
            frag_op_mode: 0,
            blend_mode: true,
        };
        let raw = op.to_raw();
        assert_eq!(raw & 0xFFFF_0000, ColorOperation::FIXED_BITS);
        assert_eq!(ColorOperation::from_raw(raw), op);
    }

    #[test]
    fn narrow_registers_mask_low_bits() {
        // 高位脏数据不得泄漏进字段
        assert_eq!(LogicalOp::from_raw(0xFFFF_FFF3), LogicalOp::Copy);
        assert_eq!(FaceCulling::from_raw(0xABCD_EF02), FaceCulling::BackFace);
    }

    #[test]
    fn stencil_and_depth_roundtrip() {
        let st = StencilTest {
            enabled: true,
            function: TestFunc::Greater,
            buffer_mask: 0xF0,
            reference: 0x42,
            mask: 0xFF,
        };
        assert_eq!(StencilTest::from_raw(st.to_raw()), st);

        let dm = DepthColorMask {
            enabled: true,
            depth_func: TestFunc::LessOrEqual,
            red_write: true,
            green_write: true,
            blue_write: false,
            alpha_write: true,
            depth_write: true,
        };
        assert_eq!(DepthColorMask::from_raw(dm.to_raw()), dm);
    }

    #[test]
    fn lut_input_abs_roundtrip() {
        let mut v = LutInputAbs::default();
        v.abs[2] = false;
        v.abs[6] = false;
        assert_eq!(LutInputAbs::from_raw(v.to_raw()), v);
    }
}
