//! PICA200 寄存器编号
//!
//! 寄存器 id 保留为裸 u16: 命令流里出现未知寄存器是正常情况
//! (向前兼容, 解码时静默忽略), 枚举会丢失这类值。

pub const GPUREG_DUMMY: u16 = 0x0000;
/// 命令队列终止哨兵寄存器
pub const GPUREG_FINALIZE: u16 = 0x0010;

pub const GPUREG_FACECULLING_CONFIG: u16 = 0x0040;

pub const GPUREG_DEPTHMAP_SCALE: u16 = 0x004D;
pub const GPUREG_DEPTHMAP_OFFSET: u16 = 0x004E;

pub const GPUREG_SH_OUTMAP_O0: u16 = 0x0050;
pub const GPUREG_SH_OUTMAP_O1: u16 = 0x0051;
pub const GPUREG_SH_OUTMAP_O2: u16 = 0x0052;
pub const GPUREG_SH_OUTMAP_O3: u16 = 0x0053;
pub const GPUREG_SH_OUTMAP_O4: u16 = 0x0054;
pub const GPUREG_SH_OUTMAP_O5: u16 = 0x0055;
pub const GPUREG_SH_OUTMAP_O6: u16 = 0x0056;

pub const GPUREG_TEXUNIT_CONFIG: u16 = 0x0080;
pub const GPUREG_TEXUNIT0_BORDER_COLOR: u16 = 0x0081;
pub const GPUREG_TEXUNIT1_BORDER_COLOR: u16 = 0x0091;
pub const GPUREG_TEXUNIT2_BORDER_COLOR: u16 = 0x0099;

// TexEnv 各阶段寄存器组: 每组步长 8, 阶段 4/5 与 0..3 之间隔了一组
pub const GPUREG_TEXENV0_SOURCE: u16 = 0x00C0;
pub const GPUREG_TEXENV0_OPERAND: u16 = 0x00C1;
pub const GPUREG_TEXENV0_COMBINER: u16 = 0x00C2;
pub const GPUREG_TEXENV0_COLOR: u16 = 0x00C3;
pub const GPUREG_TEXENV0_SCALE: u16 = 0x00C4;
pub const GPUREG_TEXENV1_SOURCE: u16 = 0x00C8;
pub const GPUREG_TEXENV2_SOURCE: u16 = 0x00D0;
pub const GPUREG_TEXENV3_SOURCE: u16 = 0x00D8;
pub const GPUREG_TEXENV_UPDATE_BUFFER: u16 = 0x00E0;
pub const GPUREG_TEXENV4_SOURCE: u16 = 0x00F0;
pub const GPUREG_TEXENV5_SOURCE: u16 = 0x00F8;
pub const GPUREG_TEXENV_BUFFER_COLOR: u16 = 0x00FD;

pub const GPUREG_COLOR_OPERATION: u16 = 0x0100;
pub const GPUREG_BLEND_FUNC: u16 = 0x0101;
pub const GPUREG_LOGIC_OP: u16 = 0x0102;
pub const GPUREG_BLEND_COLOR: u16 = 0x0103;
pub const GPUREG_FRAGOP_ALPHA_TEST: u16 = 0x0104;
pub const GPUREG_STENCIL_TEST: u16 = 0x0105;
pub const GPUREG_STENCIL_OP: u16 = 0x0106;
pub const GPUREG_DEPTH_COLOR_MASK: u16 = 0x0107;

pub const GPUREG_FRAMEBUFFER_INVALIDATE: u16 = 0x0110;
pub const GPUREG_FRAMEBUFFER_FLUSH: u16 = 0x0111;
pub const GPUREG_COLORBUFFER_READ: u16 = 0x0112;
pub const GPUREG_COLORBUFFER_WRITE: u16 = 0x0113;
pub const GPUREG_DEPTHBUFFER_READ: u16 = 0x0114;
pub const GPUREG_DEPTHBUFFER_WRITE: u16 = 0x0115;

pub const GPUREG_DEPTHMAP_ENABLE: u16 = 0x0126;

pub const GPUREG_LIGHTING_LUTINPUT_ABS: u16 = 0x01D0;
pub const GPUREG_LIGHTING_LUTINPUT_SELECT: u16 = 0x01D1;
pub const GPUREG_LIGHTING_LUTINPUT_SCALE: u16 = 0x01D2;

pub const GPUREG_GSH_ENTRYPOINT: u16 = 0x028A;
pub const GPUREG_GSH_FLOATUNIFORM_INDEX: u16 = 0x0290;
pub const GPUREG_GSH_FLOATUNIFORM_DATA0: u16 = 0x0291;
pub const GPUREG_GSH_FLOATUNIFORM_DATA7: u16 = 0x0298;

pub const GPUREG_VSH_ENTRYPOINT: u16 = 0x02BA;
pub const GPUREG_VSH_FLOATUNIFORM_INDEX: u16 = 0x02C0;
pub const GPUREG_VSH_FLOATUNIFORM_DATA0: u16 = 0x02C1;
pub const GPUREG_VSH_FLOATUNIFORM_DATA7: u16 = 0x02C8;

pub const GPUREG_VSH_CODETRANSFER_DATA0: u16 = 0x02CC;
pub const GPUREG_VSH_CODETRANSFER_DATA7: u16 = 0x02D3;
pub const GPUREG_VSH_OPDESCS_DATA0: u16 = 0x02D6;
pub const GPUREG_VSH_OPDESCS_DATA7: u16 = 0x02DD;
