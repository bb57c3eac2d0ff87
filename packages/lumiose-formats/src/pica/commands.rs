//! GPU 命令流编解码
//!
//! 一条命令 = 参数字 + 头部字 (+ 追加参数), 整条命令补齐到 8 字节:
//! 头部 bits 0-15 寄存器, 16-19 字节使能掩码, 20-30 追加参数数, 31 连续写标志。
//! 解码必须从头到尾顺序扫描 (逐寄存器最后写入生效), 不能随机访问。

use std::collections::BTreeMap;

use glam::Vec4;

use super::float24;
use super::registers as reg;
use crate::error::{Error, Result};

/// 一条已解码的命令
#[derive(Debug, Clone)]
pub struct PicaCommand {
    pub register: u16,
    pub parameters: Vec<u32>,
    pub mask: u8,
    pub consecutive: bool,
}

impl PicaCommand {
    pub fn parameter(&self) -> u32 {
        self.parameters[0]
    }
}

/// 浮点 uniform 累积状态 (顶点/几何各一份)
#[derive(Default)]
struct UniformBank {
    index: u32,
    f32_mode: bool,
    pending: Vec<u32>,
    values: BTreeMap<u32, Vec4>,
}

impl UniformBank {
    fn set_index(&mut self, param: u32) {
        self.index = param & 0xFF;
        self.f32_mode = param >> 31 != 0;
        self.pending.clear();
    }

    fn push_data(&mut self, words: &[u32]) {
        self.pending.extend_from_slice(words);
        let chunk = if self.f32_mode { 4 } else { 3 };
        while self.pending.len() >= chunk {
            let v = if self.f32_mode {
                // f32 模式: 分量按 W,Z,Y,X 顺序到达
                Vec4::new(
                    f32::from_bits(self.pending[3]),
                    f32::from_bits(self.pending[2]),
                    f32::from_bits(self.pending[1]),
                    f32::from_bits(self.pending[0]),
                )
            } else {
                float24::unpack_vec4([self.pending[0], self.pending[1], self.pending[2]])
            };
            self.pending.drain(..chunk);
            self.values.insert(self.index, v);
            self.index += 1;
        }
    }
}

/// 命令流解码器: 一次性解出全部命令并记录 uniform 侧信道
pub struct CommandReader {
    commands: Vec<PicaCommand>,
    vtx_uniforms: UniformBank,
    geo_uniforms: UniformBank,
}

impl CommandReader {
    pub fn new(words: &[u32]) -> Result<Self> {
        let mut rd = CommandReader {
            commands: Vec::new(),
            vtx_uniforms: UniformBank::default(),
            geo_uniforms: UniformBank::default(),
        };

        let mut i = 0;
        while i < words.len() {
            let first_param = words[i];
            i += 1;
            if i >= words.len() {
                return Err(Error::TruncatedCommand { index: i });
            }
            let header = words[i];
            i += 1;

            let id = (header & 0xFFFF) as u16;
            let mask = (header >> 16 & 0xF) as u8;
            let extra = (header >> 20 & 0x7FF) as usize;
            let consecutive = header >> 31 != 0;

            if consecutive {
                // 连续写: 每个参数落到递增的寄存器上
                let mut register = id;
                let mut param = first_param;
                for n in 0..=extra {
                    rd.track_uniforms(register, &[param]);
                    rd.commands.push(PicaCommand {
                        register,
                        parameters: vec![param],
                        mask,
                        consecutive: true,
                    });
                    register = register.wrapping_add(1);
                    if n < extra {
                        if i >= words.len() {
                            return Err(Error::TruncatedCommand { index: i });
                        }
                        param = words[i];
                        i += 1;
                    }
                }
            } else {
                let mut parameters = Vec::with_capacity(extra + 1);
                parameters.push(first_param);
                for _ in 0..extra {
                    if i >= words.len() {
                        return Err(Error::TruncatedCommand { index: i });
                    }
                    parameters.push(words[i]);
                    i += 1;
                }
                rd.track_uniforms(id, &parameters);
                rd.commands.push(PicaCommand {
                    register: id,
                    parameters,
                    mask,
                    consecutive: false,
                });
            }

            // 每条命令之后对齐到 8 字节
            if i & 1 != 0 {
                i += 1;
            }
        }

        Ok(rd)
    }

    fn track_uniforms(&mut self, register: u16, params: &[u32]) {
        match register {
            reg::GPUREG_VSH_FLOATUNIFORM_INDEX => self.vtx_uniforms.set_index(params[0]),
            reg::GPUREG_VSH_FLOATUNIFORM_DATA0..=reg::GPUREG_VSH_FLOATUNIFORM_DATA7 => {
                self.vtx_uniforms.push_data(params)
            }
            reg::GPUREG_GSH_FLOATUNIFORM_INDEX => self.geo_uniforms.set_index(params[0]),
            reg::GPUREG_GSH_FLOATUNIFORM_DATA0..=reg::GPUREG_GSH_FLOATUNIFORM_DATA7 => {
                self.geo_uniforms.push_data(params)
            }
            _ => {}
        }
    }

    pub fn commands(&self) -> &[PicaCommand] {
        &self.commands
    }

    /// 指定下标的顶点 uniform, 未写入时为零向量
    pub fn vtx_uniform(&self, index: u32) -> Vec4 {
        self.vtx_uniforms
            .values
            .get(&index)
            .copied()
            .unwrap_or(Vec4::ZERO)
    }

    pub fn vtx_uniforms(&self) -> &BTreeMap<u32, Vec4> {
        &self.vtx_uniforms.values
    }

    pub fn geo_uniforms(&self) -> &BTreeMap<u32, Vec4> {
        &self.geo_uniforms.values
    }
}

/// 命令流编码器: 按调用顺序忠实转写, 不排序不去重
/// (与参考文件做二进制对比依赖命令顺序逐字一致)
///
/// 实例只服务一次编码, 不要跨编码复用。
#[derive(Default)]
pub struct CommandWriter {
    words: Vec<u32>,
}

impl CommandWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, register: u16, mask: u8, consecutive: bool, params: &[u32]) {
        debug_assert!(!params.is_empty());
        let extra = (params.len() - 1) as u32;
        let header = register as u32
            | (mask as u32 & 0xF) << 16
            | (extra & 0x7FF) << 20
            | (consecutive as u32) << 31;
        self.words.push(params[0]);
        self.words.push(header);
        self.words.extend_from_slice(&params[1..]);
        if self.words.len() & 1 != 0 {
            self.words.push(0);
        }
    }

    pub fn set_command(&mut self, register: u16, consecutive: bool, params: &[u32]) {
        self.push(register, 0xF, consecutive, params);
    }

    pub fn set_single(&mut self, register: u16, param: u32) {
        self.push(register, 0xF, false, &[param]);
    }

    /// 低位窄参数寄存器: 通过字节掩码限制生效范围, 不污染高位
    pub fn set_masked(&mut self, register: u16, param: u32, mask: u8) {
        self.push(register, mask, false, &[param]);
    }

    pub fn set_bool(&mut self, register: u16, v: bool) {
        self.set_single(register, v as u32);
    }

    pub fn set_bools(&mut self, register: u16, b0: bool, b1: bool) {
        self.set_single(register, b0 as u32 | (b1 as u32) << 1);
    }

    /// 终止哨兵: 向 finalize 寄存器写入固定值
    pub fn write_end(&mut self) {
        self.set_single(reg::GPUREG_FINALIZE, 0x1234_5678);
    }

    pub fn get_buffer(self) -> Vec<u32> {
        self.words
    }
}

/// 命令字序列的小端字节表示 (用于内容哈希)
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_command_roundtrip() {
        let mut w = CommandWriter::new();
        w.set_single(reg::GPUREG_BLEND_FUNC, 0x0101_0010);
        let buf = w.get_buffer();
        assert_eq!(buf.len(), 2);

        let rd = CommandReader::new(&buf).unwrap();
        assert_eq!(rd.commands().len(), 1);
        let cmd = &rd.commands()[0];
        assert_eq!(cmd.register, reg::GPUREG_BLEND_FUNC);
        assert_eq!(cmd.parameter(), 0x0101_0010);
        assert!(!cmd.consecutive);
    }

    #[test]
    fn consecutive_write_splits_per_register() {
        let mut w = CommandWriter::new();
        w.set_command(reg::GPUREG_TEXENV0_SOURCE, true, &[1, 2, 3, 4, 5]);
        let buf = w.get_buffer();

        let rd = CommandReader::new(&buf).unwrap();
        assert_eq!(rd.commands().len(), 5);
        for (n, cmd) in rd.commands().iter().enumerate() {
            assert_eq!(cmd.register, reg::GPUREG_TEXENV0_SOURCE + n as u16);
            assert_eq!(cmd.parameter(), n as u32 + 1);
            assert!(cmd.consecutive);
        }
    }

    #[test]
    fn decode_then_replay_is_identity() {
        // 解码后按记录的调用序列重放, 必须逐字还原
        let mut w = CommandWriter::new();
        w.set_single(reg::GPUREG_FACECULLING_CONFIG, 1);
        w.set_masked(reg::GPUREG_COLOR_OPERATION, 0x00E4_0100, 3);
        w.set_command(reg::GPUREG_TEXENV0_SOURCE, true, &[0xF0F0, 0x0F0F, 3]);
        w.set_command(reg::GPUREG_TEXUNIT_CONFIG, false, &[0, 0, 0, 0]);
        w.write_end();
        let original = w.get_buffer();

        let rd = CommandReader::new(&original).unwrap();
        let mut replay = CommandWriter::new();
        let mut pending: Option<(u16, u8, Vec<u32>)> = None;
        for cmd in rd.commands() {
            if cmd.consecutive {
                // 连续写在解码时被拆开, 重放时按寄存器连续性合并回去
                match &mut pending {
                    Some((start, _, params))
                        if *start + params.len() as u16 == cmd.register =>
                    {
                        params.push(cmd.parameter());
                        continue;
                    }
                    _ => {}
                }
                if let Some((start, mask, params)) = pending.take() {
                    replay.push(start, mask, true, &params);
                }
                pending = Some((cmd.register, cmd.mask, vec![cmd.parameter()]));
            } else {
                if let Some((start, mask, params)) = pending.take() {
                    replay.push(start, mask, true, &params);
                }
                replay.push(cmd.register, cmd.mask, false, &cmd.parameters);
            }
        }
        if let Some((start, mask, params)) = pending.take() {
            replay.push(start, mask, true, &params);
        }
        assert_eq!(replay.get_buffer(), original);
    }

    #[test]
    fn uniform_side_channel_f32() {
        let mut w = CommandWriter::new();
        // 材质写 uniform 0 的方式: index + W,Z,Y,X
        w.set_command(
            reg::GPUREG_VSH_FLOATUNIFORM_INDEX,
            true,
            &[
                0x8000_0000,
                4.0f32.to_bits(),
                3.0f32.to_bits(),
                2.0f32.to_bits(),
                1.0f32.to_bits(),
            ],
        );
        let rd = CommandReader::new(&w.get_buffer()).unwrap();
        assert_eq!(rd.vtx_uniform(0), Vec4::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn uniform_bulk_write_advances_index() {
        let mut w = CommandWriter::new();
        w.set_single(reg::GPUREG_VSH_FLOATUNIFORM_INDEX, 0x8000_0002);
        let floats: Vec<u32> = (0..8).map(|n| (n as f32).to_bits()).collect();
        w.set_command(reg::GPUREG_VSH_FLOATUNIFORM_DATA0, false, &floats);
        let rd = CommandReader::new(&w.get_buffer()).unwrap();
        // 两个 vec4 依次落在 2 和 3 号槽位
        assert_eq!(rd.vtx_uniform(2), Vec4::new(3.0, 2.0, 1.0, 0.0));
        assert_eq!(rd.vtx_uniform(3), Vec4::new(7.0, 6.0, 5.0, 4.0));
    }

    #[test]
    fn truncated_buffer_is_error() {
        assert!(matches!(
            CommandReader::new(&[0x1234]),
            Err(Error::TruncatedCommand { .. })
        ));
    }
}
