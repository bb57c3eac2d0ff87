//! 着色器块解析/编码
//!
//! 读取时整块字节原样捕获: 带顶点微码的着色器不做重汇编,
//! 写回即原字节 (有意的范围限制); 仅片元着色器走结构化编码。

use std::collections::BTreeMap;

use glam::Vec4;

use crate::color::Rgba;
use crate::error::Result;
use crate::hash::{hash_str, Fnv1};
use crate::io::{Reader, Writer};
use crate::pica::commands::{words_to_bytes, CommandReader, CommandWriter};
use crate::pica::registers as reg;
use crate::pica::texenv::{self, TexEnvCombiner, TexEnvOperand, TexEnvScale, TexEnvSource, TexEnvStage};
use crate::section::GfSection;

pub const SHADER_MAGIC: u32 = 0x1504_1213;
const MAGIC: &str = "shader";

/// uniform 槽位数 (一个寄存器组)
const UNIFORM_BANK_SIZE: usize = 96;

// 微码操作码 (指令字高 6 位)
const OP_END: u32 = 0x22;
const OP_CALL: u32 = 0x24;
const OP_CALLC: u32 = 0x25;
const OP_CALLU: u32 = 0x26;
const OP_JMPC: u32 = 0x2C;
const OP_JMPU: u32 = 0x2D;

/// 输出寄存器的语义名
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShaderOutputName {
    #[default]
    Position,
    QuatNormal,
    Color,
    TexCoord0,
    TexCoord1,
    TexCoord0W,
    Generic,
    View,
    TexCoord2,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ShaderOutputReg {
    pub name: ShaderOutputName,
    pub mask: u32,
}

/// 跳转/调用目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderLabel {
    pub id: u32,
    pub offset: u32,
    pub length: u32,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct ShaderUniform {
    pub name: String,
    pub is_array: bool,
    pub array_index: usize,
    pub array_length: usize,
    pub constant: Vec4,
}

/// 顶点或几何程序
#[derive(Debug, Clone, Default)]
pub struct ShaderProgram {
    pub main_offset: u32,
    pub end_main_offset: u32,
    pub output_regs: [ShaderOutputReg; 7],
    pub labels: Vec<ShaderLabel>,
    pub vec4_uniforms: Vec<ShaderUniform>,
}

/// GF 着色器: 片元合成阶段 + 可选的顶点/几何微码
#[derive(Debug, Clone)]
pub struct GfShader {
    pub name: String,
    pub file_name: String,

    raw_data: Vec<u8>,

    pub tex_env_stages: [TexEnvStage; 6],
    pub tex_env_buffer_color: Rgba,

    pub vtx_program: Option<ShaderProgram>,
    pub geo_program: Option<ShaderProgram>,

    pub executable: Vec<u32>,
    pub swizzles: Vec<u32>,
}

impl GfShader {
    /// 仅片元路径的构造: 顶点微码为空
    pub fn from_stages(name: &str, stages: [TexEnvStage; 6], buffer_color: Rgba) -> Self {
        Self {
            name: name.to_string(),
            file_name: format!("{name}.gffsh"),
            raw_data: Vec::new(),
            tex_env_stages: stages,
            tex_env_buffer_color: buffer_color,
            vtx_program: None,
            geo_program: None,
            executable: Vec::new(),
            swizzles: Vec::new(),
        }
    }

    pub fn has_vertex_shader(&self) -> bool {
        self.vtx_program.is_some()
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        let raw_start = r.position();

        r.read_u32()?; // SHADER_MAGIC
        r.read_u32()?; // 着色器数量
        r.skip_padding()?;

        let (_section, _start) = GfSection::expect(r, MAGIC)?;

        let name = r.read_padded_str(0x40)?;
        r.read_u32()?; // 名字哈希, 写回时重算
        r.read_u32()?; // 计数
        r.skip_padding()?;

        let commands_length = r.read_u32()?;
        r.read_u32()?; // 命令计数
        r.read_u32()?; // 命令哈希, 写回时重算
        r.read_u32()?; // 填充字

        let file_name = r.read_padded_str(0x40)?;

        let mut words = Vec::with_capacity(commands_length as usize / 4);
        for _ in 0..commands_length / 4 {
            words.push(r.read_u32()?);
        }

        let raw_end = r.position();
        r.seek(raw_start)?;
        let raw_data = r.read_bytes(raw_end - raw_start)?.to_vec();

        let mut shader = GfShader {
            name,
            file_name,
            raw_data,
            tex_env_stages: [TexEnvStage::default(); 6],
            tex_env_buffer_color: Rgba::default(),
            vtx_program: None,
            geo_program: None,
            executable: Vec::new(),
            swizzles: Vec::new(),
        };

        let mut out_map = [0u32; 7];

        let cmd_reader = CommandReader::new(&words)?;
        for cmd in cmd_reader.commands() {
            let param = cmd.parameter();
            let stage = texenv::stage_from_register(cmd.register);

            match cmd.register {
                reg::GPUREG_SH_OUTMAP_O0..=reg::GPUREG_SH_OUTMAP_O6 => {
                    out_map[(cmd.register - reg::GPUREG_SH_OUTMAP_O0) as usize] = param;
                }

                r2 if texenv_field(r2).is_some() => {
                    let st = &mut shader.tex_env_stages[stage];
                    match texenv_field(r2) {
                        Some(0) => st.source = TexEnvSource::from_raw(param),
                        Some(1) => st.operand = TexEnvOperand::from_raw(param),
                        Some(2) => st.combiner = TexEnvCombiner::from_raw(param),
                        Some(3) => st.color = Rgba::from_word(param),
                        _ => st.scale = TexEnvScale::from_raw(param),
                    }
                }

                reg::GPUREG_TEXENV_UPDATE_BUFFER => {
                    TexEnvStage::set_update_buffer(&mut shader.tex_env_stages, param);
                }
                reg::GPUREG_TEXENV_BUFFER_COLOR => {
                    shader.tex_env_buffer_color = Rgba::from_word(param);
                }

                reg::GPUREG_GSH_ENTRYPOINT => {
                    shader
                        .geo_program
                        .get_or_insert_with(ShaderProgram::default)
                        .main_offset = param & 0xFFFF;
                }
                reg::GPUREG_VSH_ENTRYPOINT => {
                    shader
                        .vtx_program
                        .get_or_insert_with(ShaderProgram::default)
                        .main_offset = param & 0xFFFF;
                }

                reg::GPUREG_VSH_CODETRANSFER_DATA0..=reg::GPUREG_VSH_CODETRANSFER_DATA7 => {
                    shader.executable.extend_from_slice(&cmd.parameters);
                }
                reg::GPUREG_VSH_OPDESCS_DATA0..=reg::GPUREG_VSH_OPDESCS_DATA7 => {
                    shader.swizzles.extend_from_slice(&cmd.parameters);
                }

                _ => {}
            }
        }

        let output_regs = decode_out_map(&out_map);
        let labels = discover_labels(&shader.executable);

        for program in [&mut shader.vtx_program, &mut shader.geo_program]
            .into_iter()
            .flatten()
        {
            program.output_regs = output_regs;
            program.labels = labels.clone();
        }

        // 格式没有标记哪些槽位属于数组, 保守起见把整个 bank 当成一个数组,
        // 允许任意下标访问 (已知的近似, 不要收紧)
        if let Some(p) = &mut shader.vtx_program {
            p.vec4_uniforms = make_bank_array("v_c", cmd_reader.vtx_uniforms());
        }
        if let Some(p) = &mut shader.geo_program {
            p.vec4_uniforms = make_bank_array("g_c", cmd_reader.geo_uniforms());
        }

        find_program_end(&mut shader.vtx_program, &shader.executable);
        find_program_end(&mut shader.geo_program, &shader.executable);

        Ok(shader)
    }

    pub fn write(&self, w: &mut Writer) {
        if self.has_vertex_shader() {
            // 不做顶点微码重汇编, 原字节直通
            w.write_bytes(&self.raw_data);
            return;
        }

        w.write_u32(SHADER_MAGIC);
        w.write_u32(1);
        w.write_padding();

        let patch = GfSection::write_placeholder(w, MAGIC);
        let start = w.position();

        w.write_padded_str(&self.name, 0x40);
        w.write_u32(hash_str(&self.name));
        w.write_u32(1);
        w.write_padding();

        let mut cw = CommandWriter::new();
        for (stage, st) in self.tex_env_stages.iter().enumerate() {
            let register = match stage {
                0 => reg::GPUREG_TEXENV0_SOURCE,
                1 => reg::GPUREG_TEXENV1_SOURCE,
                2 => reg::GPUREG_TEXENV2_SOURCE,
                3 => reg::GPUREG_TEXENV3_SOURCE,
                4 => reg::GPUREG_TEXENV4_SOURCE,
                _ => reg::GPUREG_TEXENV5_SOURCE,
            };
            cw.set_command(
                register,
                true,
                &[
                    st.source.to_raw(),
                    st.operand.to_raw(),
                    st.combiner.to_raw(),
                    st.color.to_word(),
                    st.scale.to_raw(),
                ],
            );
        }

        cw.set_masked(
            reg::GPUREG_TEXENV_UPDATE_BUFFER,
            TexEnvStage::get_update_buffer(&self.tex_env_stages),
            2,
        );
        cw.set_single(
            reg::GPUREG_TEXENV_BUFFER_COLOR,
            self.tex_env_buffer_color.to_word(),
        );
        cw.write_end();

        let bytes = words_to_bytes(&cw.get_buffer());
        let mut fnv = Fnv1::new();
        fnv.update_bytes(&bytes);

        w.write_u32(bytes.len() as u32);
        w.write_u32(1);
        w.write_u32(fnv.finish());
        w.write_padding();

        w.write_padded_str(&self.file_name, 0x40);
        w.write_bytes(&bytes);

        GfSection::backpatch(w, patch, start);
    }
}

/// TexEnv 阶段寄存器组内的字段偏移 (source=0 … scale=4), 非阶段寄存器为 None
fn texenv_field(register: u16) -> Option<u16> {
    let base = register & !7;
    let offset = register & 7;
    let is_stage = matches!(
        base,
        reg::GPUREG_TEXENV0_SOURCE
            | reg::GPUREG_TEXENV1_SOURCE
            | reg::GPUREG_TEXENV2_SOURCE
            | reg::GPUREG_TEXENV3_SOURCE
            | reg::GPUREG_TEXENV4_SOURCE
            | reg::GPUREG_TEXENV5_SOURCE
    );
    (is_stage && offset <= 4).then_some(offset)
}

/// out-map 字解码: 每字 4 个 5 位域, 0x1F 为空位哨兵
fn decode_out_map(out_map: &[u32; 7]) -> [ShaderOutputReg; 7] {
    let mut regs = [ShaderOutputReg::default(); 7];
    for (i, &word) in out_map.iter().enumerate() {
        if word == 0 {
            continue;
        }
        let mut out = ShaderOutputReg::default();
        for j in 0..4 {
            let value = word >> (j * 8) & 0x1F;
            if value == 0x1F {
                continue;
            }
            out.mask |= 1 << j;
            out.name = match value {
                v if v < 0x4 => ShaderOutputName::Position,
                v if v < 0x8 => ShaderOutputName::QuatNormal,
                v if v < 0xC => ShaderOutputName::Color,
                v if v < 0xE => ShaderOutputName::TexCoord0,
                v if v < 0x10 => ShaderOutputName::TexCoord1,
                v if v < 0x11 => ShaderOutputName::TexCoord0W,
                v if v < 0x12 => ShaderOutputName::Generic,
                v if v < 0x16 => ShaderOutputName::View,
                v if v < 0x18 => ShaderOutputName::TexCoord2,
                _ => ShaderOutputName::Generic,
            };
        }
        regs[i] = out;
    }
    regs
}

/// 标签发现: 扫描控制流指令, 目标按首次出现顺序编号
/// (只是发现目标, 不构建控制流图)
pub fn discover_labels(executable: &[u32]) -> Vec<ShaderLabel> {
    let mut seen = std::collections::HashSet::new();
    let mut labels = Vec::new();
    for &word in executable {
        let opcode = word >> 26;
        if matches!(opcode, OP_CALL | OP_CALLC | OP_CALLU | OP_JMPC | OP_JMPU) {
            let dst = word >> 10 & 0xFFF;
            if seen.insert(dst) {
                labels.push(ShaderLabel {
                    id: labels.len() as u32,
                    offset: dst,
                    length: 0,
                    name: format!("label_{dst:04x}"),
                });
            }
        }
    }
    labels
}

fn make_bank_array(name: &str, constants: &BTreeMap<u32, Vec4>) -> Vec<ShaderUniform> {
    (0..UNIFORM_BANK_SIZE)
        .map(|i| ShaderUniform {
            name: name.to_string(),
            is_array: true,
            array_index: i,
            array_length: UNIFORM_BANK_SIZE,
            constant: constants.get(&(i as u32)).copied().unwrap_or(Vec4::ZERO),
        })
        .collect()
}

fn find_program_end(program: &mut Option<ShaderProgram>, executable: &[u32]) {
    if let Some(p) = program {
        for i in p.main_offset as usize..executable.len() {
            if executable[i] >> 26 == OP_END {
                p.end_main_offset = i as u32;
                break;
            }
        }
    }
}
