//! 材质解析/编码
//!
//! 磁盘上的权威编码是命令流, 结构体字段只是解码后的投影;
//! 写回时按固定命令顺序重建命令流, 二进制必须逐字节还原。

use glam::Vec2;
use tracing::trace;

use crate::color::Rgba;
use crate::error::{Error, Result};
use crate::hash::{Fnv1, HashName};
use crate::io::{Reader, Writer};
use crate::pica::commands::{words_to_bytes, CommandReader, CommandWriter};
use crate::pica::registers as reg;
use crate::pica::state::{
    AlphaTest, BlendFunction, ColorOperation, DepthColorMask, FaceCulling, LogicalOp,
    LutInputAbs, LutInputScale, LutInputSelect, StencilOperation, StencilTest,
};
use crate::pica::float24;
use crate::section::GfSection;

const MAGIC: &str = "material";
/// 命令块头部末尾的固定常数, 含义未知, 原样保留
const TRAILER_MAGIC: u32 = 0xCD20_DD3D;

/// 一个纹理单元的坐标变换与采样参数
#[derive(Debug, Clone, PartialEq)]
pub struct GfTextureCoord {
    pub name: String,
    pub unit: u8,
    pub mapping: u8,
    pub scale: Vec2,
    pub rotation: f32,
    pub translation: Vec2,
    pub wrap_u: u32,
    pub wrap_v: u32,
    pub mag_filter: u32,
    pub min_filter: u32,
    pub min_lod: u32,
}

impl Default for GfTextureCoord {
    fn default() -> Self {
        Self {
            name: String::new(),
            unit: 0,
            mapping: 0,
            scale: Vec2::ONE,
            rotation: 0.0,
            translation: Vec2::ZERO,
            wrap_u: 0,
            wrap_v: 0,
            mag_filter: 0,
            min_filter: 0,
            min_lod: 0,
        }
    }
}

impl GfTextureCoord {
    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            name: HashName::read(r)?.name,
            unit: r.read_u8()?,
            mapping: r.read_u8()?,
            scale: r.read_vec2()?,
            rotation: r.read_f32()?,
            translation: r.read_vec2()?,
            wrap_u: r.read_u32()?,
            wrap_v: r.read_u32()?,
            mag_filter: r.read_u32()?,
            min_filter: r.read_u32()?,
            min_lod: r.read_u32()?,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        HashName::write(w, &self.name);
        w.write_u8(self.unit);
        w.write_u8(self.mapping);
        w.write_vec2(self.scale);
        w.write_f32(self.rotation);
        w.write_vec2(self.translation);
        w.write_u32(self.wrap_u);
        w.write_u32(self.wrap_v);
        w.write_u32(self.mag_filter);
        w.write_u32(self.min_filter);
        w.write_u32(self.min_lod);
    }

    /// 3x4 变换矩阵: 先缩放, 再绕 Z 旋转, 最后平移
    pub fn transform_rows(&self) -> [[f32; 4]; 3] {
        let (sin, cos) = self.rotation.sin_cos();
        [
            [
                cos * self.scale.x,
                -sin * self.scale.y,
                0.0,
                self.translation.x,
            ],
            [
                sin * self.scale.x,
                cos * self.scale.y,
                0.0,
                self.translation.y,
            ],
            [0.0, 0.0, 1.0, 0.0],
        ]
    }
}

/// GF 材质: 颜色常量 + 纹理坐标槽 + 片元管线状态
#[derive(Debug, Clone)]
pub struct GfMaterial {
    pub name: String,
    pub shader_name: String,
    pub vtx_shader_name: String,
    pub frag_shader_name: String,

    pub lut_hashes: [u32; 3],

    /// -1 表示无凹凸贴图
    pub bump_texture: i8,
    pub constant_assignments: [u8; 6],
    pub light_set_index: u8,

    pub constant_colors: [Rgba; 6],
    pub specular_colors: [Rgba; 2],
    pub blend_color: Rgba,
    pub emission_color: Rgba,
    pub ambient_color: Rgba,
    pub diffuse_color: Rgba,

    pub edge_type: i32,
    pub id_edge_enable: i32,
    pub edge_id: i32,
    pub projection_type: i32,
    pub rim_power: f32,
    pub rim_scale: f32,
    pub phong_power: f32,
    pub phong_scale: f32,
    pub id_edge_offset_enable: i32,
    pub edge_map_alpha_mask: i32,
    pub bake_textures: [i32; 3],
    pub bake_constants: [i32; 6],
    pub vertex_shader_type: i32,
    pub shader_params: [f32; 4],

    pub render_priority: i32,
    pub render_layer: i32,

    pub color_operation: ColorOperation,
    pub blend_function: BlendFunction,
    pub logical_operation: LogicalOp,
    pub alpha_test: AlphaTest,
    pub stencil_test: StencilTest,
    pub stencil_operation: StencilOperation,
    pub depth_color_mask: DepthColorMask,
    pub face_culling: FaceCulling,
    pub lut_input_abs: LutInputAbs,
    pub lut_input_select: LutInputSelect,
    pub lut_input_scale: LutInputScale,

    pub color_buffer_read: bool,
    pub color_buffer_write: bool,
    pub stencil_buffer_read: bool,
    pub stencil_buffer_write: bool,
    pub depth_buffer_read: bool,
    pub depth_buffer_write: bool,

    /// 最多 3 个纹理单元, 数量即磁盘上的 units count
    pub texture_coords: Vec<GfTextureCoord>,
    pub border_colors: [Rgba; 3],
    /// 顶点 uniform 0 号槽位携带的 4 个纹理源选择
    pub texture_sources: [f32; 4],
}

impl Default for GfMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            shader_name: String::new(),
            vtx_shader_name: String::new(),
            frag_shader_name: String::new(),
            lut_hashes: [0; 3],
            bump_texture: -1,
            constant_assignments: [0; 6],
            light_set_index: 0,
            constant_colors: [Rgba::WHITE; 6],
            specular_colors: [Rgba::default(); 2],
            blend_color: Rgba::default(),
            emission_color: Rgba::default(),
            ambient_color: Rgba::WHITE,
            diffuse_color: Rgba::WHITE,
            edge_type: 0,
            id_edge_enable: 0,
            edge_id: 255,
            projection_type: 0,
            rim_power: 0.0,
            rim_scale: 1.0,
            phong_power: 0.0,
            phong_scale: 1.0,
            id_edge_offset_enable: 0,
            edge_map_alpha_mask: 0,
            bake_textures: [0; 3],
            bake_constants: [0; 6],
            vertex_shader_type: 0,
            shader_params: [0.0; 4],
            render_priority: 0,
            render_layer: 0,
            color_operation: ColorOperation::default(),
            blend_function: BlendFunction::default(),
            logical_operation: LogicalOp::default(),
            alpha_test: AlphaTest::default(),
            stencil_test: StencilTest::default(),
            stencil_operation: StencilOperation::default(),
            depth_color_mask: DepthColorMask::default(),
            face_culling: FaceCulling::default(),
            lut_input_abs: LutInputAbs::default(),
            lut_input_select: LutInputSelect::default(),
            lut_input_scale: LutInputScale::default(),
            color_buffer_read: false,
            color_buffer_write: true,
            stencil_buffer_read: false,
            stencil_buffer_write: false,
            depth_buffer_read: true,
            depth_buffer_write: true,
            texture_coords: Vec::new(),
            border_colors: [Rgba::default(); 3],
            texture_sources: [0.0; 4],
        }
    }
}

impl GfMaterial {
    pub fn read(r: &mut Reader) -> Result<Self> {
        let (section, start) = GfSection::expect(r, MAGIC)?;

        let mut mat = GfMaterial {
            name: HashName::read(r)?.name,
            shader_name: HashName::read(r)?.name,
            vtx_shader_name: HashName::read(r)?.name,
            frag_shader_name: HashName::read(r)?.name,
            ..GfMaterial::default()
        };

        for h in &mut mat.lut_hashes {
            *h = r.read_u32()?;
        }
        r.read_u32()?; // 填充字

        mat.bump_texture = r.read_i8()?;
        for a in &mut mat.constant_assignments {
            *a = r.read_u8()?;
        }
        mat.light_set_index = r.read_u8()?;

        for c in &mut mat.constant_colors {
            *c = Rgba::read(r)?;
        }
        for c in &mut mat.specular_colors {
            *c = Rgba::read(r)?;
        }
        mat.blend_color = Rgba::read(r)?;
        mat.emission_color = Rgba::read(r)?;
        mat.ambient_color = Rgba::read(r)?;
        mat.diffuse_color = Rgba::read(r)?;

        mat.edge_type = r.read_i32()?;
        mat.id_edge_enable = r.read_i32()?;
        mat.edge_id = r.read_i32()?;
        mat.projection_type = r.read_i32()?;
        mat.rim_power = r.read_f32()?;
        mat.rim_scale = r.read_f32()?;
        mat.phong_power = r.read_f32()?;
        mat.phong_scale = r.read_f32()?;
        mat.id_edge_offset_enable = r.read_i32()?;
        mat.edge_map_alpha_mask = r.read_i32()?;
        for b in &mut mat.bake_textures {
            *b = r.read_i32()?;
        }
        for b in &mut mat.bake_constants {
            *b = r.read_i32()?;
        }
        mat.vertex_shader_type = r.read_i32()?;
        for p in &mut mat.shader_params {
            *p = r.read_f32()?;
        }

        let units_count = r.read_u32()?;
        if units_count > 3 {
            return Err(Error::Malformed {
                context: "材质纹理单元数超过 3",
            });
        }
        for _ in 0..units_count {
            mat.texture_coords.push(GfTextureCoord::read(r)?);
        }

        r.skip_padding()?;

        let commands_length = r.read_u32()?;
        mat.render_priority = r.read_i32()?;
        r.read_u32()?; // 命令流内容哈希, 写回时重算
        mat.render_layer = r.read_i32()?;
        r.read_u32()?; // LUT 哈希重复 x3
        r.read_u32()?;
        r.read_u32()?;
        r.read_u32()?; // TRAILER_MAGIC

        let mut words = Vec::with_capacity(commands_length as usize / 4);
        for _ in 0..commands_length / 4 {
            words.push(r.read_u32()?);
        }

        let cmd_reader = CommandReader::new(&words)?;
        for cmd in cmd_reader.commands() {
            mat.dispatch(cmd.register, cmd.parameter());
        }

        let sources = cmd_reader.vtx_uniform(0);
        mat.texture_sources = [sources.x, sources.y, sources.z, sources.w];

        section.finish(r, start)?;

        Ok(mat)
    }

    /// 已知寄存器落到对应字段, 未知寄存器静默忽略 (向前兼容)
    fn dispatch(&mut self, register: u16, param: u32) {
        match register {
            reg::GPUREG_TEXUNIT0_BORDER_COLOR => self.border_colors[0] = Rgba::from_word(param),
            reg::GPUREG_TEXUNIT1_BORDER_COLOR => self.border_colors[1] = Rgba::from_word(param),
            reg::GPUREG_TEXUNIT2_BORDER_COLOR => self.border_colors[2] = Rgba::from_word(param),

            reg::GPUREG_COLOR_OPERATION => self.color_operation = ColorOperation::from_raw(param),
            reg::GPUREG_BLEND_FUNC => self.blend_function = BlendFunction::from_raw(param),
            reg::GPUREG_BLEND_COLOR => self.blend_color = Rgba::from_word(param),
            reg::GPUREG_LOGIC_OP => self.logical_operation = LogicalOp::from_raw(param),
            reg::GPUREG_FRAGOP_ALPHA_TEST => self.alpha_test = AlphaTest::from_raw(param),
            reg::GPUREG_STENCIL_TEST => self.stencil_test = StencilTest::from_raw(param),
            reg::GPUREG_STENCIL_OP => self.stencil_operation = StencilOperation::from_raw(param),
            reg::GPUREG_DEPTH_COLOR_MASK => self.depth_color_mask = DepthColorMask::from_raw(param),
            reg::GPUREG_FACECULLING_CONFIG => self.face_culling = FaceCulling::from_raw(param),

            reg::GPUREG_COLORBUFFER_READ => self.color_buffer_read = param & 0xF == 0xF,
            reg::GPUREG_COLORBUFFER_WRITE => self.color_buffer_write = param & 0xF == 0xF,
            reg::GPUREG_DEPTHBUFFER_READ => {
                self.stencil_buffer_read = param & 1 != 0;
                self.depth_buffer_read = param & 2 != 0;
            }
            reg::GPUREG_DEPTHBUFFER_WRITE => {
                self.stencil_buffer_write = param & 1 != 0;
                self.depth_buffer_write = param & 2 != 0;
            }

            reg::GPUREG_LIGHTING_LUTINPUT_ABS => self.lut_input_abs = LutInputAbs::from_raw(param),
            reg::GPUREG_LIGHTING_LUTINPUT_SELECT => {
                self.lut_input_select = LutInputSelect::from_raw(param)
            }
            reg::GPUREG_LIGHTING_LUTINPUT_SCALE => {
                self.lut_input_scale = LutInputScale::from_raw(param)
            }

            other => trace!(register = format_args!("{other:#06x}"), "忽略未知寄存器"),
        }
    }

    pub fn write(&self, w: &mut Writer) {
        let patch = GfSection::write_placeholder(w, MAGIC);
        let start = w.position();

        HashName::write(w, &self.name);
        HashName::write(w, &self.shader_name);
        HashName::write(w, &self.vtx_shader_name);
        HashName::write(w, &self.frag_shader_name);

        for h in self.lut_hashes {
            w.write_u32(h);
        }
        w.write_u32(0);

        w.write_i8(self.bump_texture);
        for a in self.constant_assignments {
            w.write_u8(a);
        }
        w.write_u8(self.light_set_index);

        for c in self.constant_colors {
            c.write(w);
        }
        for c in self.specular_colors {
            c.write(w);
        }
        // 混合颜色只经命令流传递, 头部槽位固定写 4 个 0x01 字节
        w.write_u32(0x0101_0101);
        self.emission_color.write(w);
        self.ambient_color.write(w);
        self.diffuse_color.write(w);

        w.write_i32(self.edge_type);
        w.write_i32(self.id_edge_enable);
        w.write_i32(self.edge_id);
        w.write_i32(self.projection_type);
        w.write_f32(self.rim_power);
        w.write_f32(self.rim_scale);
        w.write_f32(self.phong_power);
        w.write_f32(self.phong_scale);
        w.write_i32(self.id_edge_offset_enable);
        w.write_i32(self.edge_map_alpha_mask);
        for b in self.bake_textures {
            w.write_i32(b);
        }
        for b in self.bake_constants {
            w.write_i32(b);
        }
        w.write_i32(self.vertex_shader_type);
        for p in self.shader_params {
            w.write_f32(p);
        }

        w.write_u32(self.texture_coords.len() as u32);

        // 每个单元的 3x4 矩阵按行倒序展开成 12 个浮点, 经 uniform 通道上传
        let mut tex_mtx = Vec::with_capacity(self.texture_coords.len() * 12);
        for tc in &self.texture_coords {
            tc.write(w);
            for row in tc.transform_rows() {
                for v in row.iter().rev() {
                    tex_mtx.push(v.to_bits());
                }
            }
        }

        w.write_padding();

        let words = self.encode_commands(&tex_mtx);
        let bytes = words_to_bytes(&words);
        let mut fnv = Fnv1::new();
        fnv.update_bytes(&bytes);

        w.write_u32(bytes.len() as u32);
        w.write_i32(self.render_priority);
        w.write_u32(fnv.finish());
        w.write_i32(self.render_layer);
        for h in self.lut_hashes {
            w.write_u32(h);
        }
        w.write_u32(TRAILER_MAGIC);

        w.write_bytes(&bytes);

        // 16 字节零结尾
        w.write_u32(0);
        w.write_u32(0);
        w.write_u32(0);
        w.write_u32(0);

        GfSection::backpatch(w, patch, start);
    }

    /// 命令发射顺序固定, 不可配置 (二进制对比依赖顺序逐字一致)
    fn encode_commands(&self, tex_mtx: &[u32]) -> Vec<u32> {
        let mut cw = CommandWriter::new();

        cw.set_command(
            reg::GPUREG_VSH_FLOATUNIFORM_INDEX,
            true,
            &[
                0x8000_0000,
                self.texture_sources[3].to_bits(),
                self.texture_sources[2].to_bits(),
                self.texture_sources[1].to_bits(),
                self.texture_sources[0].to_bits(),
            ],
        );
        cw.set_single(reg::GPUREG_VSH_FLOATUNIFORM_INDEX, 0x8000_0001);
        if !tex_mtx.is_empty() {
            cw.set_command(reg::GPUREG_VSH_FLOATUNIFORM_DATA0, false, tex_mtx);
        }

        cw.set_single(reg::GPUREG_FACECULLING_CONFIG, self.face_culling.to_raw());
        cw.set_masked(reg::GPUREG_COLOR_OPERATION, self.color_operation.to_raw(), 3);
        cw.set_single(reg::GPUREG_BLEND_FUNC, self.blend_function.to_raw());

        if !self.blend_function.is_identity() {
            cw.set_single(reg::GPUREG_LOGIC_OP, self.logical_operation.to_raw());
            cw.set_single(
                reg::GPUREG_BLEND_COLOR,
                self.blend_color.to_word() | 0xFF00_0000,
            );
        }

        cw.set_masked(reg::GPUREG_FRAGOP_ALPHA_TEST, self.alpha_test.to_raw(), 3);
        cw.set_single(reg::GPUREG_STENCIL_TEST, self.stencil_test.to_raw());
        cw.set_single(reg::GPUREG_STENCIL_OP, self.stencil_operation.to_raw());
        cw.set_single(reg::GPUREG_DEPTH_COLOR_MASK, self.depth_color_mask.to_raw());

        cw.set_bool(reg::GPUREG_DEPTHMAP_ENABLE, true);
        cw.set_single(reg::GPUREG_DEPTHMAP_SCALE, float24::to_word24(-1.0));
        cw.set_single(reg::GPUREG_DEPTHMAP_OFFSET, 0);

        cw.set_bool(reg::GPUREG_FRAMEBUFFER_FLUSH, true);
        cw.set_bool(reg::GPUREG_FRAMEBUFFER_INVALIDATE, true);

        cw.set_masked(
            reg::GPUREG_COLORBUFFER_READ,
            if self.color_buffer_read { 0xF } else { 0 },
            1,
        );
        cw.set_masked(
            reg::GPUREG_COLORBUFFER_WRITE,
            if self.color_buffer_write { 0xF } else { 0 },
            1,
        );
        cw.set_bools(
            reg::GPUREG_DEPTHBUFFER_READ,
            self.stencil_buffer_read,
            self.depth_buffer_read,
        );
        cw.set_bools(
            reg::GPUREG_DEPTHBUFFER_WRITE,
            self.stencil_buffer_write,
            self.depth_buffer_write,
        );

        let mut texunit_config = 0x0001_1000u32;
        for i in 0..self.texture_coords.len() {
            texunit_config |= 1 << i;
        }
        cw.set_command(reg::GPUREG_TEXUNIT_CONFIG, false, &[0, 0, 0, 0]);
        cw.set_single(reg::GPUREG_TEXUNIT_CONFIG, texunit_config);

        cw.set_single(
            reg::GPUREG_TEXUNIT0_BORDER_COLOR,
            self.border_colors[0].to_word(),
        );
        cw.set_single(
            reg::GPUREG_TEXUNIT1_BORDER_COLOR,
            self.border_colors[1].to_word(),
        );
        cw.set_single(
            reg::GPUREG_TEXUNIT2_BORDER_COLOR,
            self.border_colors[2].to_word(),
        );

        cw.set_single(reg::GPUREG_LIGHTING_LUTINPUT_ABS, self.lut_input_abs.to_raw());
        cw.set_single(
            reg::GPUREG_LIGHTING_LUTINPUT_SELECT,
            self.lut_input_select.to_raw(),
        );
        cw.set_single(
            reg::GPUREG_LIGHTING_LUTINPUT_SCALE,
            self.lut_input_scale.to_raw(),
        );

        cw.write_end();
        cw.get_buffer()
    }
}
