//! 端到端夹具: 1 个模型 (3 根骨骼链, 1 个带纹理网格, Modulate 材质)

use glam::{Vec2, Vec3};

use lumiose_formats::hash::{hash_str, Fnv1};
use lumiose_formats::io::{Reader, Writer};
use lumiose_formats::model::material::GfTextureCoord;
use lumiose_formats::model::mesh::{AttrFormat, AttrName, GfSubMesh, Skinning, VertexAttr};
use lumiose_formats::model::{GfBone, GfMaterial, GfMesh, GfModel, GfTexture};
use lumiose_formats::pica::commands::words_to_bytes;
use lumiose_formats::pica::registers as reg;
use lumiose_formats::pica::texenv::{CombinerMode, CombinerSource, TexEnvStage};
use lumiose_formats::pica::CommandWriter;
use lumiose_formats::shader::{GfShader, ShaderOutputName, SHADER_MAGIC};
use lumiose_formats::{GfModelPack, GfSection, Rgba};

fn fixture_pack() -> GfModelPack {
    let bones = vec![
        GfBone {
            name: "Origin".to_string(),
            parent_index: -1,
            translation: Vec3::new(0.0, 1.0, 0.0),
            ..GfBone::default()
        },
        GfBone {
            name: "Waist".to_string(),
            parent_index: 0,
            translation: Vec3::new(0.0, 0.5, 0.0),
            ..GfBone::default()
        },
        GfBone {
            name: "Head".to_string(),
            parent_index: 1,
            translation: Vec3::new(0.0, 0.25, 0.0),
            ..GfBone::default()
        },
    ];

    let material = GfMaterial {
        name: "Body".to_string(),
        shader_name: "Default_SHA".to_string(),
        vtx_shader_name: "Poke".to_string(),
        frag_shader_name: "Default_SHA".to_string(),
        texture_coords: vec![GfTextureCoord {
            name: "BodyTex".to_string(),
            ..GfTextureCoord::default()
        }],
        ..GfMaterial::default()
    };

    let mut buf = Writer::new();
    let tri = [
        (Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0)),
        (Vec3::new(1.0, 0.0, 0.0), Vec2::new(1.0, 0.0)),
        (Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 1.0)),
    ];
    for (p, t) in tri {
        buf.write_f32(p.x);
        buf.write_f32(p.y);
        buf.write_f32(p.z);
        buf.write_f32(t.x);
        buf.write_f32(t.y);
    }

    let mesh = GfMesh {
        name: "BodyMesh".to_string(),
        attributes: vec![
            VertexAttr {
                name: AttrName::Position,
                format: AttrFormat::F32,
                elements: 3,
                scale: 1.0,
            },
            VertexAttr {
                name: AttrName::TexCoord0,
                format: AttrFormat::F32,
                elements: 2,
                scale: 1.0,
            },
        ],
        vertex_buffer: buf.into_bytes(),
        submeshes: vec![GfSubMesh {
            indices: vec![0, 1, 2],
            bone_indices: vec![0],
            skinning: Skinning::Rigid,
        }],
    };

    GfModelPack {
        models: vec![GfModel {
            name: "pm0025_00".to_string(),
            bones,
            materials: vec![material],
            meshes: vec![mesh],
        }],
        textures: vec![GfTexture {
            name: "BodyTex".to_string(),
            width: 64,
            height: 64,
            format: 12,
            mipmap_count: 1,
            data: vec![0x55; 32],
        }],
        ..GfModelPack::default()
    }
}

fn modulate_shader() -> GfShader {
    let mut stages = [TexEnvStage::default(); 6];
    stages[0].source.color = [
        CombinerSource::Texture0,
        CombinerSource::PrimaryColor,
        CombinerSource::PrimaryColor,
    ];
    stages[0].source.alpha = stages[0].source.color;
    stages[0].combiner.color = CombinerMode::Modulate;
    stages[0].combiner.alpha = CombinerMode::Modulate;
    for stage in stages.iter_mut().skip(1) {
        stage.source.color[0] = CombinerSource::Previous;
        stage.source.alpha[0] = CombinerSource::Previous;
    }
    GfShader::from_stages("Default_SHA", stages, Rgba::WHITE)
}

#[test]
fn pack_roundtrip_preserves_scene_graph() {
    let pack = fixture_pack();
    let bytes = pack.to_bytes();
    let back = GfModelPack::from_bytes(&bytes).unwrap();

    assert_eq!(back.models.len(), 1);
    let model = &back.models[0];
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.bones.len(), 3);
    assert_eq!(
        model.bones.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        ["Origin", "Waist", "Head"]
    );
    for (i, bone) in model.bones.iter().enumerate() {
        assert!(bone.parent_index < i as i32);
    }
    assert_eq!(back.textures.len(), 1);
    assert_eq!(back.textures[0].name, "BodyTex");
    assert_eq!(model.materials[0].texture_coords[0].name, "BodyTex");
}

#[test]
fn pack_roundtrip_is_byte_exact() {
    let bytes = fixture_pack().to_bytes();
    let back = GfModelPack::from_bytes(&bytes).unwrap();
    assert_eq!(back.to_bytes(), bytes);
}

#[test]
fn material_reencode_keeps_command_hash() {
    let pack = fixture_pack();
    let mut w = Writer::new();
    pack.models[0].materials[0].write(&mut w);
    let bytes = w.into_bytes();

    let mut r = Reader::new(&bytes);
    let decoded = GfMaterial::read(&mut r).unwrap();
    let mut w2 = Writer::new();
    decoded.write(&mut w2);
    // 命令流哈希存在 section 内的固定偏移上, 字节级相等涵盖它
    assert_eq!(w2.into_bytes(), bytes);
}

#[test]
fn fragment_shader_roundtrip() {
    let shader = modulate_shader();
    let mut w = Writer::new();
    shader.write(&mut w);
    let bytes = w.into_bytes();

    let mut r = Reader::new(&bytes);
    let back = GfShader::read(&mut r).unwrap();
    assert_eq!(
        back.tex_env_stages[0].combiner.color,
        CombinerMode::Modulate
    );
    assert_eq!(
        back.tex_env_stages[0].source.color[0],
        CombinerSource::Texture0
    );

    let mut w2 = Writer::new();
    back.write(&mut w2);
    assert_eq!(w2.into_bytes(), bytes);
}

/// 按磁盘布局手工组装一个带顶点微码的着色器块
fn vertex_shader_bytes() -> Vec<u8> {
    // call 0x010, end, 再一个 end 作为 label 目标
    let code = [
        0x24u32 << 26 | 0x010 << 10,
        0x22u32 << 26,
        0x22u32 << 26,
    ];

    let mut cw = CommandWriter::new();
    cw.set_single(reg::GPUREG_VSH_ENTRYPOINT, 0x7FFF_0000);
    cw.set_single(reg::GPUREG_SH_OUTMAP_O0, 0x1F_02_01_00);
    cw.set_command(reg::GPUREG_VSH_CODETRANSFER_DATA0, false, &code);
    cw.set_command(reg::GPUREG_VSH_OPDESCS_DATA0, false, &[0x0000_036F]);
    cw.write_end();
    let cmd_bytes = words_to_bytes(&cw.get_buffer());
    let mut fnv = Fnv1::new();
    fnv.update_bytes(&cmd_bytes);

    let mut w = Writer::new();
    w.write_u32(SHADER_MAGIC);
    w.write_u32(1);
    w.write_padding();

    let patch = GfSection::write_placeholder(&mut w, "shader");
    let start = w.position();
    w.write_padded_str("Poke", 0x40);
    w.write_u32(hash_str("Poke"));
    w.write_u32(1);
    w.write_padding();

    w.write_u32(cmd_bytes.len() as u32);
    w.write_u32(1);
    w.write_u32(fnv.finish());
    w.write_padding();

    w.write_padded_str("Poke.gfvsh", 0x40);
    w.write_bytes(&cmd_bytes);

    GfSection::backpatch(&mut w, patch, start);
    w.into_bytes()
}

#[test]
fn vertex_shader_write_is_raw_passthrough() {
    let bytes = vertex_shader_bytes();
    let mut r = Reader::new(&bytes);
    let shader = GfShader::read(&mut r).unwrap();

    assert!(shader.has_vertex_shader());
    assert_eq!(shader.name, "Poke");
    assert_eq!(shader.file_name, "Poke.gfvsh");
    let program = shader.vtx_program.as_ref().unwrap();
    assert_eq!(program.main_offset, 0);
    assert_eq!(program.end_main_offset, 1);
    assert_eq!(program.output_regs[0].name, ShaderOutputName::Position);
    assert_eq!(program.output_regs[0].mask, 0b0111);
    assert_eq!(program.labels.len(), 1);
    assert_eq!(program.labels[0].name, "label_0010");
    assert_eq!(shader.executable.len(), 3);
    assert_eq!(shader.swizzles, vec![0x0000_036F]);

    let mut w = Writer::new();
    shader.write(&mut w);
    assert_eq!(w.into_bytes(), bytes);
}

#[test]
fn vertices_flatten_for_adapters() {
    let pack = fixture_pack();
    let mesh = &pack.models[0].meshes[0];
    let verts = mesh.vertices().unwrap();
    assert_eq!(verts.len(), 3);
    assert_eq!(verts[1].position, Vec3::new(1.0, 0.0, 0.0));
    assert_eq!(verts[2].texcoords[0], Vec2::new(0.0, 1.0));
    // 越界骨骼槽位回落到 0, 顶点位置依旧有效
    let sub = &mesh.submeshes[0];
    assert_eq!(sub.resolve_bone(7, pack.models[0].bones.len()), 0);
    assert!(verts.iter().all(|v| v.position.is_finite()));
}
