//! 3ds Max 材质脚本生成

use std::fmt::Write as _;

use lumiose_formats::model::GfModel;
use lumiose_formats::pica::texenv::{CombinerMode, CombinerSource, TexEnvStage};
use lumiose_formats::{GfMaterial, GfShader, Rgba};

use super::{dedup_positions, triangle_positions};

fn max_color(c: Rgba) -> String {
    format!("(color {} {} {})", c.r, c.g, c.b)
}

fn texture_map(material: &GfMaterial, unit: usize) -> String {
    match material.texture_coords.get(unit) {
        Some(tc) => format!("(bitmapTexture filename:\"{}.png\")", tc.name),
        None => format!("txt{unit}"),
    }
}

fn source_expr(src: CombinerSource, stage: &TexEnvStage, material: &GfMaterial) -> String {
    match src {
        CombinerSource::PrimaryColor => "vtxColor".to_string(),
        CombinerSource::FragmentPrimaryColor => "fragPrimary".to_string(),
        CombinerSource::FragmentSecondaryColor => "fragSecondary".to_string(),
        CombinerSource::Texture0 => texture_map(material, 0),
        CombinerSource::Texture1 => texture_map(material, 1),
        CombinerSource::Texture2 => texture_map(material, 2),
        CombinerSource::Texture3 => "txt3".to_string(),
        CombinerSource::PreviousBuffer => "buffer".to_string(),
        CombinerSource::Constant => max_color(stage.color),
        CombinerSource::Previous => "prev".to_string(),
    }
}

fn combiner_expr(mode: CombinerMode, args: &[String]) -> String {
    match mode {
        CombinerMode::Replace => args[0].clone(),
        CombinerMode::Modulate => format!("{} * {}", args[0], args[1]),
        CombinerMode::Add => format!("{} + {}", args[0], args[1]),
        CombinerMode::AddSigned => format!("{} + {} - 0.5", args[0], args[1]),
        CombinerMode::Interpolate => {
            format!("lerp {} {} {}", args[1], args[0], args[2])
        }
        CombinerMode::Subtract => format!("{} - {}", args[0], args[1]),
        CombinerMode::DotProduct3Rgb | CombinerMode::DotProduct3Rgba => {
            format!("dot {} {}", args[0], args[1])
        }
        CombinerMode::MultAdd => format!("{} * {} + {}", args[0], args[1], args[2]),
        CombinerMode::AddMult => format!("({} + {}) * {}", args[0], args[1], args[2]),
    }
}

/// 整个模型的 MaxScript 场景: 材质 + 几何; 有片元着色器时附带逐级合成注释
pub fn scene_script(model: &GfModel, shaders: &[GfShader]) -> String {
    let mut s = material_script(model, shaders);

    let world = model.world_transforms();
    for (mi, mesh) in model.meshes.iter().enumerate() {
        let verts = match mesh.vertices() {
            Ok(v) => v,
            Err(_) => continue,
        };
        for (si, sub) in mesh.submeshes.iter().enumerate() {
            let positions = triangle_positions(model, &verts, sub, &world);
            let (unique, remap) = dedup_positions(&positions);

            let verts_list: Vec<String> = unique
                .iter()
                .map(|p| format!("[{}, {}, {}]", p.x, p.y, p.z))
                .collect();
            // MaxScript 面下标从 1 起
            let faces_list: Vec<String> = remap
                .chunks_exact(3)
                .map(|t| format!("[{}, {}, {}]", t[0] + 1, t[1] + 1, t[2] + 1))
                .collect();

            let var = format!("msh{mi}_{si}");
            let _ = writeln!(s);
            let _ = writeln!(
                s,
                "{var} = mesh vertices:#({}) faces:#({})",
                verts_list.join(", "),
                faces_list.join(", ")
            );
            let _ = writeln!(s, "{var}.name = \"{}_{si}\"", mesh.name);
            if !model.materials.is_empty() {
                let _ = writeln!(s, "{var}.material = mat0");
            }
        }
    }

    s
}

/// 仅材质定义
pub fn material_script(model: &GfModel, shaders: &[GfShader]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "-- generated from model \"{}\"", model.name);

    for (i, material) in model.materials.iter().enumerate() {
        let var = format!("mat{i}");
        let _ = writeln!(s);
        let _ = writeln!(
            s,
            "{var} = standardMaterial name:\"{}\" shaderByName:\"phong\"",
            material.name
        );
        let _ = writeln!(s, "{var}.ambient = {}", max_color(material.ambient_color));
        let _ = writeln!(s, "{var}.diffuse = {}", max_color(material.diffuse_color));
        let _ = writeln!(
            s,
            "{var}.specular = {}",
            max_color(material.specular_colors[0])
        );
        if let Some(tc) = material.texture_coords.first() {
            let _ = writeln!(
                s,
                "{var}.diffuseMap = (bitmapTexture filename:\"{}.png\")",
                tc.name
            );
        }

        let shader = shaders
            .iter()
            .find(|sh| sh.name == material.frag_shader_name);
        if let Some(shader) = shader {
            for (j, stage) in shader.tex_env_stages.iter().enumerate() {
                if stage.is_color_pass_through() {
                    continue;
                }
                let args: Vec<String> = stage
                    .source
                    .color
                    .iter()
                    .take(stage.combiner.color.source_count())
                    .map(|&src| source_expr(src, stage, material))
                    .collect();
                let _ = writeln!(
                    s,
                    "-- stage {j}: prev = {}",
                    combiner_expr(stage.combiner.color, &args)
                );
                if stage.update_color_buffer {
                    let _ = writeln!(s, "-- stage {j}: buffer = copy(prev)");
                }
            }
        }

        let _ = writeln!(s, "meditMaterials[{}] = {var}", i + 1);
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumiose_formats::io::Writer;
    use lumiose_formats::model::material::GfTextureCoord;
    use lumiose_formats::model::mesh::{
        AttrFormat, AttrName, GfMesh, GfSubMesh, Skinning, VertexAttr,
    };

    #[test]
    fn scene_script_emits_one_based_faces() {
        let mut buf = Writer::new();
        for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            buf.write_f32(p[0]);
            buf.write_f32(p[1]);
            buf.write_f32(p[2]);
        }
        let model = GfModel {
            name: "pm0025_00".to_string(),
            meshes: vec![GfMesh {
                name: "BodyMesh".to_string(),
                attributes: vec![VertexAttr {
                    name: AttrName::Position,
                    format: AttrFormat::F32,
                    elements: 3,
                    scale: 1.0,
                }],
                vertex_buffer: buf.into_bytes(),
                submeshes: vec![GfSubMesh {
                    indices: vec![0, 1, 2],
                    bone_indices: vec![0],
                    skinning: Skinning::Rigid,
                }],
            }],
            ..GfModel::default()
        };
        let script = scene_script(&model, &[]);
        assert!(script.contains(
            "msh0_0 = mesh vertices:#([0, 0, 0], [1, 0, 0], [0, 1, 0]) faces:#([1, 2, 3])"
        ));
        assert!(script.contains("msh0_0.name = \"BodyMesh_0\""));

        // 索引缓冲越过顶点表: 该三角形丢弃, 其余照常生成
        let mut broken = model;
        broken.meshes[0].submeshes[0].indices = vec![0, 1, 99, 0, 1, 2];
        let script = scene_script(&broken, &[]);
        assert!(script.contains("faces:#([1, 2, 3])"));
    }

    #[test]
    fn script_defines_one_material_per_slot() {
        let model = GfModel {
            name: "pm0025_00".to_string(),
            materials: vec![GfMaterial {
                name: "Body".to_string(),
                texture_coords: vec![GfTextureCoord {
                    name: "BodyTex".to_string(),
                    ..GfTextureCoord::default()
                }],
                ..GfMaterial::default()
            }],
            ..GfModel::default()
        };
        let script = material_script(&model, &[]);
        assert!(script.contains("standardMaterial name:\"Body\" shaderByName:\"phong\""));
        assert!(script.contains("bitmapTexture filename:\"BodyTex.png\""));
        assert!(script.contains("meditMaterials[1] = mat0"));
    }

    #[test]
    fn pass_through_stages_are_omitted() {
        let mut stages = [TexEnvStage::default(); 6];
        stages[0].source.color = [
            CombinerSource::Texture0,
            CombinerSource::PrimaryColor,
            CombinerSource::PrimaryColor,
        ];
        stages[0].combiner.color = CombinerMode::Modulate;
        for stage in stages.iter_mut().skip(1) {
            stage.source.color[0] = CombinerSource::Previous;
            stage.source.alpha[0] = CombinerSource::Previous;
        }
        let shader = GfShader::from_stages("Default_SHA", stages, Rgba::WHITE);

        let model = GfModel {
            materials: vec![GfMaterial {
                name: "Body".to_string(),
                frag_shader_name: "Default_SHA".to_string(),
                ..GfMaterial::default()
            }],
            ..GfModel::default()
        };
        let script = material_script(&model, &[shader]);
        assert!(script.contains("-- stage 0"));
        assert!(!script.contains("-- stage 1"));
    }
}
