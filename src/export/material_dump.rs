//! 材质状态的可读报告, 用于逐字段比对

use std::fmt::Write as _;

use lumiose_formats::{GfMaterial, GfShader};

pub fn material_report(material: &GfMaterial, shader: Option<&GfShader>) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "material: {}", material.name);
    let _ = writeln!(s, "  shader: {}", material.shader_name);
    let _ = writeln!(s, "  vtx shader: {}", material.vtx_shader_name);
    let _ = writeln!(s, "  frag shader: {}", material.frag_shader_name);
    let _ = writeln!(s, "  render priority: {}", material.render_priority);
    let _ = writeln!(s, "  render layer: {}", material.render_layer);
    let _ = writeln!(s, "  light set: {}", material.light_set_index);
    let _ = writeln!(s, "  bump texture: {}", material.bump_texture);

    let _ = writeln!(s, "  colors:");
    let _ = writeln!(s, "    emission: {}", material.emission_color);
    let _ = writeln!(s, "    ambient: {}", material.ambient_color);
    let _ = writeln!(s, "    diffuse: {}", material.diffuse_color);
    let _ = writeln!(s, "    blend: {}", material.blend_color);
    for (i, c) in material.specular_colors.iter().enumerate() {
        let _ = writeln!(s, "    specular{i}: {c}");
    }
    for (i, c) in material.constant_colors.iter().enumerate() {
        let _ = writeln!(s, "    constant{i}: {c}");
    }

    let _ = writeln!(s, "  pipeline:");
    let _ = writeln!(s, "    face culling: {:?}", material.face_culling);
    let _ = writeln!(s, "    color op: {:?}", material.color_operation);
    let _ = writeln!(s, "    blend: {:?}", material.blend_function);
    let _ = writeln!(s, "    logic op: {:?}", material.logical_operation);
    let _ = writeln!(s, "    alpha test: {:?}", material.alpha_test);
    let _ = writeln!(s, "    stencil test: {:?}", material.stencil_test);
    let _ = writeln!(s, "    stencil op: {:?}", material.stencil_operation);
    let _ = writeln!(s, "    depth/color mask: {:?}", material.depth_color_mask);
    let _ = writeln!(
        s,
        "    color buffer r/w: {}/{}",
        material.color_buffer_read, material.color_buffer_write
    );
    let _ = writeln!(
        s,
        "    depth buffer r/w: {}/{}",
        material.depth_buffer_read, material.depth_buffer_write
    );
    let _ = writeln!(
        s,
        "    stencil buffer r/w: {}/{}",
        material.stencil_buffer_read, material.stencil_buffer_write
    );

    let _ = writeln!(s, "  texture units: {}", material.texture_coords.len());
    for tc in &material.texture_coords {
        let _ = writeln!(
            s,
            "    unit {}: {} scale=({}, {}) rot={} trans=({}, {}) wrap={}/{}",
            tc.unit,
            tc.name,
            tc.scale.x,
            tc.scale.y,
            tc.rotation,
            tc.translation.x,
            tc.translation.y,
            tc.wrap_u,
            tc.wrap_v
        );
    }

    if let Some(shader) = shader {
        let _ = writeln!(s, "  combiner ({}):", shader.name);
        for (i, stage) in shader.tex_env_stages.iter().enumerate() {
            if stage.is_color_pass_through() && stage.is_alpha_pass_through() {
                continue;
            }
            let _ = writeln!(
                s,
                "    stage {i}: color {:?} {:?} alpha {:?} {:?} const={}",
                stage.combiner.color,
                stage.source.color,
                stage.combiner.alpha,
                stage.source.alpha,
                stage.color
            );
        }
    }

    s
}
