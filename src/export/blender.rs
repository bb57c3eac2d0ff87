//! Blender 场景脚本生成
//!
//! 产物是独立的 Python 脚本, 由 Blender 以 `--background --python` 执行后
//! 存成 .blend 文件; 刚性蒙皮的子网格按绑定骨骼变换到世界空间。

use std::fmt::Write as _;
use std::path::Path;

use lumiose_formats::model::GfModel;
use lumiose_formats::{GfMotion, Result};

use super::{dedup_positions, triangle_positions};

fn python_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

pub fn scene_script(
    model: &GfModel,
    motions: &[GfMotion],
    blend_path: &Path,
) -> Result<String> {
    let world = model.world_transforms();

    let mut s = String::new();
    s.push_str("import bpy\n");
    s.push_str("import bmesh\n\n");

    let _ = writeln!(
        s,
        "root = bpy.data.objects.new(\"{}\", None)",
        model.name
    );
    s.push_str("bpy.context.collection.objects.link(root)\n");

    for (i, material) in model.materials.iter().enumerate() {
        let c = material.diffuse_color;
        let _ = writeln!(
            s,
            "mat{i} = bpy.data.materials.new(\"{}\")",
            material.name
        );
        let _ = writeln!(
            s,
            "mat{i}.diffuse_color = ({}, {}, {}, {})",
            c.r as f32 / 255.0,
            c.g as f32 / 255.0,
            c.b as f32 / 255.0,
            c.a as f32 / 255.0
        );
    }

    for (mi, mesh) in model.meshes.iter().enumerate() {
        let verts = mesh.vertices()?;
        for (si, sub) in mesh.submeshes.iter().enumerate() {
            let positions = triangle_positions(model, &verts, sub, &world);
            let (unique, remap) = dedup_positions(&positions);

            let obj = format!("{}_{}", mesh.name, si);
            let mvar = format!("me{mi}_{si}");
            let _ = writeln!(s);
            let _ = writeln!(s, "{mvar} = bpy.data.meshes.new(\"{obj}\")");
            let _ = writeln!(s, "ob = bpy.data.objects.new(\"{obj}\", {mvar})");
            s.push_str("ob.parent = root\n");
            s.push_str("bpy.context.collection.objects.link(ob)\n");
            s.push_str("bm = bmesh.new()\n");
            for p in &unique {
                let _ = writeln!(s, "bm.verts.new(({}, {}, {}))", p.x, p.y, p.z);
            }
            s.push_str("bm.verts.ensure_lookup_table()\n");
            for tri in remap.chunks_exact(3) {
                // 去重后可能出现退化三角形或重复面, Blender 会拒绝, 跳过即可
                let _ = writeln!(s, "try:");
                let _ = writeln!(
                    s,
                    "    bm.faces.new((bm.verts[{}], bm.verts[{}], bm.verts[{}]))",
                    tri[0], tri[1], tri[2]
                );
                let _ = writeln!(s, "except ValueError:");
                let _ = writeln!(s, "    pass");
            }
            let _ = writeln!(s, "bm.to_mesh({mvar})");
            s.push_str("bm.free()\n");
            if !model.materials.is_empty() {
                let _ = writeln!(s, "{mvar}.materials.append(mat0)");
            }
        }
    }

    for motion in motions {
        let _ = writeln!(s);
        let _ = writeln!(
            s,
            "act = bpy.data.actions.new(\"{}\")",
            motion.name
        );
        for track in &motion.bone_tracks {
            let groups = [
                ("location", &track.translation),
                ("rotation_euler", &track.rotation),
                ("scale", &track.scale),
            ];
            for (attr, curves) in groups {
                for (axis, curve) in curves.iter().enumerate() {
                    if curve.is_empty() {
                        continue;
                    }
                    let _ = writeln!(
                        s,
                        "fc = act.fcurves.new(\"pose.bones[\\\"{}\\\"].{attr}\", index={axis})",
                        track.name
                    );
                    let _ = writeln!(s, "fc.keyframe_points.add({})", curve.keys.len());
                    for (k, key) in curve.keys.iter().enumerate() {
                        let _ = writeln!(
                            s,
                            "fc.keyframe_points[{k}].co = ({}, {})",
                            key.frame, key.value
                        );
                    }
                }
            }
        }
        // 材质 UV 轨道落到自定义属性通道 "<材质名>_<通道>"
        for track in &motion.material_tracks {
            let channels = [
                ("scale_u", &track.scale_u),
                ("scale_v", &track.scale_v),
                ("rotation", &track.rotation),
                ("translation_u", &track.translation_u),
                ("translation_v", &track.translation_v),
            ];
            for (channel, curve) in channels {
                if curve.is_empty() {
                    continue;
                }
                let _ = writeln!(
                    s,
                    "fc = act.fcurves.new(\"[\\\"{}_{channel}\\\"]\")",
                    track.name
                );
                let _ = writeln!(s, "fc.keyframe_points.add({})", curve.keys.len());
                for (k, key) in curve.keys.iter().enumerate() {
                    let _ = writeln!(
                        s,
                        "fc.keyframe_points[{k}].co = ({}, {})",
                        key.frame, key.value
                    );
                }
            }
        }
    }

    let _ = writeln!(s);
    let _ = writeln!(
        s,
        "bpy.ops.wm.save_as_mainfile(filepath=\"{}\")",
        python_path(blend_path)
    );

    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use lumiose_formats::io::Writer;
    use lumiose_formats::model::mesh::{
        AttrFormat, AttrName, GfMesh, GfSubMesh, Skinning, VertexAttr,
    };
    use lumiose_formats::GfBone;

    fn one_triangle_model() -> GfModel {
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
        GfModel {
            name: "pm0025_00".to_string(),
            bones: vec![GfBone {
                name: "Origin".to_string(),
                parent_index: -1,
                translation: Vec3::new(0.0, 2.0, 0.0),
                ..GfBone::default()
            }],
            meshes: vec![GfMesh {
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
            }],
            ..GfModel::default()
        }
    }

    #[test]
    fn script_builds_scene_and_saves() {
        let model = one_triangle_model();
        let script =
            scene_script(&model, &[], Path::new("/tmp/out/pm0025_00.blend")).unwrap();
        assert!(script.starts_with("import bpy\nimport bmesh\n"));
        assert!(script.contains("bpy.data.objects.new(\"pm0025_00\", None)"));
        assert!(script.contains("bpy.data.meshes.new(\"BodyMesh_0\")"));
        // 刚性蒙皮: 骨骼平移 (0, 2, 0) 已作用在顶点上
        assert!(script.contains("bm.verts.new((0, 2, 0))"));
        assert!(script.contains("bm.verts.new((1, 2, 0))"));
        assert!(script.contains(
            "bpy.ops.wm.save_as_mainfile(filepath=\"/tmp/out/pm0025_00.blend\")"
        ));
    }

    #[test]
    fn shared_corners_are_deduplicated() {
        let mut model = one_triangle_model();
        // 两个互为镜像的三角形, 6 个角只有 3 个唯一位置
        model.meshes[0].submeshes[0].indices = vec![0, 1, 2, 2, 1, 0];
        let script = scene_script(&model, &[], Path::new("out.blend")).unwrap();
        let vert_lines = script.matches("bm.verts.new(").count();
        assert_eq!(vert_lines, 3);
    }

    #[test]
    fn motions_become_actions_with_fcurves() {
        use lumiose_formats::model::motion::{BoneTrack, Curve, KeyFrame, MaterialTrack};

        let model = one_triangle_model();
        let motion = GfMotion {
            name: "Walk".to_string(),
            frame_count: 30,
            material_tracks: vec![MaterialTrack {
                name: "Body".to_string(),
                unit: 0,
                translation_u: Curve {
                    keys: vec![KeyFrame {
                        frame: 0.0,
                        value: 0.25,
                        slope: 0.0,
                    }],
                },
                ..MaterialTrack::default()
            }],
            bone_tracks: vec![BoneTrack {
                name: "Origin".to_string(),
                translation: [
                    Curve::default(),
                    Curve {
                        keys: vec![KeyFrame {
                            frame: 0.0,
                            value: 0.5,
                            slope: 0.0,
                        }],
                    },
                    Curve::default(),
                ],
                ..BoneTrack::default()
            }],
            ..GfMotion::default()
        };
        let script =
            scene_script(&model, &[motion], Path::new("out.blend")).unwrap();
        assert!(script.contains("act = bpy.data.actions.new(\"Walk\")"));
        assert!(script
            .contains("fc = act.fcurves.new(\"pose.bones[\\\"Origin\\\"].location\", index=1)"));
        assert!(script.contains("fc.keyframe_points[0].co = (0, 0.5)"));
        assert!(script.contains("fc = act.fcurves.new(\"[\\\"Body_translation_u\\\"]\")"));
        assert!(script.contains("fc.keyframe_points[0].co = (0, 0.25)"));
    }
}
