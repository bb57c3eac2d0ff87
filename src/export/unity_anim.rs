//! Unity AnimationClip (.anim) 生成
//!
//! 产物是 Unity 的文本序列化 YAML; 数值一律用 `format!` 写出,
//! 不受任何区域设置影响。

use std::fmt::Write as _;

use lumiose_formats::model::motion::Curve;
use lumiose_formats::model::GfModel;
use lumiose_formats::GfMotion;

const SAMPLE_RATE: f32 = 30.0;

/// 从根到该骨骼的路径, 层级用 '/' 连接
fn bone_path(model: &GfModel, name: &str) -> String {
    let mut chain = Vec::new();
    let mut index = model.bones.iter().position(|b| b.name == name);
    while let Some(i) = index {
        chain.push(model.bones[i].name.as_str());
        let parent = model.bones[i].parent_index;
        index = if parent >= 0 {
            Some(parent as usize)
        } else {
            None
        };
    }
    if chain.is_empty() {
        return name.to_string();
    }
    chain.reverse();
    chain.join("/")
}

/// 三条分量曲线的关键帧帧号并集, 升序
fn union_frames(curves: &[Curve; 3]) -> Vec<f32> {
    let mut frames: Vec<f32> = curves
        .iter()
        .flat_map(|c| c.keys.iter().map(|k| k.frame))
        .collect();
    frames.sort_by(|a, b| a.total_cmp(b));
    frames.dedup_by(|a, b| a.to_bits() == b.to_bits());
    frames
}

fn component_at(curve: &Curve, frame: f32, default: f32) -> (f32, f32) {
    let value = curve.sample(frame).unwrap_or(default);
    let slope = curve
        .keys
        .iter()
        .find(|k| k.frame.to_bits() == frame.to_bits())
        .map(|k| k.slope)
        .unwrap_or(0.0);
    (value, slope)
}

fn write_vector_curve(
    s: &mut String,
    curves: &[Curve; 3],
    default: f32,
    scale: f32,
    rotation_order: u32,
    path: &str,
) {
    let _ = writeln!(s, "  - curve:");
    let _ = writeln!(s, "      serializedVersion: 2");
    let _ = writeln!(s, "      m_Curve:");
    for frame in union_frames(curves) {
        let (x, sx) = component_at(&curves[0], frame, default);
        let (y, sy) = component_at(&curves[1], frame, default);
        let (z, sz) = component_at(&curves[2], frame, default);
        let _ = writeln!(s, "      - serializedVersion: 3");
        let _ = writeln!(s, "        time: {}", frame / SAMPLE_RATE);
        let _ = writeln!(
            s,
            "        value: {{x: {}, y: {}, z: {}}}",
            x * scale,
            y * scale,
            z * scale
        );
        let _ = writeln!(
            s,
            "        inSlope: {{x: {}, y: {}, z: {}}}",
            sx * scale,
            sy * scale,
            sz * scale
        );
        let _ = writeln!(
            s,
            "        outSlope: {{x: {}, y: {}, z: {}}}",
            sx * scale,
            sy * scale,
            sz * scale
        );
        let _ = writeln!(s, "        tangentMode: 0");
    }
    let _ = writeln!(s, "      m_PreInfinity: 2");
    let _ = writeln!(s, "      m_PostInfinity: 2");
    let _ = writeln!(s, "      m_RotationOrder: {rotation_order}");
    let _ = writeln!(s, "    path: {path}");
}

pub fn anim_yaml(motion: &GfMotion, model: &GfModel) -> String {
    let mut s = String::new();
    s.push_str("%YAML 1.1\n");
    s.push_str("%TAG !u! tag:unity3d.com,2011:\n");
    s.push_str("--- !u!74 &7400000\n");
    s.push_str("AnimationClip:\n");
    s.push_str("  m_ObjectHideFlags: 0\n");
    let _ = writeln!(s, "  m_Name: {}", motion.name);
    s.push_str("  serializedVersion: 6\n");
    s.push_str("  m_Legacy: 1\n");
    s.push_str("  m_Compressed: 0\n");
    s.push_str("  m_UseHighQualityCurve: 1\n");
    s.push_str("  m_RotationCurves: []\n");
    s.push_str("  m_CompressedRotationCurves: []\n");

    let tracks = &motion.bone_tracks;
    let to_deg = 180.0 / std::f32::consts::PI;

    let euler: Vec<_> = tracks
        .iter()
        .filter(|t| t.rotation.iter().any(|c| !c.is_empty()))
        .collect();
    if euler.is_empty() {
        s.push_str("  m_EulerCurves: []\n");
    } else {
        s.push_str("  m_EulerCurves:\n");
        for track in euler {
            write_vector_curve(
                &mut s,
                &track.rotation,
                0.0,
                to_deg,
                0,
                &bone_path(model, &track.name),
            );
        }
    }

    let position: Vec<_> = tracks
        .iter()
        .filter(|t| t.translation.iter().any(|c| !c.is_empty()))
        .collect();
    if position.is_empty() {
        s.push_str("  m_PositionCurves: []\n");
    } else {
        s.push_str("  m_PositionCurves:\n");
        for track in position {
            write_vector_curve(
                &mut s,
                &track.translation,
                0.0,
                1.0,
                4,
                &bone_path(model, &track.name),
            );
        }
    }

    let scale: Vec<_> = tracks
        .iter()
        .filter(|t| t.scale.iter().any(|c| !c.is_empty()))
        .collect();
    if scale.is_empty() {
        s.push_str("  m_ScaleCurves: []\n");
    } else {
        s.push_str("  m_ScaleCurves:\n");
        for track in scale {
            write_vector_curve(
                &mut s,
                &track.scale,
                1.0,
                1.0,
                4,
                &bone_path(model, &track.name),
            );
        }
    }

    s.push_str("  m_FloatCurves: []\n");
    s.push_str("  m_PPtrCurves: []\n");
    let _ = writeln!(s, "  m_SampleRate: {SAMPLE_RATE}");
    s.push_str("  m_WrapMode: 0\n");
    s.push_str("  m_AnimationClipSettings:\n");
    s.push_str("    serializedVersion: 2\n");
    s.push_str("    m_StartTime: 0\n");
    let _ = writeln!(
        s,
        "    m_StopTime: {}",
        motion.frame_count as f32 / SAMPLE_RATE
    );
    s.push_str("    m_LoopTime: 1\n");
    s.push_str("  m_EditorCurves: []\n");
    s.push_str("  m_EulerEditorCurves: []\n");
    s.push_str("  m_Events: []\n");
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumiose_formats::model::motion::{BoneTrack, KeyFrame};
    use lumiose_formats::GfBone;

    fn chain_model() -> GfModel {
        GfModel {
            bones: vec![
                GfBone {
                    name: "Origin".to_string(),
                    parent_index: -1,
                    ..GfBone::default()
                },
                GfBone {
                    name: "Waist".to_string(),
                    parent_index: 0,
                    translation: Vec3::new(0.0, 0.5, 0.0),
                    ..GfBone::default()
                },
            ],
            ..GfModel::default()
        }
    }

    #[test]
    fn bone_path_walks_parent_chain() {
        let model = chain_model();
        assert_eq!(bone_path(&model, "Waist"), "Origin/Waist");
        assert_eq!(bone_path(&model, "Origin"), "Origin");
        assert_eq!(bone_path(&model, "Missing"), "Missing");
    }

    #[test]
    fn clip_header_and_tracks() {
        let motion = GfMotion {
            name: "Walk".to_string(),
            frame_count: 30,
            bone_tracks: vec![BoneTrack {
                name: "Waist".to_string(),
                translation: [
                    Curve {
                        keys: vec![
                            KeyFrame {
                                frame: 0.0,
                                value: 0.0,
                                slope: 0.0,
                            },
                            KeyFrame {
                                frame: 30.0,
                                value: 1.0,
                                slope: 0.5,
                            },
                        ],
                    },
                    Curve::default(),
                    Curve::default(),
                ],
                ..BoneTrack::default()
            }],
            ..GfMotion::default()
        };
        let yaml = anim_yaml(&motion, &chain_model());
        assert!(yaml.starts_with("%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n"));
        assert!(yaml.contains("--- !u!74 &7400000"));
        assert!(yaml.contains("m_Name: Walk"));
        assert!(yaml.contains("m_PositionCurves:\n"));
        assert!(yaml.contains("    path: Origin/Waist"));
        assert!(yaml.contains("m_EulerCurves: []"));
        assert!(yaml.contains("        time: 1\n"));
        assert!(yaml.contains("    m_StopTime: 1\n"));
        assert!(yaml.contains("inSlope: {x: 0.5, y: 0, z: 0}"));
    }

    #[test]
    fn euler_values_are_degrees() {
        let motion = GfMotion {
            name: "Turn".to_string(),
            frame_count: 1,
            bone_tracks: vec![BoneTrack {
                name: "Origin".to_string(),
                rotation: [
                    Curve::default(),
                    Curve::default(),
                    Curve {
                        keys: vec![KeyFrame {
                            frame: 0.0,
                            value: std::f32::consts::PI,
                            slope: 0.0,
                        }],
                    },
                ],
                ..BoneTrack::default()
            }],
            ..GfMotion::default()
        };
        let yaml = anim_yaml(&motion, &chain_model());
        let z = std::f32::consts::PI * (180.0 / std::f32::consts::PI);
        let expected = format!("value: {{x: 0, y: 0, z: {z}}}");
        assert!(yaml.contains(&expected));
        assert!((z - 180.0).abs() < 1e-3);
        assert!(yaml.contains("m_RotationOrder: 0"));
    }
}
