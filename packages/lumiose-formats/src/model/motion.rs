//! 动画: 骨骼轨道与材质纹理变换轨道
//!
//! 曲线用 Hermite 关键帧 (帧号, 值, 切线斜率), 按目标名字索引。

use crate::error::Result;
use crate::io::{Reader, Writer};
use crate::section::GfSection;

const MAGIC: &str = "gfmotion";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KeyFrame {
    pub frame: f32,
    pub value: f32,
    pub slope: f32,
}

/// 单分量曲线
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Curve {
    pub keys: Vec<KeyFrame>,
}

impl Curve {
    fn read(r: &mut Reader) -> Result<Self> {
        let count = r.read_u32()?;
        let mut keys = Vec::with_capacity(count as usize);
        for _ in 0..count {
            keys.push(KeyFrame {
                frame: r.read_f32()?,
                value: r.read_f32()?,
                slope: r.read_f32()?,
            });
        }
        Ok(Self { keys })
    }

    fn write(&self, w: &mut Writer) {
        w.write_u32(self.keys.len() as u32);
        for k in &self.keys {
            w.write_f32(k.frame);
            w.write_f32(k.value);
            w.write_f32(k.slope);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Hermite 插值采样; 越界处取端点值
    pub fn sample(&self, frame: f32) -> Option<f32> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if frame <= first.frame {
            return Some(first.value);
        }
        if frame >= last.frame {
            return Some(last.value);
        }
        let right = self.keys.iter().position(|k| k.frame > frame)?;
        let a = self.keys[right - 1];
        let b = self.keys[right];
        let span = b.frame - a.frame;
        let t = (frame - a.frame) / span;
        let t2 = t * t;
        let t3 = t2 * t;
        Some(
            a.value * (2.0 * t3 - 3.0 * t2 + 1.0)
                + b.value * (-2.0 * t3 + 3.0 * t2)
                + a.slope * span * (t3 - 2.0 * t2 + t)
                + b.slope * span * (t3 - t2),
        )
    }
}

/// 一根骨骼的 9 条分量曲线 (平移/旋转/缩放 x XYZ)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoneTrack {
    pub name: String,
    pub translation: [Curve; 3],
    pub rotation: [Curve; 3],
    pub scale: [Curve; 3],
}

impl BoneTrack {
    fn read(r: &mut Reader) -> Result<Self> {
        let name = r.read_short_str()?;
        let mut track = BoneTrack {
            name,
            ..BoneTrack::default()
        };
        for c in &mut track.translation {
            *c = Curve::read(r)?;
        }
        for c in &mut track.rotation {
            *c = Curve::read(r)?;
        }
        for c in &mut track.scale {
            *c = Curve::read(r)?;
        }
        Ok(track)
    }

    fn write(&self, w: &mut Writer) {
        w.write_short_str(&self.name);
        for c in &self.translation {
            c.write(w);
        }
        for c in &self.rotation {
            c.write(w);
        }
        for c in &self.scale {
            c.write(w);
        }
    }
}

/// 一个材质纹理单元的 5 条曲线 (缩放 UV, 旋转, 平移 UV)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialTrack {
    pub name: String,
    pub unit: u32,
    pub scale_u: Curve,
    pub scale_v: Curve,
    pub rotation: Curve,
    pub translation_u: Curve,
    pub translation_v: Curve,
}

impl MaterialTrack {
    fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            name: r.read_short_str()?,
            unit: r.read_u32()?,
            scale_u: Curve::read(r)?,
            scale_v: Curve::read(r)?,
            rotation: Curve::read(r)?,
            translation_u: Curve::read(r)?,
            translation_v: Curve::read(r)?,
        })
    }

    fn write(&self, w: &mut Writer) {
        w.write_short_str(&self.name);
        w.write_u32(self.unit);
        self.scale_u.write(w);
        self.scale_v.write(w);
        self.rotation.write(w);
        self.translation_u.write(w);
        self.translation_v.write(w);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GfMotion {
    pub name: String,
    pub frame_count: u32,
    pub bone_tracks: Vec<BoneTrack>,
    pub material_tracks: Vec<MaterialTrack>,
}

impl GfMotion {
    pub fn read(r: &mut Reader) -> Result<Self> {
        let (section, start) = GfSection::expect(r, MAGIC)?;

        let name = r.read_padded_str(0x40)?;
        let frame_count = r.read_u32()?;
        let bone_track_count = r.read_u32()?;
        let material_track_count = r.read_u32()?;

        let mut bone_tracks = Vec::with_capacity(bone_track_count as usize);
        for _ in 0..bone_track_count {
            bone_tracks.push(BoneTrack::read(r)?);
        }
        let mut material_tracks = Vec::with_capacity(material_track_count as usize);
        for _ in 0..material_track_count {
            material_tracks.push(MaterialTrack::read(r)?);
        }

        section.finish(r, start)?;
        r.skip_padding()?;

        Ok(Self {
            name,
            frame_count,
            bone_tracks,
            material_tracks,
        })
    }

    pub fn write(&self, w: &mut Writer) {
        let patch = GfSection::write_placeholder(w, MAGIC);
        let start = w.position();

        w.write_padded_str(&self.name, 0x40);
        w.write_u32(self.frame_count);
        w.write_u32(self.bone_tracks.len() as u32);
        w.write_u32(self.material_tracks.len() as u32);

        for t in &self.bone_tracks {
            t.write(w);
        }
        for t in &self.material_tracks {
            t.write(w);
        }

        GfSection::backpatch(w, patch, start);
        w.write_padding();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hermite_sample_hits_keys_and_clamps() {
        let curve = Curve {
            keys: vec![
                KeyFrame {
                    frame: 0.0,
                    value: 1.0,
                    slope: 0.0,
                },
                KeyFrame {
                    frame: 10.0,
                    value: 3.0,
                    slope: 0.0,
                },
            ],
        };
        assert_eq!(curve.sample(0.0), Some(1.0));
        assert_eq!(curve.sample(10.0), Some(3.0));
        assert_eq!(curve.sample(-5.0), Some(1.0));
        assert_eq!(curve.sample(20.0), Some(3.0));
        // 零斜率 Hermite 在中点取均值
        assert!((curve.sample(5.0).unwrap() - 2.0).abs() < 1e-6);
        assert_eq!(Curve::default().sample(1.0), None);
    }

    #[test]
    fn motion_roundtrip() {
        let motion = GfMotion {
            name: "pm0025_00_Walk".to_string(),
            frame_count: 30,
            bone_tracks: vec![BoneTrack {
                name: "Waist".to_string(),
                translation: [
                    Curve {
                        keys: vec![KeyFrame {
                            frame: 0.0,
                            value: 0.5,
                            slope: 0.1,
                        }],
                    },
                    Curve::default(),
                    Curve::default(),
                ],
                ..BoneTrack::default()
            }],
            material_tracks: vec![MaterialTrack {
                name: "Body".to_string(),
                unit: 0,
                translation_u: Curve {
                    keys: vec![
                        KeyFrame {
                            frame: 0.0,
                            value: 0.0,
                            slope: 0.0,
                        },
                        KeyFrame {
                            frame: 30.0,
                            value: 1.0,
                            slope: 0.0,
                        },
                    ],
                },
                ..MaterialTrack::default()
            }],
        };

        let mut w = Writer::new();
        motion.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        assert_eq!(GfMotion::read(&mut r).unwrap(), motion);
    }
}
