//! 批量导出: 逐文件解码 + 按适配器落盘
//!
//! 单个文件失败只记一次跳过, 不中断整批;
//! 输出目录镜像输入相对路径, 两个同名文件不会互相覆盖。

use std::path::{Path, PathBuf};

use anyhow::Context;
use lumiose_formats::{GfModel, GfModelPack, GfMotion};
use tracing::debug;

use crate::export::{blender, material_dump, max_script, unity_anim, Adapter};
use crate::script_runner::{RunOutcome, ScriptRunner};

/// 批处理进度
pub enum BatchProgress {
    File {
        index: usize,
        total: usize,
        name: String,
    },
    Skipped {
        name: String,
        reason: String,
    },
    /// 外部工具的执行结果; 工具缺席或失败不中断批处理
    Tool {
        script: String,
        outcome: RunOutcome,
    },
    Done {
        exported: usize,
        skipped: usize,
    },
}

pub struct BatchOptions {
    /// 输入根目录, 输出子目录按相对它的路径镜像
    pub input_root: PathBuf,
    pub output_dir: PathBuf,
    pub adapters: Vec<Adapter>,
    pub runner: Option<Box<dyn ScriptRunner>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub exported: usize,
    pub skipped: usize,
}

pub fn run_batch(
    inputs: &[PathBuf],
    options: &BatchOptions,
    mut progress: impl FnMut(BatchProgress),
) -> anyhow::Result<BatchSummary> {
    std::fs::create_dir_all(&options.output_dir)
        .with_context(|| format!("创建输出目录 {}", options.output_dir.display()))?;

    let mut summary = BatchSummary::default();
    for (i, path) in inputs.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        progress(BatchProgress::File {
            index: i + 1,
            total: inputs.len(),
            name: name.clone(),
        });

        match export_file(path, options, &mut progress) {
            Ok(()) => summary.exported += 1,
            Err(e) => {
                summary.skipped += 1;
                progress(BatchProgress::Skipped {
                    name,
                    reason: format!("{e:#}"),
                });
            }
        }
    }

    progress(BatchProgress::Done {
        exported: summary.exported,
        skipped: summary.skipped,
    });
    Ok(summary)
}

/// 输出子目录 = 输出根 + 输入文件相对输入根的路径 (去扩展名)
fn output_subdir(path: &Path, options: &BatchOptions) -> PathBuf {
    let rel = match path.strip_prefix(&options.input_root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel.to_path_buf(),
        _ => path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output")),
    };
    options.output_dir.join(rel.with_extension(""))
}

fn export_file(
    path: &Path,
    options: &BatchOptions,
    progress: &mut impl FnMut(BatchProgress),
) -> anyhow::Result<()> {
    let data = std::fs::read(path).with_context(|| format!("读取 {}", path.display()))?;
    let pack = GfModelPack::from_bytes(&data)?;
    debug!(
        models = pack.models.len(),
        textures = pack.textures.len(),
        "已解码 {}",
        path.display()
    );

    let out_dir = output_subdir(path, options);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("创建 {}", out_dir.display()))?;

    let motions: Vec<GfMotion> = pack
        .skeletal_motions
        .iter()
        .chain(&pack.material_motions)
        .cloned()
        .collect();

    for model in &pack.models {
        for &adapter in &options.adapters {
            match adapter {
                Adapter::MaxScript => {
                    let script = max_script::scene_script(model, &[]);
                    write_artifact(&out_dir.join(format!("{}.ms", model.name)), &script)?;
                }
                Adapter::MaterialDump => {
                    let mut report = String::new();
                    for material in &model.materials {
                        report.push_str(&material_dump::material_report(material, None));
                        report.push('\n');
                    }
                    write_artifact(
                        &out_dir.join(format!("{}_materials.txt", model.name)),
                        &report,
                    )?;
                }
                Adapter::Blender => {
                    let blend = out_dir.join(format!("{}.blend", model.name));
                    let script = blender::scene_script(model, &motions, &blend)?;
                    let script_path = out_dir.join(format!("{}.py", model.name));
                    write_artifact(&script_path, &script)?;
                    if let Some(runner) = &options.runner {
                        let outcome = runner.run(&script_path)?;
                        progress(BatchProgress::Tool {
                            script: script_path.display().to_string(),
                            outcome,
                        });
                    }
                }
                Adapter::UnityAnim => {}
            }
        }
    }

    if options.adapters.contains(&Adapter::UnityAnim) {
        let skeleton_source = pack.models.first().cloned().unwrap_or_else(GfModel::default);
        for motion in &pack.skeletal_motions {
            let yaml = unity_anim::anim_yaml(motion, &skeleton_source);
            write_artifact(&out_dir.join(format!("{}.anim", motion.name)), &yaml)?;
        }
    }

    Ok(())
}

fn write_artifact(path: &Path, content: &str) -> anyhow::Result<()> {
    std::fs::write(path, content).with_context(|| format!("写入 {}", path.display()))
}
