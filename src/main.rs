use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

use lumiose::config::{load_config, save_config};
use lumiose::script_runner::{ProcessScriptRunner, RunOutcome, ScriptRunner};
use lumiose::{run_batch, Adapter, BatchOptions, BatchProgress};

const USAGE: &str = "用法: lumiose <文件/目录>... [-o 输出目录] [--adapter max|dump|blender|anim]...";

fn collect_files(path: &Path, out: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    if path.is_dir() {
        let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("读取目录 {}", path.display()))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();
        entries.sort();
        for entry in entries {
            collect_files(&entry, out)?;
        }
    } else {
        out.push(path.to_path_buf());
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut inputs = Vec::new();
    let mut output_dir: Option<PathBuf> = None;
    let mut adapters = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-o" | "--output" => {
                let dir = args.next().with_context(|| USAGE.to_string())?;
                output_dir = Some(PathBuf::from(dir));
            }
            "--adapter" => {
                let name = args.next().with_context(|| USAGE.to_string())?;
                match Adapter::from_name(&name) {
                    Some(a) => adapters.push(a),
                    None => bail!("未知的适配器 {name}\n{USAGE}"),
                }
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ => inputs.push(PathBuf::from(arg)),
        }
    }

    if inputs.is_empty() {
        bail!("{USAGE}");
    }
    if adapters.is_empty() {
        adapters = Adapter::ALL.to_vec();
    }

    let mut config = load_config();
    let output_dir = output_dir
        .or_else(|| config.last_output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("./export"));

    let mut files = Vec::new();
    for input in &inputs {
        collect_files(input, &mut files)?;
    }
    println!("共 {} 个文件, 输出到 {}", files.len(), output_dir.display());

    // 单个目录输入: 输出镜像其内部结构; 否则以第一个输入的父目录为根
    let input_root = if inputs.len() == 1 && inputs[0].is_dir() {
        inputs[0].clone()
    } else {
        inputs[0]
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    };

    let runner: Option<Box<dyn ScriptRunner>> = config
        .blender_path
        .clone()
        .map(|p| Box::new(ProcessScriptRunner::blender(p)) as Box<dyn ScriptRunner>);

    let options = BatchOptions {
        input_root,
        output_dir: output_dir.clone(),
        adapters,
        runner,
    };
    run_batch(&files, &options, |p| match p {
        BatchProgress::File { index, total, name } => {
            println!("[{index}/{total}] 处理 {name}");
        }
        BatchProgress::Skipped { name, reason } => {
            println!("跳过 {name}: {reason}");
        }
        BatchProgress::Tool { script, outcome } => match outcome {
            RunOutcome::Success => println!("外部工具执行成功: {script}"),
            RunOutcome::ToolNotFound => {
                println!("未找到外部工具, 已生成脚本: {script}")
            }
            RunOutcome::ToolFailed(code) => {
                println!("外部工具退出异常 (码 {code:?}): {script}")
            }
        },
        BatchProgress::Done { exported, skipped } => {
            println!("完成: 导出 {exported} 个, 跳过 {skipped} 个");
        }
    })?;

    config.last_output_dir = Some(output_dir);
    if let Err(e) = save_config(&config) {
        println!("配置保存失败: {e}");
    }

    Ok(())
}
