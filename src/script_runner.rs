//! 外部工具 (Blender 等) 的脚本执行

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 脚本执行结果; 工具缺席不算错误, 调用方据此降级为只生成脚本
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    /// 可执行文件不存在
    ToolNotFound,
    /// 工具启动了但以非零码退出
    ToolFailed(Option<i32>),
}

pub trait ScriptRunner {
    fn run(&self, script: &Path) -> io::Result<RunOutcome>;
}

/// 以子进程方式调用外部工具, 脚本路径作为最后一个参数
pub struct ProcessScriptRunner {
    pub tool: PathBuf,
    pub leading_args: Vec<String>,
}

impl ProcessScriptRunner {
    pub fn blender(tool: PathBuf) -> Self {
        Self {
            tool,
            leading_args: vec!["--background".to_string(), "--python".to_string()],
        }
    }
}

impl ScriptRunner for ProcessScriptRunner {
    fn run(&self, script: &Path) -> io::Result<RunOutcome> {
        let status = Command::new(&self.tool)
            .args(&self.leading_args)
            .arg(script)
            .status();
        match status {
            Ok(s) if s.success() => Ok(RunOutcome::Success),
            Ok(s) => Ok(RunOutcome::ToolFailed(s.code())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(RunOutcome::ToolNotFound),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tool_reports_not_found() {
        let runner = ProcessScriptRunner::blender(PathBuf::from(
            "/nonexistent/lumiose-test-blender",
        ));
        let outcome = runner.run(Path::new("script.py")).unwrap();
        assert_eq!(outcome, RunOutcome::ToolNotFound);
    }
}
