use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 上次使用的导出目录
    pub last_output_dir: Option<PathBuf>,
    pub blender_path: Option<PathBuf>,
    pub max_path: Option<PathBuf>,
}

pub fn config_path() -> PathBuf {
    data_root().join("config.json")
}

pub fn load_config() -> AppConfig {
    let path = config_path();
    std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let path = config_path();
    let json = serde_json::to_string_pretty(config).map_err(|e| e.to_string())?;
    std::fs::write(&path, json).map_err(|e| e.to_string())
}

pub fn data_root() -> PathBuf {
    let root = if cfg!(debug_assertions) {
        PathBuf::from("./.lumiose")
    } else {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lumiose")
    };
    let _ = std::fs::create_dir_all(&root);
    root
}
