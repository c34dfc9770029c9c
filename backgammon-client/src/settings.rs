//! 客户端设置
//!
//! 以 JSON 保存在用户配置目录，命令行参数优先于设置文件。

use std::path::{Path, PathBuf};

use anyhow::Context;
use protocol::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

/// 客户端设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// 默认服务器地址
    pub host: String,
    /// 默认端口
    pub port: u16,
    /// 默认同时启动服务端
    pub host_server: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            host_server: false,
        }
    }
}

impl ClientSettings {
    /// 获取设置文件路径
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut path| {
            path.push("backgammon");
            path.push("settings.json");
            path
        })
    }

    /// 从默认位置加载设置
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            tracing::warn!("Config directory unavailable, using default settings");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// 从指定文件加载，文件不存在或无效时使用默认值
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::info!("No settings file at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => {
                    tracing::info!("Loaded settings: {:?}", path);
                    settings
                }
                Err(e) => {
                    tracing::warn!("Invalid settings file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Cannot read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// 保存到默认位置
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::settings_path().context("config directory unavailable")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("failed to write {:?}", path))?;

        tracing::info!("Settings saved: {:?}", path);
        Ok(())
    }

    /// 服务器地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
