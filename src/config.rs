//! 应用配置
//!
//! 配置文件位于 `<config_dir>/smart-bowl/config.json`，不存在时使用默认值。
//! 命令行参数优先于配置文件。

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认桥接命令
pub const DEFAULT_BRIDGE_CMD: &str = "smart-bowl-bridge";
/// 默认 SMS 发送命令
pub const DEFAULT_SMS_CMD: &str = "osascript";

/// SMS 设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsSettings {
    /// 未设置时不启用 SMS 渠道
    pub phone_number: Option<String>,
    pub command: String,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self {
            phone_number: None,
            command: DEFAULT_SMS_CMD.to_string(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 模拟器项目 URL
    pub simulation_url: String,
    /// 打开模拟的超时（秒）
    pub open_simulation_timeout_secs: u64,
    /// 串口采样间隔（毫秒）
    pub sample_rate_ms: u64,
    /// 桥接命令
    pub bridge_cmd: String,
    pub sms: SmsSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            simulation_url: String::new(),
            open_simulation_timeout_secs: 60,
            sample_rate_ms: 500,
            bridge_cmd: DEFAULT_BRIDGE_CMD.to_string(),
            sms: SmsSettings::default(),
        }
    }
}

impl AppConfig {
    /// 默认配置文件路径
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("smart-bowl/config.json")
    }

    /// 从默认路径加载
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// 从指定路径加载，文件不存在时返回默认配置
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// 日志目录
    pub fn log_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("smart-bowl")
    }
}
