//! Config 命令 - 显示生效的配置

use super::run::load_config;
use crate::config::AppConfig;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Config 命令参数
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 处理 config 命令
pub fn handle_config(args: ConfigArgs) -> Result<()> {
    let path = args.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = load_config(args.config.as_ref())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", describe(&config, &path));
    }
    Ok(())
}

/// 人类可读的配置摘要
pub fn describe(config: &AppConfig, path: &std::path::Path) -> String {
    let url = if config.simulation_url.is_empty() {
        "(未设置)"
    } else {
        config.simulation_url.as_str()
    };
    let phone = config.sms.phone_number.as_deref().unwrap_or("(未设置，SMS 告警关闭)");

    let mut out = String::new();
    out.push_str(&format!("配置文件: {}{}\n", path.display(), if path.exists() { "" } else { " (不存在，使用默认值)" }));
    out.push_str(&format!("  simulation_url: {}\n", url));
    out.push_str(&format!("  open_simulation_timeout_secs: {}\n", config.open_simulation_timeout_secs));
    out.push_str(&format!("  sample_rate_ms: {}\n", config.sample_rate_ms));
    out.push_str(&format!("  bridge_cmd: {}\n", config.bridge_cmd));
    out.push_str(&format!("  sms.phone_number: {}\n", phone));
    out.push_str(&format!("  sms.command: {}\n", config.sms.command));
    out.push_str(&format!("日志目录: {}\n", AppConfig::log_dir().display()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_describe_defaults() {
        let text = describe(&AppConfig::default(), Path::new("/no/such/config.json"));
        assert!(text.contains("不存在，使用默认值"));
        assert!(text.contains("sample_rate_ms: 500"));
        assert!(text.contains("SMS 告警关闭"));
    }
}
