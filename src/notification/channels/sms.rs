//! SMS 渠道（通过系统命令发送）
//!
//! 默认使用 macOS `osascript` 驱动 Messages 应用；也可配置任意
//! 接受 `<phone> <message>` 参数的命令。

use crate::notification::channel::NotificationChannel;
use anyhow::{anyhow, Result};
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

/// Messages.app 发送脚本，argv: phone, message
const OSASCRIPT_SEND_SMS: &str = r#"on run argv
    tell application "Messages"
        set targetService to 1st account whose service type = SMS
        set targetBuddy to participant (item 1 of argv) of targetService
        send (item 2 of argv) to targetBuddy
    end tell
end run"#;

/// SMS 渠道配置
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// 目标号码 (E.164)
    pub phone_number: String,
    /// 发送命令
    pub command: String,
}

/// 构造命令行参数
fn build_args<'a>(config: &'a SmsConfig, message: &'a str) -> Vec<&'a str> {
    let is_osascript = Path::new(&config.command)
        .file_name()
        .is_some_and(|name| name == "osascript");

    if is_osascript {
        vec!["-e", OSASCRIPT_SEND_SMS, config.phone_number.as_str(), message]
    } else {
        vec![config.phone_number.as_str(), message]
    }
}

/// 发送一条短信
pub fn send_sms(config: &SmsConfig, message: &str) -> Result<()> {
    let output = Command::new(&config.command)
        .args(build_args(config, message))
        .output()?;

    if output.status.success() {
        info!(
            channel = "sms",
            target = %config.phone_number,
            "SMS sent successfully"
        );
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(channel = "sms", error = %stderr, "Failed to send SMS");
        Err(anyhow!("sms command failed: {}", stderr.trim()))
    }
}

/// SMS 渠道：把 `send_sms` 绑定到号码后包装成通知渠道
pub fn sms_channel(config: SmsConfig) -> NotificationChannel {
    NotificationChannel::new("sms", move |message: &str| send_sms(&config, message))
}
