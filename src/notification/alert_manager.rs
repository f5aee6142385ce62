//! 告警管理器 - 把领域告警广播到所有渠道

use super::channel::Notify;
use crate::models::Alert;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// 告警管理器
///
/// 按注册顺序逐个通知渠道。某个渠道失败时立即返回错误，
/// 后续渠道不会收到这条告警。
#[derive(Default)]
pub struct AlertManager {
    channels: Vec<Arc<dyn Notify>>,
}

impl AlertManager {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// 用已有渠道列表创建
    pub fn with_channels(channels: Vec<Arc<dyn Notify>>) -> Self {
        Self { channels }
    }

    /// 注册渠道
    pub fn register_channel(&mut self, channel: Arc<dyn Notify>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// 处理新告警
    pub fn on_new_alert(&self, alert: &Alert) -> Result<()> {
        self.notify(&alert.message)
    }

    /// 依次发送到所有渠道
    pub fn notify(&self, message: &str) -> Result<()> {
        for channel in &self.channels {
            debug!(channel = channel.name(), "Dispatching alert");
            channel.notify(message)?;
        }
        Ok(())
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}
