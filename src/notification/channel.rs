//! 通知渠道 trait 定义

use anyhow::Result;

/// 通知渠道 trait
pub trait Notify: Send + Sync {
    /// 渠道名称（用于日志）
    fn name(&self) -> &str;

    /// 同步发送消息
    fn notify(&self, message: &str) -> Result<()>;
}

/// 单一投递函数
pub type NotifyFn = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// 把一个投递函数包装成渠道，消息原样转发
pub struct NotificationChannel {
    name: String,
    notify_fn: NotifyFn,
}

impl NotificationChannel {
    pub fn new<F>(name: impl Into<String>, notify_fn: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            notify_fn: Box::new(notify_fn),
        }
    }
}

impl Notify for NotificationChannel {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&self, message: &str) -> Result<()> {
        (self.notify_fn)(message)
    }
}

impl std::fmt::Debug for NotificationChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationChannel")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_channel_forwards_message_unchanged() {
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let channel = NotificationChannel::new("test", move |msg: &str| {
            sink.lock().unwrap().push(msg.to_string());
            Ok(())
        });

        channel.notify("Bowl is empty :(").unwrap();

        assert_eq!(channel.name(), "test");
        assert_eq!(*received.lock().unwrap(), vec!["Bowl is empty :(".to_string()]);
    }

    #[test]
    fn test_channel_propagates_error() {
        let channel = NotificationChannel::new("broken", |_: &str| anyhow::bail!("no modem"));
        let err = channel.notify("hi").unwrap_err();
        assert_eq!(err.to_string(), "no modem");
    }
}
