//! Bowl 中介者 - 传感器事件 ↔ GUI 状态 ↔ 设备命令

use super::gui::BowlGui;
use crate::models::{Alert, InEventType, IncomingEvent, OutEvent};
use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// 空碗告警文案
pub const EMPTY_BOWL_MESSAGE: &str = "Bowl is empty :(";

/// 告警出口
pub type AlertFn = Box<dyn Fn(Alert) + Send + Sync>;

/// 向设备发送一行命令
pub type SendMessageFn = Arc<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// 事件处理错误
#[derive(Debug, Error)]
pub enum EventError {
    #[error("malformed event payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// 设备命令发送器（GUI 回调与 Bowl 共用）
#[derive(Clone)]
pub struct CommandSender {
    send_message_fn: SendMessageFn,
}

impl CommandSender {
    pub fn new(send_message_fn: SendMessageFn) -> Self {
        Self { send_message_fn }
    }

    pub fn request_refill(&self) -> Result<()> {
        self.send(OutEvent::refill())
    }

    pub fn propose_new_target_weight(&self, value: i64) -> Result<()> {
        self.send(OutEvent::new_target_weight(value))
    }

    fn send(&self, event: OutEvent) -> Result<()> {
        let message = event.to_string();
        debug!(message = %message, "Sending command to bowl");
        (self.send_message_fn)(&message)
    }
}

/// Bowl 中介者
pub struct Bowl<G: BowlGui> {
    gui: Arc<G>,
    alert_fn: AlertFn,
    sender: CommandSender,
}

impl<G: BowlGui> Bowl<G> {
    /// 创建中介者并注册 GUI 回调
    pub fn new(gui: Arc<G>, alert_fn: AlertFn, send_message_fn: SendMessageFn) -> Self {
        let sender = CommandSender::new(send_message_fn);

        let refill_sender = sender.clone();
        gui.set_refill_callback(Box::new(move || {
            if let Err(e) = refill_sender.request_refill() {
                warn!(error = %e, "Failed to send refill request");
            }
        }));

        let target_sender = sender.clone();
        gui.set_propose_new_target_weight_callback(Box::new(move |value| {
            if let Err(e) = target_sender.propose_new_target_weight(value) {
                warn!(error = %e, value, "Failed to send target weight proposal");
            }
        }));

        Self {
            gui,
            alert_fn,
            sender,
        }
    }

    pub fn request_refill(&self) -> Result<()> {
        self.sender.request_refill()
    }

    pub fn propose_new_target_weight(&self, value: i64) -> Result<()> {
        self.sender.propose_new_target_weight(value)
    }

    /// 处理一条解码后的串口消息
    pub fn on_new_event(
        &self,
        message: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), EventError> {
        let event = IncomingEvent::from_message(message)?;
        self.dispatch(event);
        Ok(())
    }

    /// 分发已解析的事件
    pub fn dispatch(&self, event: IncomingEvent) {
        match event.event_type {
            InEventType::BowlCapacity => self.gui.set_capacity_value(event.value),
            InEventType::BowlWeight => self.gui.set_current_weight(event.value),
            InEventType::TargetWeightUpdate => {
                if !event.error.is_empty() {
                    self.gui.on_new_target_proposal_denial(&event.error);
                } else {
                    self.gui.set_target_weight(event.value);
                }
            }
            InEventType::RefillStateUpdate => self.gui.set_refill_state(event.value as i64),
            InEventType::EmptyBowlAlert => (self.alert_fn)(Alert::new(EMPTY_BOWL_MESSAGE)),
            InEventType::GeneralErrorAlert => error!(time_ms = event.time_ms, "{}", event.error),
            InEventType::Unknown => debug!(time_ms = event.time_ms, "Ignoring unknown event type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bowl::gui::{ProposeTargetCallback, RefillCallback};
    use std::sync::Mutex;

    #[derive(Default)]
    struct NullGui {
        refill: Mutex<Option<RefillCallback>>,
    }

    impl BowlGui for NullGui {
        fn set_capacity_value(&self, _capacity: f64) {}
        fn set_current_weight(&self, _weight: f64) {}
        fn set_target_weight(&self, _weight: f64) {}
        fn set_refill_state(&self, _state: i64) {}
        fn set_refill_callback(&self, callback: RefillCallback) {
            *self.refill.lock().unwrap() = Some(callback);
        }
        fn set_propose_new_target_weight_callback(&self, _callback: ProposeTargetCallback) {}
        fn on_new_target_proposal_denial(&self, _error_message: &str) {}
    }

    #[test]
    fn test_refill_callback_failure_is_swallowed() {
        let gui = Arc::new(NullGui::default());
        let _bowl = Bowl::new(
            gui.clone(),
            Box::new(|_| {}),
            Arc::new(|_: &str| anyhow::bail!("transport closed")),
        );

        // 回调内部只记录日志，不 panic
        let callback = gui.refill.lock().unwrap().take().unwrap();
        callback();
    }

    #[test]
    fn test_send_error_returned_from_request() {
        let bowl = Bowl::new(
            Arc::new(NullGui::default()),
            Box::new(|_| {}),
            Arc::new(|_: &str| anyhow::bail!("transport closed")),
        );
        assert!(bowl.request_refill().is_err());
    }
}
