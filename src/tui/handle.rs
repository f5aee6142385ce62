//! 跨线程 GUI 句柄
//!
//! 串口线程只把修改排入队列，由 UI 线程在下一帧统一应用，
//! 仪表盘状态只在 UI 线程上被修改。

use crate::bowl::{BowlGui, ProposeTargetCallback, RefillCallback};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use tracing::trace;

/// 排队等待 UI 线程应用的修改
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    SetCapacity(f64),
    SetCurrentWeight(f64),
    SetTargetWeight(f64),
    SetRefillState(i64),
    Denial(String),
    Alert(String),
    TransportStatus(String),
}

/// 用户操作回调（未注册时为空操作）
#[derive(Default)]
pub struct GuiCallbacks {
    refill: Mutex<Option<RefillCallback>>,
    propose_target: Mutex<Option<ProposeTargetCallback>>,
}

impl GuiCallbacks {
    pub fn on_refill(&self) {
        if let Ok(guard) = self.refill.lock() {
            if let Some(callback) = guard.as_ref() {
                callback();
            }
        }
    }

    pub fn on_propose_target(&self, weight: i64) {
        if let Ok(guard) = self.propose_target.lock() {
            if let Some(callback) = guard.as_ref() {
                callback(weight);
            }
        }
    }
}

/// 终端仪表盘的 `BowlGui` 实现
#[derive(Clone)]
pub struct TuiGui {
    tx: Sender<GuiCommand>,
    callbacks: Arc<GuiCallbacks>,
}

impl TuiGui {
    pub fn new(tx: Sender<GuiCommand>, callbacks: Arc<GuiCallbacks>) -> Self {
        Self { tx, callbacks }
    }

    fn schedule(&self, command: GuiCommand) {
        if self.tx.send(command).is_err() {
            trace!("Dashboard closed, dropping update");
        }
    }

    /// 追加一条告警到告警面板
    pub fn push_alert(&self, message: &str) {
        self.schedule(GuiCommand::Alert(message.to_string()));
    }

    /// 更新状态栏中的传输状态
    pub fn set_transport_status(&self, status: impl Into<String>) {
        self.schedule(GuiCommand::TransportStatus(status.into()));
    }
}

impl BowlGui for TuiGui {
    fn set_capacity_value(&self, capacity: f64) {
        self.schedule(GuiCommand::SetCapacity(capacity));
    }

    fn set_current_weight(&self, weight: f64) {
        self.schedule(GuiCommand::SetCurrentWeight(weight));
    }

    fn set_target_weight(&self, weight: f64) {
        self.schedule(GuiCommand::SetTargetWeight(weight));
    }

    fn set_refill_state(&self, state: i64) {
        self.schedule(GuiCommand::SetRefillState(state));
    }

    fn set_refill_callback(&self, callback: RefillCallback) {
        if let Ok(mut guard) = self.callbacks.refill.lock() {
            *guard = Some(callback);
        }
    }

    fn set_propose_new_target_weight_callback(&self, callback: ProposeTargetCallback) {
        if let Ok(mut guard) = self.callbacks.propose_target.lock() {
            *guard = Some(callback);
        }
    }

    fn on_new_target_proposal_denial(&self, error_message: &str) {
        self.schedule(GuiCommand::Denial(error_message.to_string()));
    }
}
