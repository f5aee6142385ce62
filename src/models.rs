//! 设备消息模型 - 传感器事件、输出命令、告警

use serde::{Deserialize, Serialize};
use std::fmt;

/// 补料状态（仅由 GUI 持有，镜像设备状态）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RefillState {
    #[default]
    Off,
    On,
}

impl RefillState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefillState::Off => "OFF",
            RefillState::On => "ON",
        }
    }
}

impl TryFrom<i64> for RefillState {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RefillState::Off),
            1 => Ok(RefillState::On),
            other => Err(other),
        }
    }
}

impl fmt::Display for RefillState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 设备上报的事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InEventType {
    BowlCapacity,
    BowlWeight,
    TargetWeightUpdate,
    RefillStateUpdate,
    EmptyBowlAlert,
    GeneralErrorAlert,
    /// 未知类型，分发时忽略
    #[serde(other)]
    Unknown,
}

/// 一条传感器采样，多余字段视为格式错误
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncomingEvent {
    pub time_ms: i64,
    #[serde(rename = "type")]
    pub event_type: InEventType,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub error: String,
}

impl IncomingEvent {
    /// 串口监视器用于去重的时间戳字段
    pub const TIME_FIELD: &'static str = "time_ms";

    /// 从解码后的消息构造事件
    pub fn from_message(message: &serde_json::Map<String, serde_json::Value>) -> serde_json::Result<Self> {
        serde_json::from_value(serde_json::Value::Object(message.clone()))
    }
}

/// 发往设备的命令
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutCommand {
    Refill,
    NewTargetWeight,
}

impl OutCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutCommand::Refill => "REFILL",
            OutCommand::NewTargetWeight => "NEW_TARGET_WEIGHT",
        }
    }
}

impl fmt::Display for OutCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 输出事件，`Display` 即线上格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutEvent {
    pub command: OutCommand,
    pub value: i64,
}

impl OutEvent {
    pub fn refill() -> Self {
        Self {
            command: OutCommand::Refill,
            value: 0,
        }
    }

    pub fn new_target_weight(value: i64) -> Self {
        Self {
            command: OutCommand::NewTargetWeight,
            value,
        }
    }
}

impl fmt::Display for OutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<value={} command={}>", self.value, self.command)
    }
}

/// 领域告警
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub message: String,
}

impl Alert {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
