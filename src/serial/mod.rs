//! 串口监视器传输层 - 帧解码、去重、桥接进程与日志回放

pub mod bridge;
pub mod frame;
pub mod monitor;
pub mod replay;

pub use bridge::{BridgeConfig, BridgeProcess};
pub use frame::{decode_line, Message};
pub use monitor::{SerialMonitor, SmiInput, TimestampFilter};
pub use replay::open_replay;
