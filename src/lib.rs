//! Smart Bowl - 智能宠物碗模拟设备的桌面伴侣

pub mod bowl;
pub mod cli;
pub mod config;
pub mod models;
pub mod notification;
pub mod serial;
pub mod tui;

pub use bowl::{Bowl, BowlGui, CommandSender, EventError, EMPTY_BOWL_MESSAGE};
pub use config::AppConfig;
pub use models::{Alert, InEventType, IncomingEvent, OutCommand, OutEvent, RefillState};
pub use notification::{AlertManager, NotificationChannel, Notify};
pub use serial::{SerialMonitor, SmiInput};
