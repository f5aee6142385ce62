//! 通知层 - 告警广播与渠道
//!
//! # 使用示例
//! ```ignore
//! use smart_bowl::notification::{AlertManager, NotificationChannel};
//!
//! let mut manager = AlertManager::new();
//! manager.register_channel(Arc::new(NotificationChannel::new("log", |msg| {
//!     println!("{msg}");
//!     Ok(())
//! })));
//! manager.on_new_alert(&Alert::new("Bowl is empty :("))?;
//! ```

pub mod alert_manager;
pub mod channel;
pub mod channels;

pub use alert_manager::AlertManager;
pub use channel::{NotificationChannel, Notify, NotifyFn};
pub use channels::{send_sms, sms_channel, DashboardChannel, SmsConfig};
