//! 具体渠道实现

pub mod dashboard;
pub mod sms;

pub use dashboard::DashboardChannel;
pub use sms::{send_sms, sms_channel, SmsConfig};
