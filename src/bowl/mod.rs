//! Bowl 服务 - 中介者与 GUI 能力接口

pub mod gui;
pub mod service;

pub use gui::{BowlGui, ProposeTargetCallback, RefillCallback};
pub use service::{AlertFn, Bowl, CommandSender, EventError, SendMessageFn, EMPTY_BOWL_MESSAGE};
