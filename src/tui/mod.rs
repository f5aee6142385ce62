//! 终端仪表盘 - Bowl GUI 的实现

mod app;
mod event;
mod handle;
mod state;
mod ui;


pub use app::{handle_event, new_dashboard, init_terminal, restore_terminal, run, App, AppResult, InputMode, Tui, INVALID_WEIGHT_MESSAGE};
pub use event::{handle_key, poll_event, TuiEvent};
pub use handle::{GuiCallbacks, GuiCommand, TuiGui};
pub use state::{food_count, AlertItem, BowlState, FoodLayer, FOOD_DENSITY, WEIGHT_UNIT};
pub use ui::render;
