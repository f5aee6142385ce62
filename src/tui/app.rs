//! TUI 应用状态和主循环

use super::event::{handle_key, poll_event, TuiEvent};
use super::handle::{GuiCallbacks, GuiCommand, TuiGui};
use super::state::BowlState;
use super::ui::render;
use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub type AppResult<T> = Result<T>;

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// 用户非法输入时的提示
pub const INVALID_WEIGHT_MESSAGE: &str = "Invalid weight value";

/// 输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    EditingTarget,
}

/// TUI 应用状态
pub struct App {
    pub state: BowlState,
    pub input_mode: InputMode,
    pub target_input: String,
    pub should_quit: bool,
    pub tick: usize,
    commands: Receiver<GuiCommand>,
    callbacks: Arc<GuiCallbacks>,
}

/// 创建仪表盘及其跨线程句柄
pub fn new_dashboard() -> (TuiGui, App) {
    let (tx, rx) = mpsc::channel();
    let callbacks = Arc::new(GuiCallbacks::default());
    let gui = TuiGui::new(tx, callbacks.clone());
    let app = App {
        state: BowlState::default(),
        input_mode: InputMode::Normal,
        target_input: String::new(),
        should_quit: false,
        tick: 0,
        commands: rx,
        callbacks,
    };
    (gui, app)
}

impl App {
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// 应用所有排队的修改
    pub fn apply_pending(&mut self) {
        let mut rng = rand::rng();
        while let Ok(command) = self.commands.try_recv() {
            match command {
                GuiCommand::SetCapacity(v) => self.state.set_capacity_value(v),
                GuiCommand::SetCurrentWeight(v) => self.state.set_current_weight(v, &mut rng),
                GuiCommand::SetTargetWeight(v) => self.state.set_target_weight(v),
                GuiCommand::SetRefillState(v) => self.state.set_refill_state(v),
                GuiCommand::Denial(msg) => self.state.denial = Some(msg),
                GuiCommand::Alert(msg) => self.state.push_alert(msg),
                GuiCommand::TransportStatus(status) => self.state.transport_status = status,
            }
        }
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn request_refill(&self) {
        self.callbacks.on_refill();
    }

    pub fn begin_target_input(&mut self) {
        self.input_mode = InputMode::EditingTarget;
        self.target_input.clear();
    }

    pub fn cancel_target_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.target_input.clear();
    }

    /// 提交目标重量；非整数时弹出错误
    pub fn submit_target_input(&mut self) {
        let input = std::mem::take(&mut self.target_input);
        self.input_mode = InputMode::Normal;
        match input.trim().parse::<i64>() {
            Ok(weight) => self.callbacks.on_propose_target(weight),
            Err(_) => self.state.denial = Some(INVALID_WEIGHT_MESSAGE.to_string()),
        }
    }

    pub fn dismiss_denial(&mut self) {
        self.state.denial = None;
    }
}

/// 进入 raw mode 和备用屏幕
pub fn init_terminal() -> Result<Tui> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// 恢复终端
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// 主循环，直到用户退出
pub fn run(terminal: &mut Tui, app: &mut App, tick_rate: Duration) -> AppResult<()> {
    while !app.should_quit {
        app.apply_pending();
        terminal.draw(|frame| render(app, frame))?;

        if let Some(event) = poll_event(tick_rate)? {
            handle_event(terminal, app, event)?;
        }
        app.on_tick();
    }
    Ok(())
}

/// 处理一次终端事件：按键交给 `handle_key`，窗口变化时立即调整画布
pub fn handle_event<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, event: TuiEvent) -> Result<()> {
    match event {
        TuiEvent::Key(key) => handle_key(app, key),
        TuiEvent::Resize(width, height) => {
            debug!(width, height, "Terminal resized");
            terminal.autoresize().context("Failed to resize terminal")?;
        }
    }
    Ok(())
}
