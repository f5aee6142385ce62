//! 事件处理模块

use super::app::{App, InputMode};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// TUI 事件
#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    Resize(u16, u16),
}

/// 轮询事件
pub fn poll_event(timeout: Duration) -> Result<Option<TuiEvent>> {
    if event::poll(timeout)? {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(Some(TuiEvent::Key(key))),
            Event::Resize(w, h) => return Ok(Some(TuiEvent::Resize(w, h))),
            _ => {}
        }
    }
    Ok(None)
}

/// 处理按键事件
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // 错误弹窗优先
    if app.state.denial.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_denial();
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(app, key),
        InputMode::EditingTarget => handle_input_key(app, key),
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('r') => app.request_refill(),
        KeyCode::Char('t') => app.begin_target_input(),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.submit_target_input(),
        KeyCode::Esc => app.cancel_target_input(),
        KeyCode::Backspace => {
            app.target_input.pop();
        }
        KeyCode::Char(c) => app.target_input.push(c),
        _ => {}
    }
}
