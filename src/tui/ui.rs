//! TUI 渲染模块

use super::app::{App, InputMode};
use super::state::{BOWL_HEIGHT, BOWL_WIDTH, WEIGHT_UNIT};
use crate::models::RefillState;
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Points},
        Block, Borders, Clear, List, ListItem, Paragraph, Wrap,
    },
};

/// 食物颜色 (#8B4513)
const FOOD_COLOR: Color = Color::Rgb(0x8B, 0x45, 0x13);
/// 碗沿渐变圈数
const BOWL_RINGS: usize = 10;
/// 每圈采样点数
const RING_SAMPLES: usize = 180;
/// 告警面板高度
const ALERT_PANEL_HEIGHT: u16 = 6;

/// 渲染主界面
pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // 垂直分割: 状态栏 | 读数 | 碗 | 告警 | 底部栏
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(7),
            Constraint::Min(10),
            Constraint::Length(ALERT_PANEL_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    let status = format!(" Smart Bowl │ Transport: {}", app.state.transport_status);
    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(status_bar, vertical[0]);

    render_readings(app, frame, vertical[1]);
    render_bowl(app, frame, vertical[2]);
    render_alerts(app, frame, vertical[3]);
    render_bottom_bar(app, frame, vertical[4]);

    if let Some(ref message) = app.state.denial {
        render_denial(message, frame, area);
    }
}

/// 渲染读数
fn render_readings(app: &App, frame: &mut Frame, area: Rect) {
    let state = &app.state;
    let refill_color = match state.refill_state {
        RefillState::Off => Color::Blue,
        RefillState::On => Color::Green,
    };

    let mut lines = vec![
        Line::from(vec![
            Span::raw("Refill "),
            Span::styled("●", Style::default().fg(refill_color)),
        ]),
        Line::from(format!("Capacity: {} {}", state.capacity, WEIGHT_UNIT)),
        Line::from(format!("Target Weight: {} {}", state.target_weight, WEIGHT_UNIT)),
        Line::from(format!("Current Weight: {} {}", state.current_weight, WEIGHT_UNIT)),
    ];
    if state.is_empty() {
        lines.push(Line::styled(
            "EMPTY!!!",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let readings = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Bowl "));
    frame.render_widget(readings, area);
}

/// 碗沿各圈的颜色和采样点（由外向内变暗）
fn bowl_rings() -> Vec<(Color, Vec<(f64, f64)>)> {
    (0..BOWL_RINGS)
        .map(|i| {
            let shade = (230 - i * 10) as u8;
            let rx = BOWL_WIDTH / 2.0 + i as f64;
            let ry = BOWL_HEIGHT / 2.0 + i as f64;
            let points = (0..RING_SAMPLES)
                .map(|k| {
                    let theta = k as f64 / RING_SAMPLES as f64 * std::f64::consts::TAU;
                    (rx * theta.cos(), ry * theta.sin())
                })
                .collect();
            (Color::Rgb(shade, shade, shade), points)
        })
        .collect()
}

/// 渲染碗和食物
fn render_bowl(app: &App, frame: &mut Frame, area: Rect) {
    let rings = bowl_rings();
    let pellets = app.state.food.pellets();
    let margin = BOWL_RINGS as f64 + 10.0;

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(" Food "))
        .marker(Marker::Braille)
        .x_bounds([-(BOWL_WIDTH / 2.0 + margin), BOWL_WIDTH / 2.0 + margin])
        .y_bounds([-(BOWL_HEIGHT / 2.0 + margin), BOWL_HEIGHT / 2.0 + margin])
        .paint(|ctx| {
            for (color, points) in &rings {
                ctx.draw(&Points {
                    coords: points,
                    color: *color,
                });
            }
            ctx.layer();
            ctx.draw(&Points {
                coords: pellets,
                color: FOOD_COLOR,
            });
        });
    frame.render_widget(canvas, area);
}

/// 渲染告警面板（最新在上）
fn render_alerts(app: &App, frame: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let items: Vec<ListItem> = app
        .state
        .alerts
        .iter()
        .rev()
        .take(visible)
        .map(|a| {
            ListItem::new(format!("[{}] {}", a.timestamp.format("%H:%M:%S"), a.message))
                .style(Style::default().fg(Color::Red))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Alerts ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(list, area);
}

/// 底部栏：输入目标重量时显示输入框，否则显示快捷键
fn render_bottom_bar(app: &App, frame: &mut Frame, area: Rect) {
    let bar = match app.input_mode {
        InputMode::EditingTarget => Paragraph::new(format!(
            " Target weight ({}): {}│  [Enter] submit  [Esc] cancel ",
            WEIGHT_UNIT, app.target_input
        ))
        .style(Style::default().bg(Color::Yellow).fg(Color::Black)),
        InputMode::Normal => Paragraph::new(" [r] Refill  [t] Set target weight  [q] quit ")
            .style(Style::default().bg(Color::DarkGray)),
    };
    frame.render_widget(bar, area);
}

/// 错误弹窗
fn render_denial(message: &str, frame: &mut Frame, area: Rect) {
    let popup = centered_rect(50, 5, area);
    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::styled("[Enter] OK", Style::default().fg(Color::DarkGray)),
    ];
    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Error ")
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(Clear, popup);
    frame.render_widget(dialog, popup);
}

/// 在 area 中居中的固定大小矩形
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
