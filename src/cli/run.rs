//! Run / Replay 命令 - 组装中介者、告警、传输层并运行仪表盘
//!
//! 串口读取在后台线程进行，仪表盘的阻塞主循环占用调用线程。

use crate::bowl::Bowl;
use crate::config::AppConfig;
use crate::models::IncomingEvent;
use crate::notification::{sms_channel, AlertManager, DashboardChannel, SmsConfig};
use crate::serial::{open_replay, BridgeConfig, BridgeProcess, SerialMonitor};
use crate::tui::{self, TuiGui};
use anyhow::{anyhow, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// 仪表盘刷新间隔
const DASHBOARD_TICK: Duration = Duration::from_millis(100);

/// Run 命令参数
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// 模拟器项目 URL
    #[arg(long)]
    pub url: Option<String>,

    /// 模拟器桥接命令
    #[arg(long)]
    pub bridge_cmd: Option<String>,

    /// 串口采样间隔（毫秒）
    #[arg(long)]
    pub sample_rate_ms: Option<u64>,

    /// 空碗 SMS 告警号码
    #[arg(long)]
    pub phone: Option<String>,

    /// 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunArgs {
    /// 命令行参数覆盖配置文件
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(ref url) = self.url {
            config.simulation_url = url.clone();
        }
        if let Some(ref cmd) = self.bridge_cmd {
            config.bridge_cmd = cmd.clone();
        }
        if let Some(rate) = self.sample_rate_ms {
            config.sample_rate_ms = rate;
        }
        if let Some(ref phone) = self.phone {
            config.sms.phone_number = Some(phone.clone());
        }
    }
}

/// Replay 命令参数
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// 录制的串口日志
    pub file: PathBuf,

    /// 回放间隔（毫秒）
    #[arg(long)]
    pub sample_rate_ms: Option<u64>,

    /// 空碗 SMS 告警号码
    #[arg(long)]
    pub phone: Option<String>,

    /// 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ReplayArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(rate) = self.sample_rate_ms {
            config.sample_rate_ms = rate;
        }
        if let Some(ref phone) = self.phone {
            config.sms.phone_number = Some(phone.clone());
        }
    }
}

/// 加载配置（显式路径或默认路径）
pub fn load_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load_from(p),
        None => AppConfig::load(),
    }
}

/// 处理 run 命令：通过桥接进程连接模拟器
pub fn handle_run(args: RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    args.apply(&mut config);

    if config.simulation_url.is_empty() {
        return Err(anyhow!(
            "simulation_url 未配置\n请使用 --url 或在 {} 中设置",
            AppConfig::default_path().display()
        ));
    }

    let bridge_config = BridgeConfig {
        command: config.bridge_cmd.clone(),
        simulation_url: config.simulation_url.clone(),
        open_timeout_secs: config.open_simulation_timeout_secs,
        sample_rate_ms: config.sample_rate_ms,
    };
    let (bridge, monitor) = BridgeProcess::spawn(&bridge_config, IncomingEvent::TIME_FIELD)?;
    info!(pid = bridge.id(), "Simulator bridge started");

    // bridge 在仪表盘退出后 drop，随之终止
    let result = run_dashboard(monitor, &config, "simulator");
    drop(bridge);
    result
}

/// 处理 replay 命令：回放录制的串口日志
pub fn handle_replay(args: ReplayArgs) -> Result<()> {
    let mut config = load_config(args.config.as_ref())?;
    args.apply(&mut config);

    let monitor = open_replay(&args.file, config.sample_rate_ms, IncomingEvent::TIME_FIELD)?;
    run_dashboard(monitor, &config, "replay")
}

/// 组装告警渠道：仪表盘在前，SMS 在后
pub fn build_alert_manager(config: &AppConfig, gui: &TuiGui) -> AlertManager {
    let mut manager = AlertManager::new();
    manager.register_channel(Arc::new(DashboardChannel::new(gui.clone())));

    match config.sms.phone_number {
        Some(ref phone) => {
            manager.register_channel(Arc::new(sms_channel(SmsConfig {
                phone_number: phone.clone(),
                command: config.sms.command.clone(),
            })));
        }
        None => info!("No SMS phone number configured, SMS alerts disabled"),
    }

    manager
}

/// 启动串口线程并运行仪表盘（阻塞直到用户退出）
fn run_dashboard(monitor: SerialMonitor, config: &AppConfig, source: &str) -> Result<()> {
    let (gui, mut app) = tui::new_dashboard();
    let gui = Arc::new(gui);

    let alert_manager = build_alert_manager(config, &gui);
    info!(channels = ?alert_manager.channel_names(), "Alert manager ready");

    let input = monitor.input();
    let bowl = Bowl::new(
        gui.clone(),
        Box::new(move |alert| {
            if let Err(e) = alert_manager.on_new_alert(&alert) {
                error!(error = %e, "Failed to deliver alert");
            }
        }),
        Arc::new(move |message: &str| input.send_smi_input(message)),
    );

    gui.set_transport_status(format!("{} connected", source));
    let status_gui = gui.clone();
    let source_name = source.to_string();
    monitor.spawn(
        move |message| bowl.on_new_event(message).map_err(anyhow::Error::from),
        move |result| match result {
            Ok(()) => status_gui.set_transport_status(format!("{} stream ended", source_name)),
            Err(e) => {
                error!(error = %e, "Serial monitor stopped");
                status_gui.set_transport_status(format!("{} stopped: {}", source_name, e));
            }
        },
    )?;

    let mut terminal = tui::init_terminal()?;
    let result = tui::run(&mut terminal, &mut app, DASHBOARD_TICK);
    tui::restore_terminal(&mut terminal)?;
    result
}
