//! Smart Bowl CLI
//!
//! 连接智能宠物碗模拟器，在终端仪表盘中显示状态并转发告警

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use smart_bowl::cli::{ConfigArgs, ReplayArgs, RunArgs};
use smart_bowl::AppConfig;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "smart_bowl=info";
const LOG_FILE: &str = "smart-bowl.log";

#[derive(Parser)]
#[command(name = "smart-bowl")]
#[command(about = "Smart Bowl - 智能宠物碗模拟设备的终端伴侣")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 连接模拟器并打开仪表盘
    Run(RunArgs),
    /// 回放录制的串口日志
    Replay(ReplayArgs),
    /// 显示当前配置
    Config(ConfigArgs),
}

impl Commands {
    /// 仪表盘占用终端，日志需写入文件
    fn uses_dashboard(&self) -> bool {
        matches!(self, Commands::Run(_) | Commands::Replay(_))
    }
}

/// 初始化 tracing 日志系统
///
/// 通过 RUST_LOG 环境变量控制日志级别，默认为 smart_bowl=info
/// 例如: RUST_LOG=smart_bowl=debug smart-bowl replay samples.log
fn init_tracing(to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if to_file {
        let dir = AppConfig::log_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
        let path = dir.join(LOG_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        fmt()
            .with_writer(Mutex::new(file))
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(false)
            .init();
    } else {
        fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .init();
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.uses_dashboard())?;

    match cli.command {
        Commands::Run(args) => smart_bowl::cli::handle_run(args)?,
        Commands::Replay(args) => smart_bowl::cli::handle_replay(args)?,
        Commands::Config(args) => smart_bowl::cli::handle_config(args)?,
    }

    Ok(())
}
