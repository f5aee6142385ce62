//! 回放录制的串口日志（无需模拟器）

use super::monitor::SerialMonitor;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// 打开串口日志，按采样间隔逐行回放；发出的命令只记录日志
pub fn open_replay(path: &Path, sample_rate_ms: u64, timestamp_field: &str) -> Result<SerialMonitor> {
    let file = File::open(path).with_context(|| format!("Failed to open replay log {}", path.display()))?;
    Ok(SerialMonitor::new(
        Box::new(BufReader::new(file)),
        Box::new(std::io::sink()),
        timestamp_field,
    )
    .with_sample_interval(Duration::from_millis(sample_rate_ms)))
}
