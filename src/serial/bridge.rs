//! 模拟器桥接进程
//!
//! 桥接程序负责驱动浏览器中的电路模拟器：把串口监视器输出逐行写到
//! stdout，并把 stdin 收到的每一行输入到模拟器。

use super::monitor::SerialMonitor;
use anyhow::{anyhow, Context, Result};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

/// 桥接进程配置
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// 桥接命令
    pub command: String,
    /// 模拟项目 URL
    pub simulation_url: String,
    /// 打开模拟的超时（秒）
    pub open_timeout_secs: u64,
    /// 采样间隔（毫秒）
    pub sample_rate_ms: u64,
}

impl BridgeConfig {
    fn args(&self) -> Vec<String> {
        vec![
            "--url".to_string(),
            self.simulation_url.clone(),
            "--sample-rate-ms".to_string(),
            self.sample_rate_ms.to_string(),
            "--open-timeout-secs".to_string(),
            self.open_timeout_secs.to_string(),
        ]
    }
}

/// 运行中的桥接进程，drop 时终止
pub struct BridgeProcess {
    child: Child,
}

impl BridgeProcess {
    /// 启动桥接进程并返回接在其 stdio 上的串口监视器
    pub fn spawn(config: &BridgeConfig, timestamp_field: &str) -> Result<(Self, SerialMonitor)> {
        let program = resolve_command(&config.command)?;
        info!(program = %program.display(), url = %config.simulation_url, "Starting simulator bridge");

        let mut child = Command::new(&program)
            .args(config.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to start bridge {}", program.display()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("bridge stdout not captured"))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("bridge stdin not captured"))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("bridge stderr not captured"))?;
        thread::Builder::new()
            .name("bridge-stderr".to_string())
            .spawn(move || log_stderr(BufReader::new(stderr)))
            .context("Failed to spawn bridge stderr thread")?;

        let monitor = SerialMonitor::new(Box::new(BufReader::new(stdout)), Box::new(stdin), timestamp_field);
        Ok((Self { child }, monitor))
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// 终止桥接进程
    pub fn kill(&mut self) -> Result<()> {
        if self.child.try_wait()?.is_none() {
            self.child.kill()?;
            let _ = self.child.wait();
        }
        Ok(())
    }
}

impl Drop for BridgeProcess {
    fn drop(&mut self) {
        if let Err(e) = self.kill() {
            warn!(error = %e, "Failed to stop simulator bridge");
        }
    }
}

/// 把桥接进程的诊断输出逐行写入日志，返回转发的行数
fn log_stderr<R: BufRead>(reader: R) -> usize {
    let mut forwarded = 0;
    for line in reader.lines() {
        let Ok(line) = line else { break };
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        warn!(line = %line, "Bridge stderr");
        forwarded += 1;
    }
    debug!(lines = forwarded, "Bridge stderr closed");
    forwarded
}

/// 查找桥接命令（PATH 或显式路径）
fn resolve_command(command: &str) -> Result<PathBuf> {
    let path = PathBuf::from(command);
    if path.components().count() > 1 {
        if path.exists() {
            return Ok(path);
        }
        return Err(anyhow!("bridge command not found: {}", command));
    }
    which::which(command).map_err(|_| {
        anyhow!(
            "{} 命令未找到\n请安装模拟器桥接程序，或使用 --bridge-cmd 指定路径",
            command
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_args() {
        let config = BridgeConfig {
            command: "bridge".to_string(),
            simulation_url: "https://sim.example/things/abc".to_string(),
            open_timeout_secs: 60,
            sample_rate_ms: 500,
        };
        assert_eq!(
            config.args(),
            vec![
                "--url",
                "https://sim.example/things/abc",
                "--sample-rate-ms",
                "500",
                "--open-timeout-secs",
                "60"
            ]
        );
    }

    #[test]
    fn test_log_stderr_forwards_non_empty_lines() {
        let stderr = "error: simulation did not open within 60s\n\n  retrying\n";
        assert_eq!(log_stderr(std::io::Cursor::new(stderr)), 2);
    }

    #[test]
    fn test_resolve_missing_command() {
        assert!(resolve_command("/definitely/not/here/bridge").is_err());
        assert!(resolve_command("smart-bowl-no-such-bridge-xyz").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_and_kill_bridge() {
        let config = BridgeConfig {
            command: "cat".to_string(),
            simulation_url: String::new(),
            open_timeout_secs: 1,
            sample_rate_ms: 1,
        };
        let (mut bridge, _monitor) = BridgeProcess::spawn(&config, "time_ms").unwrap();
        assert!(bridge.id() > 0);
        bridge.kill().unwrap();
    }
}
