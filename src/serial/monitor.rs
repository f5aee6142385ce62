//! 串口监视器 - 后台读取采样，串行写入设备命令

use super::frame::{self, Message};
use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace};

/// 设备输入（可跨线程克隆）
#[derive(Clone)]
pub struct SmiInput {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SmiInput {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// 写入一行命令
    pub fn send_smi_input(&self, message: &str) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("serial input writer poisoned"))?;
        writeln!(writer, "{}", message).context("Failed to write serial input")?;
        writer.flush().context("Failed to flush serial input")?;
        info!(message = %message, "Serial input sent");
        Ok(())
    }
}

/// 丢弃重复抓取的采样
///
/// 模拟器的串口监视器会被反复抓取，旧行会再次出现。设备在同一时刻
/// 可能上报多条不同事件，因此时间戳相同但内容不同的采样照常转发：
/// - 时间戳小于高水位：旧行，丢弃
/// - 时间戳等于高水位：内容已见过则丢弃
/// - 时间戳大于高水位：转发并开始新的一批
#[derive(Debug, Clone)]
pub struct TimestampFilter {
    field: String,
    last: Option<i64>,
    /// 高水位时刻已转发的消息
    seen_at_last: HashSet<String>,
}

impl TimestampFilter {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            last: None,
            seen_at_last: HashSet::new(),
        }
    }

    /// 没有时间戳的消息照常放行，交给下游报错
    pub fn accept(&mut self, message: &Message) -> bool {
        let Some(ts) = frame::timestamp(message, &self.field) else {
            return true;
        };
        // Map 按键排序，序列化结果可作为内容键
        let key = Value::Object(message.clone()).to_string();

        match self.last {
            Some(last) if ts < last => false,
            Some(last) if ts == last => self.seen_at_last.insert(key),
            _ => {
                self.last = Some(ts);
                self.seen_at_last.clear();
                self.seen_at_last.insert(key);
                true
            }
        }
    }
}

/// 串口监视器
pub struct SerialMonitor {
    reader: Box<dyn BufRead + Send>,
    input: SmiInput,
    filter: TimestampFilter,
    sample_interval: Option<Duration>,
}

impl SerialMonitor {
    pub fn new(
        reader: Box<dyn BufRead + Send>,
        writer: Box<dyn Write + Send>,
        timestamp_field: &str,
    ) -> Self {
        Self {
            reader,
            input: SmiInput::new(writer),
            filter: TimestampFilter::new(timestamp_field),
            sample_interval: None,
        }
    }

    /// 每读取一行前等待的间隔（回放时使用）
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = Some(interval);
        self
    }

    /// 获取设备输入句柄
    pub fn input(&self) -> SmiInput {
        self.input.clone()
    }

    /// 在后台线程读取，结束时（EOF 或出错）调用 on_exit
    pub fn spawn<F, E>(self, handler: F, on_exit: E) -> Result<JoinHandle<Result<()>>>
    where
        F: FnMut(&Message) -> Result<()> + Send + 'static,
        E: FnOnce(&Result<()>) + Send + 'static,
    {
        thread::Builder::new()
            .name("serial-monitor".to_string())
            .spawn(move || {
                let result = self.run(handler);
                on_exit(&result);
                result
            })
            .context("Failed to spawn serial monitor thread")
    }

    /// 阻塞读取直到 EOF；handler 出错时停止并返回该错误
    pub fn run<F>(mut self, mut handler: F) -> Result<()>
    where
        F: FnMut(&Message) -> Result<()>,
    {
        let mut line = String::new();
        loop {
            if let Some(interval) = self.sample_interval {
                thread::sleep(interval);
            }

            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .context("Failed to read serial monitor")?;
            if read == 0 {
                info!("Serial monitor reached end of stream");
                return Ok(());
            }

            let Some(message) = frame::decode_line(&line) else {
                debug!(line = %line.trim_end(), "Skipping non-frame serial output");
                continue;
            };

            if !self.filter.accept(&message) {
                trace!("Dropping already seen sample");
                continue;
            }

            handler(&message)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn monitor(input: &str, out: SharedBuf) -> SerialMonitor {
        SerialMonitor::new(
            Box::new(Cursor::new(input.to_string().into_bytes())),
            Box::new(out),
            "time_ms",
        )
    }

    #[test]
    fn test_timestamp_filter_drops_replayed_rows() {
        let mut filter = TimestampFilter::new("time_ms");
        let m = |t: i64| json!({"time_ms": t}).as_object().cloned().unwrap();

        assert!(filter.accept(&m(10)));
        assert!(!filter.accept(&m(10)));
        assert!(!filter.accept(&m(5)));
        assert!(filter.accept(&m(11)));
        assert!(filter.accept(&json!({"type": "X"}).as_object().cloned().unwrap()));
    }

    #[test]
    fn test_timestamp_filter_keeps_distinct_events_in_same_tick() {
        let mut filter = TimestampFilter::new("time_ms");
        let weight = json!({"time_ms": 2500, "type": "BOWL_WEIGHT", "value": 0})
            .as_object()
            .cloned()
            .unwrap();
        let empty = json!({"time_ms": 2500, "type": "EMPTY_BOWL_ALERT", "value": 0})
            .as_object()
            .cloned()
            .unwrap();

        assert!(filter.accept(&weight));
        assert!(filter.accept(&empty));
        // 重新抓取时两行都已见过
        assert!(!filter.accept(&weight));
        assert!(!filter.accept(&empty));
    }

    #[test]
    fn test_run_forwards_new_samples_in_order() {
        let input = "booting...\n\
                     <time_ms=1 type=BOWL_CAPACITY value=500>\n\
                     <time_ms=1 type=BOWL_CAPACITY value=500>\n\
                     <time_ms=2 type=BOWL_WEIGHT value=20>\n\
                     <time_ms=2 type=EMPTY_BOWL_ALERT value=0>\n\
                     <time_ms=1 type=BOWL_CAPACITY value=500>\n";
        let mut seen = Vec::new();
        monitor(input, SharedBuf::default())
            .run(|msg| {
                seen.push(msg.get("type").cloned().unwrap());
                Ok(())
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![json!("BOWL_CAPACITY"), json!("BOWL_WEIGHT"), json!("EMPTY_BOWL_ALERT")]
        );
    }

    #[test]
    fn test_run_stops_on_handler_error() {
        let input = "<time_ms=1 type=A>\n<time_ms=2 type=B>\n";
        let mut calls = 0;
        let err = monitor(input, SharedBuf::default())
            .run(|_| {
                calls += 1;
                anyhow::bail!("bad payload")
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "bad payload");
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_input_writes_one_line_per_command() {
        let out = SharedBuf::default();
        let monitor = monitor("", out.clone());
        let input = monitor.input();

        input.send_smi_input("<value=0 command=REFILL>").unwrap();
        input.send_smi_input("<value=42 command=NEW_TARGET_WEIGHT>").unwrap();

        let written = String::from_utf8(out.0.lock().unwrap().clone()).unwrap();
        assert_eq!(
            written,
            "<value=0 command=REFILL>\n<value=42 command=NEW_TARGET_WEIGHT>\n"
        );
    }

    #[test]
    fn test_spawn_reports_exit() {
        let exited = Arc::new(Mutex::new(None));
        let flag = exited.clone();
        let handle = monitor("<time_ms=1 type=BOWL_WEIGHT value=3>\n", SharedBuf::default())
            .spawn(|_| anyhow::bail!("boom"), move |result| {
                *flag.lock().unwrap() = Some(result.is_ok());
            })
            .unwrap();

        assert!(handle.join().unwrap().is_err());
        assert_eq!(*exited.lock().unwrap(), Some(false));
    }
}
