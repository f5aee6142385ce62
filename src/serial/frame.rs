//! 串口帧编解码
//!
//! 设备每行输出一个采样，支持两种格式：
//! - `<time_ms=1200 type=BOWL_WEIGHT value=35.5>`（值含空格时用双引号）
//! - `{"time_ms": 1200, "type": "BOWL_WEIGHT", "value": 35.5}`

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\w+)=(?:"([^"]*)"|([^\s>]+))"#).expect("Invalid frame field regex")
});

/// 解码后的消息
pub type Message = Map<String, Value>;

/// 解码一行串口输出，非帧内容（启动日志等）返回 None
pub fn decode_line(line: &str) -> Option<Message> {
    let line = line.trim();

    if line.starts_with('{') {
        return serde_json::from_str::<Message>(line).ok();
    }

    let inner = line.strip_prefix('<')?.strip_suffix('>')?;
    let mut message = Map::new();
    for caps in FIELD_RE.captures_iter(inner) {
        let key = caps[1].to_string();
        let value = match (caps.get(2), caps.get(3)) {
            (Some(quoted), _) => Value::String(quoted.as_str().to_string()),
            (None, Some(raw)) => parse_scalar(raw.as_str()),
            (None, None) => continue,
        };
        message.insert(key, value);
    }

    if message.is_empty() {
        None
    } else {
        Some(message)
    }
}

/// 数字优先，其余当作字符串
fn parse_scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

/// 读取消息中的整数时间戳
pub fn timestamp(message: &Message, field: &str) -> Option<i64> {
    let value = message.get(field)?;
    value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}
