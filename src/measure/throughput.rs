//! 吞吐量提取
//!
//! 在带宽测试工具（iperf）的文本输出里找第一个 `Mbits/sec` 速率。

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

static MBITS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*Mbits/sec").expect("throughput regex")
});

/// 吞吐量结果。`Missing` 与 `Error` 都是合法、可记录的结果。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Throughput {
    Mbps(f64),
    /// 输出为空、不存在或没有速率行
    Missing,
    /// 输出存在但读取失败
    Error,
}

impl Throughput {
    pub fn mbps(self) -> Option<f64> {
        match self {
            Throughput::Mbps(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Throughput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Throughput::Mbps(v) => write!(f, "{v}"),
            Throughput::Missing => f.write_str("missing"),
            Throughput::Error => f.write_str("error"),
        }
    }
}

/// 返回第一处 `<数字> Mbits/sec` 的数值；找不到时为 `Missing`
pub fn extract_throughput(text: &str) -> Throughput {
    let found = text
        .lines()
        .find_map(|line| MBITS_RE.captures(line))
        .and_then(|caps| caps[1].parse::<f64>().ok());
    match found {
        Some(v) => {
            debug!(mbps = v, "找到速率");
            Throughput::Mbps(v)
        }
        None => Throughput::Missing,
    }
}

/// 从文件提取；文件缺失或为空得到 `Missing`，读取失败得到 `Error`
pub fn throughput_from_file(path: impl AsRef<Path>) -> Throughput {
    let path = path.as_ref();
    if !path.exists() {
        warn!(path = %path.display(), "bandwidth test output is missing");
        return Throughput::Missing;
    }
    match std::fs::read_to_string(path) {
        Ok(text) if text.trim().is_empty() => {
            warn!(path = %path.display(), "bandwidth test output is empty");
            Throughput::Missing
        }
        Ok(text) => extract_throughput(&text),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "error reading bandwidth test output");
            Throughput::Error
        }
    }
}
