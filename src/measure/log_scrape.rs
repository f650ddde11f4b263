//! 旧日志兼容层
//!
//! 主数据路径是结构化记录；这里只为已有的纯文本日志按正则抓取时间戳。

use regex::Regex;
use std::path::Path;
use tracing::warn;

/// 客户端 “Sent N bytes at T” 行
pub const SEND_PATTERN: &str = r"Sent .* at ([0-9]+\.[0-9]+)";
/// 服务端 “Completed receiving N bytes ... at T” 行
pub const RECV_COMPLETE_PATTERN: &str = r"Completed receiving .* at ([0-9]+\.[0-9]+)";

#[derive(Debug, Clone)]
pub struct TimestampScraper {
    re: Regex,
}

impl TimestampScraper {
    /// `pattern` 的第一个捕获组必须是时间戳
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            re: Regex::new(pattern)?,
        })
    }

    pub fn sends() -> Self {
        Self::new(SEND_PATTERN).expect("send pattern")
    }

    pub fn recv_completions() -> Self {
        Self::new(RECV_COMPLETE_PATTERN).expect("receive pattern")
    }

    /// 按行顺序返回所有匹配的时间戳
    pub fn scrape(&self, text: &str) -> Vec<f64> {
        text.lines()
            .filter_map(|line| self.re.captures(line))
            .filter_map(|caps| caps.get(1)?.as_str().parse().ok())
            .collect()
    }

    /// 文件缺失、为空或读取失败时返回空列表并记 warn
    pub fn scrape_file(&self, path: impl AsRef<Path>) -> Vec<f64> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) if text.is_empty() => {
                warn!(path = %path.display(), "log is empty");
                Vec::new()
            }
            Ok(text) => self.scrape(&text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "log is missing or unreadable");
                Vec::new()
            }
        }
    }
}
