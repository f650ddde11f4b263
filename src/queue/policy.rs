//! 策略参数

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static RATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?(bit|kbit|mbit|gbit|bps|kbps|mbps|gbps)$").expect("rate regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QdiscError {
    #[error("invalid rate {0:?}, expected e.g. 10mbit")]
    InvalidRate(String),
    #[error("unknown qdisc {0:?}, expected fifo, tbf, netem or dctcp")]
    UnknownKind(String),
    #[error("unknown host {0}")]
    UnknownHost(String),
    #[error("applying `{command}` failed: {reason}")]
    Apply { command: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QdiscKind {
    #[default]
    Fifo,
    Tbf,
    Netem,
    Dctcp,
}

impl FromStr for QdiscKind {
    type Err = QdiscError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "fifo" => Ok(Self::Fifo),
            "tbf" => Ok(Self::Tbf),
            "netem" => Ok(Self::Netem),
            "dctcp" => Ok(Self::Dctcp),
            _ => Err(QdiscError::UnknownKind(raw.to_string())),
        }
    }
}

/// `tc` 速率字符串，如 `10mbit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rate(String);

impl Rate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Rate {
    type Err = QdiscError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_lowercase();
        if RATE_RE.is_match(&normalized) {
            Ok(Rate(normalized))
        } else {
            Err(QdiscError::InvalidRate(raw.to_string()))
        }
    }
}

impl TryFrom<String> for Rate {
    type Error = QdiscError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Rate> for String {
    fn from(rate: Rate) -> Self {
        rate.0
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 整形参数：作用于 core–aggregation 链路的 aggregation 侧接口
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapingOpts {
    pub qdisc: QdiscKind,
    pub core_rate: Option<Rate>,
    pub netem_args: Option<String>,
    /// 即使 qdisc 不是 dctcp 也打开 ECN
    pub ecn: bool,
    pub tbf_burst: String,
    pub tbf_limit: String,
}

impl Default for ShapingOpts {
    fn default() -> Self {
        Self {
            qdisc: QdiscKind::Fifo,
            core_rate: None,
            netem_args: None,
            ecn: false,
            tbf_burst: "100kb".to_string(),
            tbf_limit: "200kb".to_string(),
        }
    }
}

impl ShapingOpts {
    pub fn wants_ecn(&self) -> bool {
        self.ecn || self.qdisc == QdiscKind::Dctcp
    }
}
