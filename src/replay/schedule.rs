//! 流量时间表
//!
//! CSV 列：`interval_s`（发送前等待的秒数）、`grad_bytes`（负载字节数）。
//! 行顺序即回放顺序；其余列忽略。

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cannot open schedule {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("schedule header unreadable: {0}")]
    Header(#[from] csv::Error),
    #[error("invalid interval {value} (must be finite and >= 0)")]
    InvalidInterval { value: f64 },
}

/// 一次定时发送
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrafficEvent {
    pub interval_s: f64,
    #[serde(rename = "grad_bytes")]
    pub payload_bytes: u64,
}

impl TrafficEvent {
    pub fn new(interval_s: f64, payload_bytes: u64) -> Self {
        Self {
            interval_s,
            payload_bytes,
        }
    }

    /// 发送前的等待时长；负数、NaN、溢出都视为非法行
    pub fn delay(&self) -> Result<Duration, ScheduleError> {
        Duration::try_from_secs_f64(self.interval_s).map_err(|_| ScheduleError::InvalidInterval {
            value: self.interval_s,
        })
    }
}

/// 被跳过的畸形行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 数据行号（不含表头，从 0 开始）
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TrafficSchedule {
    events: Vec<TrafficEvent>,
    rejected: Vec<RejectedRow>,
}

impl TrafficSchedule {
    pub fn from_events(events: Vec<TrafficEvent>) -> Self {
        Self {
            events,
            rejected: Vec::new(),
        }
    }

    /// 从文件加载。文件不存在或为空时得到空时间表（记 warn），不报错。
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let empty = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        if empty {
            warn!(path = %path.display(), "schedule is empty or missing");
            return Ok(Self::default());
        }
        let file = File::open(path).map_err(|source| ScheduleError::Open {
            path: path.display().to_string(),
            source,
        })?;
        let schedule = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            events = schedule.len(),
            rejected = schedule.rejected.len(),
            "schedule loaded"
        );
        Ok(schedule)
    }

    /// 逐行解析；畸形行记录下来并跳过
    pub fn from_reader<R: Read>(r: R) -> Result<Self, ScheduleError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(r);
        rdr.headers()?;

        let mut out = Self::default();
        for (row, result) in rdr.deserialize::<TrafficEvent>().enumerate() {
            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|ev| ev.delay().map(|_| ev).map_err(|e| e.to_string()));
            match parsed {
                Ok(ev) => out.events.push(ev),
                Err(reason) => {
                    warn!(row, %reason, "skipping malformed schedule row");
                    out.rejected.push(RejectedRow { row, reason });
                }
            }
        }
        debug!(events = out.events.len(), "时间表解析完成");
        Ok(out)
    }

    pub fn events(&self) -> &[TrafficEvent] {
        &self.events
    }

    pub fn rejected(&self) -> &[RejectedRow] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.events.iter().map(|e| e.payload_bytes).sum()
    }

    /// 全部等待时间之和再加上 `margin`，用于估计一次回放需要多久
    pub fn total_runtime(&self, margin: Duration) -> Duration {
        self.events
            .iter()
            .filter_map(|e| e.delay().ok())
            .sum::<Duration>()
            + margin
    }
}
