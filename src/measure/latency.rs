//! 时延提取
//!
//! 严格按位置配对：第 i 条发送对第 i 条接收完成，不看负载大小或内容。

use crate::replay::{RecvRecord, SendRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyRecord {
    pub batch: usize,
    /// 可能为负（时钟偏差或日志损坏），不做截断
    pub latency_s: f64,
}

/// 配对情况
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pairing {
    /// 两侧条数相同
    Matched,
    /// 条数不同，只配对了较短的前缀
    Mismatch { sends: usize, recvs: usize },
    /// 两侧都没有记录
    NoTraffic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatencyReport {
    pub records: Vec<LatencyRecord>,
    pub pairing: Pairing,
}

impl LatencyReport {
    pub fn summary(&self) -> Option<LatencySummary> {
        LatencySummary::from_records(&self.records)
    }
}

pub fn extract_latencies(sends: &[f64], recvs: &[f64]) -> LatencyReport {
    if sends.is_empty() && recvs.is_empty() {
        warn!("no timestamps found in either log, traffic may not be flowing");
        return LatencyReport {
            records: Vec::new(),
            pairing: Pairing::NoTraffic,
        };
    }

    let pairing = if sends.len() == recvs.len() {
        Pairing::Matched
    } else {
        warn!(
            sends = sends.len(),
            recvs = recvs.len(),
            "{} sends vs {} receives",
            sends.len(),
            recvs.len()
        );
        Pairing::Mismatch {
            sends: sends.len(),
            recvs: recvs.len(),
        }
    };

    let records: Vec<LatencyRecord> = sends
        .iter()
        .zip(recvs)
        .enumerate()
        .map(|(batch, (s, r))| LatencyRecord {
            batch,
            latency_s: r - s,
        })
        .collect();
    info!(records = records.len(), ?pairing, "latencies paired");

    LatencyReport { records, pairing }
}

/// 直接从结构化记录提取：发送时间对接收完成时间
pub fn latencies_from_records(sends: &[SendRecord], recvs: &[RecvRecord]) -> LatencyReport {
    let send_ts: Vec<f64> = sends.iter().map(|s| s.t_send).collect();
    let recv_ts: Vec<f64> = recvs.iter().map(|r| r.t_recv_complete).collect();
    extract_latencies(&send_ts, &recv_ts)
}

/// 时延统计（样本标准差，p95 取最近秩）
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
}

impl LatencySummary {
    pub fn from_records(records: &[LatencyRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let mut xs: Vec<f64> = records.iter().map(|r| r.latency_s).collect();
        xs.sort_by(f64::total_cmp);

        let n = xs.len();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 1 {
            xs[n / 2]
        } else {
            (xs[n / 2 - 1] + xs[n / 2]) / 2.0
        };
        let std = if n > 1 {
            let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            var.sqrt()
        } else {
            0.0
        };
        let rank = ((0.95 * n as f64).ceil() as usize).clamp(1, n);

        Some(Self {
            count: n,
            mean,
            median,
            std,
            min: xs[0],
            max: xs[n - 1],
            p95: xs[rank - 1],
        })
    }
}
