//! 结果文件读写

use super::latency::LatencyRecord;
use super::throughput::Throughput;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("io error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("bad record on line {line}: {source}")]
    Json {
        line: usize,
        source: serde_json::Error,
    },
}

/// 写 `batch,latency_s`；没有记录时只写表头
pub fn write_latency_csv(path: impl AsRef<Path>, records: &[LatencyRecord]) -> Result<(), MeasureError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    if records.is_empty() {
        wtr.write_record(["batch", "latency_s"])?;
    }
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush().map_err(|source| MeasureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), records = records.len(), "wrote latency records");
    Ok(())
}

pub fn read_latency_csv(path: impl AsRef<Path>) -> Result<Vec<LatencyRecord>, MeasureError> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}

/// 写 `metric,value`，唯一一行是 `throughput_mbps,<值|missing|error>`
pub fn write_throughput_csv(path: impl AsRef<Path>, value: Throughput) -> Result<(), MeasureError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["metric", "value"])?;
    wtr.write_record(["throughput_mbps".to_string(), value.to_string()])?;
    wtr.flush().map_err(|source| MeasureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), %value, "wrote throughput");
    Ok(())
}

/// 读取 JSON lines 记录文件；文件缺失时返回空列表
pub fn read_jsonl<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, MeasureError> {
    let path = path.as_ref();
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "record file is missing");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(MeasureError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let mut out = Vec::new();
    for (idx, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| MeasureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let rec = serde_json::from_str(&line).map_err(|source| MeasureError::Json {
            line: idx + 1,
            source,
        })?;
        out.push(rec);
    }
    Ok(out)
}
