//! 实验配置
//!
//! 可选的 JSON 文件，字段全部有默认值；命令行参数在此基础上覆盖。

use crate::queue::ShapingOpts;
use crate::replay::{DEFAULT_PORT, SinkOpts};
use crate::topo::{CoreWiring, FatTreeOpts, Topology};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be a finite, non-negative number of seconds, got {value}")]
    InvalidDuration { field: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub k: usize,
    pub link_mbps: u32,
    pub link_delay_us: Option<u64>,
    pub core_wiring: CoreWiring,
    pub shaping: ShapingOpts,
    /// 参数服务器（接收端）主机；未设置时取拓扑中最后一台主机
    pub ps_host: Option<String>,
    /// worker（发送端）主机；未设置时取第一台主机
    pub worker_host: Option<String>,
    pub port: u16,
    pub iperf_port: u16,
    pub iperf_duration_s: u64,
    pub accept_timeout_s: f64,
    pub read_timeout_s: f64,
    pub connect_timeout_s: f64,
    /// 估计回放时长时在时间表总间隔之外额外等待的秒数
    pub runtime_margin_s: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            k: 4,
            link_mbps: 10,
            link_delay_us: None,
            core_wiring: CoreWiring::Strided,
            shaping: ShapingOpts::default(),
            ps_host: None,
            worker_host: None,
            port: DEFAULT_PORT,
            iperf_port: 5001,
            iperf_duration_s: 10,
            accept_timeout_s: 300.0,
            read_timeout_s: 60.0,
            connect_timeout_s: 30.0,
            runtime_margin_s: 5.0,
        }
    }
}

fn seconds(field: &'static str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidDuration { field, value })
}

impl ExperimentConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.sink_opts()?;
        cfg.connect_timeout()?;
        cfg.runtime_margin()?;
        Ok(cfg)
    }

    pub fn fat_tree_opts(&self) -> FatTreeOpts {
        FatTreeOpts {
            k: self.k,
            link_mbps: self.link_mbps,
            link_delay_us: self.link_delay_us,
            core_wiring: self.core_wiring,
        }
    }

    pub fn sink_opts(&self) -> Result<SinkOpts, ConfigError> {
        Ok(SinkOpts {
            port: self.port,
            accept_timeout: seconds("accept_timeout_s", self.accept_timeout_s)?,
            read_timeout: seconds("read_timeout_s", self.read_timeout_s)?,
            ..SinkOpts::default()
        })
    }

    pub fn connect_timeout(&self) -> Result<Duration, ConfigError> {
        seconds("connect_timeout_s", self.connect_timeout_s)
    }

    pub fn runtime_margin(&self) -> Result<Duration, ConfigError> {
        seconds("runtime_margin_s", self.runtime_margin_s)
    }

    pub fn resolve_ps_host(&self, topo: &Topology) -> Option<String> {
        self.ps_host
            .clone()
            .or_else(|| topo.hosts.last().map(|h| h.name.clone()))
    }

    pub fn resolve_worker_host(&self, topo: &Topology) -> Option<String> {
        self.worker_host
            .clone()
            .or_else(|| topo.hosts.first().map(|h| h.name.clone()))
    }

    /// 参数服务器上的带宽测试服务端
    pub fn iperf_server_argv(&self) -> Vec<String> {
        vec![
            "iperf".to_string(),
            "-s".to_string(),
            "-p".to_string(),
            self.iperf_port.to_string(),
        ]
    }

    /// worker 上指向 `server` 的带宽测试客户端
    pub fn iperf_client_argv(&self, server: &str) -> Vec<String> {
        vec![
            "iperf".to_string(),
            "-c".to_string(),
            server.to_string(),
            "-p".to_string(),
            self.iperf_port.to_string(),
            "-t".to_string(),
            self.iperf_duration_s.to_string(),
        ]
    }
}
