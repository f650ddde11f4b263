//! 发送端（客户端角色）
//!
//! 严格按时间表顺序：先睡眠 `interval_s`，再写出一整帧，写完后记录时间戳。

use super::frame;
use super::record::{RecordLog, SendRecord, wall_clock_secs};
use super::schedule::TrafficEvent;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("could not resolve {addr}")]
    Resolve { addr: String },
    #[error("could not connect to {addr}: {source}")]
    Connect { addr: SocketAddr, source: io::Error },
    #[error("replay aborted at event {index} after {sent} events sent: {source}")]
    Aborted {
        sent: usize,
        index: usize,
        #[source]
        source: io::Error,
    },
}

impl ReplayError {
    /// 失败前成功发送的事件数
    pub fn events_sent(&self) -> usize {
        match self {
            ReplayError::Aborted { sent, .. } => *sent,
            _ => 0,
        }
    }
}

pub struct TrafficPlayer<W: Write> {
    out: W,
    records: Vec<SendRecord>,
    bytes_sent: u64,
    log: RecordLog,
}

impl TrafficPlayer<TcpStream> {
    /// 连接服务端；`addr` 形如 `10.0.0.16:5000`
    pub fn connect(addr: &str, timeout: Duration) -> Result<Self, ReplayError> {
        let target = addr
            .to_socket_addrs()
            .ok()
            .and_then(|mut it| it.next())
            .ok_or_else(|| ReplayError::Resolve {
                addr: addr.to_string(),
            })?;
        info!(%target, "[Client] Connecting to {target}...");
        let stream = TcpStream::connect_timeout(&target, timeout)
            .map_err(|source| ReplayError::Connect { addr: target, source })?;
        info!("[Client] Connected");
        Ok(Self::new(stream))
    }
}

impl<W: Write> TrafficPlayer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            records: Vec::new(),
            bytes_sent: 0,
            log: RecordLog::disabled(),
        }
    }

    pub fn with_record_log(mut self, log: RecordLog) -> Self {
        self.log = log;
        self
    }

    pub fn records(&self) -> &[SendRecord] {
        &self.records
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn into_inner(self) -> (W, Vec<SendRecord>) {
        (self.out, self.records)
    }

    /// 回放全部事件，返回成功发送的事件数。
    ///
    /// 等待时长非法的行记 warn 后跳过；写失败说明连接已不可用，立即以
    /// `ReplayError::Aborted` 结束，已发送的记录仍可通过 `records()` 取得。
    #[tracing::instrument(skip_all, fields(events = events.len()))]
    pub fn replay(&mut self, events: &[TrafficEvent]) -> Result<usize, ReplayError> {
        let mut sent = 0;
        for (idx, ev) in events.iter().enumerate() {
            let delay = match ev.delay() {
                Ok(d) => d,
                Err(e) => {
                    warn!(idx, error = %e, "[Client] Error parsing row {idx}: {e}");
                    continue;
                }
            };
            let size = ev.payload_bytes;
            debug!(idx, "[Client] [{idx}] Sleeping {:.4}s before sending {size} bytes", ev.interval_s);
            std::thread::sleep(delay);

            if let Err(source) = frame::write_frame(&mut self.out, size) {
                warn!(idx, error = %source, "[Client] Socket error at row {idx}: {source}");
                return Err(ReplayError::Aborted {
                    sent,
                    index: idx,
                    source,
                });
            }
            let t_send = wall_clock_secs();
            info!(idx, "[Client] [{idx}] Sent {size} bytes at {t_send:.6}");

            let record = SendRecord {
                seq: idx,
                payload_bytes: size,
                t_send,
            };
            if let Err(e) = self.log.append(&record) {
                warn!(error = %e, "failed to append send record");
            }
            self.records.push(record);
            self.bytes_sent += size;
            sent += 1;
        }
        info!(sent, bytes = self.bytes_sent, "[Client] Processed {sent} gradient exchanges");
        Ok(sent)
    }
}
