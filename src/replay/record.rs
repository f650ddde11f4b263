//! 每帧的结构化记录，以及 JSON lines 形式的记录文件

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// 当前墙钟时间（UNIX 秒）。两端日志来自不同主机，只能用墙钟对齐。
pub fn wall_clock_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// 客户端发送记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SendRecord {
    /// 时间表中的行号（从 0 开始）
    pub seq: usize,
    pub payload_bytes: u64,
    /// 整帧写完之后的时间戳
    pub t_send: f64,
}

/// 服务端接收记录
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecvRecord {
    /// 会话内的帧序号（从 0 开始）
    pub seq: usize,
    /// 帧头声明的长度
    pub requested_bytes: u64,
    /// 实际收到的字节数；提前结束时小于 `requested_bytes`
    pub received_bytes: u64,
    pub t_recv_start: f64,
    pub t_recv_complete: f64,
}

impl RecvRecord {
    pub fn is_complete(&self) -> bool {
        self.received_bytes == self.requested_bytes
    }
}

/// 逐条追加、逐条 flush 的记录文件；未启用时所有写入都是空操作
pub struct RecordLog {
    out: Option<Box<dyn Write + Send>>,
}

impl RecordLog {
    pub fn disabled() -> Self {
        Self { out: None }
    }

    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::to_writer(BufWriter::new(file)))
    }

    pub fn to_writer(w: impl Write + Send + 'static) -> Self {
        Self {
            out: Some(Box::new(w)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    pub fn append<T: Serialize>(&mut self, record: &T) -> io::Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        serde_json::to_writer(&mut *out, record)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

impl Default for RecordLog {
    fn default() -> Self {
        Self::disabled()
    }
}

impl std::fmt::Debug for RecordLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordLog")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
