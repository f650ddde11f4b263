//! 接收端（服务端角色）
//!
//! 最多接受一个连接，按顺序读完该连接上的所有帧。接受超时、读超时、对端关闭
//! 和帧头不完整都会结束会话，且不会重试。

use super::frame::{self, CHUNK_LEN, HeaderRead, PayloadEnd};
use super::record::{RecordLog, RecvRecord, wall_clock_secs};
use super::DEFAULT_PORT;
use std::io::{self, ErrorKind, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// 非阻塞 accept 的轮询间隔
const ACCEPT_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("could not bind to {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("listener failed: {0}")]
    Listener(#[from] io::Error),
}

#[derive(Debug, Clone)]
pub struct SinkOpts {
    pub bind: IpAddr,
    pub port: u16,
    pub accept_timeout: Duration,
    /// 单次读调用的超时；零表示不设超时
    pub read_timeout: Duration,
}

impl Default for SinkOpts {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            accept_timeout: Duration::from_secs(300),
            read_timeout: Duration::from_secs(60),
        }
    }
}

/// 会话为何结束
#[derive(Debug)]
pub enum SessionEnd {
    /// 等待连接超时，没有会话发生
    AcceptTimeout,
    /// 对端在帧边界处正常关闭
    PeerClosed,
    /// 只收到部分帧头
    ProtocolViolation { header_bytes: usize },
    /// 读超时
    ReadTimeout,
    /// 连接被重置等传输错误
    Transport(io::Error),
}

impl SessionEnd {
    /// 协议违例与传输错误之外的结束都属于正常收尾
    pub fn is_clean(&self) -> bool {
        !matches!(
            self,
            SessionEnd::ProtocolViolation { .. } | SessionEnd::Transport(_)
        )
    }
}

#[derive(Debug)]
pub struct SinkReport {
    pub peer: Option<SocketAddr>,
    pub frames: Vec<RecvRecord>,
    pub end: SessionEnd,
}

impl SinkReport {
    pub fn bytes_received(&self) -> u64 {
        self.frames.iter().map(|f| f.received_bytes).sum()
    }
}

/// 在任意字节流上运行接收循环，返回每帧记录与结束原因。
#[tracing::instrument(skip_all)]
pub fn read_session<R: Read + ?Sized>(r: &mut R, log: &mut RecordLog) -> (Vec<RecvRecord>, SessionEnd) {
    let mut frames = Vec::new();
    let mut buf = vec![0u8; CHUNK_LEN];

    loop {
        let size = match frame::read_header(r) {
            Ok(HeaderRead::Length(size)) => size,
            Ok(HeaderRead::Closed) => {
                info!("[Server] Connection closed by client");
                return (frames, SessionEnd::PeerClosed);
            }
            Ok(HeaderRead::TimedOut) => {
                info!("[Server] Timeout waiting for next header");
                return (frames, SessionEnd::ReadTimeout);
            }
            Ok(HeaderRead::Short(got)) => {
                warn!(header_bytes = got, "[Server] Received incomplete header: {got} bytes");
                return (frames, SessionEnd::ProtocolViolation { header_bytes: got });
            }
            Err(e) => {
                warn!(error = %e, "[Server] Connection error while reading header");
                return (frames, SessionEnd::Transport(e));
            }
        };

        let t_recv_start = wall_clock_secs();
        info!(seq = frames.len(), "[Server] Received header for {size} bytes at {t_recv_start:.6}");

        let payload = frame::drain_payload(r, size, &mut buf);
        let t_recv_complete = wall_clock_secs();
        let record = RecvRecord {
            seq: frames.len(),
            requested_bytes: size,
            received_bytes: payload.received,
            t_recv_start,
            t_recv_complete,
        };
        info!(
            seq = record.seq,
            requested = size,
            "[Server] Completed receiving {} bytes (in {} chunks) at {:.6}",
            payload.received,
            payload.chunks,
            t_recv_complete
        );
        if let Err(e) = log.append(&record) {
            warn!(error = %e, "failed to append receive record");
        }
        frames.push(record);

        match payload.end {
            PayloadEnd::Complete => {}
            PayloadEnd::Closed => {
                warn!(missing = size - payload.received, "[Server] Connection broken while receiving data");
                return (frames, SessionEnd::PeerClosed);
            }
            PayloadEnd::TimedOut => {
                warn!(
                    missing = size - payload.received,
                    "[Server] Timeout while receiving data, {} bytes left",
                    size - payload.received
                );
                return (frames, SessionEnd::ReadTimeout);
            }
            PayloadEnd::Failed(e) => {
                warn!(error = %e, "[Server] Connection error while receiving data");
                return (frames, SessionEnd::Transport(e));
            }
        }
    }
}

pub struct TrafficSink {
    listener: TcpListener,
    opts: SinkOpts,
    log: RecordLog,
}

impl TrafficSink {
    pub fn bind(opts: SinkOpts) -> Result<Self, SinkError> {
        let addr = SocketAddr::new(opts.bind, opts.port);
        let listener = TcpListener::bind(addr).map_err(|source| SinkError::Bind { addr, source })?;
        info!(%addr, "[Server] Listening on port {}", opts.port);
        Ok(Self {
            listener,
            opts,
            log: RecordLog::disabled(),
        })
    }

    pub fn with_record_log(mut self, log: RecordLog) -> Self {
        self.log = log;
        self
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 在截止时间内等待一个连接
    fn accept_within(&self, timeout: Duration) -> io::Result<Option<(TcpStream, SocketAddr)>> {
        self.listener.set_nonblocking(true)?;
        let deadline = Instant::now() + timeout;
        loop {
            match self.listener.accept() {
                Ok(conn) => return Ok(Some(conn)),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// 运行一次会话：接受一个连接并读到会话结束。
    #[tracing::instrument(skip(self), fields(port = self.opts.port))]
    pub fn serve(mut self) -> Result<SinkReport, SinkError> {
        let Some((mut stream, peer)) = self.accept_within(self.opts.accept_timeout)? else {
            info!("[Server] Timeout waiting for client connection");
            return Ok(SinkReport {
                peer: None,
                frames: Vec::new(),
                end: SessionEnd::AcceptTimeout,
            });
        };
        info!(%peer, "[Server] Connection from {peer}");

        stream.set_nonblocking(false)?;
        let read_timeout = Some(self.opts.read_timeout).filter(|d| !d.is_zero());
        stream.set_read_timeout(read_timeout)?;
        debug!(?read_timeout, "读超时已设置");

        let (frames, end) = read_session(&mut stream, &mut self.log);
        let report = SinkReport {
            peer: Some(peer),
            frames,
            end,
        };
        info!(
            frames = report.frames.len(),
            bytes = report.bytes_received(),
            end = ?report.end,
            "[Server] Shut down"
        );
        Ok(report)
    }
}
