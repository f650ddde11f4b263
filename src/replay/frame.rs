//! 帧编解码
//!
//! 每帧 = 8 字节大端 u64 长度 `L` + `L` 字节负载。负载内容不参与测量，发送端用零填充。

use std::io::{self, ErrorKind, Read, Write};

pub const HEADER_LEN: usize = 8;

/// 收发负载时每次读写的块大小
pub const CHUNK_LEN: usize = 64 * 1024;

static FILLER: [u8; CHUNK_LEN] = [0; CHUNK_LEN];

pub fn encode_header(len: u64) -> [u8; HEADER_LEN] {
    len.to_be_bytes()
}

/// 读超时在不同平台上分别表现为 WouldBlock 或 TimedOut
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// 写出一整帧。帧头与负载要么全部写完，要么返回错误。
pub fn write_frame<W: Write + ?Sized>(w: &mut W, len: u64) -> io::Result<()> {
    w.write_all(&encode_header(len))?;
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(CHUNK_LEN as u64) as usize;
        w.write_all(&FILLER[..n])?;
        remaining -= n as u64;
    }
    w.flush()
}

/// 读帧头的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderRead {
    Length(u64),
    /// 一个字节都没读到对端就关闭了
    Closed,
    /// 一个字节都没读到就超时
    TimedOut,
    /// 读到部分帧头后连接关闭或超时
    Short(usize),
}

/// 精确读取 8 字节帧头。非超时的 I/O 错误原样返回。
pub fn read_header<R: Read + ?Sized>(r: &mut R) -> io::Result<HeaderRead> {
    let mut buf = [0u8; HEADER_LEN];
    let mut got = 0;
    while got < HEADER_LEN {
        match r.read(&mut buf[got..]) {
            Ok(0) if got == 0 => return Ok(HeaderRead::Closed),
            Ok(0) => return Ok(HeaderRead::Short(got)),
            Ok(n) => got += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if is_timeout(&e) && got == 0 => return Ok(HeaderRead::TimedOut),
            Err(e) if is_timeout(&e) => return Ok(HeaderRead::Short(got)),
            Err(e) => return Err(e),
        }
    }
    Ok(HeaderRead::Length(u64::from_be_bytes(buf)))
}

/// 负载读取为何停止
#[derive(Debug)]
pub enum PayloadEnd {
    Complete,
    Closed,
    TimedOut,
    Failed(io::Error),
}

/// 负载读取结果：实际字节数、读调用次数与停止原因
#[derive(Debug)]
pub struct PayloadRead {
    pub received: u64,
    pub chunks: usize,
    pub end: PayloadEnd,
}

/// 读取并丢弃 `len` 字节负载，直到读满、超时或连接关闭。
pub fn drain_payload<R: Read + ?Sized>(r: &mut R, len: u64, buf: &mut [u8]) -> PayloadRead {
    let mut received = 0u64;
    let mut chunks = 0usize;
    while received < len {
        let want = (len - received).min(buf.len() as u64) as usize;
        match r.read(&mut buf[..want]) {
            Ok(0) => {
                return PayloadRead {
                    received,
                    chunks,
                    end: PayloadEnd::Closed,
                };
            }
            Ok(n) => {
                chunks += 1;
                received += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                let end = if is_timeout(&e) {
                    PayloadEnd::TimedOut
                } else {
                    PayloadEnd::Failed(e)
                };
                return PayloadRead {
                    received,
                    chunks,
                    end,
                };
            }
        }
    }
    PayloadRead {
        received,
        chunks,
        end: PayloadEnd::Complete,
    }
}
