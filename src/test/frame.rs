use crate::replay::frame::{
    CHUNK_LEN, HEADER_LEN, HeaderRead, PayloadEnd, drain_payload, encode_header, read_header,
    write_frame,
};
use std::io::{self, Cursor, ErrorKind, Read};

/// 每次最多返回 `step` 字节的读端，模拟被拆碎的 TCP 段
struct Trickle {
    data: Vec<u8>,
    pos: usize,
    step: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

/// 先吐出 `data`，然后返回指定错误
struct ThenFail {
    data: Cursor<Vec<u8>>,
    kind: ErrorKind,
}

impl Read for ThenFail {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(self.kind, "injected"));
        }
        Ok(n)
    }
}

#[test]
fn header_is_big_endian_u64() {
    assert_eq!(encode_header(1), [0, 0, 0, 0, 0, 0, 0, 1]);
    assert_eq!(encode_header(0x0102_0304), [0, 0, 0, 0, 1, 2, 3, 4]);
    assert_eq!(HEADER_LEN, 8);
}

#[test]
fn write_frame_emits_header_then_exact_payload() {
    let mut out = Vec::new();
    write_frame(&mut out, 70_000).expect("write frame");
    assert_eq!(out.len(), HEADER_LEN + 70_000);
    assert_eq!(out[..HEADER_LEN], encode_header(70_000));
    assert!(out[HEADER_LEN..].iter().all(|b| *b == 0));

    let mut empty = Vec::new();
    write_frame(&mut empty, 0).expect("write empty frame");
    assert_eq!(empty, encode_header(0));
}

#[test]
fn read_header_assembles_fragmented_header() {
    let mut r = Trickle {
        data: encode_header(65_536).to_vec(),
        pos: 0,
        step: 3,
    };
    assert_eq!(read_header(&mut r).expect("header"), HeaderRead::Length(65_536));
}

#[test]
fn read_header_distinguishes_close_short_and_timeout() {
    assert_eq!(
        read_header(&mut Cursor::new(Vec::new())).expect("eof"),
        HeaderRead::Closed
    );
    assert_eq!(
        read_header(&mut Cursor::new(vec![0u8; 4])).expect("short"),
        HeaderRead::Short(4)
    );

    let mut idle = ThenFail {
        data: Cursor::new(Vec::new()),
        kind: ErrorKind::WouldBlock,
    };
    assert_eq!(read_header(&mut idle).expect("timeout"), HeaderRead::TimedOut);

    let mut partial = ThenFail {
        data: Cursor::new(vec![0u8; 5]),
        kind: ErrorKind::TimedOut,
    };
    assert_eq!(read_header(&mut partial).expect("short"), HeaderRead::Short(5));

    let mut reset = ThenFail {
        data: Cursor::new(Vec::new()),
        kind: ErrorKind::ConnectionReset,
    };
    let err = read_header(&mut reset).expect_err("reset is an error");
    assert_eq!(err.kind(), ErrorKind::ConnectionReset);
}

#[test]
fn drain_payload_counts_partial_reads() {
    let mut buf = vec![0u8; CHUNK_LEN];

    let done = drain_payload(&mut Cursor::new(vec![7u8; 100]), 100, &mut buf);
    assert_eq!(done.received, 100);
    assert!(matches!(done.end, PayloadEnd::Complete));

    let short = drain_payload(&mut Cursor::new(vec![7u8; 40]), 100, &mut buf);
    assert_eq!(short.received, 40);
    assert!(matches!(short.end, PayloadEnd::Closed));

    let mut stalled = ThenFail {
        data: Cursor::new(vec![1u8; 10]),
        kind: ErrorKind::WouldBlock,
    };
    let timed_out = drain_payload(&mut stalled, 100, &mut buf);
    assert_eq!(timed_out.received, 10);
    assert!(matches!(timed_out.end, PayloadEnd::TimedOut));
}

#[test]
fn drain_payload_does_not_read_past_frame() {
    let mut buf = vec![0u8; CHUNK_LEN];
    let mut data = vec![0u8; 10];
    data.extend_from_slice(&encode_header(3));
    let mut r = Cursor::new(data);

    let payload = drain_payload(&mut r, 10, &mut buf);
    assert_eq!(payload.received, 10);
    assert_eq!(read_header(&mut r).expect("next header"), HeaderRead::Length(3));
}
