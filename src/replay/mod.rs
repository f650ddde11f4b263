//! 梯度流量回放
//!
//! 长度前缀帧协议的两端：`TrafficPlayer`（客户端）按时间表发送帧，
//! `TrafficSink`（服务端）接收一个连接上的全部帧。两端都是单线程阻塞状态机，
//! 每帧产出一条结构化记录。

pub mod frame;
mod player;
mod record;
mod schedule;
mod sink;

pub use player::{ReplayError, TrafficPlayer};
pub use record::{RecordLog, RecvRecord, SendRecord, wall_clock_secs};
pub use schedule::{RejectedRow, ScheduleError, TrafficEvent, TrafficSchedule};
pub use sink::{SessionEnd, SinkError, SinkOpts, SinkReport, TrafficSink, read_session};

/// 回放协议默认端口
pub const DEFAULT_PORT: u16 = 5000;
