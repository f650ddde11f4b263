//! 测量结果提取
//!
//! 把两端的日志/记录变成时延记录，把带宽测试工具的文本输出变成吞吐量，
//! 并写出下游需要的 CSV。缺失输入得到空的（或占位的）结果而不是错误。

mod latency;
mod log_scrape;
mod output;
mod throughput;

pub use latency::{
    LatencyRecord, LatencyReport, LatencySummary, Pairing, extract_latencies,
    latencies_from_records,
};
pub use log_scrape::{RECV_COMPLETE_PATTERN, SEND_PATTERN, TimestampScraper};
pub use output::{MeasureError, read_jsonl, read_latency_csv, write_latency_csv, write_throughput_csv};
pub use throughput::{Throughput, extract_throughput, throughput_from_file};
