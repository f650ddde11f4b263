use super::unique_temp_dir;
use crate::measure::{Throughput, extract_throughput, throughput_from_file, write_throughput_csv};

const IPERF_OUTPUT: &str = "\
------------------------------------------------------------
Client connecting to 10.0.0.16, TCP port 5001
TCP window size: 85.0 KByte (default)
------------------------------------------------------------
[  3] local 10.0.0.1 port 49152 connected with 10.0.0.16 port 5001
[ ID] Interval       Transfer     Bandwidth
[  3]  0.0-10.2 sec  11.4 MBytes  9.38 Mbits/sec
";

#[test]
fn first_rate_is_extracted() {
    assert_eq!(extract_throughput("rate 9.50 Mbits/sec"), Throughput::Mbps(9.5));
    assert_eq!(
        extract_throughput("12 Mbits/sec\n3.5 Mbits/sec\n"),
        Throughput::Mbps(12.0)
    );
    assert_eq!(extract_throughput(IPERF_OUTPUT), Throughput::Mbps(9.38));
}

#[test]
fn text_without_rate_is_missing() {
    assert_eq!(extract_throughput(""), Throughput::Missing);
    assert_eq!(
        extract_throughput("connect failed: Connection refused\n"),
        Throughput::Missing
    );
    assert_eq!(extract_throughput("9.5 Gbits/sec"), Throughput::Missing);
}

#[test]
fn throughput_display_matches_csv_values() {
    assert_eq!(Throughput::Mbps(9.5).to_string(), "9.5");
    assert_eq!(Throughput::Missing.to_string(), "missing");
    assert_eq!(Throughput::Error.to_string(), "error");
    assert_eq!(Throughput::Mbps(9.5).mbps(), Some(9.5));
    assert_eq!(Throughput::Error.mbps(), None);
}

#[test]
fn throughput_from_files() {
    let dir = unique_temp_dir("throughput");

    assert_eq!(throughput_from_file(dir.join("absent.log")), Throughput::Missing);

    let empty = dir.join("empty.log");
    std::fs::write(&empty, "  \n").expect("write");
    assert_eq!(throughput_from_file(&empty), Throughput::Missing);

    let full = dir.join("iperf.log");
    std::fs::write(&full, IPERF_OUTPUT).expect("write");
    assert_eq!(throughput_from_file(&full), Throughput::Mbps(9.38));

    // 目录无法按文本读取
    assert_eq!(throughput_from_file(&dir), Throughput::Error);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn throughput_csv_has_one_metric_row() {
    let dir = unique_temp_dir("throughput-csv");

    let path = dir.join("throughput.csv");
    write_throughput_csv(&path, Throughput::Mbps(9.5)).expect("write");
    assert_eq!(
        std::fs::read_to_string(&path).expect("read"),
        "metric,value\nthroughput_mbps,9.5\n"
    );

    write_throughput_csv(&path, Throughput::Missing).expect("write");
    assert_eq!(
        std::fs::read_to_string(&path).expect("read"),
        "metric,value\nthroughput_mbps,missing\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
