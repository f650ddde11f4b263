use super::unique_temp_dir;
use crate::measure::{TimestampScraper, extract_latencies};

const CLIENT_LOG: &str = "\
INFO connecting to 10.0.0.16:5000
INFO Sent 1000 bytes at 1700000000.125000
INFO Sent 2000 bytes at 1700000000.625000
WARN skipping malformed schedule row
";

const SERVER_LOG: &str = "\
INFO listening on 0.0.0.0:5000
INFO Started receiving 1000 bytes at 1700000000.100000
INFO Completed receiving 1000 bytes (expected 1000) at 1700000000.325000
INFO Started receiving 2000 bytes at 1700000000.630000
INFO Completed receiving 2000 bytes (expected 2000) at 1700000001.025000
";

#[test]
fn scrapers_pick_only_their_lines() {
    let sends = TimestampScraper::sends().scrape(CLIENT_LOG);
    assert_eq!(sends, [1_700_000_000.125, 1_700_000_000.625]);

    let recvs = TimestampScraper::recv_completions().scrape(SERVER_LOG);
    assert_eq!(recvs, [1_700_000_000.325, 1_700_000_001.025]);

    let report = extract_latencies(&sends, &recvs);
    assert_eq!(report.records.len(), 2);
    assert!((report.records[0].latency_s - 0.2).abs() < 1e-6);
    assert!((report.records[1].latency_s - 0.4).abs() < 1e-6);
}

#[test]
fn timestamps_without_fraction_do_not_match() {
    let sends = TimestampScraper::sends().scrape("Sent 10 bytes at 1700000000\n");
    assert!(sends.is_empty());
}

#[test]
fn custom_pattern_and_bad_pattern() {
    let scraper = TimestampScraper::new(r"t=([0-9.]+)").expect("pattern");
    assert_eq!(scraper.scrape("a t=1.5\nb\nc t=2\n"), [1.5, 2.0]);
    assert!(TimestampScraper::new(r"(unclosed").is_err());
}

#[test]
fn missing_or_empty_log_scrapes_nothing() {
    let dir = unique_temp_dir("scrape");
    let scraper = TimestampScraper::sends();

    assert!(scraper.scrape_file(dir.join("h1_client.log")).is_empty());

    let empty = dir.join("empty.log");
    std::fs::write(&empty, "").expect("write");
    assert!(scraper.scrape_file(&empty).is_empty());

    let full = dir.join("client.log");
    std::fs::write(&full, CLIENT_LOG).expect("write");
    assert_eq!(scraper.scrape_file(&full).len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}
