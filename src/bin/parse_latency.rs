use clap::Parser;
use fattree_replay::measure::{
    MeasureError, Pairing, TimestampScraper, extract_latencies, latencies_from_records, read_jsonl,
    write_latency_csv,
};
use fattree_replay::replay::{RecvRecord, SendRecord};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "parse-latency",
    about = "Pair client send and server receive-complete timestamps into latencies.csv"
)]
struct Args {
    /// Client log (text) to scrape "Sent ... at T" lines from
    #[arg(long, default_value = "h1_client.log")]
    client_log: PathBuf,

    /// Server log (text) to scrape "Completed receiving ... at T" lines from
    #[arg(long, default_value = "h16_server.log")]
    server_log: PathBuf,

    /// Client JSON records; used instead of --client-log when given with --recv-records
    #[arg(long, requires = "recv_records")]
    send_records: Option<PathBuf>,

    /// Server JSON records
    #[arg(long, requires = "send_records")]
    recv_records: Option<PathBuf>,

    /// Output CSV
    #[arg(long, default_value = "latencies.csv")]
    out: PathBuf,
}

fn run(args: Args) -> Result<(), MeasureError> {
    let report = match (&args.send_records, &args.recv_records) {
        (Some(sends), Some(recvs)) => {
            let sends: Vec<SendRecord> = read_jsonl(sends)?;
            let recvs: Vec<RecvRecord> = read_jsonl(recvs)?;
            latencies_from_records(&sends, &recvs)
        }
        _ => {
            let sends = TimestampScraper::sends().scrape_file(&args.client_log);
            let recvs = TimestampScraper::recv_completions().scrape_file(&args.server_log);
            extract_latencies(&sends, &recvs)
        }
    };

    write_latency_csv(&args.out, &report.records)?;
    match report.pairing {
        Pairing::NoTraffic => println!("no traffic observed; wrote empty {}", args.out.display()),
        Pairing::Mismatch { sends, recvs } => println!("warning: {sends} sends vs {recvs} receives"),
        Pairing::Matched => {}
    }
    println!(
        "wrote {} latency records to {}",
        report.records.len(),
        args.out.display()
    );
    if let Some(s) = report.summary() {
        println!(
            "latency mean={:.4}s median={:.4}s std={:.4}s min={:.4}s max={:.4}s p95={:.4}s",
            s.mean, s.median, s.std, s.min, s.max, s.p95
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
