use clap::Parser;
use fattree_replay::measure::{throughput_from_file, write_throughput_csv};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "parse-throughput",
    about = "Extract the achieved Mbits/sec rate from iperf client output"
)]
struct Args {
    /// iperf client output
    #[arg(long, default_value = "iperf_client.log")]
    iperf_log: PathBuf,

    /// Output CSV (metric,value)
    #[arg(long, default_value = "throughput.csv")]
    out: PathBuf,
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

    let args = Args::parse();
    let value = throughput_from_file(&args.iperf_log);
    if let Err(e) = write_throughput_csv(&args.out, value) {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }
    println!("throughput_mbps={value}");
    ExitCode::SUCCESS
}
