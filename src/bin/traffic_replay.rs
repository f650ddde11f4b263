use clap::{Parser, ValueEnum};
use fattree_replay::config::ExperimentConfig;
use fattree_replay::replay::{RecordLog, SessionEnd, TrafficPlayer, TrafficSchedule, TrafficSink};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    Server,
    Client,
}

#[derive(Debug, Parser)]
#[command(
    name = "traffic-replay",
    about = "Replay gradient-exchange traffic between two hosts of the fabric"
)]
struct Args {
    #[arg(long, value_enum)]
    mode: Mode,

    /// Server address (client mode)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on / connect to
    #[arg(long)]
    port: Option<u16>,

    /// Traffic profile CSV with interval_s and grad_bytes columns (client mode)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Append one JSON record per frame to this file
    #[arg(long)]
    records: Option<PathBuf>,

    /// Experiment config (JSON) providing port and timeouts
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds to wait for the client to connect (server mode)
    #[arg(long)]
    accept_timeout_s: Option<f64>,

    /// Per-read timeout in seconds (server mode)
    #[arg(long)]
    read_timeout_s: Option<f64>,

    /// Connection timeout in seconds (client mode)
    #[arg(long)]
    connect_timeout_s: Option<f64>,
}

fn resolve_config(args: &Args) -> Result<ExperimentConfig, String> {
    let mut cfg = match &args.config {
        Some(path) => ExperimentConfig::load(path).map_err(|e| e.to_string())?,
        None => ExperimentConfig::default(),
    };
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if let Some(s) = args.accept_timeout_s {
        cfg.accept_timeout_s = s;
    }
    if let Some(s) = args.read_timeout_s {
        cfg.read_timeout_s = s;
    }
    if let Some(s) = args.connect_timeout_s {
        cfg.connect_timeout_s = s;
    }
    Ok(cfg)
}

fn record_log(path: Option<&PathBuf>) -> Result<RecordLog, String> {
    match path {
        Some(p) => RecordLog::create(p).map_err(|e| format!("create {}: {e}", p.display())),
        None => Ok(RecordLog::disabled()),
    }
}

fn run_server(args: &Args, cfg: &ExperimentConfig) -> Result<(), String> {
    let opts = cfg.sink_opts().map_err(|e| e.to_string())?;
    let sink = TrafficSink::bind(opts)
        .map_err(|e| e.to_string())?
        .with_record_log(record_log(args.records.as_ref())?);
    let report = sink.serve().map_err(|e| e.to_string())?;

    // 会话以何种方式结束都不算进程失败
    match &report.end {
        SessionEnd::ProtocolViolation { header_bytes } => {
            println!("session ended: protocol violation ({header_bytes} header bytes)")
        }
        SessionEnd::Transport(e) => println!("session ended: transport error ({e})"),
        other => println!("session ended: {other:?}"),
    }
    println!(
        "frames={} bytes={}",
        report.frames.len(),
        report.bytes_received()
    );
    Ok(())
}

fn run_client(args: &Args, cfg: &ExperimentConfig) -> Result<(), String> {
    let (Some(host), Some(csv)) = (&args.host, &args.csv) else {
        return Err("--host and --csv are required in client mode".to_string());
    };
    let schedule = TrafficSchedule::load(csv).map_err(|e| e.to_string())?;
    let timeout = cfg.connect_timeout().map_err(|e| e.to_string())?;
    let addr = format!("{host}:{}", cfg.port);

    // 回放加余量，调用方据此决定等待多久再收集日志
    let margin = cfg.runtime_margin().map_err(|e| e.to_string())?;
    let expected = schedule.total_runtime(margin);
    tracing::info!(events = schedule.len(), "[Client] Expected runtime {:.1}s", expected.as_secs_f64());
    println!("expected_runtime_s={:.3}", expected.as_secs_f64());

    let mut player = TrafficPlayer::connect(&addr, timeout.max(Duration::from_millis(1)))
        .map_err(|e| e.to_string())?
        .with_record_log(record_log(args.records.as_ref())?);
    let result = player.replay(schedule.events());
    println!(
        "sent={} bytes={} rejected_rows={}",
        player.records().len(),
        player.bytes_sent(),
        schedule.rejected().len()
    );
    result.map(|_| ()).map_err(|e| e.to_string())
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
        .init();

    let args = Args::parse();
    let outcome = resolve_config(&args).and_then(|cfg| match args.mode {
        Mode::Server => run_server(&args, &cfg),
        Mode::Client => run_client(&args, &cfg),
    });

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
