use clap::Parser;
use fattree_replay::config::ExperimentConfig;
use fattree_replay::net::{Fabric, deploy};
use fattree_replay::queue::{DryRun, QdiscKind, Rate, apply_all, plan};
use fattree_replay::topo::{CoreWiring, IdAllocator, Layer, LinkKind, build_fat_tree};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(
    name = "fat-tree",
    about = "Build a k-ary fat-tree and print its switches, links and qdisc plan"
)]
struct Args {
    /// Experiment config (JSON); flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of pods (even, >= 2)
    #[arg(long)]
    k: Option<usize>,

    /// Default link bandwidth in Mbps
    #[arg(long)]
    link_mbps: Option<u32>,

    /// Core wiring convention: strided (i mod k/2) or grouped (i div k/2)
    #[arg(long)]
    core_wiring: Option<String>,

    /// Write the full topology as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Queuing policy on core links: fifo, tbf, netem or dctcp
    #[arg(long)]
    qdisc: Option<String>,

    /// Rate limit on core links, e.g. 10mbit
    #[arg(long)]
    core_bw: Option<String>,

    /// netem arguments, e.g. "delay 5ms loss 1%"
    #[arg(long)]
    netem_args: Option<String>,

    /// Enable ECN on the switches and the PS/worker hosts
    #[arg(long)]
    ecn: bool,

    /// Print every link
    #[arg(long)]
    links: bool,
}

fn parse_core_wiring(raw: &str) -> Result<CoreWiring, String> {
    match raw.trim().to_lowercase().as_str() {
        "strided" | "mod" => Ok(CoreWiring::Strided),
        "grouped" | "div" => Ok(CoreWiring::Grouped),
        _ => Err(format!("unknown core wiring: {raw}")),
    }
}

fn resolve_config(args: &Args) -> Result<ExperimentConfig, String> {
    let mut cfg = match &args.config {
        Some(path) => ExperimentConfig::load(path).map_err(|e| e.to_string())?,
        None => ExperimentConfig::default(),
    };
    if let Some(k) = args.k {
        cfg.k = k;
    }
    if let Some(mbps) = args.link_mbps {
        cfg.link_mbps = mbps;
    }
    if let Some(raw) = &args.core_wiring {
        cfg.core_wiring = parse_core_wiring(raw)?;
    }
    if let Some(raw) = &args.qdisc {
        cfg.shaping.qdisc = QdiscKind::from_str(raw).map_err(|e| e.to_string())?;
    }
    if let Some(raw) = &args.core_bw {
        cfg.shaping.core_rate = Some(Rate::from_str(raw).map_err(|e| e.to_string())?);
    }
    if let Some(raw) = &args.netem_args {
        cfg.shaping.netem_args = Some(raw.clone());
    }
    if args.ecn {
        cfg.shaping.ecn = true;
    }
    Ok(cfg)
}

fn run(args: Args) -> Result<(), String> {
    let cfg = resolve_config(&args)?;

    let mut ids = IdAllocator::default();
    let topo = build_fat_tree(&cfg.fat_tree_opts(), &mut ids).map_err(|e| e.to_string())?;

    let mut fabric = Fabric::default();
    deploy(&topo, &mut fabric);

    println!(
        "fat-tree k={} wiring={:?}: core={} aggregation={} edge={} hosts={}",
        topo.k,
        cfg.core_wiring,
        fabric.switches_in(Layer::Core).count(),
        fabric.switches_in(Layer::Aggregation).count(),
        fabric.switches_in(Layer::Edge).count(),
        fabric.host_count(),
    );
    println!(
        "links: core-aggregation={} aggregation-edge={} edge-host={}",
        topo.links_of_kind(LinkKind::CoreAggregation).count(),
        topo.links_of_kind(LinkKind::AggregationEdge).count(),
        topo.links_of_kind(LinkKind::EdgeHost).count(),
    );

    if args.links {
        for link in &topo.links {
            println!(
                "link {} <-> {} kind={:?} bw={}Mbps",
                topo.interface(link, link.a).unwrap_or_default(),
                topo.interface(link, link.b).unwrap_or_default(),
                link.kind,
                link.bandwidth_mbps
            );
        }
    }

    if let Some(path) = &args.json {
        let raw = serde_json::to_string_pretty(&topo).map_err(|e| e.to_string())?;
        std::fs::write(path, raw).map_err(|e| format!("write {}: {e}", path.display()))?;
        println!("topology written to {}", path.display());
    }

    let ps = cfg.resolve_ps_host(&topo);
    let worker = cfg.resolve_worker_host(&topo);
    let hosts: Vec<&str> = ps.iter().chain(worker.iter()).map(String::as_str).collect();
    let actions = plan(&topo, &cfg.shaping, &hosts).map_err(|e| e.to_string())?;
    let mut dry_run = DryRun::default();
    apply_all(&actions, &mut dry_run).map_err(|e| e.to_string())?;
    for line in &dry_run.applied {
        println!("qdisc {line}");
    }

    if let (Some(ps), Some(worker)) = (&ps, &worker) {
        println!("iperf {ps}: {}", cfg.iperf_server_argv().join(" "));
        println!("iperf {worker}: {}", cfg.iperf_client_argv(ps).join(" "));
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
