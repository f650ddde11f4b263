//! 策略规划与执行接口

use super::policy::{QdiscError, QdiscKind, ShapingOpts};
use crate::topo::{LinkKind, Topology};
use std::fmt;
use tracing::{debug, info, warn};

/// 动作作用对象
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// 交换机上的某个接口
    Interface { node: String, interface: String },
    /// 主机（在主机的命名空间里执行）
    Host(String),
    /// 仿真器全局配置
    Global,
}

/// 一条待执行的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QdiscAction {
    pub target: Target,
    pub argv: Vec<String>,
}

impl QdiscAction {
    fn new(target: Target, argv: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            target,
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command(&self) -> String {
        self.argv.join(" ")
    }
}

impl fmt::Display for QdiscAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Interface { node, .. } => write!(f, "{node}: {}", self.command()),
            Target::Host(host) => write!(f, "{host}: {}", self.command()),
            Target::Global => write!(f, "*: {}", self.command()),
        }
    }
}

/// 根据整形参数生成动作列表。
///
/// 速率限制与 netem 只作用于 core–aggregation 链路的 aggregation 侧接口；
/// ECN/DCTCP 打开仿真器全局 ECN，并在 `ecn_hosts` 上切换拥塞控制。
pub fn plan(
    topo: &Topology,
    opts: &ShapingOpts,
    ecn_hosts: &[&str],
) -> Result<Vec<QdiscAction>, QdiscError> {
    let mut actions = Vec::new();

    if opts.wants_ecn() {
        actions.push(QdiscAction::new(
            Target::Global,
            ["ovs-vsctl", "set", "Open_vSwitch", ".", "other_config:ecn=true"],
        ));
        for host in ecn_hosts {
            if topo.lookup(host).is_none() {
                return Err(QdiscError::UnknownHost(host.to_string()));
            }
            for setting in ["net.ipv4.tcp_ecn=1", "net.ipv4.tcp_congestion_control=dctcp"] {
                actions.push(QdiscAction::new(
                    Target::Host(host.to_string()),
                    ["sysctl", "-w", setting],
                ));
            }
        }
    }

    let root: Option<Vec<String>> = match opts.qdisc {
        QdiscKind::Tbf | QdiscKind::Fifo => {
            if opts.qdisc == QdiscKind::Tbf && opts.core_rate.is_none() {
                warn!("tbf without a core rate, core links left unshaped");
            }
            opts.core_rate.as_ref().map(|rate| tbf_args(rate.as_str(), opts))
        }
        QdiscKind::Netem => {
            let args = opts.netem_args.as_deref().filter(|a| !a.trim().is_empty());
            if args.is_none() {
                warn!("netem without arguments, core links left unshaped");
            }
            args.map(|args| {
                let mut argv = vec!["netem".to_string()];
                argv.extend(args.split_whitespace().map(str::to_string));
                argv
            })
        }
        QdiscKind::Dctcp => None,
    };

    if let Some(root) = root {
        for link in topo.links_of_kind(LinkKind::CoreAggregation) {
            // a 端是 core，b 端是 aggregation
            let agg = link.b;
            let (Some(node), Some(interface)) = (topo.name(agg), topo.interface(link, agg)) else {
                continue;
            };
            let node = node.to_string();
            let mut argv: Vec<String> = ["tc", "qdisc", "replace", "dev", interface.as_str(), "root"]
                .into_iter()
                .map(str::to_string)
                .collect();
            argv.extend(root.iter().cloned());
            debug!(%node, %interface, "规划接口策略");
            actions.push(QdiscAction {
                target: Target::Interface { node, interface },
                argv,
            });
        }
    }

    info!(actions = actions.len(), qdisc = ?opts.qdisc, "qdisc plan ready");
    Ok(actions)
}

fn tbf_args(rate: &str, opts: &ShapingOpts) -> Vec<String> {
    [
        "tbf",
        "rate",
        rate,
        "burst",
        opts.tbf_burst.as_str(),
        "limit",
        opts.tbf_limit.as_str(),
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// 执行动作的外部旁路
pub trait QdiscApplier {
    fn apply(&mut self, action: &QdiscAction) -> Result<(), QdiscError>;
}

/// 只记录命令、不执行的 applier
#[derive(Debug, Default)]
pub struct DryRun {
    pub applied: Vec<String>,
}

impl QdiscApplier for DryRun {
    fn apply(&mut self, action: &QdiscAction) -> Result<(), QdiscError> {
        self.applied.push(action.to_string());
        Ok(())
    }
}

/// 依次执行，遇到第一个失败即停止；返回成功执行的条数
pub fn apply_all<A: QdiscApplier + ?Sized>(
    actions: &[QdiscAction],
    applier: &mut A,
) -> Result<usize, QdiscError> {
    for action in actions {
        applier.apply(action)?;
    }
    Ok(actions.len())
}
