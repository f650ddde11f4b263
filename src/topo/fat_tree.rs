//! Fat-tree 拓扑构建

use super::id::IdAllocator;
use super::spec::{HostSpec, Layer, LinkKind, LinkSpec, NodeRef, SwitchSpec, Topology};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// 每个 edge 交换机下挂的主机数
pub const HOSTS_PER_EDGE: usize = 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("fat-tree k must be even and >= 2, got {k}")]
    InvalidParameter { k: usize },
}

/// core 交换机到 aggregation 槽位的映射约定
///
/// 两种约定都满足度数不变量，但连出来的是不同的 fabric。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreWiring {
    /// `slot = i mod (k/2)`
    #[default]
    Strided,
    /// `slot = i div (k/2)`
    Grouped,
}

impl CoreWiring {
    pub fn slot(self, core_index: usize, half: usize) -> usize {
        match self {
            CoreWiring::Strided => core_index % half,
            CoreWiring::Grouped => core_index / half,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FatTreeOpts {
    pub k: usize,
    pub link_mbps: u32,
    pub link_delay_us: Option<u64>,
    pub core_wiring: CoreWiring,
}

impl FatTreeOpts {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }
}

impl Default for FatTreeOpts {
    fn default() -> Self {
        Self {
            k: 4,
            link_mbps: 10,
            link_delay_us: None,
            core_wiring: CoreWiring::Strided,
        }
    }
}

/// 链路收集器：按创建顺序给每个节点分配端口号
struct LinkSet {
    links: Vec<LinkSpec>,
    switch_ports: Vec<u32>,
    host_ports: Vec<u32>,
    bandwidth_mbps: u32,
    delay_us: Option<u64>,
}

impl LinkSet {
    fn next_port(&mut self, node: NodeRef) -> u32 {
        let slot = match node {
            NodeRef::Switch(i) => &mut self.switch_ports[i],
            NodeRef::Host(i) => &mut self.host_ports[i],
        };
        *slot += 1;
        *slot
    }

    fn connect(&mut self, a: NodeRef, b: NodeRef, kind: LinkKind) {
        let a_port = self.next_port(a);
        let b_port = self.next_port(b);
        self.links.push(LinkSpec {
            a,
            b,
            kind,
            bandwidth_mbps: self.bandwidth_mbps,
            delay_us: self.delay_us,
            a_port,
            b_port,
        });
    }
}

/// 构建 k-ary fat-tree。
///
/// 交换机按 Core、Aggregation、Edge 的顺序从 `ids` 连续分配 datapath id；
/// 名字沿用同一全局序号（`c1..`、`a{L1+1}..`、`e{L1+L2+1}..`），主机为 `h1..`。
/// 链路按 core→agg、agg→edge、edge→host 的顺序生成。
#[tracing::instrument(skip(ids), fields(k = opts.k, wiring = ?opts.core_wiring))]
pub fn build_fat_tree(opts: &FatTreeOpts, ids: &mut IdAllocator) -> Result<Topology, TopologyError> {
    let k = opts.k;
    if k < 2 || k % 2 != 0 {
        return Err(TopologyError::InvalidParameter { k });
    }

    let half = k / 2;
    let core_count = half * half;
    let pod_count = k * half;

    let mut switches = Vec::with_capacity(core_count + 2 * pod_count);
    for index in 0..core_count {
        switches.push(SwitchSpec {
            name: format!("{}{}", Layer::Core.prefix(), switches.len() + 1),
            dpid: ids.next_dpid(),
            layer: Layer::Core,
            index,
            pod: None,
            slot: opts.core_wiring.slot(index, half),
        });
    }
    for layer in [Layer::Aggregation, Layer::Edge] {
        for index in 0..pod_count {
            switches.push(SwitchSpec {
                name: format!("{}{}", layer.prefix(), switches.len() + 1),
                dpid: ids.next_dpid(),
                layer,
                index,
                pod: Some(index / half),
                slot: index % half,
            });
        }
    }
    debug!(core_count, agg_count = pod_count, edge_count = pod_count, "交换机已分配");

    let agg_base = core_count;
    let edge_base = core_count + pod_count;
    let host_count = pod_count * HOSTS_PER_EDGE;

    let mut set = LinkSet {
        links: Vec::with_capacity(core_count * k + pod_count * half + host_count),
        switch_ports: vec![0; switches.len()],
        host_ports: vec![0; host_count],
        bandwidth_mbps: opts.link_mbps,
        delay_us: opts.link_delay_us,
    };

    for core in 0..core_count {
        let slot = switches[core].slot;
        for pod in 0..k {
            let agg = agg_base + pod * half + slot;
            set.connect(
                NodeRef::Switch(core),
                NodeRef::Switch(agg),
                LinkKind::CoreAggregation,
            );
        }
    }

    for agg in 0..pod_count {
        let pod = agg / half;
        for slot in 0..half {
            let edge = edge_base + pod * half + slot;
            set.connect(
                NodeRef::Switch(agg_base + agg),
                NodeRef::Switch(edge),
                LinkKind::AggregationEdge,
            );
        }
    }

    let mut hosts = Vec::with_capacity(host_count);
    for edge in 0..pod_count {
        for _ in 0..HOSTS_PER_EDGE {
            let index = hosts.len();
            hosts.push(HostSpec {
                name: format!("h{}", index + 1),
                index,
                edge: edge_base + edge,
            });
            set.connect(
                NodeRef::Switch(edge_base + edge),
                NodeRef::Host(index),
                LinkKind::EdgeHost,
            );
        }
    }

    info!(
        switches = switches.len(),
        hosts = hosts.len(),
        links = set.links.len(),
        "fat-tree built"
    );

    Ok(Topology {
        k,
        switches,
        hosts,
        links: set.links,
    })
}
