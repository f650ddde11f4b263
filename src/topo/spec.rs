//! 拓扑规格类型
//!
//! 交换机、主机与链路的不可变描述。每个交换机和链路都携带显式的层级标签，
//! 下游（例如队列策略）按类型筛选，而不是解析名字前缀。

use super::id::Dpid;
use serde::{Deserialize, Serialize};

/// 交换机所在层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Core,
    Aggregation,
    Edge,
}

impl Layer {
    /// 名字前缀（c / a / e）
    pub fn prefix(self) -> &'static str {
        match self {
            Layer::Core => "c",
            Layer::Aggregation => "a",
            Layer::Edge => "e",
        }
    }
}

/// 交换机规格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSpec {
    pub name: String,
    pub dpid: Dpid,
    pub layer: Layer,
    /// 在本层内的序号（从 0 开始）
    pub index: usize,
    /// 所属 pod；core 交换机为 None
    pub pod: Option<usize>,
    /// pod 内位置（aggregation/edge），或 core 交换机对应的 aggregation 槽位
    pub slot: usize,
}

/// 主机规格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSpec {
    pub name: String,
    /// 全局序号（从 0 开始；名字为 `h{index+1}`）
    pub index: usize,
    /// 所连接的 edge 交换机在 `Topology::switches` 中的下标
    pub edge: usize,
}

/// 链路端点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum NodeRef {
    Switch(usize),
    Host(usize),
}

/// 链路类别（即链路两端的层级组合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    CoreAggregation,
    AggregationEdge,
    EdgeHost,
}

/// 链路规格。`a` 总是上层端点，`b` 是下层端点。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub a: NodeRef,
    pub b: NodeRef,
    pub kind: LinkKind,
    pub bandwidth_mbps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_us: Option<u64>,
    /// 端口号（各节点从 1 开始按链路创建顺序编号）
    pub a_port: u32,
    pub b_port: u32,
}

impl LinkSpec {
    pub fn endpoints(&self) -> [NodeRef; 2] {
        [self.a, self.b]
    }

    pub fn connects(&self, node: NodeRef) -> bool {
        self.a == node || self.b == node
    }

    /// 对端节点；`node` 不在此链路上时返回 None
    pub fn peer_of(&self, node: NodeRef) -> Option<NodeRef> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }

    /// `node` 一侧的端口号
    pub fn port_of(&self, node: NodeRef) -> Option<u32> {
        if self.a == node {
            Some(self.a_port)
        } else if self.b == node {
            Some(self.b_port)
        } else {
            None
        }
    }
}

/// 构建完成的 fat-tree 拓扑
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    pub k: usize,
    /// 按 Core、Aggregation、Edge 的顺序连续排列
    pub switches: Vec<SwitchSpec>,
    pub hosts: Vec<HostSpec>,
    pub links: Vec<LinkSpec>,
}

impl Topology {
    fn half(&self) -> usize {
        self.k / 2
    }

    pub fn core_count(&self) -> usize {
        self.half() * self.half()
    }

    pub fn pod_switch_count(&self) -> usize {
        self.k * self.half()
    }

    /// 指定层级的全部交换机（连续切片）
    pub fn layer(&self, layer: Layer) -> &[SwitchSpec] {
        let cores = self.core_count();
        let per_layer = self.pod_switch_count();
        let range = match layer {
            Layer::Core => 0..cores,
            Layer::Aggregation => cores..cores + per_layer,
            Layer::Edge => cores + per_layer..cores + 2 * per_layer,
        };
        // 反序列化得到的拓扑可能与 k 不一致
        self.switches.get(range).unwrap_or(&[])
    }

    /// core 交换机在 `switches` 中的下标
    pub fn core(&self, index: usize) -> NodeRef {
        NodeRef::Switch(index)
    }

    pub fn agg(&self, pod: usize, slot: usize) -> NodeRef {
        NodeRef::Switch(self.core_count() + pod * self.half() + slot)
    }

    pub fn edge(&self, pod: usize, slot: usize) -> NodeRef {
        NodeRef::Switch(self.core_count() + self.pod_switch_count() + pod * self.half() + slot)
    }

    pub fn switch(&self, node: NodeRef) -> Option<&SwitchSpec> {
        match node {
            NodeRef::Switch(i) => self.switches.get(i),
            NodeRef::Host(_) => None,
        }
    }

    pub fn name(&self, node: NodeRef) -> Option<&str> {
        match node {
            NodeRef::Switch(i) => self.switches.get(i).map(|s| s.name.as_str()),
            NodeRef::Host(i) => self.hosts.get(i).map(|h| h.name.as_str()),
        }
    }

    /// 按名字查找节点
    pub fn lookup(&self, name: &str) -> Option<NodeRef> {
        if let Some(i) = self.switches.iter().position(|s| s.name == name) {
            return Some(NodeRef::Switch(i));
        }
        self.hosts
            .iter()
            .position(|h| h.name == name)
            .map(NodeRef::Host)
    }

    pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &LinkSpec> {
        self.links.iter().filter(move |l| l.kind == kind)
    }

    pub fn links_of(&self, node: NodeRef) -> impl Iterator<Item = &LinkSpec> {
        self.links.iter().filter(move |l| l.connects(node))
    }

    pub fn degree(&self, node: NodeRef) -> usize {
        self.links_of(node).count()
    }

    /// `node` 一侧的接口名，形如 `a5-eth3`
    pub fn interface(&self, link: &LinkSpec, node: NodeRef) -> Option<String> {
        let port = link.port_of(node)?;
        let name = self.name(node)?;
        Some(format!("{name}-eth{port}"))
    }
}
