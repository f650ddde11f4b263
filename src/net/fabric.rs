//! 内存中的 fabric
//!
//! 实现 `Emulator`，记录节点、链路与邻接表，可以回答度数与邻居查询。

use std::collections::HashMap;

use super::emulator::Emulator;
use super::id::{LinkId, NodeId};
use super::link::Link;
use super::node::{Node, NodeKind};
use crate::topo::{HostSpec, Layer, LinkSpec, SwitchSpec};
use tracing::trace;

#[derive(Debug, Default)]
pub struct Fabric {
    nodes: Vec<Node>,
    links: Vec<Link>,
    adjacency: Vec<Vec<LinkId>>,
    by_name: HashMap<String, NodeId>,
}

impl Fabric {
    fn push_node(&mut self, name: &str, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.to_string(),
            kind,
        });
        self.adjacency.push(Vec::new());
        self.by_name.insert(name.to_string(), id);
        trace!(%id, name, "添加节点");
        id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency[id.0].len()
    }

    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency[id.0]
            .iter()
            .filter_map(move |l| self.links[l.0].peer(id))
    }

    /// 位于指定层级的邻居个数；`None` 统计主机邻居
    pub fn neighbors_in(&self, id: NodeId, layer: Option<Layer>) -> usize {
        self.neighbors(id)
            .filter(|n| self.nodes[n.0].layer() == layer)
            .count()
    }

    pub fn switches_in(&self, layer: Layer) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(move |n| n.layer() == Some(layer))
    }

    pub fn host_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_host()).count()
    }
}

impl Emulator for Fabric {
    fn add_switch(&mut self, spec: &SwitchSpec) -> NodeId {
        self.push_node(
            &spec.name,
            NodeKind::Switch {
                layer: spec.layer,
                dpid: spec.dpid,
            },
        )
    }

    fn add_host(&mut self, spec: &HostSpec) -> NodeId {
        self.push_node(&spec.name, NodeKind::Host)
    }

    fn add_link(&mut self, a: NodeId, b: NodeId, spec: &LinkSpec) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link {
            a,
            b,
            kind: spec.kind,
            bandwidth_mbps: spec.bandwidth_mbps,
            delay_us: spec.delay_us,
        });
        self.adjacency[a.0].push(id);
        self.adjacency[b.0].push(id);
        id
    }
}
