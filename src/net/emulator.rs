//! 仿真器接口与拓扑部署

use super::id::{LinkId, NodeId};
use crate::topo::{HostSpec, LinkSpec, NodeRef, SwitchSpec, Topology};
use tracing::{debug, info};

/// 外部网络仿真器需要提供的最小操作集
pub trait Emulator {
    /// 创建交换机
    fn add_switch(&mut self, spec: &SwitchSpec) -> NodeId;

    /// 创建主机
    fn add_host(&mut self, spec: &HostSpec) -> NodeId;

    /// 创建带宽/时延链路
    fn add_link(&mut self, a: NodeId, b: NodeId, spec: &LinkSpec) -> LinkId;
}

/// 拓扑规格到仿真器句柄的映射
#[derive(Debug, Clone, Default)]
pub struct Deployment {
    pub switches: Vec<NodeId>,
    pub hosts: Vec<NodeId>,
    pub links: Vec<LinkId>,
}

impl Deployment {
    pub fn node(&self, node: NodeRef) -> NodeId {
        match node {
            NodeRef::Switch(i) => self.switches[i],
            NodeRef::Host(i) => self.hosts[i],
        }
    }
}

/// 按规格顺序把拓扑交给仿真器：先交换机，再主机，最后链路。
#[tracing::instrument(skip_all, fields(k = topo.k))]
pub fn deploy<E: Emulator + ?Sized>(topo: &Topology, emu: &mut E) -> Deployment {
    let mut out = Deployment {
        switches: Vec::with_capacity(topo.switches.len()),
        hosts: Vec::with_capacity(topo.hosts.len()),
        links: Vec::with_capacity(topo.links.len()),
    };

    for sw in &topo.switches {
        out.switches.push(emu.add_switch(sw));
    }
    for host in &topo.hosts {
        out.hosts.push(emu.add_host(host));
    }
    debug!(switches = out.switches.len(), hosts = out.hosts.len(), "节点已创建");

    for link in &topo.links {
        let a = out.node(link.a);
        let b = out.node(link.b);
        out.links.push(emu.add_link(a, b, link));
    }

    info!(links = out.links.len(), "topology deployed");
    out
}
