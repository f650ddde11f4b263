//! 节点类型

use super::id::NodeId;
use crate::topo::{Dpid, Layer};

/// 节点种类：交换机带层级与 datapath id，主机没有
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Switch { layer: Layer, dpid: Dpid },
    Host,
}

/// 已创建的节点
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn layer(&self) -> Option<Layer> {
        match self.kind {
            NodeKind::Switch { layer, .. } => Some(layer),
            NodeKind::Host => None,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self.kind, NodeKind::Host)
    }
}
