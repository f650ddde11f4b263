//! 链路类型

use super::id::NodeId;
use crate::topo::LinkKind;

/// 双向链路（仿真器视角）
#[derive(Debug, Clone)]
pub struct Link {
    pub a: NodeId,
    pub b: NodeId,
    pub kind: LinkKind,
    pub bandwidth_mbps: u32,
    /// None 表示不注入额外时延
    pub delay_us: Option<u64>,
}

impl Link {
    /// 另一端；`node` 不在链路上时返回 None
    pub fn peer(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }
}
