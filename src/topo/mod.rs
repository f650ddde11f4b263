//! 拓扑构建
//!
//! 纯函数式地计算 fat-tree 的交换机、主机与链路规格，不做任何 I/O。

pub mod fat_tree;
mod id;
mod spec;

pub use fat_tree::{CoreWiring, FatTreeOpts, TopologyError, build_fat_tree, HOSTS_PER_EDGE};
pub use id::{Dpid, IdAllocator};
pub use spec::{HostSpec, Layer, LinkKind, LinkSpec, NodeRef, SwitchSpec, Topology};
