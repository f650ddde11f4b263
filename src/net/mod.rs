//! 网络仿真器接口
//!
//! 拓扑规格通过 `Emulator` 交给外部网络仿真器（创建交换机、主机、带宽/时延链路）。
//! `Fabric` 是一个内存实现，只记录节点与邻接关系，用于汇总输出与测试。

// 子模块声明
mod emulator;
mod fabric;
mod id;
mod link;
mod node;

// 重新导出公共接口
pub use emulator::{Deployment, Emulator, deploy};
pub use fabric::Fabric;
pub use id::{LinkId, NodeId};
pub use link::Link;
pub use node::{Node, NodeKind};
