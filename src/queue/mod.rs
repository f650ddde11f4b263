//! 队列策略（Queue disciplines）
//!
//! 只负责“对哪条链路的哪个接口施加什么策略”的规划；真正执行 `tc` / `ovs-vsctl`
//! 的是外部旁路，通过 `QdiscApplier` 接入。链路按 `LinkKind` 类型筛选。

mod plan;
mod policy;

pub use plan::{DryRun, QdiscAction, QdiscApplier, Target, apply_all, plan};
pub use policy::{QdiscError, QdiscKind, Rate, ShapingOpts};
