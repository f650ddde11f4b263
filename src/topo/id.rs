//! 交换机 datapath 标识分配
//!
//! 取代进程级的全局计数器：分配器是一个普通值，由调用方持有并传入构建函数。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 交换机 datapath id（64 位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dpid(pub u64);

impl fmt::Display for Dpid {
    /// 16 位小写十六进制，与 OpenFlow 控制器期望的格式一致。
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// 单调递增的 datapath id 分配器
#[derive(Debug, Clone)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub const DEFAULT_BASE: u64 = 0x100;

    /// 以 `base` 为起点；第一次分配得到 `base + 1`。
    pub fn new(base: u64) -> Self {
        Self { last: base }
    }

    pub fn next_dpid(&mut self) -> Dpid {
        self.last = self.last.wrapping_add(1);
        Dpid(self.last)
    }

    /// 最近一次分配出去的值（尚未分配时为 base）
    pub fn last(&self) -> u64 {
        self.last
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE)
    }
}
