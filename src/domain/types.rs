// ==========================================
// 堆场箱位分配仿真系统 - 领域类型定义
// ==========================================
// 职责: 枚举型领域类型 (簇规模模式 / 分配失败原因 / 落位方式)
// 红线: 分配失败是可记录的结果, 不是致命错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 簇规模模式 (Cluster Sizing)
// ==========================================
// 决定估算簇数时的"每簇平均箱量"除数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClusterSizing {
    #[default]
    Normal,     // 每簇约 150 箱
    Aggressive, // 每簇约 100 箱
}

impl ClusterSizing {
    /// 每簇平均箱量
    pub fn avg_boxes_per_cluster(&self) -> u32 {
        match self {
            ClusterSizing::Normal => 150,
            ClusterSizing::Aggressive => 100,
        }
    }

    /// 估算所需簇数: ceil(total_boxes / avg)
    pub fn estimated_clusters(&self, total_boxes: u32) -> usize {
        total_boxes.div_ceil(self.avg_boxes_per_cluster()) as usize
    }
}

impl fmt::Display for ClusterSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterSizing::Normal => write!(f, "NORMAL"),
            ClusterSizing::Aggressive => write!(f, "AGGRESSIVE"),
        }
    }
}

impl std::str::FromStr for ClusterSizing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(ClusterSizing::Normal),
            "aggressive" => Ok(ClusterSizing::Aggressive),
            other => Err(format!("未知簇规模模式: {}", other)),
        }
    }
}

// ==========================================
// 分配失败原因 (Allocation Failure)
// ==========================================
// 由 ClusterAllocator 返回, 写入每日日志, 不中断仿真
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationFailure {
    InsufficientPlaceableSlots,   // 合法空箱位总数不足
    NoContiguousBlockLargeEnough, // 有空位, 但同一箱区内无足够长的连续段
    IntraShipGapViolation,        // 足够长的连续段均违反本船簇间距
    MaxClustersReached,           // 有合法块, 但簇数已达上限
}

impl AllocationFailure {
    /// 面向调度员的处理建议
    pub fn hint(&self) -> &'static str {
        match self {
            AllocationFailure::InsufficientPlaceableSlots => {
                "yard is saturated for this vessel; free space or relax exclusion rules"
            }
            AllocationFailure::NoContiguousBlockLargeEnough => {
                "free space is fragmented; consider a smaller block or consolidating neighbours"
            }
            AllocationFailure::IntraShipGapViolation => {
                "only blocks too close to the vessel's own stacks remain; reduce intra-ship gap"
            }
            AllocationFailure::MaxClustersReached => {
                "fragment ceiling reached; switch to aggressive cluster sizing"
            }
        }
    }
}

impl fmt::Display for AllocationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationFailure::InsufficientPlaceableSlots => write!(f, "INSUFFICIENT_PLACEABLE_SLOTS"),
            AllocationFailure::NoContiguousBlockLargeEnough => {
                write!(f, "NO_CONTIGUOUS_BLOCK_LARGE_ENOUGH")
            }
            AllocationFailure::IntraShipGapViolation => write!(f, "INTRA_SHIP_GAP_VIOLATION"),
            AllocationFailure::MaxClustersReached => write!(f, "MAX_CLUSTERS_REACHED"),
        }
    }
}

// ==========================================
// 落位方式 (Placement Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementMode {
    ExpandInPlace, // 原簇前后连续扩展
    NewBlock,      // 新开连续块
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementMode::ExpandInPlace => write!(f, "EXPAND_IN_PLACE"),
            PlacementMode::NewBlock => write!(f, "NEW_BLOCK"),
        }
    }
}
