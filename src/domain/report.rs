// ==========================================
// 堆场箱位分配仿真系统 - 仿真输出领域模型
// ==========================================
// 职责: 每日分配日志 / 占用率序列 / 船舶汇总 / 簇分布 / 每日快照
// 用途: 供外部报表 / 可视化层只读消费
// ==========================================

use crate::domain::types::{AllocationFailure, PlacementMode};
use crate::domain::vessel::VesselId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// DailyLogEntry - 每日分配日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyLogEntry {
    pub date: NaiveDate,
    pub vessel: String,

    // ===== 需求 =====
    pub boxes_forecast: u32,  // 当日预测进箱
    pub boxes_needed: u32,    // 扣除结转容量后的有效需求
    pub slots_needed: u32,

    // ===== 结果 =====
    pub slots_granted: u32,
    pub slots_unmet: u32,
    pub boxes_unmet: u32,     // 按未满足箱位折算的未满足箱量
    pub placement: Option<PlacementMode>,
    pub cluster_index: Option<usize>,
    pub failure: Option<AllocationFailure>,
    pub rollover_after: u32,  // 当日结束时的结转容量

    // ===== 可解释性 =====
    pub recommendation: String,
}

impl DailyLogEntry {
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

// ==========================================
// OccupancyPoint - 每日堆场占用
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyPoint {
    pub date: NaiveDate,
    pub occupied_slots: usize,
    pub occupied_capacity_boxes: u64, // occupied_slots * slot_capacity
    pub occupancy_pct: f64,           // YOR, 百分比
}

// ==========================================
// VesselRecap - 船舶最终汇总
// ==========================================
// 红线: fulfilled + failed == requested, 由日志对账得出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselRecap {
    pub vessel: String,
    pub requested_boxes: u64,
    pub fulfilled_boxes: u64,
    pub failed_boxes: u64,
}

impl VesselRecap {
    /// 满足率 (0.0 - 1.0); 无需求视为全部满足
    pub fn fulfilment_ratio(&self) -> f64 {
        if self.requested_boxes == 0 {
            return 1.0;
        }
        self.fulfilled_boxes as f64 / self.requested_boxes as f64
    }
}

// ==========================================
// ClusterMap - 簇分布 (船名 → 簇下标 → 连续段文本)
// ==========================================
pub type ClusterMap = BTreeMap<String, BTreeMap<usize, Vec<String>>>;

// ==========================================
// YardSnapshot - 每日堆场快照
// ==========================================
// 按全局索引顺序记录占用船舶编号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YardSnapshot {
    pub date: NaiveDate,
    pub owners: Vec<Option<VesselId>>,
}

impl YardSnapshot {
    pub fn occupied_count(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }
}
