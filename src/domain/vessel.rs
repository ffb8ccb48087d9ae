// ==========================================
// 堆场箱位分配仿真系统 - 船舶领域模型
// ==========================================
// 职责: 船期记录 (VesselSchedule) / 船舶分配状态 (Vessel) / 簇 (Cluster)
// 红线: 簇只增不清, 离港释放只清堆场占用位, 不清簇
// ==========================================

use crate::domain::types::ClusterSizing;
use crate::domain::yard::{GlobalIndex, YardLayout};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// VesselId - 船舶在本次运行中的编号
// ==========================================
// 等于船舶在输入船期中的下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VesselId(pub usize);

impl VesselId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VesselId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ==========================================
// VesselSchedule - 船期记录 (外部输入)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselSchedule {
    pub vessel: String,            // 船名 (唯一)
    pub service: String,           // 航线代码
    pub total_boxes: u32,          // 总箱量
    pub open_stacking: NaiveDate,  // 开港日
    pub etd: NaiveDate,            // 预计离港日 (含)
}

impl VesselSchedule {
    /// 开港天数 (开港日至 ETD, 含两端)
    pub fn open_days(&self) -> usize {
        let days = (self.etd - self.open_stacking).num_days();
        if days < 0 {
            0
        } else {
            days as usize + 1
        }
    }

    /// 当日是否在集港窗口内 (开港日 <= date <= ETD)
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.open_stacking <= date && date <= self.etd
    }

    /// 相对开港日的天数偏移
    pub fn day_offset(&self, date: NaiveDate) -> Option<usize> {
        if !self.is_active_on(date) {
            return None;
        }
        Some((date - self.open_stacking).num_days() as usize)
    }

    /// 两船 ETD 是否相差不超过 1 天
    pub fn etd_within_one_day(&self, other: &VesselSchedule) -> bool {
        (self.etd - other.etd).num_days().abs() <= 1
    }
}

// ==========================================
// Cluster - 簇
// ==========================================
// 箱位按全局索引有序保存; 连续性是分配目标, 不是结构约束
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    slots: Vec<GlobalIndex>,
}

impl Cluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[GlobalIndex] {
        &self.slots
    }

    pub fn first(&self) -> Option<GlobalIndex> {
        self.slots.first().copied()
    }

    pub fn last(&self) -> Option<GlobalIndex> {
        self.slots.last().copied()
    }

    /// 并入新箱位并保持有序
    pub fn absorb(&mut self, slots: &[GlobalIndex]) {
        self.slots.extend_from_slice(slots);
        self.slots.sort_unstable();
        self.slots.dedup();
    }

    /// 按箱区拆分后的 (最小, 最大) 全局索引
    ///
    /// 排除区计算只在簇自身所在箱区内进行
    pub fn area_bounds(&self, layout: &YardLayout) -> Vec<(usize, GlobalIndex, GlobalIndex)> {
        let mut bounds: Vec<(usize, GlobalIndex, GlobalIndex)> = Vec::new();
        for &idx in &self.slots {
            let Some(pos) = layout.area_pos_of(idx) else {
                continue;
            };
            match bounds.iter_mut().find(|(p, _, _)| *p == pos) {
                Some((_, lo, hi)) => {
                    *lo = (*lo).min(idx);
                    *hi = (*hi).max(idx);
                }
                None => bounds.push((pos, idx, idx)),
            }
        }
        bounds
    }

    /// 连续段 (同一箱区内相邻索引), 每段为 (起, 止)
    pub fn runs(&self, layout: &YardLayout) -> Vec<(GlobalIndex, GlobalIndex)> {
        let mut runs: Vec<(GlobalIndex, GlobalIndex)> = Vec::new();
        for &idx in &self.slots {
            match runs.last_mut() {
                Some((_, end))
                    if end.0 + 1 == idx.0
                        && layout.area_pos_of(*end) == layout.area_pos_of(idx) =>
                {
                    *end = idx;
                }
                _ => runs.push((idx, idx)),
            }
        }
        runs
    }
}

// ==========================================
// Vessel - 船舶 (含分配状态)
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct Vessel {
    pub id: VesselId,
    pub schedule: VesselSchedule,

    // ===== 派生 =====
    pub forecast: Vec<u32>, // 每日进箱预测 (总和 == total_boxes)

    // ===== 分配状态 =====
    pub clusters: Vec<Cluster>,
    pub max_clusters: usize,
    pub rollover_capacity: u32, // 已持箱位中未用完的容量 (箱)
}

impl Vessel {
    /// 创建船舶并按估算需求预置空簇
    ///
    /// 预置簇数 = ceil(total / avg), 上限 = 预置簇数 + 2
    pub fn new(
        id: VesselId,
        schedule: VesselSchedule,
        forecast: Vec<u32>,
        sizing: ClusterSizing,
    ) -> Self {
        let estimated = sizing.estimated_clusters(schedule.total_boxes);
        Self {
            id,
            schedule,
            forecast,
            clusters: vec![Cluster::new(); estimated],
            max_clusters: estimated + 2,
            rollover_capacity: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.schedule.vessel
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.schedule.is_active_on(date)
    }

    /// 当日预测进箱量 (窗口外为 0)
    pub fn boxes_on(&self, date: NaiveDate) -> u32 {
        self.schedule
            .day_offset(date)
            .and_then(|offset| self.forecast.get(offset).copied())
            .unwrap_or(0)
    }

    /// 非空簇 (下标, 簇)
    pub fn non_empty_clusters(&self) -> impl Iterator<Item = (usize, &Cluster)> {
        self.clusters.iter().enumerate().filter(|(_, c)| !c.is_empty())
    }

    /// 各簇箱位数之和
    pub fn clustered_slot_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::yard::AreaSpec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn schedule(total: u32, open: u32, etd: u32) -> VesselSchedule {
        VesselSchedule {
            vessel: "MV ALPHA".to_string(),
            service: "SVC1".to_string(),
            total_boxes: total,
            open_stacking: date(open),
            etd: date(etd),
        }
    }

    #[test]
    fn test_window_helpers() {
        let s = schedule(30, 1, 3);
        assert_eq!(s.open_days(), 3);
        assert!(s.is_active_on(date(3)));
        assert!(!s.is_active_on(date(4)));
        assert_eq!(s.day_offset(date(2)), Some(1));
        assert_eq!(s.day_offset(date(4)), None);
    }

    #[test]
    fn test_vessel_presizes_clusters() {
        let v = Vessel::new(VesselId(0), schedule(310, 1, 5), vec![62; 5], ClusterSizing::Normal);
        assert_eq!(v.clusters.len(), 3);
        assert_eq!(v.max_clusters, 5);
        assert!(v.clusters.iter().all(Cluster::is_empty));
    }

    #[test]
    fn test_cluster_runs_split_at_area_boundary() {
        let layout = YardLayout::new(&[AreaSpec::new("A01", 3), AreaSpec::new("A02", 3)]).unwrap();
        let mut cluster = Cluster::new();
        cluster.absorb(&[GlobalIndex(2), GlobalIndex(1), GlobalIndex(3)]);
        assert_eq!(
            cluster.runs(&layout),
            vec![(GlobalIndex(1), GlobalIndex(2)), (GlobalIndex(3), GlobalIndex(3))]
        );
        assert_eq!(cluster.area_bounds(&layout).len(), 2);
    }
}
