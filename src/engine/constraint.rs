// ==========================================
// 堆场箱位分配仿真系统 - 约束引擎
// ==========================================
// 职责: 计算请求船舶当日的可放置箱位集合
// 红线: 纯函数, 不修改堆场与船舶; 排除区不跨箱区边界
// ==========================================
// 三层集合:
// - free: 无主箱位
// - legal: free - 他船排除区 (排除区 / ETD 相近船间距)
// - placeable: legal - 本船各簇的簇间距区
// ==========================================

use crate::config::allocation_rules::AllocationRules;
use crate::domain::vessel::Vessel;
use crate::domain::yard::{GlobalIndex, YardLayout, YardState};
use chrono::NaiveDate;
use std::ops::Range;
use tracing::trace;

/// 本船某簇在某箱区内的簇间距区
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnZone {
    pub cluster: usize,       // 簇下标
    pub area_pos: usize,      // 箱区位置
    pub lo: GlobalIndex,      // 簇在该箱区的最小索引
    pub hi: GlobalIndex,      // 簇在该箱区的最大索引
    pub blocked: Range<usize>, // [lo - intra, hi + intra], 钳制在箱区内
}

/// 一次约束评估的结果视图
#[derive(Debug, Clone)]
pub struct PlacementView {
    legal: Vec<bool>,
    placeable: Vec<bool>,
    own_zones: Vec<OwnZone>,
}

impl PlacementView {
    /// 无主且不在他船排除区内
    pub fn is_legal(&self, idx: GlobalIndex) -> bool {
        self.legal.get(idx.0).copied().unwrap_or(false)
    }

    /// legal 且不在本船任何簇的簇间距区内
    pub fn is_placeable(&self, idx: GlobalIndex) -> bool {
        self.placeable.get(idx.0).copied().unwrap_or(false)
    }

    pub fn legal_count(&self) -> usize {
        self.legal.iter().filter(|b| **b).count()
    }

    pub fn own_zones(&self) -> &[OwnZone] {
        &self.own_zones
    }

    /// 箱位是否落在除 `except` 簇以外的本船簇间距区内
    pub fn blocked_by_other_clusters(&self, idx: GlobalIndex, except: usize) -> bool {
        self.own_zones
            .iter()
            .any(|z| z.cluster != except && z.blocked.contains(&idx.0))
    }

    /// 可放置箱位 (按全局索引有序)
    pub fn placeable_slots(&self) -> Vec<GlobalIndex> {
        collect_set(&self.placeable)
    }

    /// legal 箱位 (按全局索引有序)
    pub fn legal_slots(&self) -> Vec<GlobalIndex> {
        collect_set(&self.legal)
    }

    pub(crate) fn legal_mask(&self) -> &[bool] {
        &self.legal
    }

    pub(crate) fn placeable_mask(&self) -> &[bool] {
        &self.placeable
    }
}

fn collect_set(mask: &[bool]) -> Vec<GlobalIndex> {
    mask.iter()
        .enumerate()
        .filter(|(_, b)| **b)
        .map(|(i, _)| GlobalIndex(i))
        .collect()
}

// ==========================================
// ConstraintEngine - 约束引擎
// ==========================================
pub struct ConstraintEngine {
    // 无状态引擎
}

impl ConstraintEngine {
    pub fn new() -> Self {
        Self {}
    }

    /// 评估请求船舶当日的 legal / placeable 集合
    ///
    /// # 参数
    /// - `requester`: 请求船舶
    /// - `vessels`: 全部船舶 (可包含请求船舶本身, 按 id 跳过)
    /// - `yard`: 当前堆场占用
    /// - `layout`: 堆场布局
    /// - `date`: 当前仿真日
    /// - `rules`: 分配规则
    pub fn evaluate(
        &self,
        requester: &Vessel,
        vessels: &[Vessel],
        yard: &YardState,
        layout: &YardLayout,
        date: NaiveDate,
        rules: &AllocationRules,
    ) -> PlacementView {
        let total = layout.total_slots();
        let mut legal: Vec<bool> = (0..total).map(|i| yard.is_free(GlobalIndex(i))).collect();

        // 1. 他船排除区
        for other in vessels {
            if other.id == requester.id
                || !other.is_active_on(date)
                || rules.is_ignored(other.name())
            {
                continue;
            }

            let etd_close = requester.schedule.etd_within_one_day(&other.schedule);
            let gap = rules.required_gap(etd_close);

            for (_, cluster) in other.non_empty_clusters() {
                for (_, lo, hi) in cluster.area_bounds(layout) {
                    let zone = layout.widen_within_area(lo, hi, gap);
                    trace!(
                        other = other.name(),
                        gap,
                        zone = ?zone,
                        "他船排除区"
                    );
                    for i in zone {
                        legal[i] = false;
                    }
                }
            }
        }

        // 2. 本船簇间距区
        let mut own_zones = Vec::new();
        for (cluster_idx, cluster) in requester.non_empty_clusters() {
            for (area_pos, lo, hi) in cluster.area_bounds(layout) {
                own_zones.push(OwnZone {
                    cluster: cluster_idx,
                    area_pos,
                    lo,
                    hi,
                    blocked: layout.widen_within_area(lo, hi, rules.intra_ship_gap),
                });
            }
        }

        let mut placeable = legal.clone();
        for zone in &own_zones {
            for i in zone.blocked.clone() {
                placeable[i] = false;
            }
        }

        PlacementView {
            legal,
            placeable,
            own_zones,
        }
    }

    /// 可放置箱位 (按全局索引有序)
    pub fn placeable_slots(
        &self,
        requester: &Vessel,
        vessels: &[Vessel],
        yard: &YardState,
        layout: &YardLayout,
        date: NaiveDate,
        rules: &AllocationRules,
    ) -> Vec<GlobalIndex> {
        self.evaluate(requester, vessels, yard, layout, date, rules)
            .placeable_slots()
    }
}

impl Default for ConstraintEngine {
    fn default() -> Self {
        Self::new()
    }
}
