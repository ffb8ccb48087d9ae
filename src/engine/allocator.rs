// ==========================================
// 堆场箱位分配仿真系统 - 簇分配器
// ==========================================
// 职责: 为一条船的当日需求选定箱位并落位
// 红线: 失败时不得部分落位; 计划阶段只读, 落位阶段才写
// ==========================================
// 决策顺序:
// 1) 原地扩展: 已有簇首位之前 / 末位之后的 need 个箱位
// 2) 新连续块: 同箱区 placeable 连续段, 最小适配 + tie-break
// 3) 簇槽位: 首个空簇, 否则在上限内新建
// ==========================================

use crate::config::allocation_rules::AllocationRules;
use crate::config::simulation_config::TieBreakPolicy;
use crate::domain::types::{AllocationFailure, PlacementMode};
use crate::domain::vessel::{Cluster, Vessel};
use crate::domain::yard::{GlobalIndex, YardLayout, YardState};
use crate::engine::constraint::{ConstraintEngine, PlacementView};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, warn};

/// 分配计划 (尚未写入堆场)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub slots: Vec<GlobalIndex>, // 有序
    pub cluster_index: usize,    // 目标簇下标 (== clusters.len() 时新建)
    pub mode: PlacementMode,
}

/// 同尺寸候选块选择器
enum TieBreaker {
    Seeded(ChaCha8Rng),
    LowestIndex,
}

impl TieBreaker {
    fn from_policy(policy: TieBreakPolicy) -> Self {
        match policy {
            TieBreakPolicy::Seeded(seed) => TieBreaker::Seeded(ChaCha8Rng::seed_from_u64(seed)),
            TieBreakPolicy::LowestIndex => TieBreaker::LowestIndex,
        }
    }

    /// 在 n 个候选中选一个 (n >= 1)
    fn pick(&mut self, n: usize) -> usize {
        match self {
            _ if n <= 1 => 0,
            TieBreaker::Seeded(rng) => rng.random_range(0..n),
            TieBreaker::LowestIndex => 0,
        }
    }
}

// ==========================================
// ClusterAllocator - 簇分配器
// ==========================================
pub struct ClusterAllocator {
    constraint: ConstraintEngine,
    tie_breaker: TieBreaker,
}

impl ClusterAllocator {
    pub fn new(policy: TieBreakPolicy) -> Self {
        Self {
            constraint: ConstraintEngine::new(),
            tie_breaker: TieBreaker::from_policy(policy),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 分配 = 计划 + 落位
    ///
    /// # 返回
    /// - Ok(Some(placement)): 已落位
    /// - Ok(None): 需求为 0 (或船舶编号无效), 无任何修改
    /// - Err(failure): 分配失败, 无任何修改
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, vessels, yard, layout, rules), fields(vessel = index))]
    pub fn allocate(
        &mut self,
        index: usize,
        slots_needed: usize,
        vessels: &mut [Vessel],
        yard: &mut YardState,
        layout: &YardLayout,
        date: NaiveDate,
        rules: &AllocationRules,
    ) -> Result<Option<Placement>, AllocationFailure> {
        if slots_needed == 0 || index >= vessels.len() {
            return Ok(None);
        }

        let snapshot: &[Vessel] = vessels;
        let placement = self.plan(
            &snapshot[index],
            slots_needed,
            snapshot,
            yard,
            layout,
            date,
            rules,
        )?;

        if let Err(err) = Self::commit(&placement, &mut vessels[index], yard) {
            // 计划与落位之间堆场未变, 不应发生
            warn!(%err, "落位失败, 按箱位不足处理");
            return Err(AllocationFailure::InsufficientPlaceableSlots);
        }
        Ok(Some(placement))
    }

    /// 计划阶段: 只读地选出箱位与目标簇
    #[allow(clippy::too_many_arguments)]
    pub fn plan(
        &mut self,
        requester: &Vessel,
        slots_needed: usize,
        vessels: &[Vessel],
        yard: &YardState,
        layout: &YardLayout,
        date: NaiveDate,
        rules: &AllocationRules,
    ) -> Result<Placement, AllocationFailure> {
        let view = self
            .constraint
            .evaluate(requester, vessels, yard, layout, date, rules);

        // 1. 原地扩展
        if let Some(placement) = self.try_expand(requester, slots_needed, &view, layout) {
            debug!(
                vessel = requester.name(),
                cluster = placement.cluster_index,
                slots = slots_needed,
                "原地扩展"
            );
            return Ok(placement);
        }

        // 2. 新连续块
        let Some(block) = self.find_new_block(slots_needed, &view, layout) else {
            let failure = classify_failure(slots_needed, &view, layout);
            debug!(vessel = requester.name(), %failure, "无可用连续块");
            return Err(failure);
        };

        // 3. 簇槽位
        let cluster_index = match requester.clusters.iter().position(Cluster::is_empty) {
            Some(idx) => idx,
            None if requester.clusters.len() < requester.max_clusters => requester.clusters.len(),
            None => {
                debug!(
                    vessel = requester.name(),
                    max_clusters = requester.max_clusters,
                    "簇数已达上限"
                );
                return Err(AllocationFailure::MaxClustersReached);
            }
        };

        debug!(
            vessel = requester.name(),
            cluster = cluster_index,
            start = block[0].0,
            slots = slots_needed,
            "新开连续块"
        );
        Ok(Placement {
            slots: block,
            cluster_index,
            mode: PlacementMode::NewBlock,
        })
    }

    /// 落位阶段: 写入堆场并并入目标簇
    ///
    /// 任一箱位已被占用 (过期计划) 时返回错误, 堆场与簇均不修改
    pub fn commit(
        placement: &Placement,
        vessel: &mut Vessel,
        yard: &mut YardState,
    ) -> EngineResult<()> {
        if let Some(&taken) = placement.slots.iter().find(|&&s| !yard.is_free(s)) {
            return Err(EngineError::SlotUnavailable { slot: taken.0 });
        }
        for &slot in &placement.slots {
            let assigned = yard.assign(slot, vessel.id);
            debug_assert!(assigned);
        }
        if placement.cluster_index >= vessel.clusters.len() {
            vessel.clusters.push(Cluster::new());
        }
        let last = vessel.clusters.len() - 1;
        let target = placement.cluster_index.min(last);
        vessel.clusters[target].absorb(&placement.slots);
        Ok(())
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 在已有簇的两端尝试扩展 (先前后后)
    fn try_expand(
        &self,
        requester: &Vessel,
        need: usize,
        view: &PlacementView,
        layout: &YardLayout,
    ) -> Option<Placement> {
        for (cluster_idx, cluster) in requester.non_empty_clusters() {
            let (Some(first), Some(last)) = (cluster.first(), cluster.last()) else {
                continue;
            };

            let usable = |idx: usize| {
                view.is_legal(GlobalIndex(idx))
                    && !view.blocked_by_other_clusters(GlobalIndex(idx), cluster_idx)
            };

            // 首位之前
            if let Some(pos) = layout.area_pos_of(first) {
                let span = layout.areas()[pos].span();
                if first.0 >= span.start + need {
                    let window = first.0 - need..first.0;
                    if window.clone().all(usable) {
                        return Some(Placement {
                            slots: window.map(GlobalIndex).collect(),
                            cluster_index: cluster_idx,
                            mode: PlacementMode::ExpandInPlace,
                        });
                    }
                }
            }

            // 末位之后
            if let Some(pos) = layout.area_pos_of(last) {
                let span = layout.areas()[pos].span();
                if last.0 + need < span.end {
                    let window = last.0 + 1..last.0 + 1 + need;
                    if window.clone().all(usable) {
                        return Some(Placement {
                            slots: window.map(GlobalIndex).collect(),
                            cluster_index: cluster_idx,
                            mode: PlacementMode::ExpandInPlace,
                        });
                    }
                }
            }
        }
        None
    }

    /// 最小适配的新连续块 (取候选段的前 need 个箱位)
    ///
    /// 候选取自 placeable 掩码, 簇间距区已排除在外
    fn find_new_block(
        &mut self,
        need: usize,
        view: &PlacementView,
        layout: &YardLayout,
    ) -> Option<Vec<GlobalIndex>> {
        let candidates: Vec<(usize, usize)> = area_runs(view.placeable_mask(), layout)
            .into_iter()
            .filter(|&(_, len)| len >= need)
            .collect();

        let best_len = candidates.iter().map(|&(_, len)| len).min()?;
        let tied: Vec<usize> = candidates
            .iter()
            .filter(|&&(_, len)| len == best_len)
            .map(|&(start, _)| start)
            .collect();

        let start = tied[self.tie_breaker.pick(tied.len())];
        Some((start..start + need).map(GlobalIndex).collect())
    }
}

/// 掩码在各箱区内的极大连续段, 每段为 (起始全局索引, 长度)
fn area_runs(mask: &[bool], layout: &YardLayout) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    for area in layout.areas() {
        let mut run_start: Option<usize> = None;
        for i in area.span() {
            match (mask.get(i).copied().unwrap_or(false), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(s)) => {
                    runs.push((s, i - s));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = run_start {
            runs.push((s, area.span().end - s));
        }
    }
    runs
}

/// 失败原因分类
///
/// 1) legal 数量不足 → InsufficientPlaceableSlots
/// 2) 无足够长的 legal 同箱区连续段 → NoContiguousBlockLargeEnough
/// 3) 有 legal 段但均被簇间距排除 → IntraShipGapViolation
fn classify_failure(need: usize, view: &PlacementView, layout: &YardLayout) -> AllocationFailure {
    if view.legal_count() < need {
        return AllocationFailure::InsufficientPlaceableSlots;
    }
    let longest_legal = area_runs(view.legal_mask(), layout)
        .into_iter()
        .map(|(_, len)| len)
        .max()
        .unwrap_or(0);
    if longest_legal < need {
        return AllocationFailure::NoContiguousBlockLargeEnough;
    }
    AllocationFailure::IntraShipGapViolation
}
