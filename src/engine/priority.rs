// ==========================================
// 堆场箱位分配仿真系统 - 当日排序
// ==========================================
// 职责: 决定当日在港船舶的分配先后
// 规则: 总箱量降序; 相同箱量保持输入顺序 (稳定排序)
// ==========================================

use crate::domain::vessel::Vessel;
use chrono::NaiveDate;

pub struct VesselRanker {
    // 无状态引擎
}

impl VesselRanker {
    pub fn new() -> Self {
        Self {}
    }

    /// 当日在港船舶的处理顺序 (返回 vessels 下标)
    pub fn rank(&self, vessels: &[Vessel], date: NaiveDate) -> Vec<usize> {
        let mut active: Vec<usize> = vessels
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_active_on(date))
            .map(|(idx, _)| idx)
            .collect();

        // sort_by 为稳定排序
        active.sort_by(|&a, &b| {
            vessels[b]
                .schedule
                .total_boxes
                .cmp(&vessels[a].schedule.total_boxes)
        });
        active
    }
}

impl Default for VesselRanker {
    fn default() -> Self {
        Self::new()
    }
}
