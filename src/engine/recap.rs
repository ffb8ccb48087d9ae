// ==========================================
// 堆场箱位分配仿真系统 - 汇总构建
// ==========================================
// 职责: 由每日日志对账出船舶汇总; 由船舶簇状态生成簇分布
// 红线: 汇总只读日志, 不另行推算 (fulfilled + failed == requested)
// ==========================================

use crate::domain::report::{ClusterMap, DailyLogEntry, VesselRecap};
use crate::domain::vessel::Vessel;
use crate::domain::yard::YardLayout;
use std::collections::{BTreeMap, HashMap};

pub struct RecapBuilder {
    // 无状态
}

impl RecapBuilder {
    pub fn new() -> Self {
        Self {}
    }

    /// 船舶汇总 (按输入顺序)
    pub fn recaps(&self, vessels: &[Vessel], log: &[DailyLogEntry]) -> Vec<VesselRecap> {
        let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
        for entry in log {
            let slot = totals.entry(entry.vessel.as_str()).or_insert((0, 0));
            slot.0 += entry.boxes_forecast as u64;
            slot.1 += entry.boxes_unmet as u64;
        }

        vessels
            .iter()
            .map(|v| {
                let (requested, failed) = totals.get(v.name()).copied().unwrap_or((0, 0));
                VesselRecap {
                    vessel: v.name().to_string(),
                    requested_boxes: requested,
                    fulfilled_boxes: requested.saturating_sub(failed),
                    failed_boxes: failed,
                }
            })
            .collect()
    }

    /// 簇分布: 船名 → 簇下标 → ["A01:3-7", ...]
    ///
    /// 只列出非空簇; 未获任何箱位的船舶保留空表
    pub fn cluster_map(&self, vessels: &[Vessel], layout: &YardLayout) -> ClusterMap {
        vessels
            .iter()
            .map(|v| {
                let clusters: BTreeMap<usize, Vec<String>> = v
                    .non_empty_clusters()
                    .map(|(idx, cluster)| {
                        let runs = cluster
                            .runs(layout)
                            .into_iter()
                            .map(|(start, end)| layout.range_label(start, end))
                            .collect();
                        (idx, runs)
                    })
                    .collect();
                (v.name().to_string(), clusters)
            })
            .collect()
    }
}

impl Default for RecapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
