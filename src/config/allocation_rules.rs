// ==========================================
// 堆场箱位分配仿真系统 - 分配规则
// ==========================================
// 用途：
// - 一次运行构造一次的规则值对象, 不随仿真变化;
// - 三档预设 (strict / standard / relaxed) 以具名构造函数提供。
// ==========================================

use crate::domain::types::ClusterSizing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 分配规则
///
/// 间距单位均为箱位: 间距 g 表示两个占用区间之间至少隔开 g 个箱位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationRules {
    /// 同一船舶两个簇之间的最小间距
    pub intra_ship_gap: u32,

    /// ETD 相差不超过 1 天的两船之间的最小间距
    pub inter_ship_gap: u32,

    /// 与任一在港船舶簇之间的最小间距 (不看 ETD)
    pub daily_exclusion_zone: u32,

    /// 簇规模模式 (决定 max_clusters)
    #[serde(default)]
    pub cluster_sizing: ClusterSizing,

    /// 不对其他船舶施加排除区的船名
    #[serde(default)]
    pub ignored_vessels: BTreeSet<String>,
}

impl AllocationRules {
    /// 严格档: 间距最大, 适合作业高峰
    pub fn strict() -> Self {
        Self {
            intra_ship_gap: 2,
            inter_ship_gap: 4,
            daily_exclusion_zone: 2,
            cluster_sizing: ClusterSizing::Normal,
            ignored_vessels: BTreeSet::new(),
        }
    }

    /// 标准档
    pub fn standard() -> Self {
        Self {
            intra_ship_gap: 1,
            inter_ship_gap: 2,
            daily_exclusion_zone: 1,
            cluster_sizing: ClusterSizing::Normal,
            ignored_vessels: BTreeSet::new(),
        }
    }

    /// 宽松档: 只保留 ETD 相近船舶之间的 1 格间隔
    pub fn relaxed() -> Self {
        Self {
            intra_ship_gap: 0,
            inter_ship_gap: 1,
            daily_exclusion_zone: 0,
            cluster_sizing: ClusterSizing::Aggressive,
            ignored_vessels: BTreeSet::new(),
        }
    }

    pub fn with_cluster_sizing(mut self, sizing: ClusterSizing) -> Self {
        self.cluster_sizing = sizing;
        self
    }

    pub fn with_ignored_vessel(mut self, vessel: &str) -> Self {
        self.ignored_vessels.insert(vessel.trim().to_string());
        self
    }

    pub fn is_ignored(&self, vessel: &str) -> bool {
        self.ignored_vessels.contains(vessel)
    }

    /// 两船之间生效的间距: ETD 相近时取排除区与船间距的较大者
    pub fn required_gap(&self, etd_within_one_day: bool) -> u32 {
        if etd_within_one_day {
            self.daily_exclusion_zone.max(self.inter_ship_gap)
        } else {
            self.daily_exclusion_zone
        }
    }
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self::standard()
    }
}

/// 规则预设档位
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RulePreset {
    Strict,
    #[default]
    Standard,
    Relaxed,
}

impl RulePreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            RulePreset::Strict => "strict",
            RulePreset::Standard => "standard",
            RulePreset::Relaxed => "relaxed",
        }
    }

    pub fn title_cn(&self) -> &'static str {
        match self {
            RulePreset::Strict => "严格间距",
            RulePreset::Standard => "标准间距",
            RulePreset::Relaxed => "宽松间距",
        }
    }

    pub fn rules(&self) -> AllocationRules {
        match self {
            RulePreset::Strict => AllocationRules::strict(),
            RulePreset::Standard => AllocationRules::standard(),
            RulePreset::Relaxed => AllocationRules::relaxed(),
        }
    }
}

impl std::str::FromStr for RulePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "ketat" => Ok(RulePreset::Strict),
            "standard" | "normal" => Ok(RulePreset::Standard),
            "relaxed" | "longgar" => Ok(RulePreset::Relaxed),
            other => Err(format!("未知规则档位: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_ordered_by_strictness() {
        let strict = AllocationRules::strict();
        let standard = AllocationRules::standard();
        let relaxed = AllocationRules::relaxed();
        assert!(strict.inter_ship_gap > standard.inter_ship_gap);
        assert!(standard.inter_ship_gap > relaxed.inter_ship_gap);
        assert!(strict.daily_exclusion_zone >= standard.daily_exclusion_zone);
    }

    #[test]
    fn test_required_gap_uses_wider_zone_for_close_etds() {
        let rules = AllocationRules::standard();
        assert_eq!(rules.required_gap(false), 1);
        assert_eq!(rules.required_gap(true), 2);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("STRICT".parse::<RulePreset>(), Ok(RulePreset::Strict));
        assert_eq!(" relaxed ".parse::<RulePreset>(), Ok(RulePreset::Relaxed));
        assert!("chaos".parse::<RulePreset>().is_err());
        assert_eq!(RulePreset::default(), RulePreset::Standard);
        assert_eq!(RulePreset::default().rules(), AllocationRules::default());
    }

    #[test]
    fn test_rules_deserialize_with_defaults() {
        let rules: AllocationRules = serde_json::from_str(
            r#"{"intra_ship_gap":1,"inter_ship_gap":3,"daily_exclusion_zone":1}"#,
        )
        .unwrap();
        assert_eq!(rules.cluster_sizing, ClusterSizing::Normal);
        assert!(rules.ignored_vessels.is_empty());
    }
}
