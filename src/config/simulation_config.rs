// ==========================================
// 堆场箱位分配仿真系统 - 仿真配置
// ==========================================
// 职责: 一次仿真运行所需的全部静态参数
// 存储: JSON 文件 (由 ConfigManager 加载)
// ==========================================

use crate::config::allocation_rules::{AllocationRules, RulePreset};
use crate::domain::yard::AreaSpec;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 默认单箱位容量 (箱)
pub const DEFAULT_SLOT_CAPACITY: u32 = 30;

/// 默认 tie-break 种子
pub const DEFAULT_TIE_BREAK_SEED: u64 = 42;

/// 默认箱区行宽
pub const DEFAULT_AREA_SLOTS: u32 = 37;

/// 同尺寸候选块的选择策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakPolicy {
    /// 以固定种子随机选择, 同种子结果可复现
    Seeded(u64),
    /// 取全局索引最小的候选块
    LowestIndex,
}

impl Default for TieBreakPolicy {
    fn default() -> Self {
        TieBreakPolicy::Seeded(DEFAULT_TIE_BREAK_SEED)
    }
}

/// 规则配置: 预设档位名或完整规则对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RulesSetting {
    Preset(RulePreset),
    Custom(AllocationRules),
}

impl RulesSetting {
    pub fn resolve(&self) -> AllocationRules {
        match self {
            RulesSetting::Preset(preset) => preset.rules(),
            RulesSetting::Custom(rules) => rules.clone(),
        }
    }
}

impl Default for RulesSetting {
    fn default() -> Self {
        RulesSetting::Preset(RulePreset::Standard)
    }
}

/// 截断的仿真日期窗口 (含两端)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 仿真配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 有序箱区布局
    #[serde(default = "default_layout")]
    pub layout: Vec<AreaSpec>,

    /// 单箱位容量 (箱)
    #[serde(default = "default_slot_capacity")]
    pub slot_capacity: u32,

    /// 分配规则
    #[serde(default)]
    pub rules: RulesSetting,

    /// tie-break 策略
    #[serde(default)]
    pub tie_break: TieBreakPolicy,

    /// 可选截断窗口; 缺省为 [最早开港日, 最晚 ETD]
    #[serde(default)]
    pub window: Option<SimulationWindow>,

    /// 是否保存每日堆场快照
    #[serde(default = "default_keep_snapshots")]
    pub keep_snapshots: bool,
}

fn default_layout() -> Vec<AreaSpec> {
    ["A01", "A02", "A03", "A04"]
        .iter()
        .map(|name| AreaSpec::new(name, DEFAULT_AREA_SLOTS))
        .collect()
}

fn default_slot_capacity() -> u32 {
    DEFAULT_SLOT_CAPACITY
}

fn default_keep_snapshots() -> bool {
    true
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            slot_capacity: DEFAULT_SLOT_CAPACITY,
            rules: RulesSetting::default(),
            tie_break: TieBreakPolicy::default(),
            window: None,
            keep_snapshots: true,
        }
    }
}

impl SimulationConfig {
    /// 以布局与容量构造, 其余取默认
    pub fn new(layout: Vec<AreaSpec>, slot_capacity: u32) -> Self {
        Self {
            layout,
            slot_capacity,
            ..Self::default()
        }
    }

    pub fn with_rules(mut self, rules: AllocationRules) -> Self {
        self.rules = RulesSetting::Custom(rules);
        self
    }

    pub fn with_preset(mut self, preset: RulePreset) -> Self {
        self.rules = RulesSetting::Preset(preset);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreakPolicy) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.window = Some(SimulationWindow { start, end });
        self
    }

    /// 生效规则
    pub fn allocation_rules(&self) -> AllocationRules {
        self.rules.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: SimulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.layout.len(), 4);
        assert_eq!(config.allocation_rules(), AllocationRules::standard());
    }

    #[test]
    fn test_rules_accept_preset_name_or_object() {
        let config: SimulationConfig = serde_json::from_str(r#"{"rules":"strict"}"#).unwrap();
        assert_eq!(config.allocation_rules(), AllocationRules::strict());

        let config: SimulationConfig = serde_json::from_str(
            r#"{"rules":{"intra_ship_gap":0,"inter_ship_gap":5,"daily_exclusion_zone":2,
                "cluster_sizing":"aggressive","ignored_vessels":["MV GHOST"]}}"#,
        )
        .unwrap();
        let rules = config.allocation_rules();
        assert_eq!(rules.inter_ship_gap, 5);
        assert!(rules.is_ignored("MV GHOST"));
    }

    #[test]
    fn test_tie_break_json_forms() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"tie_break":{"seeded":7}}"#).unwrap();
        assert_eq!(config.tie_break, TieBreakPolicy::Seeded(7));
        let config: SimulationConfig =
            serde_json::from_str(r#"{"tie_break":"lowest_index"}"#).unwrap();
        assert_eq!(config.tie_break, TieBreakPolicy::LowestIndex);
    }
}
