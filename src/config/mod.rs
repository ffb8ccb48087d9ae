// ==========================================
// 堆场箱位分配仿真系统 - 配置层
// ==========================================
// 职责: 分配规则预设 / 仿真参数 / 配置文件加载与覆写
// 存储: JSON 文件
// ==========================================

pub mod allocation_rules;
pub mod config_manager;
pub mod simulation_config;

// 重导出核心配置
pub use allocation_rules::{AllocationRules, RulePreset};
pub use config_manager::{ConfigError, ConfigManager, ConfigResult};
pub use simulation_config::{
    RulesSetting, SimulationConfig, SimulationWindow, TieBreakPolicy, DEFAULT_SLOT_CAPACITY,
    DEFAULT_TIE_BREAK_SEED,
};
