// ==========================================
// 堆场箱位分配仿真系统 - 核心库
// ==========================================
// 系统定位: 集装箱码头堆场箱位逐日分配仿真 (决策支持)
// 核心: 进箱预测 → 约束计算 → 簇分配 → 逐日推演
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 分配规则与仿真
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行参数
pub mod config;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AllocationFailure, ClusterSizing, PlacementMode};

// 领域实体
pub use domain::{
    AreaSpec, Cluster, DailyLogEntry, GlobalIndex, OccupancyPoint, Slot, SlotRange, TrendTable,
    Vessel, VesselId, VesselRecap, VesselSchedule, YardLayout, YardSnapshot, YardState,
};

// 配置
pub use config::{AllocationRules, ConfigManager, RulePreset, SimulationConfig, TieBreakPolicy};

// 引擎
pub use engine::{
    ArrivalForecaster, ClusterAllocator, ConstraintEngine, EngineError, SimulationOutcome,
    YardSimulator,
};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "堆场箱位分配仿真系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
