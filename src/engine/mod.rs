// ==========================================
// 堆场箱位分配仿真系统 - 引擎层
// ==========================================
// 职责: 进箱预测 / 约束计算 / 簇分配 / 逐日仿真 / 审计
// 红线: 引擎不读写文件; 分配失败必须输出原因码
// ==========================================

pub mod allocator;
pub mod audit;
pub mod constraint;
pub mod error;
pub mod forecaster;
pub mod priority;
pub mod recap;
pub mod row_merge;
pub mod simulation;

// 重导出核心引擎
pub use allocator::{ClusterAllocator, Placement};
pub use audit::{check_outcome, check_state, AuditViolation};
pub use constraint::{ConstraintEngine, OwnZone, PlacementView};
pub use error::{EngineError, EngineResult};
pub use forecaster::ArrivalForecaster;
pub use priority::VesselRanker;
pub use recap::RecapBuilder;
pub use row_merge::{merge_area_row, merge_service_row, RowMerge, RowSpan};
pub use simulation::{SimulationOutcome, YardSimulator};
