// ==========================================
// 堆场箱位分配仿真系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、输出结构
// 红线: 不含引擎逻辑, 不含文件读写
// ==========================================

pub mod error;
pub mod report;
pub mod trend;
pub mod types;
pub mod vessel;
pub mod yard;

// 重导出核心类型
pub use error::{ModelError, ModelResult};
pub use report::{ClusterMap, DailyLogEntry, OccupancyPoint, VesselRecap, YardSnapshot};
pub use trend::TrendTable;
pub use types::{AllocationFailure, ClusterSizing, PlacementMode};
pub use vessel::{Cluster, Vessel, VesselId, VesselSchedule};
pub use yard::{AreaExtent, AreaSpec, GlobalIndex, Slot, SlotRange, YardLayout, YardState};
