// ==========================================
// 堆场箱位分配仿真系统 - 引擎错误类型
// ==========================================
// 职责: 仿真启动前的输入结构校验错误, 落位前的堆场一致性检查
// 红线: 分配失败不在此列 (见 AllocationFailure)
// ==========================================

use crate::domain::error::ModelError;
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("单箱位容量必须大于 0")]
    ZeroSlotCapacity,

    #[error("仿真窗口无效: {start} 晚于 {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },

    #[error("落位失败: 箱位 {slot} 已被占用或越界")]
    SlotUnavailable { slot: usize },
}

pub type EngineResult<T> = Result<T, EngineError>;
