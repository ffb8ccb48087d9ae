// ==========================================
// 堆场箱位分配仿真系统 - 领域模型错误类型
// ==========================================
// 职责: 堆场布局 / 船期记录的结构性校验错误
// 工具: thiserror 派生宏
// ==========================================

use chrono::NaiveDate;
use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    // ===== 堆场布局 =====
    #[error("堆场布局为空: 至少需要一个箱区")]
    EmptyLayout,

    #[error("箱区名称为空 (第 {0} 个箱区)")]
    BlankAreaName(usize),

    #[error("箱区重复: {0}")]
    DuplicateArea(String),

    #[error("箱区 {0} 的箱位数为 0")]
    EmptyArea(String),

    #[error("箱区不存在: {0}")]
    UnknownArea(String),

    #[error("箱位超出范围: {area}:{number} (箱区共 {size} 个箱位)")]
    SlotOutOfRange { area: String, number: u32, size: u32 },

    #[error("箱位区间格式错误: {0}（期望 AREA:START-END）")]
    MalformedSlotRange(String),

    // ===== 船期 =====
    #[error("船名为空 (第 {0} 条船期)")]
    BlankVesselName(usize),

    #[error("船名重复: {0}")]
    DuplicateVessel(String),

    #[error("船舶 {vessel} 的开港日 {open_stacking} 晚于 ETD {etd}")]
    InvertedWindow {
        vessel: String,
        open_stacking: NaiveDate,
        etd: NaiveDate,
    },
}

pub type ModelResult<T> = Result<T, ModelError>;
