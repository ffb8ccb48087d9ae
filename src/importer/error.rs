// ==========================================
// 堆场箱位分配仿真系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 行号约定: 表头为第 1 行, 数据从第 2 行开始
// 红线: 任一行出错即整表拒绝
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("不支持的文件扩展名 \"{0}\" (可用: csv / xlsx / xls)")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel 解析失败: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Excel 工作簿结构无效: {0}")]
    EmptyWorkbook(&'static str),

    // ===== 列 / 单元格 =====
    #[error("缺少必需列 {column} (表头: {available})")]
    MissingColumn { column: String, available: String },

    #[error("第 {row} 行 {field} 为空")]
    MissingValue { row: usize, field: String },

    #[error("第 {row} 行 {field} 无法转换: {message}")]
    TypeConversionError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("第 {row} 行 {field} 日期无法识别: {value}")]
    DateFormatError {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 船期整表校验 =====
    #[error("第 {row} 行船名重复: {vessel}")]
    DuplicateVessel { row: usize, vessel: String },

    #[error("第 {row} 行 {vessel} 的开港日晚于 ETD")]
    InvertedWindow { row: usize, vessel: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
