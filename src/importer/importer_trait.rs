// ==========================================
// 堆场箱位分配仿真系统 - 导入接口
// ==========================================
// 职责: 定义文件解析 / 行映射两个阶段的接口
// 阶段 0: 文件 → 原始行 (列名 → 文本)
// 阶段 1: 原始行 → 领域记录 (含类型转换与校验)
// ==========================================

use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 原始行: 列名 → 去首尾空白后的文本
pub type RawRow = HashMap<String, String>;

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser / ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始行记录
    ///
    /// # 返回
    /// - Ok(rows): 已跳过完全空白的行
    /// - Err: 文件不存在 / 格式不支持 / 读取失败
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRow>>;
}

// ==========================================
// RowMapper Trait
// ==========================================
// 实现者: ScheduleImporter (VesselSchedule)
pub trait RowMapper<T>: Send + Sync {
    /// 映射单行
    ///
    /// # 参数
    /// - row: 原始行
    /// - row_number: 文件行号 (表头为第 1 行)
    fn map_row(&self, row: &RawRow, row_number: usize) -> ImportResult<T>;
}
