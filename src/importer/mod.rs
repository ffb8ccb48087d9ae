// ==========================================
// 堆场箱位分配仿真系统 - 导入层
// ==========================================
// 职责: 外部船期 / 趋势文件 → 已校验的领域记录
// 支持: Excel, CSV
// 红线: 引擎不依赖本层; 本层只产出领域类型
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod schedule_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{normalize_header, parse_date_text, FieldMapper, StandardField};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use importer_trait::{FileParser, RawRow, RowMapper};
pub use schedule_importer::{ScheduleImporter, TrendImporter};
