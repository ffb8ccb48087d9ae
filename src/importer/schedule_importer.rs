// ==========================================
// 堆场箱位分配仿真系统 - 船期 / 趋势导入器
// ==========================================
// 职责: 文件 → 已校验的 VesselSchedule 列表 / TrendTable
// 红线: 校验失败整表拒绝, 不做部分导入
// ==========================================
// 船期校验:
// - 船名 / 航线非空
// - 船名唯一
// - 箱量为非负整数
// - 开港日 <= ETD
// 趋势表:
// - 航线列 + 日列 (day1 / d1 / hari1 / 1 ...), 按日序排列
// - 空单元格为缺失值, 允许 % 后缀
// ==========================================

use crate::domain::trend::TrendTable;
use crate::domain::vessel::VesselSchedule;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{normalize_header, parse_percent_text, FieldMapper, StandardField};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{RawRow, RowMapper};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, instrument, warn};

/// 数据首行的文件行号 (表头为第 1 行)
const FIRST_DATA_ROW: usize = 2;

// ==========================================
// ScheduleImporter - 船期导入器
// ==========================================
pub struct ScheduleImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl ScheduleImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    /// 从文件导入船期
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<VesselSchedule>> {
        let rows = self.parser.parse(path.as_ref())?;
        let schedules = self.import_rows(&rows)?;
        info!(vessels = schedules.len(), "船期导入完成");
        Ok(schedules)
    }

    /// 从原始行导入船期 (含整表校验)
    pub fn import_rows(&self, rows: &[RawRow]) -> ImportResult<Vec<VesselSchedule>> {
        if let Some(first) = rows.first() {
            self.check_columns(first)?;
        }

        let mut seen: HashSet<String> = HashSet::with_capacity(rows.len());
        let mut schedules = Vec::with_capacity(rows.len());

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + FIRST_DATA_ROW;
            let schedule = self.map_row(row, row_number)?;
            if !seen.insert(schedule.vessel.clone()) {
                return Err(ImportError::DuplicateVessel {
                    row: row_number,
                    vessel: schedule.vessel,
                });
            }
            schedules.push(schedule);
        }
        Ok(schedules)
    }

    /// 必需列检查 (以首行为准)
    fn check_columns(&self, row: &RawRow) -> ImportResult<()> {
        let required = [
            StandardField::Vessel,
            StandardField::Service,
            StandardField::TotalBoxes,
            StandardField::OpenStacking,
            StandardField::Etd,
        ];
        for field in required {
            if self.mapper.resolve_column(row, field).is_none() {
                let mut available: Vec<&str> = row.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(ImportError::MissingColumn {
                    column: field.as_str().to_string(),
                    available: available.join(", "),
                });
            }
        }
        Ok(())
    }
}

impl RowMapper<VesselSchedule> for ScheduleImporter {
    fn map_row(&self, row: &RawRow, row_number: usize) -> ImportResult<VesselSchedule> {
        let vessel = self
            .mapper
            .require_string(row, StandardField::Vessel, row_number)?;
        let service = self
            .mapper
            .require_string(row, StandardField::Service, row_number)?;
        let total_boxes = self
            .mapper
            .parse_count(row, StandardField::TotalBoxes, row_number)?;
        let open_stacking = self
            .mapper
            .parse_date(row, StandardField::OpenStacking, row_number)?;
        let etd = self.mapper.parse_date(row, StandardField::Etd, row_number)?;

        if open_stacking > etd {
            return Err(ImportError::InvertedWindow {
                row: row_number,
                vessel,
            });
        }

        Ok(VesselSchedule {
            vessel,
            service,
            total_boxes,
            open_stacking,
            etd,
        })
    }
}

impl Default for ScheduleImporter {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// TrendImporter - 进箱趋势导入器
// ==========================================
pub struct TrendImporter {
    parser: UniversalFileParser,
    mapper: FieldMapper,
}

impl TrendImporter {
    pub fn new() -> Self {
        Self {
            parser: UniversalFileParser,
            mapper: FieldMapper,
        }
    }

    /// 从文件导入趋势表
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> ImportResult<TrendTable> {
        let rows = self.parser.parse(path.as_ref())?;
        let table = self.import_rows(&rows)?;
        info!(services = table.len(), "趋势表导入完成");
        Ok(table)
    }

    /// 从原始行导入趋势表; 同一航线出现多次时以后者为准
    pub fn import_rows(&self, rows: &[RawRow]) -> ImportResult<TrendTable> {
        let mut table = TrendTable::new();

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + FIRST_DATA_ROW;
            let service = self
                .mapper
                .require_string(row, StandardField::Service, row_number)?;

            // 日序 → 原始列名
            let day_columns: BTreeMap<usize, &str> = row
                .keys()
                .filter_map(|key| day_number(key).map(|day| (day, key.as_str())))
                .collect();
            let Some(&last_day) = day_columns.keys().next_back() else {
                let mut available: Vec<&str> = row.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(ImportError::MissingColumn {
                    column: "day1".to_string(),
                    available: available.join(", "),
                });
            };

            let mut profile: Vec<Option<f64>> = vec![None; last_day];
            for (&day, &column) in &day_columns {
                let raw = row.get(column).map(String::as_str).unwrap_or("");
                profile[day - 1] = match parse_percent_text(raw) {
                    None => None,
                    Some(Ok(value)) => Some(value),
                    Some(Err(message)) => {
                        return Err(ImportError::TypeConversionError {
                            row: row_number,
                            field: column.to_string(),
                            message,
                        })
                    }
                };
            }

            if table.contains(&service) {
                warn!(service = %service, row = row_number, "航线重复, 以后出现的行为准");
            }
            table.insert(&service, profile);
        }
        Ok(table)
    }
}

impl Default for TrendImporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 列名 → 开港日序号 (1-based); 非日列返回 None
fn day_number(header: &str) -> Option<usize> {
    let normalized = normalize_header(header);
    let digits = ["day", "hari", "d", "h"]
        .iter()
        .find_map(|prefix| normalized.strip_prefix(prefix))
        .unwrap_or(&normalized);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<usize>().ok().filter(|&d| d >= 1)
}
