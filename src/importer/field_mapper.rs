// ==========================================
// 堆场箱位分配仿真系统 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段 + 类型转换
// 列名归一化: 忽略大小写 / 空格 / 下划线 / 连字符 / 点
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::RawRow;
use chrono::{Duration, NaiveDate, NaiveDateTime};

// ==========================================
// 标准字段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardField {
    Vessel,
    Service,
    TotalBoxes,
    OpenStacking,
    Etd,
}

impl StandardField {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardField::Vessel => "vessel",
            StandardField::Service => "service",
            StandardField::TotalBoxes => "total_boxes",
            StandardField::OpenStacking => "open_stacking",
            StandardField::Etd => "etd",
        }
    }

    /// 可接受的列名 (已归一化)
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            StandardField::Vessel => &["vessel", "vesselname", "ship", "kapal", "船名"],
            StandardField::Service => &["service", "servicecode", "svc", "route", "航线"],
            StandardField::TotalBoxes => &[
                "totalboxes",
                "totalbox",
                "boxes",
                "box",
                "containers",
                "total",
                "箱量",
            ],
            StandardField::OpenStacking => &[
                "openstacking",
                "openstack",
                "openstackingdate",
                "open",
                "开港日",
            ],
            StandardField::Etd => &["etd", "etddate", "departure", "离港日"],
        }
    }
}

/// 列名归一化
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Excel 序列日期的合理区间 (约 1954 - 2119 年)
const EXCEL_SERIAL_RANGE: std::ops::RangeInclusive<f64> = 20000.0..=80000.0;

pub struct FieldMapper;

impl FieldMapper {
    /// 在行中定位标准字段的原始列名
    pub fn resolve_column<'a>(&self, row: &'a RawRow, field: StandardField) -> Option<&'a str> {
        // 按别名优先级查找, 避免依赖 HashMap 迭代顺序
        field.aliases().iter().find_map(|alias| {
            row.keys()
                .map(String::as_str)
                .find(|key| normalize_header(key) == *alias)
        })
    }

    /// 提取字符串字段 (空串视为缺失)
    pub fn get_string(&self, row: &RawRow, field: StandardField) -> Option<String> {
        let column = self.resolve_column(row, field)?;
        let value = row.get(column)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// 提取必填字符串字段
    pub fn require_string(
        &self,
        row: &RawRow,
        field: StandardField,
        row_number: usize,
    ) -> ImportResult<String> {
        self.get_string(row, field)
            .ok_or_else(|| ImportError::MissingValue {
                row: row_number,
                field: field.as_str().to_string(),
            })
    }

    /// 解析非负整数箱量 (接受 "120" / "120.0")
    pub fn parse_count(
        &self,
        row: &RawRow,
        field: StandardField,
        row_number: usize,
    ) -> ImportResult<u32> {
        let value = self.require_string(row, field, row_number)?;
        let conversion = |message: String| ImportError::TypeConversionError {
            row: row_number,
            field: field.as_str().to_string(),
            message,
        };

        if let Ok(n) = value.parse::<u32>() {
            return Ok(n);
        }
        let float = value
            .parse::<f64>()
            .map_err(|_| conversion(format!("无法解析为整数: {}", value)))?;
        if float < 0.0 {
            return Err(conversion(format!("箱量不能为负: {}", value)));
        }
        if float.fract() != 0.0 || float > u32::MAX as f64 {
            return Err(conversion(format!("箱量必须为整数: {}", value)));
        }
        Ok(float as u32)
    }

    /// 解析必填日期
    pub fn parse_date(
        &self,
        row: &RawRow,
        field: StandardField,
        row_number: usize,
    ) -> ImportResult<NaiveDate> {
        let value = self.require_string(row, field, row_number)?;
        parse_date_text(&value).ok_or_else(|| ImportError::DateFormatError {
            row: row_number,
            field: field.as_str().to_string(),
            value,
        })
    }
}

/// 日期文本解析
///
/// 支持: YYYY-MM-DD / DD/MM/YYYY / YYYYMMDD / YYYY-MM-DD HH:MM:SS / Excel 序列日期
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    for format in ["%Y-%m-%d", "%d/%m/%Y", "%Y%m%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    // Excel 单元格以序列号显示的日期
    let serial = value.parse::<f64>().ok()?;
    if !EXCEL_SERIAL_RANGE.contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// 百分比文本解析 (允许 % 后缀); 空串为缺失
pub fn parse_percent_text(value: &str) -> Option<Result<f64, String>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let number = value.trim_end_matches('%').trim();
    Some(
        number
            .parse::<f64>()
            .map_err(|_| format!("无法解析为百分比: {}", value)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header(" Open_Stacking "), "openstacking");
        assert_eq!(normalize_header("Total-Box"), "totalbox");
        assert_eq!(normalize_header("E.T.D"), "etd");
    }

    #[test]
    fn test_resolve_aliases() {
        let mapper = FieldMapper;
        let row = create_test_row(&[("Open Stack", "2025-03-01"), ("BOXES", "90")]);
        assert_eq!(
            mapper.resolve_column(&row, StandardField::OpenStacking),
            Some("Open Stack")
        );
        assert_eq!(mapper.parse_count(&row, StandardField::TotalBoxes, 2).unwrap(), 90);
        assert!(mapper.get_string(&row, StandardField::Etd).is_none());
    }

    #[test]
    fn test_parse_count_rejects_negative_and_fraction() {
        let mapper = FieldMapper;
        let row = create_test_row(&[("boxes", "-5")]);
        assert!(matches!(
            mapper.parse_count(&row, StandardField::TotalBoxes, 3),
            Err(ImportError::TypeConversionError { row: 3, .. })
        ));
        let row = create_test_row(&[("boxes", "12.5")]);
        assert!(mapper.parse_count(&row, StandardField::TotalBoxes, 3).is_err());
        let row = create_test_row(&[("boxes", "12.0")]);
        assert_eq!(mapper.parse_count(&row, StandardField::TotalBoxes, 3).unwrap(), 12);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 4);
        assert_eq!(parse_date_text("2025-03-04"), expected);
        assert_eq!(parse_date_text("04/03/2025"), expected);
        assert_eq!(parse_date_text("20250304"), expected);
        assert_eq!(parse_date_text("2025-03-04 13:30:00"), expected);
        assert_eq!(parse_date_text("45720"), expected);
        assert_eq!(parse_date_text("next tuesday"), None);
    }

    #[test]
    fn test_missing_date_is_missing_value() {
        let mapper = FieldMapper;
        let row = create_test_row(&[("etd", "")]);
        assert!(matches!(
            mapper.parse_date(&row, StandardField::Etd, 7),
            Err(ImportError::MissingValue { row: 7, .. })
        ));
    }

    #[test]
    fn test_percent_text() {
        assert_eq!(parse_percent_text("12.5%"), Some(Ok(12.5)));
        assert_eq!(parse_percent_text(" 30 "), Some(Ok(30.0)));
        assert_eq!(parse_percent_text(""), None);
        assert!(matches!(parse_percent_text("abc"), Some(Err(_))));
    }
}
