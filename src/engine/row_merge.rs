// ==========================================
// 堆场箱位分配仿真系统 - 单行航线合并
// ==========================================
// 职责: 把若干 (航线, "起-止") 铺进一行箱位, 标记冲突, 合并相邻同航线格
// 规则:
// - 后写入的航线覆盖先写入的, 被覆盖位置记为冲突
// - 格式错误 / 越界 / 航线名为空的条目整体跳过
// - 空格逐格输出, 不合并
// ==========================================

use crate::domain::yard::parse_number_range;
use crate::domain::yard::SlotRange;
use serde::Serialize;
use tracing::debug;

/// 合并后的一段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowSpan {
    pub service: Option<String>,
    pub start: u32, // 箱位号 (1-based)
    pub len: u32,
}

/// 单行合并结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowMerge {
    pub cells: Vec<Option<String>>,
    pub clashes: Vec<bool>,
    pub spans: Vec<RowSpan>,
    pub skipped: Vec<usize>, // 被跳过的条目下标
}

impl RowMerge {
    /// 冲突箱位号 (1-based)
    pub fn clash_positions(&self) -> Vec<u32> {
        self.clashes
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }

    pub fn has_clash(&self) -> bool {
        self.clashes.iter().any(|c| *c)
    }
}

/// 铺排一行
///
/// # 参数
/// - `entries`: (航线, "START-END") 列表, 按写入顺序
/// - `row_len`: 行宽 (箱位数)
pub fn merge_service_row(entries: &[(String, String)], row_len: usize) -> RowMerge {
    let mut cells: Vec<Option<String>> = vec![None; row_len];
    let mut clashes = vec![false; row_len];
    let mut skipped = Vec::new();

    for (idx, (service, range)) in entries.iter().enumerate() {
        let service = service.trim();
        let parsed = parse_number_range(range).filter(|&(_, end)| end as usize <= row_len);
        let (Some((start, end)), false) = (parsed, service.is_empty()) else {
            debug!(entry = idx, service, range = range.as_str(), "跳过无效条目");
            skipped.push(idx);
            continue;
        };

        for pos in (start as usize - 1)..(end as usize) {
            if cells[pos].is_some() {
                clashes[pos] = true;
            }
            cells[pos] = Some(service.to_string());
        }
    }

    let spans = merge_spans(&cells);
    RowMerge {
        cells,
        clashes,
        spans,
        skipped,
    }
}

/// 以箱区区间文本 (AREA:START-END) 铺排一行, 只取指定箱区的条目
pub fn merge_area_row(entries: &[(String, SlotRange)], area: &str, row_len: usize) -> RowMerge {
    let plain: Vec<(String, String)> = entries
        .iter()
        .filter(|(_, r)| r.area == area)
        .map(|(service, r)| (service.clone(), format!("{}-{}", r.start, r.end)))
        .collect();
    merge_service_row(&plain, row_len)
}

fn merge_spans(cells: &[Option<String>]) -> Vec<RowSpan> {
    let mut spans: Vec<RowSpan> = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        match (spans.last_mut(), cell) {
            (Some(last), Some(service)) if last.service.as_ref() == Some(service) => {
                last.len += 1;
            }
            _ => spans.push(RowSpan {
                service: cell.clone(),
                start: i as u32 + 1,
                len: 1,
            }),
        }
    }
    spans
}
