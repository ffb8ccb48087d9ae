// ==========================================
// 堆场箱位分配仿真系统 - 堆场领域模型
// ==========================================
// 职责: 箱区布局 (YardLayout) + 箱位占用状态 (YardState)
// 红线: 相邻/排除区计算不得跨越箱区边界
// ==========================================
// 箱位坐标: (箱区, 箱位号), 箱位号从 1 开始
// 全局索引: 箱区偏移 + 箱位号 - 1, 跨箱区全序
// ==========================================

use crate::domain::error::{ModelError, ModelResult};
use crate::domain::vessel::VesselId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

// ==========================================
// GlobalIndex - 全局箱位索引
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalIndex(pub usize);

impl GlobalIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

// ==========================================
// Slot - 箱位坐标
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub area: String, // 箱区名称
    pub number: u32,  // 箱位号 (1-based)
}

impl Slot {
    pub fn new(area: &str, number: u32) -> Self {
        Self {
            area: area.to_string(),
            number,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.area, self.number)
    }
}

// ==========================================
// AreaSpec - 箱区配置 (外部输入)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaSpec {
    pub area: String, // 箱区名称
    pub slots: u32,   // 箱位数
}

impl AreaSpec {
    pub fn new(area: &str, slots: u32) -> Self {
        Self {
            area: area.to_string(),
            slots,
        }
    }
}

/// 布局内的箱区 (含全局偏移)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaExtent {
    pub name: String,
    pub offset: usize,
    pub len: usize,
}

impl AreaExtent {
    /// 该箱区的全局索引区间 [offset, offset + len)
    pub fn span(&self) -> Range<usize> {
        self.offset..self.offset + self.len
    }
}

// ==========================================
// YardLayout - 堆场布局 (运行期不可变)
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct YardLayout {
    areas: Vec<AreaExtent>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
    total_slots: usize,
}

impl YardLayout {
    /// 由有序箱区配置构建布局
    ///
    /// # 错误
    /// 空布局 / 空箱区名 / 重复箱区 / 箱位数为 0
    pub fn new(specs: &[AreaSpec]) -> ModelResult<Self> {
        if specs.is_empty() {
            return Err(ModelError::EmptyLayout);
        }

        let mut areas = Vec::with_capacity(specs.len());
        let mut by_name = HashMap::with_capacity(specs.len());
        let mut offset = 0usize;

        for (idx, spec) in specs.iter().enumerate() {
            let name = spec.area.trim();
            if name.is_empty() {
                return Err(ModelError::BlankAreaName(idx + 1));
            }
            if spec.slots == 0 {
                return Err(ModelError::EmptyArea(name.to_string()));
            }
            if by_name.insert(name.to_string(), areas.len()).is_some() {
                return Err(ModelError::DuplicateArea(name.to_string()));
            }
            areas.push(AreaExtent {
                name: name.to_string(),
                offset,
                len: spec.slots as usize,
            });
            offset += spec.slots as usize;
        }

        Ok(Self {
            areas,
            by_name,
            total_slots: offset,
        })
    }

    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    pub fn areas(&self) -> &[AreaExtent] {
        &self.areas
    }

    /// 按名称查找箱区
    pub fn area(&self, name: &str) -> Option<&AreaExtent> {
        self.by_name.get(name).map(|&pos| &self.areas[pos])
    }

    /// 坐标 → 全局索引
    pub fn global_index(&self, slot: &Slot) -> ModelResult<GlobalIndex> {
        let area = self
            .area(&slot.area)
            .ok_or_else(|| ModelError::UnknownArea(slot.area.clone()))?;
        if slot.number == 0 || slot.number as usize > area.len {
            return Err(ModelError::SlotOutOfRange {
                area: slot.area.clone(),
                number: slot.number,
                size: area.len as u32,
            });
        }
        Ok(GlobalIndex(area.offset + slot.number as usize - 1))
    }

    /// 全局索引所在箱区的位置 (areas() 下标)
    pub fn area_pos_of(&self, idx: GlobalIndex) -> Option<usize> {
        if idx.0 >= self.total_slots {
            return None;
        }
        // 偏移单调递增, 取最后一个 offset <= idx 的箱区
        let pos = self.areas.partition_point(|a| a.offset <= idx.0);
        Some(pos - 1)
    }

    /// 全局索引 → 坐标
    pub fn slot_at(&self, idx: GlobalIndex) -> Option<Slot> {
        let area = &self.areas[self.area_pos_of(idx)?];
        Some(Slot {
            area: area.name.clone(),
            number: (idx.0 - area.offset + 1) as u32,
        })
    }

    /// 以 [lo - gap, hi + gap] 向外扩展, 并钳制在 lo 所在箱区内
    ///
    /// lo/hi 必须同属一个箱区
    pub fn widen_within_area(&self, lo: GlobalIndex, hi: GlobalIndex, gap: u32) -> Range<usize> {
        let Some(pos) = self.area_pos_of(lo) else {
            return 0..0;
        };
        let span = self.areas[pos].span();
        let gap = gap as usize;
        let start = lo.0.saturating_sub(gap).max(span.start);
        let end = (hi.0 + gap + 1).min(span.end);
        start..end
    }

    /// 连续区间的展示文本, 例如 A01:3-7
    pub fn range_label(&self, start: GlobalIndex, end: GlobalIndex) -> String {
        match (self.slot_at(start), self.slot_at(end)) {
            (Some(a), Some(b)) => SlotRange {
                area: a.area,
                start: a.number,
                end: b.number,
            }
            .to_string(),
            _ => format!("?{}-{}", start.0, end.0),
        }
    }
}

// ==========================================
// SlotRange - 箱位区间 (AREA:START-END)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRange {
    pub area: String,
    pub start: u32,
    pub end: u32,
}

impl fmt::Display for SlotRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.area, self.start, self.end)
    }
}

impl std::str::FromStr for SlotRange {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ModelError::MalformedSlotRange(s.to_string());
        let (area, range) = s.trim().rsplit_once(':').ok_or_else(malformed)?;
        let (start, end) = parse_number_range(range).ok_or_else(malformed)?;
        if area.trim().is_empty() {
            return Err(malformed());
        }
        Ok(SlotRange {
            area: area.trim().to_string(),
            start,
            end,
        })
    }
}

/// 解析 "START-END" (单个数字视为 START=END); 要求 1 <= START <= END
pub fn parse_number_range(text: &str) -> Option<(u32, u32)> {
    let text = text.trim();
    let (start, end) = match text.split_once('-') {
        Some((a, b)) => (a.trim().parse::<u32>().ok()?, b.trim().parse::<u32>().ok()?),
        None => {
            let n = text.parse::<u32>().ok()?;
            (n, n)
        }
    };
    if start == 0 || start > end {
        return None;
    }
    Some((start, end))
}

// ==========================================
// YardState - 箱位占用状态 (仿真唯一共享可变资源)
// ==========================================
// 红线: 一个箱位同一时刻最多属于一条船
// 写入方: 分配器 (落位) + 释放步骤 (ETD 次日)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YardState {
    owners: Vec<Option<VesselId>>,
}

impl YardState {
    /// 创建全空堆场
    pub fn new(layout: &YardLayout) -> Self {
        Self {
            owners: vec![None; layout.total_slots()],
        }
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn owner(&self, idx: GlobalIndex) -> Option<VesselId> {
        self.owners.get(idx.0).copied().flatten()
    }

    pub fn is_free(&self, idx: GlobalIndex) -> bool {
        matches!(self.owners.get(idx.0), Some(None))
    }

    /// 占用箱位; 箱位已被占用时返回 false 且不修改
    pub fn assign(&mut self, idx: GlobalIndex, vessel: VesselId) -> bool {
        match self.owners.get_mut(idx.0) {
            Some(cell) if cell.is_none() => {
                *cell = Some(vessel);
                true
            }
            _ => false,
        }
    }

    /// 释放某船的全部箱位, 返回释放数量
    pub fn release_vessel(&mut self, vessel: VesselId) -> usize {
        let mut released = 0;
        for cell in self.owners.iter_mut() {
            if *cell == Some(vessel) {
                *cell = None;
                released += 1;
            }
        }
        released
    }

    /// 已占用箱位数
    pub fn occupied_count(&self) -> usize {
        self.owners.iter().filter(|o| o.is_some()).count()
    }

    /// 某船当前持有的箱位数
    pub fn owned_by(&self, vessel: VesselId) -> usize {
        self.owners.iter().filter(|o| **o == Some(vessel)).count()
    }

    /// 堆场占用率 (0.0 - 1.0)
    pub fn occupancy_ratio(&self) -> f64 {
        if self.owners.is_empty() {
            return 0.0;
        }
        self.occupied_count() as f64 / self.owners.len() as f64
    }

    /// 按全局索引顺序的占用视图
    pub fn owners(&self) -> &[Option<VesselId>] {
        &self.owners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_area_layout() -> YardLayout {
        YardLayout::new(&[AreaSpec::new("A01", 10), AreaSpec::new("A02", 5)]).unwrap()
    }

    #[test]
    fn test_global_index_round_trip_across_areas() {
        let layout = two_area_layout();
        assert_eq!(layout.total_slots(), 15);
        assert_eq!(layout.global_index(&Slot::new("A01", 1)).unwrap(), GlobalIndex(0));
        assert_eq!(layout.global_index(&Slot::new("A02", 1)).unwrap(), GlobalIndex(10));
        assert_eq!(layout.slot_at(GlobalIndex(14)), Some(Slot::new("A02", 5)));
        assert_eq!(layout.slot_at(GlobalIndex(15)), None);
    }

    #[test]
    fn test_layout_rejects_invalid_specs() {
        assert_eq!(YardLayout::new(&[]).unwrap_err(), ModelError::EmptyLayout);
        assert_eq!(
            YardLayout::new(&[AreaSpec::new("A01", 3), AreaSpec::new("A01", 4)]).unwrap_err(),
            ModelError::DuplicateArea("A01".to_string())
        );
        assert_eq!(
            YardLayout::new(&[AreaSpec::new("A01", 0)]).unwrap_err(),
            ModelError::EmptyArea("A01".to_string())
        );
    }

    #[test]
    fn test_slot_out_of_range() {
        let layout = two_area_layout();
        assert!(layout.global_index(&Slot::new("A02", 6)).is_err());
        assert!(layout.global_index(&Slot::new("A02", 0)).is_err());
        assert!(layout.global_index(&Slot::new("B01", 1)).is_err());
    }

    #[test]
    fn test_widen_is_clamped_to_area() {
        let layout = two_area_layout();
        // A01:9-10 扩 3 格, 不得伸入 A02
        let r = layout.widen_within_area(GlobalIndex(8), GlobalIndex(9), 3);
        assert_eq!(r, 5..10);
        // A02:1 扩 2 格, 不得伸回 A01
        let r = layout.widen_within_area(GlobalIndex(10), GlobalIndex(10), 2);
        assert_eq!(r, 10..13);
    }

    #[test]
    fn test_slot_range_parse_and_display() {
        let r: SlotRange = "A01:3-7".parse().unwrap();
        assert_eq!(r, SlotRange { area: "A01".to_string(), start: 3, end: 7 });
        assert_eq!(r.to_string(), "A01:3-7");
        assert!("A01:7-3".parse::<SlotRange>().is_err());
        assert!("3-7".parse::<SlotRange>().is_err());
    }

    #[test]
    fn test_yard_state_single_owner() {
        let layout = two_area_layout();
        let mut yard = YardState::new(&layout);
        assert!(yard.assign(GlobalIndex(3), VesselId(0)));
        assert!(!yard.assign(GlobalIndex(3), VesselId(1)));
        assert_eq!(yard.owner(GlobalIndex(3)), Some(VesselId(0)));
        assert_eq!(yard.occupied_count(), 1);
        assert_eq!(yard.release_vessel(VesselId(0)), 1);
        assert!(yard.is_free(GlobalIndex(3)));
    }
}
