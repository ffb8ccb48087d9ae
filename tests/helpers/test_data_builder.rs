// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{Duration, NaiveDate};
use yard_alloc::config::{AllocationRules, SimulationConfig, TieBreakPolicy};
use yard_alloc::domain::vessel::VesselSchedule;
use yard_alloc::domain::yard::AreaSpec;

/// 测试基准日 (第 1 天)
pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap() + Duration::days(n - 1)
}

// ==========================================
// VesselSchedule 构建器
// ==========================================

pub struct ScheduleBuilder {
    vessel: String,
    service: String,
    total_boxes: u32,
    open_day: i64,
    etd_day: i64,
}

impl ScheduleBuilder {
    pub fn new(vessel: &str) -> Self {
        Self {
            vessel: vessel.to_string(),
            service: "SVC".to_string(),
            total_boxes: 0,
            open_day: 1,
            etd_day: 1,
        }
    }

    pub fn service(mut self, service: &str) -> Self {
        self.service = service.to_string();
        self
    }

    pub fn boxes(mut self, total: u32) -> Self {
        self.total_boxes = total;
        self
    }

    /// 开港日 / ETD (均为第 n 天, 含两端)
    pub fn window(mut self, open_day: i64, etd_day: i64) -> Self {
        self.open_day = open_day;
        self.etd_day = etd_day;
        self
    }

    pub fn build(self) -> VesselSchedule {
        VesselSchedule {
            vessel: self.vessel,
            service: self.service,
            total_boxes: self.total_boxes,
            open_stacking: day(self.open_day),
            etd: day(self.etd_day),
        }
    }
}

// ==========================================
// SimulationConfig 构建
// ==========================================

/// 按 (箱区, 箱位数) 列表构建配置, tie-break 取最低索引
pub fn create_test_config(areas: &[(&str, u32)], slot_capacity: u32) -> SimulationConfig {
    let layout = areas
        .iter()
        .map(|(name, slots)| AreaSpec::new(name, *slots))
        .collect();
    SimulationConfig::new(layout, slot_capacity).with_tie_break(TieBreakPolicy::LowestIndex)
}

/// 同上, 指定规则
pub fn create_test_config_with_rules(
    areas: &[(&str, u32)],
    slot_capacity: u32,
    rules: AllocationRules,
) -> SimulationConfig {
    create_test_config(areas, slot_capacity).with_rules(rules)
}
