// ==========================================
// 堆场箱位分配仿真系统 - 逐日仿真主循环
// ==========================================
// 职责: 逐日推进 释放 → 排序 → 预测/约束/分配 → 快照
// 红线: 单线程顺序执行; 当日分配严格按排序逐船进行
// ==========================================
// 每日流程:
// 1. 释放: ETD 已过的船舶清空堆场占用 (簇保留供汇总)
// 2. 排序: 在港船舶按总箱量降序
// 3. 逐船: 有效需求 = 当日进箱 - 结转容量, 折算箱位后分配
// 4. 快照: 占用率 + 完整堆场副本
// ==========================================

use crate::config::allocation_rules::AllocationRules;
use crate::config::simulation_config::{SimulationConfig, SimulationWindow};
use crate::domain::error::ModelError;
use crate::domain::report::{
    ClusterMap, DailyLogEntry, OccupancyPoint, VesselRecap, YardSnapshot,
};
use crate::domain::trend::TrendTable;
use crate::domain::types::{AllocationFailure, PlacementMode};
use crate::domain::vessel::{Vessel, VesselId, VesselSchedule};
use crate::domain::yard::{Slot, YardLayout, YardState};
use crate::engine::allocator::{ClusterAllocator, Placement};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::forecaster::ArrivalForecaster;
use crate::engine::priority::VesselRanker;
use crate::engine::recap::RecapBuilder;
use crate::engine::row_merge::{merge_service_row, RowMerge};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, instrument, warn};

// ==========================================
// SimulationOutcome - 仿真输出
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    pub layout: YardLayout,
    pub slot_capacity: u32,
    pub rules: AllocationRules,
    pub window: Option<SimulationWindow>,
    pub schedules: Vec<VesselSchedule>, // 下标即 VesselId

    pub daily_log: Vec<DailyLogEntry>,
    pub occupancy: Vec<OccupancyPoint>,
    pub recaps: Vec<VesselRecap>,
    pub cluster_map: ClusterMap,
    pub snapshots: BTreeMap<NaiveDate, YardSnapshot>,
}

impl SimulationOutcome {
    /// 占用最高的一天 (并列取最早)
    pub fn most_congested_day(&self) -> Option<&OccupancyPoint> {
        self.occupancy.iter().fold(None, |best, point| match best {
            Some(b) if b.occupied_slots >= point.occupied_slots => Some(b),
            _ => Some(point),
        })
    }

    /// 至少有一次分配失败的日期 (升序)
    pub fn failure_days(&self) -> Vec<NaiveDate> {
        self.daily_log
            .iter()
            .filter(|e| e.is_failed())
            .map(|e| e.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 某日某箱位的占用船名 (需保存快照)
    pub fn owner_at(&self, date: NaiveDate, slot: &Slot) -> Option<&str> {
        let idx = self.layout.global_index(slot).ok()?;
        let owner: VesselId = self.snapshots.get(&date)?.owners.get(idx.0).copied().flatten()?;
        self.schedules.get(owner.0).map(|s| s.vessel.as_str())
    }

    pub fn recap_for(&self, vessel: &str) -> Option<&VesselRecap> {
        self.recaps.iter().find(|r| r.vessel == vessel)
    }

    pub fn failure_count(&self) -> usize {
        self.daily_log.iter().filter(|e| e.is_failed()).count()
    }

    /// 某日某箱区的航线分布 (同航线相邻船舶合并为一段)
    pub fn service_row(&self, date: NaiveDate, area: &str) -> Option<RowMerge> {
        let extent = self.layout.area(area)?;
        let owners = &self.snapshots.get(&date)?.owners;

        // 逐船连续段 → (航线, "起-止")
        let mut entries: Vec<(String, String)> = Vec::new();
        let mut run: Option<(VesselId, usize)> = None;
        for number in 1..=extent.len + 1 {
            let owner = if number <= extent.len {
                owners.get(extent.offset + number - 1).copied().flatten()
            } else {
                None
            };
            match (run, owner) {
                (Some((current, _)), Some(next)) if current == next => continue,
                (Some((current, start)), _) => {
                    if let Some(schedule) = self.schedules.get(current.0) {
                        entries.push((schedule.service.clone(), format!("{}-{}", start, number - 1)));
                    }
                    run = owner.map(|o| (o, number));
                }
                (None, _) => run = owner.map(|o| (o, number)),
            }
        }
        Some(merge_service_row(&entries, extent.len))
    }
}

// ==========================================
// YardSimulator - 仿真主循环
// ==========================================
pub struct YardSimulator {
    layout: YardLayout,
    rules: AllocationRules,
    slot_capacity: u32,
    keep_snapshots: bool,
    window: Option<SimulationWindow>,

    // ===== 运行状态 =====
    vessels: Vec<Vessel>,
    yard: YardState,
    cursor: Option<NaiveDate>,

    // ===== 引擎 =====
    allocator: ClusterAllocator,
    ranker: VesselRanker,

    // ===== 输出 =====
    daily_log: Vec<DailyLogEntry>,
    occupancy: Vec<OccupancyPoint>,
    snapshots: BTreeMap<NaiveDate, YardSnapshot>,
}

impl YardSimulator {
    /// 校验输入并构建仿真
    ///
    /// # 错误
    /// - 布局非法 / 单箱位容量为 0
    /// - 船名为空或重复 / 开港日晚于 ETD
    /// - 截断窗口起点晚于终点
    #[instrument(skip_all, fields(vessels = schedules.len()))]
    pub fn new(
        config: &SimulationConfig,
        schedules: Vec<VesselSchedule>,
        trend: &TrendTable,
    ) -> EngineResult<Self> {
        let layout = YardLayout::new(&config.layout)?;
        if config.slot_capacity == 0 {
            return Err(EngineError::ZeroSlotCapacity);
        }
        validate_schedules(&schedules)?;

        let window = match config.window {
            Some(w) if w.start > w.end => {
                return Err(EngineError::InvertedWindow {
                    start: w.start,
                    end: w.end,
                })
            }
            Some(w) => Some(w),
            None => schedule_span(&schedules),
        };

        let rules = config.allocation_rules();
        let forecaster = ArrivalForecaster::new();
        let vessels: Vec<Vessel> = schedules
            .into_iter()
            .enumerate()
            .map(|(idx, schedule)| {
                let forecast = forecaster.forecast(
                    schedule.total_boxes,
                    &schedule.service,
                    trend,
                    schedule.open_days(),
                );
                Vessel::new(VesselId(idx), schedule, forecast, rules.cluster_sizing)
            })
            .collect();

        info!(
            areas = layout.areas().len(),
            total_slots = layout.total_slots(),
            slot_capacity = config.slot_capacity,
            vessels = vessels.len(),
            window = ?window,
            "仿真初始化完成"
        );

        Ok(Self {
            yard: YardState::new(&layout),
            cursor: window.map(|w| w.start),
            layout,
            rules,
            slot_capacity: config.slot_capacity,
            keep_snapshots: config.keep_snapshots,
            window,
            vessels,
            allocator: ClusterAllocator::new(config.tie_break),
            ranker: VesselRanker::new(),
            daily_log: Vec::new(),
            occupancy: Vec::new(),
            snapshots: BTreeMap::new(),
        })
    }

    // ==========================================
    // 推进
    // ==========================================

    /// 推进一天; 窗口结束后返回 None
    pub fn step(&mut self) -> Option<NaiveDate> {
        let date = self.cursor?;
        let end = self.window?.end;
        if date > end {
            return None;
        }
        self.run_day(date);
        self.cursor = date.succ_opt();
        Some(date)
    }

    /// 跑完整个窗口并汇总输出
    pub fn run(mut self) -> SimulationOutcome {
        while self.step().is_some() {}
        self.into_outcome()
    }

    /// 以当前状态汇总输出 (可在未跑完时调用)
    pub fn into_outcome(self) -> SimulationOutcome {
        let builder = RecapBuilder::new();
        let recaps = builder.recaps(&self.vessels, &self.daily_log);
        let cluster_map = builder.cluster_map(&self.vessels, &self.layout);

        let failures = self.daily_log.iter().filter(|e| e.is_failed()).count();
        info!(
            days = self.occupancy.len(),
            log_entries = self.daily_log.len(),
            failures,
            "仿真结束"
        );

        SimulationOutcome {
            slot_capacity: self.slot_capacity,
            rules: self.rules,
            window: self.window,
            schedules: self.vessels.into_iter().map(|v| v.schedule).collect(),
            daily_log: self.daily_log,
            occupancy: self.occupancy,
            recaps,
            cluster_map,
            snapshots: self.snapshots,
            layout: self.layout,
        }
    }

    // ==========================================
    // 状态访问
    // ==========================================

    pub fn vessels(&self) -> &[Vessel] {
        &self.vessels
    }

    pub fn yard(&self) -> &YardState {
        &self.yard
    }

    pub fn layout(&self) -> &YardLayout {
        &self.layout
    }

    pub fn daily_log(&self) -> &[DailyLogEntry] {
        &self.daily_log
    }

    // ==========================================
    // 单日处理
    // ==========================================

    #[instrument(skip(self), fields(date = %date))]
    fn run_day(&mut self, date: NaiveDate) {
        // 1. 释放
        for vessel in &self.vessels {
            if vessel.schedule.etd < date {
                let released = self.yard.release_vessel(vessel.id);
                if released > 0 {
                    debug!(vessel = vessel.name(), released, "离港释放箱位");
                }
            }
        }

        // 2. 排序
        let order = self.ranker.rank(&self.vessels, date);

        // 3. 逐船分配
        let mut failures = 0usize;
        for idx in order.iter().copied() {
            let entry = self.serve_vessel(idx, date);
            if entry.is_failed() {
                failures += 1;
            }
            self.daily_log.push(entry);
        }

        // 4. 快照
        let occupied = self.yard.occupied_count();
        let point = OccupancyPoint {
            date,
            occupied_slots: occupied,
            occupied_capacity_boxes: occupied as u64 * self.slot_capacity as u64,
            occupancy_pct: self.yard.occupancy_ratio() * 100.0,
        };
        info!(
            active = order.len(),
            failures,
            occupied_slots = occupied,
            occupancy_pct = point.occupancy_pct,
            "日终"
        );
        self.occupancy.push(point);

        if self.keep_snapshots {
            self.snapshots.insert(
                date,
                YardSnapshot {
                    date,
                    owners: self.yard.owners().to_vec(),
                },
            );
        }
    }

    /// 处理一条船的当日需求并返回日志
    fn serve_vessel(&mut self, idx: usize, date: NaiveDate) -> DailyLogEntry {
        let boxes_today = self.vessels[idx].boxes_on(date);
        let rollover = self.vessels[idx].rollover_capacity;
        let mut entry = DailyLogEntry {
            date,
            vessel: self.vessels[idx].name().to_string(),
            boxes_forecast: boxes_today,
            boxes_needed: 0,
            slots_needed: 0,
            slots_granted: 0,
            slots_unmet: 0,
            boxes_unmet: 0,
            placement: None,
            cluster_index: None,
            failure: None,
            rollover_after: 0,
            recommendation: String::new(),
        };

        // 结转容量足以覆盖当日进箱
        if boxes_today <= rollover {
            let left = rollover - boxes_today;
            self.vessels[idx].rollover_capacity = left;
            entry.rollover_after = left;
            entry.recommendation = if boxes_today == 0 {
                "NO_ARRIVALS".to_string()
            } else {
                format!(
                    "ROLLOVER_COVERED: {} box(es) absorbed by spare slot capacity, {} left",
                    boxes_today, left
                )
            };
            return entry;
        }

        let need_boxes = boxes_today - rollover;
        let slots_needed = need_boxes.div_ceil(self.slot_capacity);
        self.vessels[idx].rollover_capacity = 0;
        entry.boxes_needed = need_boxes;
        entry.slots_needed = slots_needed;

        let result = self.allocator.allocate(
            idx,
            slots_needed as usize,
            &mut self.vessels,
            &mut self.yard,
            &self.layout,
            date,
            &self.rules,
        );

        match result {
            Ok(placement) => {
                let granted = placement.as_ref().map_or(0, |p| p.slots.len()) as u32;
                let left = granted
                    .saturating_mul(self.slot_capacity)
                    .saturating_sub(need_boxes);
                self.vessels[idx].rollover_capacity = left;

                entry.slots_granted = granted;
                entry.rollover_after = left;
                if let Some(p) = placement {
                    entry.placement = Some(p.mode);
                    entry.cluster_index = Some(p.cluster_index);
                    entry.recommendation = self.describe_placement(&p);
                }
            }
            Err(failure) => {
                entry.slots_unmet = slots_needed;
                entry.boxes_unmet = estimate_unmet_boxes(slots_needed, slots_needed, need_boxes);
                entry.failure = Some(failure);
                entry.recommendation = describe_failure(failure, slots_needed);
                warn!(
                    vessel = %entry.vessel,
                    slots_needed,
                    boxes_needed = need_boxes,
                    failure = %failure,
                    "分配失败"
                );
            }
        }
        entry
    }

    fn describe_placement(&self, placement: &Placement) -> String {
        let (Some(&first), Some(&last)) = (placement.slots.first(), placement.slots.last()) else {
            return String::new();
        };
        let range = self.layout.range_label(first, last);
        match placement.mode {
            PlacementMode::ExpandInPlace => format!(
                "{}: cluster {} grows by {} slot(s) at {}",
                placement.mode,
                placement.cluster_index,
                placement.slots.len(),
                range
            ),
            PlacementMode::NewBlock => format!(
                "{}: cluster {} opened at {}",
                placement.mode, placement.cluster_index, range
            ),
        }
    }
}

/// 未满足箱量估算: round(slots_unmet * boxes_needed / slots_needed)
fn estimate_unmet_boxes(slots_unmet: u32, slots_needed: u32, boxes_needed: u32) -> u32 {
    if slots_needed == 0 {
        return 0;
    }
    (slots_unmet as f64 * boxes_needed as f64 / slots_needed as f64).round() as u32
}

fn describe_failure(failure: AllocationFailure, slots_needed: u32) -> String {
    format!(
        "{}: need {} slot(s), none granted; {}",
        failure,
        slots_needed,
        failure.hint()
    )
}

/// 船期结构校验: 船名非空且唯一, 开港日不晚于 ETD
fn validate_schedules(schedules: &[VesselSchedule]) -> Result<(), ModelError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(schedules.len());
    for (idx, s) in schedules.iter().enumerate() {
        let name = s.vessel.trim();
        if name.is_empty() {
            return Err(ModelError::BlankVesselName(idx + 1));
        }
        if !seen.insert(name) {
            return Err(ModelError::DuplicateVessel(name.to_string()));
        }
        if s.open_stacking > s.etd {
            return Err(ModelError::InvertedWindow {
                vessel: name.to_string(),
                open_stacking: s.open_stacking,
                etd: s.etd,
            });
        }
    }
    Ok(())
}

/// 默认窗口: [最早开港日, 最晚 ETD]; 无船期时为 None
fn schedule_span(schedules: &[VesselSchedule]) -> Option<SimulationWindow> {
    let start = schedules.iter().map(|s| s.open_stacking).min()?;
    let end = schedules.iter().map(|s| s.etd).max()?;
    Some(SimulationWindow { start, end })
}
