// ==========================================
// 堆场箱位分配仿真系统 - 结果审计
// ==========================================
// 职责: 对仿真状态 / 输出做不变量复核, 返回违规清单
// 检查项:
// - 占用守恒: 在港船舶持有箱位数 == 各簇箱位数之和; 离港后为 0
// - 窗口约束: 快照中的占用船舶当日必须在集港窗口内
// - 占用对账: 快照持有数 == 窗口内累计分配数
// - 间距约束: 同箱区两条非豁免船舶之间至少隔开 required_gap 个箱位
// - 汇总对账: fulfilled + failed == requested, 且与日志一致
// ==========================================

use crate::domain::vessel::{Vessel, VesselId};
use crate::domain::yard::YardState;
use crate::engine::simulation::SimulationOutcome;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

/// 审计违规项
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditViolation {
    #[error("{date} 箱位 #{slot} 的占用者 {owner} 不存在")]
    UnknownOwner {
        date: NaiveDate,
        slot: usize,
        owner: VesselId,
    },

    #[error("{date} {vessel} 持有 {owned} 个箱位, 簇内记录 {clustered} 个")]
    ConservationBroken {
        date: NaiveDate,
        vessel: String,
        owned: usize,
        clustered: usize,
    },

    #[error("{date} {vessel} 不在集港窗口内却持有 {owned} 个箱位")]
    HeldOutsideWindow {
        date: NaiveDate,
        vessel: String,
        owned: usize,
    },

    #[error("{date} {vessel} 持有 {owned} 个箱位, 日志累计分配 {granted} 个")]
    GrantMismatch {
        date: NaiveDate,
        vessel: String,
        owned: usize,
        granted: u64,
    },

    #[error("{date} {area}: {first} 与 {second} 之间仅隔 {between} 个箱位 (要求 {required})")]
    GapViolated {
        date: NaiveDate,
        area: String,
        first: String,
        second: String,
        between: usize,
        required: u32,
    },

    #[error("{vessel} 汇总不平: 需求 {requested}, 满足 {fulfilled}, 失败 {failed}")]
    RecapMismatch {
        vessel: String,
        requested: u64,
        fulfilled: u64,
        failed: u64,
    },
}

// ==========================================
// 运行期状态审计 (逐日调用)
// ==========================================

/// 检查当日结束时的占用守恒
pub fn check_state(vessels: &[Vessel], yard: &YardState, date: NaiveDate) -> Vec<AuditViolation> {
    let mut violations = Vec::new();
    for vessel in vessels {
        let owned = yard.owned_by(vessel.id);
        let expected = if date <= vessel.schedule.etd {
            vessel.clustered_slot_count()
        } else {
            0
        };
        if owned != expected {
            violations.push(AuditViolation::ConservationBroken {
                date,
                vessel: vessel.name().to_string(),
                owned,
                clustered: expected,
            });
        }
    }
    violations
}

// ==========================================
// 仿真输出审计
// ==========================================

/// 对完整输出做全部可离线复核的检查
pub fn check_outcome(outcome: &SimulationOutcome) -> Vec<AuditViolation> {
    let mut violations = Vec::new();
    check_snapshots(outcome, &mut violations);
    check_gaps(outcome, &mut violations);
    check_recaps(outcome, &mut violations);

    if violations.is_empty() {
        info!(days = outcome.snapshots.len(), "审计通过");
    } else {
        warn!(count = violations.len(), "审计发现违规");
    }
    violations
}

/// 快照: 占用者有效 / 窗口约束 / 与日志累计分配一致
fn check_snapshots(outcome: &SimulationOutcome, violations: &mut Vec<AuditViolation>) {
    let mut cumulative: HashMap<&str, u64> = HashMap::new();
    let mut log = outcome.daily_log.iter().peekable();

    for (&date, snapshot) in &outcome.snapshots {
        while let Some(entry) = log.next_if(|e| e.date <= date) {
            *cumulative.entry(entry.vessel.as_str()).or_insert(0) += entry.slots_granted as u64;
        }

        let mut owned: HashMap<VesselId, usize> = HashMap::new();
        for (slot, owner) in snapshot.owners.iter().enumerate() {
            let Some(owner) = owner else { continue };
            if owner.0 >= outcome.schedules.len() {
                violations.push(AuditViolation::UnknownOwner {
                    date,
                    slot,
                    owner: *owner,
                });
                continue;
            }
            *owned.entry(*owner).or_insert(0) += 1;
        }

        for (id, schedule) in outcome.schedules.iter().enumerate() {
            let held = owned.get(&VesselId(id)).copied().unwrap_or(0);
            if held > 0 && !schedule.is_active_on(date) {
                violations.push(AuditViolation::HeldOutsideWindow {
                    date,
                    vessel: schedule.vessel.clone(),
                    owned: held,
                });
            }
            if date <= schedule.etd {
                let granted = cumulative.get(schedule.vessel.as_str()).copied().unwrap_or(0);
                if held as u64 != granted {
                    violations.push(AuditViolation::GrantMismatch {
                        date,
                        vessel: schedule.vessel.clone(),
                        owned: held,
                        granted,
                    });
                }
            }
        }
    }
}

/// 间距: 同箱区任意两条非豁免船舶的箱位之间至少 required_gap 个箱位
fn check_gaps(outcome: &SimulationOutcome, violations: &mut Vec<AuditViolation>) {
    let rules = &outcome.rules;

    for (&date, snapshot) in &outcome.snapshots {
        for area in outcome.layout.areas() {
            let held: Vec<(usize, VesselId)> = area
                .span()
                .filter_map(|i| snapshot.owners.get(i).copied().flatten().map(|o| (i, o)))
                .filter(|(_, o)| {
                    outcome
                        .schedules
                        .get(o.0)
                        .is_some_and(|s| !rules.is_ignored(&s.vessel))
                })
                .collect();

            for (pos, &(i, a)) in held.iter().enumerate() {
                for &(j, b) in &held[pos + 1..] {
                    if a == b {
                        continue;
                    }
                    let (sa, sb) = (&outcome.schedules[a.0], &outcome.schedules[b.0]);
                    let required = rules.required_gap(sa.etd_within_one_day(sb));
                    let between = j - i - 1;
                    if between < required as usize {
                        violations.push(AuditViolation::GapViolated {
                            date,
                            area: area.name.clone(),
                            first: sa.vessel.clone(),
                            second: sb.vessel.clone(),
                            between,
                            required,
                        });
                    }
                }
            }
        }
    }
}

/// 汇总: 与日志求和一致且 fulfilled + failed == requested
fn check_recaps(outcome: &SimulationOutcome, violations: &mut Vec<AuditViolation>) {
    let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
    for entry in &outcome.daily_log {
        let t = totals.entry(entry.vessel.as_str()).or_insert((0, 0));
        t.0 += entry.boxes_forecast as u64;
        t.1 += entry.boxes_unmet as u64;
    }

    for recap in &outcome.recaps {
        let (requested, failed) = totals.get(recap.vessel.as_str()).copied().unwrap_or((0, 0));
        let balanced = recap.fulfilled_boxes + recap.failed_boxes == recap.requested_boxes;
        if !balanced || recap.requested_boxes != requested || recap.failed_boxes != failed {
            violations.push(AuditViolation::RecapMismatch {
                vessel: recap.vessel.clone(),
                requested: recap.requested_boxes,
                fulfilled: recap.fulfilled_boxes,
                failed: recap.failed_boxes,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::simulation_config::{SimulationConfig, TieBreakPolicy};
    use crate::domain::report::YardSnapshot;
    use crate::domain::trend::TrendTable;
    use crate::domain::vessel::VesselSchedule;
    use crate::domain::yard::AreaSpec;
    use crate::engine::simulation::YardSimulator;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn create_test_outcome() -> SimulationOutcome {
        let config = SimulationConfig::new(vec![AreaSpec::new("A01", 20)], 10)
            .with_tie_break(TieBreakPolicy::LowestIndex);
        let schedules = vec![
            VesselSchedule {
                vessel: "MV A".to_string(),
                service: "SVC".to_string(),
                total_boxes: 40,
                open_stacking: date(1),
                etd: date(2),
            },
            VesselSchedule {
                vessel: "MV B".to_string(),
                service: "SVC".to_string(),
                total_boxes: 30,
                open_stacking: date(1),
                etd: date(3),
            },
        ];
        YardSimulator::new(&config, schedules, &TrendTable::new())
            .unwrap()
            .run()
    }

    #[test]
    fn test_clean_run_has_no_violations() {
        let outcome = create_test_outcome();
        assert!(check_outcome(&outcome).is_empty());
    }

    #[test]
    fn test_tampered_snapshot_is_reported() {
        let mut outcome = create_test_outcome();
        // MV A (ETD day 2) 在第 3 天仍持有箱位, 并紧贴 MV B
        let snapshot: &mut YardSnapshot = outcome.snapshots.get_mut(&date(3)).unwrap();
        let b_slot = snapshot
            .owners
            .iter()
            .position(|o| *o == Some(VesselId(1)))
            .unwrap();
        let neighbour = if b_slot > 0 { b_slot - 1 } else { b_slot + 1 };
        snapshot.owners[neighbour] = Some(VesselId(0));

        let violations = check_outcome(&outcome);
        assert!(violations
            .iter()
            .any(|v| matches!(v, AuditViolation::HeldOutsideWindow { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, AuditViolation::GapViolated { .. })));
    }

    #[test]
    fn test_recap_mismatch_is_reported() {
        let mut outcome = create_test_outcome();
        outcome.recaps[0].fulfilled_boxes += 1;
        let violations = check_outcome(&outcome);
        assert_eq!(violations.len(), 1);
        assert!(matches!(violations[0], AuditViolation::RecapMismatch { .. }));
    }

    #[test]
    fn test_state_conservation() {
        let config = SimulationConfig::new(vec![AreaSpec::new("A01", 20)], 10);
        let schedules = vec![VesselSchedule {
            vessel: "MV A".to_string(),
            service: "SVC".to_string(),
            total_boxes: 40,
            open_stacking: date(1),
            etd: date(2),
        }];
        let mut sim = YardSimulator::new(&config, schedules, &TrendTable::new()).unwrap();
        while let Some(day) = sim.step() {
            assert!(check_state(sim.vessels(), sim.yard(), day).is_empty());
        }
    }
}
