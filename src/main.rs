// ==========================================
// 堆场箱位分配仿真系统 - 命令行入口
// ==========================================
// 用法:
//   yard-alloc --schedule <file> [--trend <file>] [--config <json>]
//              [--preset strict|standard|relaxed] [--sizing normal|aggressive]
//              [--seed N] [--output <json>] [--audit] [--json-log]
// 输出: stdout 打印汇总表; --output 写出完整仿真结果 (JSON)
// ==========================================

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::PathBuf;
use yard_alloc::config::ConfigManager;
use yard_alloc::domain::trend::TrendTable;
use yard_alloc::engine::audit::check_outcome;
use yard_alloc::engine::simulation::{SimulationOutcome, YardSimulator};
use yard_alloc::importer::{ScheduleImporter, TrendImporter};
use yard_alloc::logging;

#[derive(Debug, Default)]
struct CliArgs {
    schedule: Option<PathBuf>,
    trend: Option<PathBuf>,
    config: Option<PathBuf>,
    preset: Option<String>,
    sizing: Option<String>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    audit: bool,
    json_log: bool,
}

const USAGE: &str = "用法: yard-alloc --schedule <file> [--trend <file>] [--config <json>] \
[--preset strict|standard|relaxed] [--sizing normal|aggressive] [--seed N] \
[--output <json>] [--audit] [--json-log]";

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(flag) = args.next() {
        let mut value = || {
            args.next()
                .with_context(|| format!("参数 {} 缺少取值\n{}", flag, USAGE))
        };
        match flag.as_str() {
            "--schedule" => parsed.schedule = Some(PathBuf::from(value()?)),
            "--trend" => parsed.trend = Some(PathBuf::from(value()?)),
            "--config" => parsed.config = Some(PathBuf::from(value()?)),
            "--preset" => parsed.preset = Some(value()?),
            "--sizing" => parsed.sizing = Some(value()?),
            "--seed" => {
                let raw = value()?;
                let seed = raw
                    .parse::<u64>()
                    .with_context(|| format!("种子必须为非负整数: {}", raw))?;
                parsed.seed = Some(seed);
            }
            "--output" => parsed.output = Some(PathBuf::from(value()?)),
            "--audit" => parsed.audit = true,
            "--json-log" => parsed.json_log = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other => bail!("未知参数: {}\n{}", other, USAGE),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    if args.json_log {
        logging::init_json();
    } else {
        logging::init();
    }

    tracing::info!("==================================================");
    tracing::info!("{}", yard_alloc::APP_NAME);
    tracing::info!("系统版本: {}", yard_alloc::VERSION);
    tracing::info!("==================================================");

    let Some(schedule_path) = args.schedule.as_ref() else {
        bail!("缺少 --schedule\n{}", USAGE);
    };

    // 配置: 文件 → 命令行覆写
    let mut manager = match &args.config {
        Some(path) => ConfigManager::load(path)?,
        None => ConfigManager::new(),
    };
    if let Some(preset) = &args.preset {
        manager.apply_preset(preset)?;
    }
    if let Some(sizing) = &args.sizing {
        manager.apply_cluster_sizing(sizing)?;
    }
    if let Some(seed) = args.seed {
        manager.apply_seed(seed);
    }
    tracing::debug!(config = %manager.snapshot_json()?, "生效配置");

    let schedules = ScheduleImporter::new()
        .import_file(schedule_path)
        .with_context(|| format!("船期导入失败: {}", schedule_path.display()))?;
    let trend = match &args.trend {
        Some(path) => TrendImporter::new()
            .import_file(path)
            .with_context(|| format!("趋势表导入失败: {}", path.display()))?,
        None => TrendTable::new(),
    };

    let config = manager.into_config();
    let outcome = YardSimulator::new(&config, schedules, &trend)?.run();

    print_summary(&outcome);

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&outcome)?;
        fs::write(path, json).with_context(|| format!("写出结果失败: {}", path.display()))?;
        tracing::info!(path = %path.display(), "仿真结果已写出");
    }

    if args.audit {
        let violations = check_outcome(&outcome);
        for violation in &violations {
            eprintln!("[审计] {}", violation);
        }
        if !violations.is_empty() {
            bail!("审计发现 {} 项违规", violations.len());
        }
        println!("审计通过");
    }

    Ok(())
}

/// 汇总表 + 拥堵日 + 失败日
fn print_summary(outcome: &SimulationOutcome) {
    println!(
        "{:<24} {:>10} {:>10} {:>10} {:>8}",
        "船名", "需求箱量", "满足箱量", "失败箱量", "满足率"
    );
    for recap in &outcome.recaps {
        println!(
            "{:<24} {:>10} {:>10} {:>10} {:>7.1}%",
            recap.vessel,
            recap.requested_boxes,
            recap.fulfilled_boxes,
            recap.failed_boxes,
            recap.fulfilment_ratio() * 100.0
        );
    }

    match outcome.most_congested_day() {
        Some(peak) => {
            println!(
                "最拥堵日: {} (占用 {} 个箱位, {:.1}%)",
                peak.date, peak.occupied_slots, peak.occupancy_pct
            );
            // 当日各箱区航线分布
            for area in outcome.layout.areas() {
                let Some(row) = outcome.service_row(peak.date, &area.name) else {
                    continue;
                };
                let spans: Vec<String> = row
                    .spans
                    .iter()
                    .filter_map(|s| {
                        s.service
                            .as_ref()
                            .map(|svc| format!("{}@{}-{}", svc, s.start, s.start + s.len - 1))
                    })
                    .collect();
                if !spans.is_empty() {
                    println!("  {}: {}", area.name, spans.join(" "));
                }
            }
        }
        None => println!("最拥堵日: 无 (仿真区间为空)"),
    }

    let failure_days = outcome.failure_days();
    if failure_days.is_empty() {
        println!("分配失败: 无");
    } else {
        let days: Vec<String> = failure_days.iter().map(|d| d.to_string()).collect();
        println!(
            "分配失败: {} 次, 涉及日期 {}",
            outcome.failure_count(),
            days.join(", ")
        );
    }
}
