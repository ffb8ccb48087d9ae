// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成船期 / 趋势表样例 CSV (固定种子, 可复现)
// 输出: tests/fixtures/datasets/*.csv
// ==========================================

use chrono::{Duration, NaiveDate};
use csv::Writer;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::fs::{self, File};

const OUTPUT_DIR: &str = "tests/fixtures/datasets";
const SEED: u64 = 20250301;

const SCHEDULE_HEADER: &[&str] = &["Vessel", "Service", "Total Boxes", "Open Stacking", "ETD"];
const SERVICES: &[&str] = &["AEX", "CIX", "MED", "JKT", "PNW"];

// 船期记录
struct ScheduleRecord {
    vessel: String,
    service: String,
    total_boxes: u32,
    open_stacking: NaiveDate,
    etd: NaiveDate,
}

impl ScheduleRecord {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.vessel.clone(),
            self.service.clone(),
            self.total_boxes.to_string(),
            self.open_stacking.format("%Y-%m-%d").to_string(),
            self.etd.format("%Y-%m-%d").to_string(),
        ]
    }
}

fn base_date() -> Result<NaiveDate, Box<dyn Error>> {
    NaiveDate::from_ymd_opt(2025, 3, 1).ok_or_else(|| "无效基准日期".into())
}

fn generate_record(rng: &mut ChaCha8Rng, index: usize, base: NaiveDate, max_boxes: u32) -> ScheduleRecord {
    let open_stacking = base + Duration::days(rng.random_range(0..14));
    let stay = rng.random_range(3..=7);
    ScheduleRecord {
        vessel: format!("MV {:03}", index + 1),
        service: SERVICES[rng.random_range(0..SERVICES.len())].to_string(),
        total_boxes: rng.random_range(60..=max_boxes),
        open_stacking,
        etd: open_stacking + Duration::days(stay),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("开始生成测试数据集...");
    fs::create_dir_all(OUTPUT_DIR)?;

    let mut rng = ChaCha8Rng::seed_from_u64(SEED);

    // 1. 常规船期 (30 条)
    generate_schedule(&mut rng, "01_normal_schedule.csv", 30, 600)?;

    // 2. 高负荷船期 (80 条, 箱量更大)
    generate_schedule(&mut rng, "02_congested_schedule.csv", 80, 1500)?;

    // 3. 趋势表
    generate_trend(&mut rng)?;

    // 4. 含错误的船期 (重复船名 + 开港晚于离港)
    generate_invalid_schedule()?;

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}

fn generate_schedule(
    rng: &mut ChaCha8Rng,
    file_name: &str,
    count: usize,
    max_boxes: u32,
) -> Result<(), Box<dyn Error>> {
    let base = base_date()?;
    let file = File::create(format!("{}/{}", OUTPUT_DIR, file_name))?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(SCHEDULE_HEADER)?;
    for i in 0..count {
        let record = generate_record(rng, i, base, max_boxes);
        wtr.write_record(&record.to_row())?;
    }

    wtr.flush()?;
    println!("✓ 生成 {} ({}条)", file_name, count);
    Ok(())
}

fn generate_trend(rng: &mut ChaCha8Rng) -> Result<(), Box<dyn Error>> {
    let file_name = "03_trend.csv";
    let file = File::create(format!("{}/{}", OUTPUT_DIR, file_name))?;
    let mut wtr = Writer::from_writer(file);

    let days = 8;
    let mut header = vec!["Service".to_string()];
    header.extend((1..=days).map(|d| format!("Day{}", d)));
    wtr.write_record(&header)?;

    for service in SERVICES {
        // 进箱集中在离港前几天
        let weights: Vec<f64> = (0..days)
            .map(|d| (d as f64 + 1.0) * rng.random_range(0.5..1.5))
            .collect();
        let sum: f64 = weights.iter().sum();
        let mut row = vec![service.to_string()];
        row.extend(weights.iter().map(|w| format!("{:.1}%", w / sum * 100.0)));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    println!("✓ 生成 {} ({}条)", file_name, SERVICES.len());
    Ok(())
}

fn generate_invalid_schedule() -> Result<(), Box<dyn Error>> {
    let file_name = "04_invalid_schedule.csv";
    let base = base_date()?;
    let file = File::create(format!("{}/{}", OUTPUT_DIR, file_name))?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(SCHEDULE_HEADER)?;
    let records = [
        ScheduleRecord {
            vessel: "MV DUP".to_string(),
            service: "AEX".to_string(),
            total_boxes: 120,
            open_stacking: base,
            etd: base + Duration::days(4),
        },
        ScheduleRecord {
            vessel: "MV DUP".to_string(),
            service: "CIX".to_string(),
            total_boxes: 90,
            open_stacking: base,
            etd: base + Duration::days(3),
        },
        ScheduleRecord {
            vessel: "MV LATE".to_string(),
            service: "MED".to_string(),
            total_boxes: 60,
            open_stacking: base + Duration::days(5),
            etd: base + Duration::days(2),
        },
    ];
    for record in &records {
        wtr.write_record(&record.to_row())?;
    }

    wtr.flush()?;
    println!("✓ 生成 {} ({}条, 含错误)", file_name, records.len());
    Ok(())
}
