// ==========================================
// 堆场箱位分配仿真系统 - 进箱预测引擎
// ==========================================
// 职责: 总箱量 + 航线趋势 → 每日进箱序列
// 红线: 输出序列之和必须严格等于总箱量
// ==========================================
// 规则:
// 1) 航线不在趋势表 → 每日均分 1/n
// 2) 航线存在但某日缺数据 → 该日按 0%
// 3) 归一化 → 乘总量 → 四舍五入 → 余数补到最大日
// ==========================================

use crate::domain::trend::TrendTable;
use tracing::debug;

// ==========================================
// ArrivalForecaster - 进箱预测引擎
// ==========================================
pub struct ArrivalForecaster {
    // 无状态引擎, 纯函数
}

impl ArrivalForecaster {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 生成每日进箱预测
    ///
    /// # 参数
    /// - `total_boxes`: 总箱量
    /// - `service`: 航线代码
    /// - `trend`: 趋势表
    /// - `days`: 开港天数
    ///
    /// # 返回
    /// 长度为 `days` 的非负整数序列, 之和等于 `total_boxes`
    pub fn forecast(
        &self,
        total_boxes: u32,
        service: &str,
        trend: &TrendTable,
        days: usize,
    ) -> Vec<u32> {
        if days == 0 {
            return Vec::new();
        }

        let weights = self.day_weights(service, trend, days);
        let mut allocation: Vec<i64> = weights
            .iter()
            .map(|w| (w * total_boxes as f64).round() as i64)
            .collect();

        let remainder = total_boxes as i64 - allocation.iter().sum::<i64>();
        self.settle_remainder(&mut allocation, remainder);

        allocation.into_iter().map(|v| v.max(0) as u32).collect()
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 归一化后的每日权重 (和为 1)
    fn day_weights(&self, service: &str, trend: &TrendTable, days: usize) -> Vec<f64> {
        let uniform = vec![1.0 / days as f64; days];

        let Some(profile) = trend.profile(service) else {
            debug!(service, days, "航线不在趋势表中, 按均分处理");
            return uniform;
        };

        let raw: Vec<f64> = (0..days)
            .map(|day| {
                profile
                    .get(day)
                    .copied()
                    .flatten()
                    .filter(|p| p.is_finite() && *p > 0.0)
                    .unwrap_or(0.0)
            })
            .collect();

        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 {
            debug!(service, days, "趋势在开港窗口内全为 0, 按均分处理");
            return uniform;
        }

        raw.into_iter().map(|p| p / sum).collect()
    }

    /// 把四舍五入余数补到最大日
    ///
    /// 负余数超过最大日本身时, 依次从次大日继续扣减, 保证无负值
    fn settle_remainder(&self, allocation: &mut [i64], mut remainder: i64) {
        if remainder > 0 {
            if let Some(idx) = largest_day(allocation) {
                allocation[idx] += remainder;
            }
            return;
        }

        while remainder < 0 {
            let Some(idx) = largest_day(allocation) else {
                break;
            };
            if allocation[idx] <= 0 {
                break;
            }
            let take = allocation[idx].min(-remainder);
            allocation[idx] -= take;
            remainder += take;
        }
    }
}

/// 最大日下标 (并列取最早)
fn largest_day(allocation: &[i64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, &value) in allocation.iter().enumerate() {
        match best {
            Some(b) if allocation[b] >= value => {}
            _ => best = Some(idx),
        }
    }
    best
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for ArrivalForecaster {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn trend_with(service: &str, profile: Vec<Option<f64>>) -> TrendTable {
        let mut trend = TrendTable::new();
        trend.insert(service, profile);
        trend
    }

    #[test]
    fn test_unknown_service_falls_back_to_uniform() {
        let forecaster = ArrivalForecaster::new();
        let result = forecaster.forecast(30, "NEW", &TrendTable::new(), 3);
        assert_eq!(result, vec![10, 10, 10]);
    }

    #[test]
    fn test_profile_is_normalized() {
        // 20/30/50 → 合计 100, 与百分比写法无关
        let forecaster = ArrivalForecaster::new();
        let trend = trend_with("SVC", vec![Some(2.0), Some(3.0), Some(5.0)]);
        assert_eq!(forecaster.forecast(200, "SVC", &trend, 3), vec![40, 60, 100]);
    }

    #[test]
    fn test_missing_days_count_as_zero_not_uniform() {
        // 开港 4 天, 趋势只覆盖 2 天
        let forecaster = ArrivalForecaster::new();
        let trend = trend_with("SVC", vec![Some(50.0), Some(50.0)]);
        assert_eq!(forecaster.forecast(100, "SVC", &trend, 4), vec![50, 50, 0, 0]);

        // 中间缺值
        let trend = trend_with("SVC", vec![Some(40.0), None, Some(60.0)]);
        assert_eq!(forecaster.forecast(10, "SVC", &trend, 3), vec![4, 0, 6]);
    }

    #[test]
    fn test_positive_remainder_goes_to_largest_day() {
        // 1/3 各 → 0,0,0 → 余 1 补到首个最大日
        let forecaster = ArrivalForecaster::new();
        assert_eq!(forecaster.forecast(1, "X", &TrendTable::new(), 3), vec![1, 0, 0]);

        let trend = trend_with("SVC", vec![Some(10.0), Some(45.0), Some(45.0)]);
        let result = forecaster.forecast(7, "SVC", &trend, 3);
        assert_eq!(result.iter().sum::<u32>(), 7);
    }

    #[test]
    fn test_negative_remainder_never_goes_below_zero() {
        // 0.5 各 → 1,1,1,1 = 4 > 2
        let forecaster = ArrivalForecaster::new();
        let result = forecaster.forecast(2, "X", &TrendTable::new(), 4);
        assert_eq!(result.iter().sum::<u32>(), 2);
        assert_eq!(result, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_degenerate_profiles() {
        let forecaster = ArrivalForecaster::new();

        // 全 0 → 均分
        // 4.5/4.5 → 5/5, 多出的 1 箱从首个最大日扣回
        let trend = trend_with("SVC", vec![Some(0.0), Some(0.0)]);
        let result = forecaster.forecast(9, "SVC", &trend, 2);
        assert_eq!(result, vec![4, 5]);
        assert_eq!(result.iter().sum::<u32>(), 9);

        // 单日
        assert_eq!(forecaster.forecast(9, "SVC", &trend, 1), vec![9]);

        // 零天
        assert!(forecaster.forecast(9, "SVC", &trend, 0).is_empty());

        // 零箱
        assert_eq!(forecaster.forecast(0, "SVC", &trend, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_largest_day_tie_takes_earliest() {
        let forecaster = ArrivalForecaster::new();

        // 1.5/1.5 → 2/2, 扣回落在第 1 天
        assert_eq!(forecaster.forecast(3, "X", &TrendTable::new(), 2), vec![1, 2]);

        // 10/45/45 → 0.8/3.6/3.6 → 1/4/4, 扣回落在第 2 天
        let trend = trend_with("SVC", vec![Some(10.0), Some(45.0), Some(45.0)]);
        assert_eq!(forecaster.forecast(8, "SVC", &trend, 3), vec![1, 3, 4]);

        assert_eq!(largest_day(&[2, 5, 5, 1]), Some(1));
        assert_eq!(largest_day(&[]), None);
    }
}
