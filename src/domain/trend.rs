// ==========================================
// 堆场箱位分配仿真系统 - 航线进箱趋势表
// ==========================================
// 职责: 航线 → 按开港日偏移排列的进箱百分比 (允许缺失)
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// TrendTable - 进箱趋势表
// ==========================================
// 下标 0 对应开港首日; None 表示该日缺数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrendTable {
    profiles: BTreeMap<String, Vec<Option<f64>>>,
}

impl TrendTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入 (覆盖) 某航线的趋势
    pub fn insert(&mut self, service: &str, percentages: Vec<Option<f64>>) {
        self.profiles.insert(service.trim().to_string(), percentages);
    }

    /// 以完整 (无缺失) 数组写入
    pub fn insert_dense(&mut self, service: &str, percentages: &[f64]) {
        self.insert(service, percentages.iter().copied().map(Some).collect());
    }

    pub fn profile(&self, service: &str) -> Option<&[Option<f64>]> {
        self.profiles.get(service.trim()).map(Vec::as_slice)
    }

    pub fn contains(&self, service: &str) -> bool {
        self.profiles.contains_key(service.trim())
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
