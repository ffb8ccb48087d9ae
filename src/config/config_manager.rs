// ==========================================
// 堆场箱位分配仿真系统 - 配置管理器
// ==========================================
// 职责: 配置加载、覆写、快照
// 存储: JSON 文件 (缺省字段取默认值)
// ==========================================

use crate::config::allocation_rules::RulePreset;
use crate::config::simulation_config::{RulesSetting, SimulationConfig, TieBreakPolicy};
use crate::domain::types::ClusterSizing;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置值错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config: SimulationConfig,
}

impl ConfigManager {
    /// 以默认配置创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 文件加载
    ///
    /// # 参数
    /// - path: 配置文件路径
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let manager = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "配置文件加载完成");
        Ok(manager)
    }

    /// 从 JSON 文本加载
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let config: SimulationConfig = serde_json::from_str(raw)?;
        Ok(Self { config })
    }

    /// 覆写规则档位 (字符串形式, 供命令行使用)
    pub fn apply_preset(&mut self, preset: &str) -> ConfigResult<()> {
        let parsed: RulePreset = preset.parse().map_err(|message| ConfigError::InvalidValue {
            key: "rules".to_string(),
            value: preset.to_string(),
            message,
        })?;
        debug!(preset = parsed.as_str(), "覆写规则档位");
        self.config.rules = RulesSetting::Preset(parsed);
        Ok(())
    }

    /// 覆写簇规模模式; 预设档位会先展开为完整规则
    pub fn apply_cluster_sizing(&mut self, sizing: &str) -> ConfigResult<()> {
        let parsed: ClusterSizing =
            sizing.parse().map_err(|message| ConfigError::InvalidValue {
                key: "cluster_sizing".to_string(),
                value: sizing.to_string(),
                message,
            })?;
        let rules = self.config.allocation_rules().with_cluster_sizing(parsed);
        self.config.rules = RulesSetting::Custom(rules);
        Ok(())
    }

    /// 覆写 tie-break 种子
    pub fn apply_seed(&mut self, seed: u64) {
        debug!(seed, "覆写 tie-break 种子");
        self.config.tie_break = TieBreakPolicy::Seeded(seed);
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn into_config(self) -> SimulationConfig {
        self.config
    }

    /// 生效配置快照 (JSON), 写入输出文件以便复现
    pub fn snapshot_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(&self.config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::allocation_rules::AllocationRules;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"layout":[{{"area":"A01","slots":10}}],"slot_capacity":5,"rules":"relaxed"}}"#
        )
        .unwrap();

        let manager = ConfigManager::load(file.path()).unwrap();
        assert_eq!(manager.config().slot_capacity, 5);
        assert_eq!(manager.config().layout.len(), 1);
        assert_eq!(manager.config().allocation_rules(), AllocationRules::relaxed());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = ConfigManager::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_overrides() {
        let mut manager = ConfigManager::new();
        manager.apply_preset("strict").unwrap();
        manager.apply_seed(99);
        manager.apply_cluster_sizing("aggressive").unwrap();

        let config = manager.config();
        assert_eq!(config.tie_break, TieBreakPolicy::Seeded(99));
        let rules = config.allocation_rules();
        assert_eq!(rules.inter_ship_gap, AllocationRules::strict().inter_ship_gap);
        assert_eq!(rules.cluster_sizing, ClusterSizing::Aggressive);

        assert!(matches!(
            manager.apply_preset("loose-ish"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_snapshot_round_trips() {
        let manager = ConfigManager::new();
        let json = manager.snapshot_json().unwrap();
        let reloaded = ConfigManager::from_json_str(&json).unwrap();
        assert_eq!(reloaded.config(), manager.config());
    }
}
