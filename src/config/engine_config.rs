// ==========================================
// 班组排程系统 - 引擎配置
// ==========================================
// 职责: 冲突引擎的阈值与窗口参数
// 存储: JSON 文件（用户配置目录）, 缺省时回退默认值
// ==========================================

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ==========================================
// EngineConfig - 引擎配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 员工未单独声明时的日工时上限（小时）
    pub default_daily_capacity_hours: f64,

    /// 周工时超配升级为 HIGH 的超出比例（0.20 = 超出 20%）
    pub overallocation_high_ratio: f64,

    /// 阶段超员硬上限比例（assigned > ceil(required × ratio) 时阻断）
    pub overstaff_hard_limit_ratio: f64,

    /// 缺员升级前瞻天数（阶段开始日期距今不超过该天数时, 缺员升为 HIGH）
    pub understaffing_horizon_days: i64,

    /// 扫描回溯天数（早于 today - look_back_days 的历史指派不进工作集）
    pub look_back_days: i64,

    /// 扫描前瞻天数（阶段检索的前向边界, 抑制远期噪声）
    pub look_ahead_days: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_daily_capacity_hours: 8.0,
            overallocation_high_ratio: 0.20,
            overstaff_hard_limit_ratio: 1.5,
            understaffing_horizon_days: 7,
            look_back_days: 30,
            look_ahead_days: 90,
        }
    }
}

impl EngineConfig {
    /// 从 JSON 文件加载配置
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
        Ok(config)
    }

    /// 默认配置文件路径（用户配置目录）
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crew-scheduling-engine").join("engine_config.json"))
    }

    /// 加载默认路径配置; 文件不存在或解析失败时回退默认值
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("配置文件加载失败, 回退默认值: {e:#}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let c = EngineConfig::default();
        assert_eq!(c.default_daily_capacity_hours, 8.0);
        assert_eq!(c.overallocation_high_ratio, 0.20);
        assert_eq!(c.understaffing_horizon_days, 7);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"understaffing_horizon_days": 3}"#).unwrap();
        assert_eq!(config.understaffing_horizon_days, 3);
        assert_eq!(config.default_daily_capacity_hours, 8.0);
    }
}
