// ==========================================
// 班组排程系统 - 阶段人力配置规则
// ==========================================
// 职责: 按阶段核对已派人数与申报人力需求
// 判定: 超员 => LOW (低效非危险); 超出硬上限 => HIGH (预提交时阻断);
//       临期缺员 (开工日落入前瞻窗口) => HIGH
// ==========================================

use crate::config::EngineConfig;
use crate::domain::{Conflict, ConflictSeverity, ConflictType, EntityType};
use crate::engine::working_set::WorkingSet;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

// ==========================================
// CapacityOverflowRule - 阶段人力配置规则
// ==========================================
pub struct CapacityOverflowRule;

impl CapacityOverflowRule {
    pub fn new() -> Self {
        Self
    }

    /// 超员硬上限: ceil(需求人数 × 硬上限比例)
    pub fn hard_limit(required: u32, ratio: f64) -> u32 {
        (f64::from(required) * ratio).ceil() as u32
    }

    /// 评估工作集内全部阶段的人力配置
    ///
    /// # 说明
    /// - 已取消/已竣工项目的阶段不做人力核对（由日期规则整体标记）
    /// - 缺员仅在开工日临近（距今不超过前瞻天数）且阶段尚未收尾时升级报告,
    ///   远期阶段允许暂未配齐
    pub fn evaluate(
        &self,
        set: &WorkingSet,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Vec<Conflict> {
        let today = now.date_naive();
        let mut conflicts = Vec::new();
        let by_phase = set.assignments_by_phase();

        // 阶段按ID升序遍历, 保证输出顺序确定
        let mut phase_ids: Vec<&str> = set.phases.keys().map(String::as_str).collect();
        phase_ids.sort_unstable();

        for phase_id in phase_ids {
            let detail = &set.phases[phase_id];
            if !detail.project.status.accepts_assignments() {
                continue;
            }

            let required = detail.phase.labor.required_headcount();
            if required == 0 {
                continue;
            }

            // 去重后的已派员工集合
            let assigned: BTreeSet<&str> = by_phase
                .get(phase_id)
                .map(|list| list.iter().map(|a| a.employee_id.as_str()).collect())
                .unwrap_or_default();
            let assigned_count = assigned.len() as u32;

            if assigned_count > required {
                let hard_limit = Self::hard_limit(required, config.overstaff_hard_limit_ratio);
                let (severity, description) = if assigned_count > hard_limit {
                    (
                        ConflictSeverity::High,
                        format!(
                            "阶段 {} 已派 {} 人, 突破硬上限 {} 人 (申报需求 {} 人)",
                            phase_id, assigned_count, hard_limit, required
                        ),
                    )
                } else {
                    (
                        ConflictSeverity::Low,
                        format!(
                            "阶段 {} 已派 {} 人, 超出申报需求 {} 人",
                            phase_id, assigned_count, required
                        ),
                    )
                };
                conflicts.push(Conflict::new(
                    ConflictType::CapacityOverflow,
                    severity,
                    EntityType::Phase,
                    phase_id,
                    assigned.iter().map(|s| s.to_string()),
                    now,
                    description,
                ));
            } else if assigned_count < required {
                let days_until_start = (detail.phase.start_date - today).num_days();
                let still_open = today <= detail.phase.end_date
                    && detail.phase.progress_percentage < 100.0;
                if days_until_start <= config.understaffing_horizon_days && still_open {
                    conflicts.push(Conflict::new(
                        ConflictType::CapacityOverflow,
                        ConflictSeverity::High,
                        EntityType::Phase,
                        phase_id,
                        assigned.iter().map(|s| s.to_string()),
                        now,
                        format!(
                            "阶段 {} 距开工 {} 天, 仅配 {}/{} 人",
                            phase_id, days_until_start, assigned_count, required
                        ),
                    ));
                }
            }
        }

        conflicts
    }
}

impl Default for CapacityOverflowRule {
    fn default() -> Self {
        Self::new()
    }
}
