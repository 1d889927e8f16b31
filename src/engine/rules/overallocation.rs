// ==========================================
// 班组排程系统 - 周工时超配规则
// ==========================================
// 职责: 按员工按自然周 (周一起始) 汇总工时, 检测超出周上限
// 判定: 超出 => MEDIUM; 超出 20% 以上 => HIGH (比例可配)
// ==========================================

use crate::config::EngineConfig;
use crate::domain::{Assignment, Conflict, ConflictSeverity, ConflictType, EntityType};
use crate::engine::working_set::WorkingSet;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use std::collections::BTreeMap;

// ==========================================
// OverallocationRule - 周工时超配规则
// ==========================================
pub struct OverallocationRule;

impl OverallocationRule {
    pub fn new() -> Self {
        Self
    }

    /// 评估工作集内全部员工的周工时
    ///
    /// 每个 (员工, 周) 组合至多产出一条冲突
    pub fn evaluate(
        &self,
        set: &WorkingSet,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let grouped = set.assignments_by_employee();

        let mut employee_ids: Vec<&str> = grouped.keys().copied().collect();
        employee_ids.sort_unstable();

        for employee_id in employee_ids {
            let Some(employee) = set.employee(employee_id) else {
                // 员工快照缺失时无法判定周上限, 生命周期问题由日期规则负责标记
                continue;
            };
            let weekly_capacity = employee.weekly_capacity_hours;

            // 按周一起始的自然周分桶 (BTreeMap 保证周序稳定)
            let mut weeks: BTreeMap<NaiveDate, Vec<&Assignment>> = BTreeMap::new();
            for &a in &grouped[employee_id] {
                let week_start = a.assignment_date.week(Weekday::Mon).first_day();
                weeks.entry(week_start).or_default().push(a);
            }

            for (week_start, assignments) in weeks {
                let total: f64 = assignments.iter().map(|a| a.hours_allocated).sum();
                if total <= weekly_capacity {
                    continue;
                }

                let high_threshold = weekly_capacity * (1.0 + config.overallocation_high_ratio);
                let severity = if total > high_threshold {
                    ConflictSeverity::High
                } else {
                    ConflictSeverity::Medium
                };

                conflicts.push(Conflict::new(
                    ConflictType::Overallocation,
                    severity,
                    EntityType::Employee,
                    employee_id,
                    assignments.iter().map(|a| a.assignment_id.clone()),
                    now,
                    format!(
                        "员工 {} 在 {} 起的一周累计工时 {:.1}h 超出周上限 {:.1}h",
                        employee_id, week_start, total, weekly_capacity
                    ),
                ));
            }
        }

        conflicts
    }
}

impl Default for OverallocationRule {
    fn default() -> Self {
        Self::new()
    }
}
