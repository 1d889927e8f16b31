// ==========================================
// 班组排程系统 - 重复派工规则
// ==========================================
// 职责: 检测同一员工同日/跨日溢出的工时冲突
// 判定: 同日组合工时 > 日上限 => CRITICAL (全重叠);
//       前日块溢出工时与次日工时组合 > 日上限 => HIGH (部分重叠)
// ==========================================

use crate::config::EngineConfig;
use crate::domain::{Conflict, ConflictSeverity, ConflictType, EntityType};
use crate::engine::working_set::WorkingSet;
use chrono::{DateTime, Utc};

// ==========================================
// DoubleBookingRule - 重复派工规则
// ==========================================
pub struct DoubleBookingRule;

impl DoubleBookingRule {
    pub fn new() -> Self {
        Self
    }

    /// 评估工作集内全部员工的重复派工
    ///
    /// # 说明
    /// - 多日块只登记首日, 超出日上限的工时视为溢出到次日;
    ///   溢出部分与次日已有指派组合超限即为部分重叠
    /// - 间隔超过一天的组合属于周超配规则的口径, 此处不重复报告
    pub fn evaluate(
        &self,
        set: &WorkingSet,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let grouped = set.assignments_by_employee();

        // 员工按ID升序遍历, 保证输出顺序确定
        let mut employee_ids: Vec<&str> = grouped.keys().copied().collect();
        employee_ids.sort_unstable();

        for employee_id in employee_ids {
            let assignments = &grouped[employee_id];
            let daily_capacity = set
                .employee(employee_id)
                .map(|e| e.effective_daily_capacity(config.default_daily_capacity_hours))
                .unwrap_or(config.default_daily_capacity_hours);

            // 组内已按日期升序, 两两比对同日/邻日组合
            for i in 0..assignments.len() {
                for j in (i + 1)..assignments.len() {
                    let a = assignments[i];
                    let b = assignments[j];
                    let gap = (b.assignment_date - a.assignment_date).num_days();
                    if gap > 1 {
                        break; // 日期升序, 后续只会更远
                    }

                    let (severity, description) = if gap == 0 {
                        // 同日全重叠
                        let combined = a.hours_allocated + b.hours_allocated;
                        if combined <= daily_capacity {
                            continue;
                        }
                        (
                            ConflictSeverity::Critical,
                            format!(
                                "员工 {} 在 {} 存在重复派工: 组合工时 {:.1}h 超出日上限 {:.1}h",
                                employee_id, a.assignment_date, combined, daily_capacity
                            ),
                        )
                    } else {
                        // 邻日部分重叠: 前日块超出日上限的溢出工时侵入次日
                        let spill = (a.hours_allocated - daily_capacity).max(0.0);
                        let combined = spill + b.hours_allocated;
                        if spill <= 0.0 || combined <= daily_capacity {
                            continue;
                        }
                        (
                            ConflictSeverity::High,
                            format!(
                                "员工 {} 在 {} 的多日块溢出 {:.1}h 侵入 {}: 次日组合工时 {:.1}h 超出日上限 {:.1}h",
                                employee_id,
                                a.assignment_date,
                                spill,
                                b.assignment_date,
                                combined,
                                daily_capacity
                            ),
                        )
                    };

                    conflicts.push(Conflict::new(
                        ConflictType::DoubleBooking,
                        severity,
                        EntityType::Employee,
                        employee_id,
                        [a.assignment_id.clone(), b.assignment_id.clone()],
                        now,
                        description,
                    ));
                }
            }
        }

        conflicts
    }
}

impl Default for DoubleBookingRule {
    fn default() -> Self {
        Self::new()
    }
}
