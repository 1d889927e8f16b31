// ==========================================
// 班组排程系统 - 冲突解决建议器
// ==========================================
// 职责: 按冲突类型给出排序后的整改提案
// 红线: 只读; 不执行写操作, 不对自身建议重新校验 (采纳方负责走预提交校验)
// 排序: 确定性比较器 (剩余工时降序 -> 工种精确匹配优先 -> 员工ID升序)
// ==========================================

use crate::api::error::ApiResult;
use crate::config::EngineConfig;
use crate::domain::{
    Assignment, Conflict, ConflictType, Employee, PhaseWithProject, ResolutionSuggestion,
    SuggestedAction,
};
use crate::engine::clock::Clock;
use crate::engine::time_window::TimeWindow;
use crate::repository::assignment_store::AssignmentStore;
use crate::repository::error::StoreError;
use chrono::{NaiveDate, Weekday};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, instrument};

/// 每类动作最多给出的候选数, 保证建议列表可操作
const MAX_SUGGESTIONS: usize = 5;

// ==========================================
// ResolutionAdvisor - 冲突解决建议器
// ==========================================
pub struct ResolutionAdvisor {
    store: Arc<dyn AssignmentStore>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl ResolutionAdvisor {
    /// 创建建议器实例
    pub fn new(
        store: Arc<dyn AssignmentStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// 为一条冲突生成排序后的解决建议
    ///
    /// 建议是只读提案; 涉及的实体可能在生成后被并发修改,
    /// 采纳前必须重新走 validate_assignment
    #[instrument(skip(self, conflict), fields(conflict_type = %conflict.conflict_type))]
    pub async fn get_resolution_suggestions(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        match conflict.conflict_type {
            ConflictType::DoubleBooking => self.suggest_for_double_booking(conflict).await,
            ConflictType::Overallocation => self.suggest_for_overallocation(conflict).await,
            ConflictType::SkillMismatch => self.suggest_for_skill_mismatch(conflict).await,
            ConflictType::CapacityOverflow => self.suggest_for_capacity_overflow(conflict).await,
            ConflictType::DateRangeViolation => self.suggest_for_date_range(conflict).await,
        }
    }

    // ==========================================
    // 分类型建议生成
    // ==========================================

    /// 重复派工: 先提议移日 (阶段窗口内有余量的日期), 再提议改派合格员工
    async fn suggest_for_double_booking(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        // 冲突关联的是一对指派; 建议移动其中创建较晚的一条
        let Some(target) = self.latest_related_assignment(conflict).await? else {
            return Ok(Vec::new());
        };
        let detail = match self.store.get_phase(&target.phase_id).await {
            Ok(d) => d,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut suggestions = self
            .spare_days_in_window(&target, &detail, None)
            .await?
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|date| ResolutionSuggestion {
                action: SuggestedAction::MoveToDate { date },
                description: format!(
                    "将指派 {} 移至 {} (员工当日仍有余量)",
                    target.assignment_id, date
                ),
            })
            .collect::<Vec<_>>();

        let candidates = self
            .ranked_candidates(
                detail.project.division,
                target.assignment_date,
                target.hours_allocated,
                &[target.employee_id.as_str()],
            )
            .await?;
        suggestions.extend(candidates.into_iter().take(MAX_SUGGESTIONS).map(|c| {
            ResolutionSuggestion {
                action: SuggestedAction::ReassignEmployee {
                    employee_id: c.employee.employee_id.clone(),
                },
                description: format!(
                    "改派给员工 {} ({} 当日剩余 {:.1}h)",
                    c.employee.employee_id, target.assignment_date, c.remaining_hours
                ),
            }
        }));

        Ok(suggestions)
    }

    /// 周超配: 提议把周内最轻的一条指派移出超配周
    async fn suggest_for_overallocation(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        let assignments = self.resolve_related_assignments(conflict).await?;
        let Some(target) = assignments.into_iter().min_by(|a, b| {
            a.hours_allocated
                .partial_cmp(&b.hours_allocated)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.assignment_id.cmp(&b.assignment_id))
        }) else {
            return Ok(Vec::new());
        };

        let detail = match self.store.get_phase(&target.phase_id).await {
            Ok(d) => d,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        // 只考虑超配周之外的日期
        let overloaded_week = target.assignment_date.week(Weekday::Mon);
        let exclude = TimeWindow {
            start: overloaded_week.first_day(),
            end: overloaded_week.last_day(),
        };

        let suggestions = self
            .spare_days_in_window(&target, &detail, Some(&exclude))
            .await?
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|date| ResolutionSuggestion {
                action: SuggestedAction::MoveToDate { date },
                description: format!(
                    "将指派 {} 移至 {} 以降低当周累计工时",
                    target.assignment_id, date
                ),
            })
            .collect();

        Ok(suggestions)
    }

    /// 工种不匹配: 提议正确工种的合格可用员工
    async fn suggest_for_skill_mismatch(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        let target = match self.store.get_assignment(&conflict.entity_id).await {
            Ok(a) => a,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let detail = match self.store.get_phase(&target.phase_id).await {
            Ok(d) => d,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let candidates = self
            .ranked_candidates(
                detail.project.division,
                target.assignment_date,
                target.hours_allocated,
                &[target.employee_id.as_str()],
            )
            .await?;

        Ok(candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|c| ResolutionSuggestion {
                action: SuggestedAction::ReassignEmployee {
                    employee_id: c.employee.employee_id.clone(),
                },
                description: format!(
                    "改派给 {} 工种员工 {}",
                    detail.project.division, c.employee.employee_id
                ),
            })
            .collect())
    }

    /// 人力配置溢出: 缺员时提议补充工种匹配且有余量的可用员工;
    /// 超员属低效非危险, 移走哪条指派是排程决策, 不自动提案
    async fn suggest_for_capacity_overflow(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        let detail = match self.store.get_phase(&conflict.entity_id).await {
            Ok(d) => d,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let assigned: BTreeSet<String> = self
            .store
            .list_assignments_for_phase(&detail.phase.phase_id)
            .await?
            .into_iter()
            .map(|a| a.employee_id)
            .collect();
        let required = detail.phase.labor.required_headcount();
        if assigned.len() as u32 >= required {
            debug!("超员冲突不生成自动提案");
            return Ok(Vec::new());
        }

        let exclude: Vec<&str> = assigned.iter().map(String::as_str).collect();
        let start = detail.phase.start_date.max(self.clock.today());
        let candidates = self
            .ranked_candidates(detail.project.division, start, 0.0, &exclude)
            .await?;

        Ok(candidates
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|c| ResolutionSuggestion {
                action: SuggestedAction::AddEmployee {
                    employee_id: c.employee.employee_id.clone(),
                },
                description: format!(
                    "为阶段 {} 补充员工 {} (缺 {} 人)",
                    detail.phase.phase_id,
                    c.employee.employee_id,
                    required - assigned.len() as u32
                ),
            })
            .collect())
    }

    /// 日期越界/生命周期失效: 给出合法日期区间; 项目已关闭或员工已停用时提议撤销
    async fn suggest_for_date_range(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        let target = match self.store.get_assignment(&conflict.entity_id).await {
            Ok(a) => a,
            Err(StoreError::NotFound { .. }) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let remove = |reason: &str| ResolutionSuggestion {
            action: SuggestedAction::RemoveAssignment {
                assignment_id: target.assignment_id.clone(),
            },
            description: format!("撤销指派 {}: {}", target.assignment_id, reason),
        };

        let detail = match self.store.get_phase(&target.phase_id).await {
            Ok(d) => d,
            Err(StoreError::NotFound { .. }) => {
                return Ok(vec![remove("引用的阶段已不存在")]);
            }
            Err(e) => return Err(e.into()),
        };

        if !detail.project.status.accepts_assignments() {
            return Ok(vec![remove("所属项目已不再承接指派")]);
        }

        match self.store.get_employee(&target.employee_id).await {
            Ok(e) if !e.is_active => {
                return Ok(vec![remove("员工已停用")]);
            }
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                return Ok(vec![remove("引用的员工已不存在")]);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(vec![ResolutionSuggestion {
            action: SuggestedAction::AdjustDateRange {
                earliest: detail.phase.start_date,
                latest: detail.phase.end_date,
            },
            description: format!(
                "将指派 {} 的日期调整至阶段窗口 {}..{} 内",
                target.assignment_id, detail.phase.start_date, detail.phase.end_date
            ),
        }])
    }

    // ==========================================
    // 候选计算
    // ==========================================

    /// 解析冲突关联实体中的指派记录 (悬空ID与非指派ID跳过)
    async fn resolve_related_assignments(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<Assignment>> {
        let mut assignments = Vec::new();
        for id in &conflict.related_entities {
            match self.store.get_assignment(id).await {
                Ok(a) => assignments.push(a),
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(assignments)
    }

    /// 取冲突关联指派中创建最晚的一条 (后来者优先被移动)
    async fn latest_related_assignment(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Option<Assignment>> {
        let mut assignments = self.resolve_related_assignments(conflict).await?;
        assignments.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.assignment_id.cmp(&b.assignment_id))
        });
        Ok(assignments.pop())
    }

    /// 阶段窗口内、目标员工尚有日工时余量的日期 (升序)
    async fn spare_days_in_window(
        &self,
        target: &Assignment,
        detail: &PhaseWithProject,
        exclude: Option<&TimeWindow>,
    ) -> ApiResult<Vec<NaiveDate>> {
        let window = TimeWindow {
            start: detail.phase.start_date,
            end: detail.phase.end_date,
        };
        let existing = self
            .store
            .list_assignments_for_employee(&target.employee_id, &window)
            .await?;

        let mut load_by_day: HashMap<NaiveDate, f64> = HashMap::new();
        for a in &existing {
            if a.assignment_id == target.assignment_id {
                continue; // 移动对象自身的占用不计
            }
            *load_by_day.entry(a.assignment_date).or_insert(0.0) += a.hours_allocated;
        }

        let daily_capacity = match self.store.get_employee(&target.employee_id).await {
            Ok(e) => e.effective_daily_capacity(self.config.default_daily_capacity_hours),
            Err(StoreError::NotFound { .. }) => self.config.default_daily_capacity_hours,
            Err(e) => return Err(e.into()),
        };

        Ok(window
            .iter_days()
            .filter(|day| *day != target.assignment_date)
            .filter(|day| exclude.map_or(true, |w| !w.contains(*day)))
            .filter(|day| {
                load_by_day.get(day).copied().unwrap_or(0.0) + target.hours_allocated
                    <= daily_capacity
            })
            .collect())
    }

    /// 可用员工候选排序: 剩余工时降序 -> 工种精确匹配优先 -> 员工ID升序
    async fn ranked_candidates(
        &self,
        division: crate::domain::Division,
        date: NaiveDate,
        needed_hours: f64,
        exclude_ids: &[&str],
    ) -> ApiResult<Vec<RankedCandidate>> {
        let day = TimeWindow::single(date);
        let available = self
            .store
            .list_available_employees(Some(division), Some(&day))
            .await?;

        let mut ranked = Vec::new();
        for employee in available {
            if exclude_ids.contains(&employee.employee_id.as_str()) {
                continue;
            }
            let load: f64 = self
                .store
                .list_assignments_for_employee(&employee.employee_id, &day)
                .await?
                .iter()
                .map(|a| a.hours_allocated)
                .sum();
            let remaining =
                employee.effective_daily_capacity(self.config.default_daily_capacity_hours) - load;
            if remaining < needed_hours || remaining <= 0.0 {
                continue;
            }
            ranked.push(RankedCandidate {
                exact_division: employee.division == division,
                remaining_hours: remaining,
                employee,
            });
        }

        ranked.sort_by(|a, b| {
            b.remaining_hours
                .partial_cmp(&a.remaining_hours)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.exact_division.cmp(&a.exact_division))
                .then_with(|| a.employee.employee_id.cmp(&b.employee.employee_id))
        });

        Ok(ranked)
    }
}

/// 排序后的候选员工
struct RankedCandidate {
    employee: Employee,
    remaining_hours: f64,
    exact_division: bool,
}
