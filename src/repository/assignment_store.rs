// ==========================================
// 班组排程系统 - 指派存储适配器 Trait
// ==========================================
// 职责: 定义引擎消费的只读查询契约（不包含实现）
// 红线: 适配器只做类型化查询, 不含业务规则; 引擎从不通过它写库
// 说明: 存储调用是引擎仅有的挂起点 (async)
// ==========================================

use crate::domain::{Assignment, Division, Employee, PhaseWithProject};
use crate::engine::time_window::TimeWindow;
use crate::engine::working_set::ScanScope;
use crate::repository::error::StoreResult;
use async_trait::async_trait;

// ==========================================
// AssignmentStore Trait
// ==========================================
// 用途: 冲突引擎的数据来源
// 实现者: SqliteAssignmentStore（rusqlite 参考实现）
#[async_trait]
pub trait AssignmentStore: Send + Sync {
    /// 列出工作集内的指派
    ///
    /// # 参数
    /// - scope: 扫描范围（回溯窗口起点、可选工种过滤）
    ///
    /// # 说明
    /// - 返回窗口内全部指派, **包含**引用已停用员工/已取消项目的记录,
    ///   由评估器负责标记, 不得在查询层静默丢弃
    async fn list_active_assignments(&self, scope: &ScanScope) -> StoreResult<Vec<Assignment>>;

    /// 按ID取员工
    ///
    /// # 返回
    /// - Err(StoreError::NotFound): ID 不存在
    async fn get_employee(&self, employee_id: &str) -> StoreResult<Employee>;

    /// 批量取员工（扫描时装配工作集用）
    async fn list_employees(&self, employee_ids: &[String]) -> StoreResult<Vec<Employee>>;

    /// 按ID取阶段（联查所属项目）
    ///
    /// # 返回
    /// - Err(StoreError::NotFound): ID 不存在
    async fn get_phase(&self, phase_id: &str) -> StoreResult<PhaseWithProject>;

    /// 按ID取指派
    async fn get_assignment(&self, assignment_id: &str) -> StoreResult<Assignment>;

    /// 列出未取消项目下、窗口相交的阶段（联查项目）
    ///
    /// # 说明
    /// - 缺员检测需要覆盖"零指派"的阶段, 故不能只从指派反推阶段集合
    async fn list_active_phases(&self, range: &TimeWindow) -> StoreResult<Vec<PhaseWithProject>>;

    /// 列出某员工在日期区间内的指派
    async fn list_assignments_for_employee(
        &self,
        employee_id: &str,
        range: &TimeWindow,
    ) -> StoreResult<Vec<Assignment>>;

    /// 列出某阶段的全部指派
    async fn list_assignments_for_phase(&self, phase_id: &str) -> StoreResult<Vec<Assignment>>;

    /// 列出可用员工（在职, 可按工种/日期区间过滤）
    ///
    /// # 说明
    /// - division 过滤包含兼容工种（普工）
    /// - range 仅用于存储侧的可用性粗筛; 精细的工时判断由建议器完成
    async fn list_available_employees(
        &self,
        division: Option<Division>,
        range: Option<&TimeWindow>,
    ) -> StoreResult<Vec<Employee>>;
}
