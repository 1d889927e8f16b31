// ==========================================
// 班组排程系统 - 扫描工作集
// ==========================================
// 职责: 聚合一次扫描所需的全部快照数据, 供规则评估器只读消费
// 目标: 评估器只依赖工作集, 不直接触达存储适配器
// ==========================================

use crate::domain::{Assignment, Division, Employee, PhaseWithProject};
use crate::engine::time_window::TimeWindow;
use std::collections::HashMap;

// ==========================================
// ScanScope - 扫描范围
// ==========================================
// 缓存键以 fingerprint() 为准: 不含具体日期窗口,
// 同一过滤条件的扫描共享缓存槽位（失效由调用方显式触发）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanScope {
    pub window: TimeWindow,         // 指派检索窗口（回溯起点..前瞻终点）
    pub division: Option<Division>, // 可选工种过滤
}

impl ScanScope {
    /// 全量扫描范围
    pub fn all(window: TimeWindow) -> Self {
        Self {
            window,
            division: None,
        }
    }

    /// 缓存键指纹: "all" 或过滤条件签名
    pub fn fingerprint(&self) -> String {
        match self.division {
            None => "all".to_string(),
            Some(d) => format!("division={}", d),
        }
    }
}

// ==========================================
// WorkingSet - 扫描快照
// ==========================================
// 一次扫描装配一次, 评估期间不再回源; 保证全部评估器
// 基于同一份数据（引用透明的前提）
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    pub assignments: Vec<Assignment>,
    pub employees: HashMap<String, Employee>,
    pub phases: HashMap<String, PhaseWithProject>,
}

impl WorkingSet {
    /// 按ID取员工快照
    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.get(employee_id)
    }

    /// 按ID取阶段快照（含所属项目）
    pub fn phase(&self, phase_id: &str) -> Option<&PhaseWithProject> {
        self.phases.get(phase_id)
    }

    /// 指派按员工分组（组内按日期升序, 保证评估顺序确定）
    pub fn assignments_by_employee(&self) -> HashMap<&str, Vec<&Assignment>> {
        let mut grouped: HashMap<&str, Vec<&Assignment>> = HashMap::new();
        for a in &self.assignments {
            grouped.entry(a.employee_id.as_str()).or_default().push(a);
        }
        for list in grouped.values_mut() {
            list.sort_by(|a, b| {
                a.assignment_date
                    .cmp(&b.assignment_date)
                    .then_with(|| a.assignment_id.cmp(&b.assignment_id))
            });
        }
        grouped
    }

    /// 指派按阶段分组
    pub fn assignments_by_phase(&self) -> HashMap<&str, Vec<&Assignment>> {
        let mut grouped: HashMap<&str, Vec<&Assignment>> = HashMap::new();
        for a in &self.assignments {
            grouped.entry(a.phase_id.as_str()).or_default().push(a);
        }
        grouped
    }
}
