// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的内存库初始化、实体构造、固定时钟
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use crew_scheduling_engine::{
    Assignment, Division, Employee, FixedClock, LaborRequirement, Phase, Project, ProjectStatus,
    SqliteAssignmentStore,
};

/// 测试基准日: 2024-06-10 (周一), 周界计算直观
pub const TODAY: &str = "2024-06-10";

/// 解析日期字面量
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("合法日期字面量")
}

/// 基准日
pub fn today() -> NaiveDate {
    date(TODAY)
}

/// 基准日零点的固定时钟
pub fn fixed_clock() -> FixedClock {
    FixedClock::at_date(today())
}

/// 创建空内存库
pub fn create_test_store() -> SqliteAssignmentStore {
    SqliteAssignmentStore::in_memory().expect("内存库初始化失败")
}

fn audit_time() -> NaiveDateTime {
    today().and_hms_opt(8, 0, 0).unwrap()
}

/// 构造在职员工 (周上限 40h, 日上限走默认)
pub fn employee(id: &str, division: Division) -> Employee {
    Employee {
        employee_id: id.to_string(),
        name: format!("测试员工{id}"),
        division,
        is_active: true,
        weekly_capacity_hours: 40.0,
        daily_capacity_hours: None,
        skills: vec![],
    }
}

/// 构造项目
pub fn project(id: &str, division: Division, status: ProjectStatus) -> Project {
    Project {
        project_id: id.to_string(),
        name: format!("测试项目{id}"),
        division,
        status,
        start_date: date("2024-01-01"),
        end_date: date("2024-12-31"),
    }
}

/// 构造阶段 (整组人数需求)
pub fn phase(id: &str, project_id: &str, start: &str, end: &str, crew_size: u32) -> Phase {
    Phase {
        phase_id: id.to_string(),
        project_id: project_id.to_string(),
        name: format!("测试阶段{id}"),
        start_date: date(start),
        end_date: date(end),
        labor: LaborRequirement::CrewSize { crew_size },
        progress_percentage: 0.0,
    }
}

/// 构造指派
pub fn assignment(id: &str, employee_id: &str, phase_id: &str, day: &str, hours: f64) -> Assignment {
    Assignment {
        assignment_id: id.to_string(),
        employee_id: employee_id.to_string(),
        phase_id: phase_id.to_string(),
        assignment_date: date(day),
        hours_allocated: hours,
        created_by: "tester".to_string(),
        created_at: audit_time(),
    }
}

/// 构造带创建时间偏移的指派 (建议器"后来者优先移动"用)
pub fn assignment_created_at(
    id: &str,
    employee_id: &str,
    phase_id: &str,
    day: &str,
    hours: f64,
    created_hour: u32,
) -> Assignment {
    let mut a = assignment(id, employee_id, phase_id, day, hours);
    a.created_at = today().and_hms_opt(created_hour, 0, 0).unwrap();
    a
}

/// 播种"单管道项目 + 单阶段"基础场景
///
/// PRJ1 (PLUMBING, ACTIVE), P1 窗口 2024-06-03..2024-06-21, 需求 crew_size 人
pub fn seed_single_phase(store: &SqliteAssignmentStore, crew_size: u32) {
    store
        .insert_project(&project("PRJ1", Division::Plumbing, ProjectStatus::Active))
        .unwrap();
    store
        .insert_phase(&phase("P1", "PRJ1", "2024-06-03", "2024-06-21", crew_size))
        .unwrap();
}
