// ==========================================
// AssignmentValidator 引擎集成测试
// ==========================================
// 测试目标: 预提交校验的阻断/警告分类、短路行为与错误分类
// 覆盖范围: 重复派工、日期越界、超员硬上限、工种警告、输入校验
// ==========================================

mod test_helpers;

use crew_scheduling_engine::{
    ApiError, ConflictApi, ConflictType, Division, EngineConfig, ProjectStatus,
};
use std::sync::Arc;
use test_helpers::*;

fn api(store: crew_scheduling_engine::SqliteAssignmentStore) -> ConflictApi {
    ConflictApi::with_clock(
        Arc::new(store),
        EngineConfig::default(),
        Arc::new(fixed_clock()),
    )
}

// ==========================================
// 阻断场景
// ==========================================

#[tokio::test]
async fn test_double_booking_blocks_validation() {
    // 员工 E1 (PLUMBING, 日上限 8h) 在 P1 (2024-01-01..05) 的 01-02 已有 8h;
    // 追加 4h 必须拒绝: 组合 12h > 8h
    let store = create_test_store();
    store
        .insert_project(&project("PRJ1", Division::Plumbing, ProjectStatus::Active))
        .unwrap();
    store
        .insert_phase(&phase("P1", "PRJ1", "2024-01-01", "2024-01-05", 3))
        .unwrap();
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-01-02", 8.0))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E1", date("2024-01-02"), 4.0)
        .await
        .unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(result.conflicts[0].conflict_type, ConflictType::DoubleBooking);
    assert!(result.conflicts[0].related_entities.contains("A1"));
}

#[tokio::test]
async fn test_date_outside_window_always_blocks() {
    // 日期越界必须拒绝, 即使工种/人力等其他因素全部满足
    let store = create_test_store();
    seed_single_phase(&store, 3);
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E1", date("2024-07-01"), 8.0)
        .await
        .unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.conflicts.len(), 1);
    assert_eq!(
        result.conflicts[0].conflict_type,
        ConflictType::DateRangeViolation
    );
    // 短路: 阻断后不再收集后续警告
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_cancelled_project_blocks_validation() {
    let store = create_test_store();
    store
        .insert_project(&project("PRJ1", Division::Plumbing, ProjectStatus::Cancelled))
        .unwrap();
    store
        .insert_phase(&phase("P1", "PRJ1", "2024-06-03", "2024-06-21", 3))
        .unwrap();
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E1", date("2024-06-11"), 8.0)
        .await
        .unwrap();

    assert!(!result.is_valid);
    assert_eq!(
        result.conflicts[0].conflict_type,
        ConflictType::DateRangeViolation
    );
}

#[tokio::test]
async fn test_overstaff_past_hard_limit_blocks() {
    // 需求 1 人, 硬上限 ceil(1×1.5)=2; 已派 E1/E2, 再派 E3 => 3 > 2, 阻断
    let store = create_test_store();
    seed_single_phase(&store, 1);
    for id in ["E1", "E2", "E3"] {
        store
            .insert_employee(&employee(id, Division::Plumbing))
            .unwrap();
    }
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();
    store
        .insert_assignment(&assignment("A2", "E2", "P1", "2024-06-12", 8.0))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E3", date("2024-06-13"), 8.0)
        .await
        .unwrap();

    assert!(!result.is_valid);
    assert_eq!(
        result.conflicts[0].conflict_type,
        ConflictType::CapacityOverflow
    );
}

// ==========================================
// 警告场景 (放行)
// ==========================================

#[tokio::test]
async fn test_skill_mismatch_is_warning_not_blocking() {
    let store = create_test_store();
    seed_single_phase(&store, 3);
    store
        .insert_employee(&employee("E1", Division::Carpentry))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E1", date("2024-06-11"), 8.0)
        .await
        .unwrap();

    assert!(result.is_valid);
    assert!(result.conflicts.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].conflict_type, ConflictType::SkillMismatch);
}

#[tokio::test]
async fn test_soft_overstaff_is_warning() {
    // 需求 2 人, 硬上限 ceil(2×1.5)=3; 第 3 人软超员, 放行带警告
    let store = create_test_store();
    seed_single_phase(&store, 2);
    for id in ["E1", "E2", "E3"] {
        store
            .insert_employee(&employee(id, Division::Plumbing))
            .unwrap();
    }
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();
    store
        .insert_assignment(&assignment("A2", "E2", "P1", "2024-06-12", 8.0))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E3", date("2024-06-13"), 8.0)
        .await
        .unwrap();

    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].conflict_type,
        ConflictType::CapacityOverflow
    );
}

#[tokio::test]
async fn test_weekly_overallocation_is_warning() {
    // 周内隔日三个 12h 块共 36h, 追加 8h => 44h > 40h (未超 20%), 放行带警告
    let store = create_test_store();
    seed_single_phase(&store, 5);
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    for (id, day) in [("A1", "2024-06-10"), ("A2", "2024-06-12"), ("A3", "2024-06-14")] {
        store
            .insert_assignment(&assignment(id, "E1", "P1", day, 12.0))
            .unwrap();
    }

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E1", date("2024-06-16"), 8.0)
        .await
        .unwrap();

    assert!(result.is_valid);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.conflict_type == ConflictType::Overallocation));
}

#[tokio::test]
async fn test_understaffed_phase_does_not_block_new_staff() {
    // 缺员阶段补人不得被人力规则拦下
    let store = create_test_store();
    seed_single_phase(&store, 3);
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();

    let api = api(store);
    let result = api
        .validate_assignment("P1", "E1", date("2024-06-11"), 8.0)
        .await
        .unwrap();

    assert!(result.is_valid);
    assert!(result.conflicts.is_empty());
    assert!(result.warnings.is_empty());
}

// ==========================================
// 输入与查找错误
// ==========================================

#[tokio::test]
async fn test_invalid_hours_rejected_before_store_access() {
    let store = create_test_store();
    // 故意不播种任何数据: 工时校验必须先于存储访问
    let api = api(store);

    for hours in [0.0, -4.0, 24.5] {
        let err = api
            .validate_assignment("P1", "E1", today(), hours)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)), "hours={hours}");
    }
}

#[tokio::test]
async fn test_unknown_phase_is_not_found() {
    let store = create_test_store();
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();

    let api = api(store);
    let err = api
        .validate_assignment("P404", "E1", today(), 8.0)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_employee_is_not_found() {
    let store = create_test_store();
    seed_single_phase(&store, 3);

    let api = api(store);
    let err = api
        .validate_assignment("P1", "E404", today(), 8.0)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}
