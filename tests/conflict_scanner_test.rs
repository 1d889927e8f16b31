// ==========================================
// ConflictScanner 引擎集成测试
// ==========================================
// 测试目标: 全量扫描的检出、幂等、排序与生命周期标记
// 覆盖范围: 五类冲突 + 严重等级排序 + 临期缺员场景
// ==========================================

mod test_helpers;

use crew_scheduling_engine::{
    ConflictApi, ConflictSeverity, ConflictType, Division, EngineConfig, ProjectStatus,
};
use std::sync::Arc;
use test_helpers::*;

fn api(store: &Arc<crew_scheduling_engine::SqliteAssignmentStore>) -> ConflictApi {
    ConflictApi::with_clock(
        store.clone(),
        EngineConfig::default(),
        Arc::new(fixed_clock()),
    )
}

#[tokio::test]
async fn test_double_booking_detected_exactly_once() {
    // 同员工同日两条指派组合超限 => 恰好一条 DOUBLE_BOOKING, 同时引用两条指派
    let store = Arc::new(create_test_store());
    seed_single_phase(&store, 3);
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();
    store
        .insert_assignment(&assignment("A2", "E1", "P1", "2024-06-11", 4.0))
        .unwrap();

    let conflicts = api(&store).scan_all_conflicts().await.unwrap();

    let double_bookings: Vec<_> = conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::DoubleBooking)
        .collect();
    assert_eq!(double_bookings.len(), 1);
    assert_eq!(double_bookings[0].severity, ConflictSeverity::Critical);
    assert_eq!(double_bookings[0].entity_id, "E1");
    assert!(double_bookings[0].related_entities.contains("A1"));
    assert!(double_bookings[0].related_entities.contains("A2"));
}

#[tokio::test]
async fn test_scan_is_idempotent_without_mutation() {
    let store = Arc::new(create_test_store());
    seed_single_phase(&store, 2);
    store
        .insert_employee(&employee("E1", Division::Carpentry))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();
    store
        .insert_assignment(&assignment("A2", "E1", "P1", "2024-06-11", 4.0))
        .unwrap();

    let api = api(&store);
    let first = api.scan_all_conflicts().await.unwrap();
    // 清缓存强制重算, 结论 (忽略 conflict_id/detected_at) 必须一致
    api.clear_cache().unwrap();
    let second = api.scan_all_conflicts().await.unwrap();

    let digest = |conflicts: &[crew_scheduling_engine::Conflict]| {
        conflicts
            .iter()
            .map(|c| {
                (
                    c.conflict_type,
                    c.severity,
                    c.entity_id.clone(),
                    c.related_entities.clone(),
                    c.description.clone(),
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(digest(&first), digest(&second));
}

#[tokio::test]
async fn test_output_sorted_by_severity_descending() {
    // 构造四种等级混排: CRITICAL(越界) / HIGH(临期缺员) / MEDIUM(工种) / LOW(超员)
    let store = Arc::new(create_test_store());
    store
        .insert_project(&project("PRJ1", Division::Plumbing, ProjectStatus::Active))
        .unwrap();
    // P1: 超员 (需1派2)
    store
        .insert_phase(&phase("P1", "PRJ1", "2024-06-03", "2024-06-21", 1))
        .unwrap();
    // P2: 临期缺员 (需3派1, 06-13 开工)
    store
        .insert_phase(&phase("P2", "PRJ1", "2024-06-13", "2024-06-28", 3))
        .unwrap();
    // P3: 日期越界载体
    store
        .insert_phase(&phase("P3", "PRJ1", "2024-06-03", "2024-06-07", 1))
        .unwrap();

    for (id, division) in [
        ("E1", Division::Plumbing),
        ("E2", Division::Plumbing),
        ("E3", Division::Carpentry),
        ("E4", Division::Plumbing),
    ] {
        store.insert_employee(&employee(id, division)).unwrap();
    }

    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();
    store
        .insert_assignment(&assignment("A2", "E2", "P1", "2024-06-12", 8.0))
        .unwrap();
    // E3 工种不匹配 (木工进管道项目) + P2 缺员
    store
        .insert_assignment(&assignment("A3", "E3", "P2", "2024-06-14", 8.0))
        .unwrap();
    // A4 日期越出 P3 窗口
    store
        .insert_assignment(&assignment("A4", "E4", "P3", "2024-06-12", 8.0))
        .unwrap();

    let conflicts = api(&store).scan_all_conflicts().await.unwrap();

    let severities: Vec<ConflictSeverity> = conflicts.iter().map(|c| c.severity).collect();
    let mut sorted = severities.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(severities, sorted, "输出必须按严重等级降序");

    assert_eq!(severities.first(), Some(&ConflictSeverity::Critical));
    assert!(severities.contains(&ConflictSeverity::High));
    assert!(severities.contains(&ConflictSeverity::Medium));
    assert_eq!(severities.last(), Some(&ConflictSeverity::Low));
}

#[tokio::test]
async fn test_understaffed_phase_near_start_is_high() {
    // P2 需求 3 人仅派 1 人, 距开工 3 天 (默认前瞻 7 天) => HIGH 缺员
    let store = Arc::new(create_test_store());
    store
        .insert_project(&project("PRJ1", Division::Plumbing, ProjectStatus::Active))
        .unwrap();
    store
        .insert_phase(&phase("P2", "PRJ1", "2024-06-13", "2024-06-28", 3))
        .unwrap();
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P2", "2024-06-14", 8.0))
        .unwrap();

    let conflicts = api(&store).scan_all_conflicts().await.unwrap();

    let capacity: Vec<_> = conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::CapacityOverflow)
        .collect();
    assert_eq!(capacity.len(), 1);
    assert_eq!(capacity[0].severity, ConflictSeverity::High);
    assert_eq!(capacity[0].entity_id, "P2");
}

#[tokio::test]
async fn test_zero_assignment_phase_is_still_scanned() {
    // 零指派的临期阶段也必须进工作集并报缺员
    let store = Arc::new(create_test_store());
    store
        .insert_project(&project("PRJ1", Division::Hvac, ProjectStatus::Active))
        .unwrap();
    store
        .insert_phase(&phase("P1", "PRJ1", "2024-06-12", "2024-06-20", 2))
        .unwrap();

    let conflicts = api(&store).scan_all_conflicts().await.unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::CapacityOverflow);
    assert_eq!(conflicts[0].severity, ConflictSeverity::High);
}

#[tokio::test]
async fn test_inactive_employee_assignment_is_flagged() {
    let store = Arc::new(create_test_store());
    seed_single_phase(&store, 2);
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();
    store.set_employee_active("E1", false).unwrap();

    let conflicts = api(&store).scan_all_conflicts().await.unwrap();

    let flagged: Vec<_> = conflicts
        .iter()
        .filter(|c| c.conflict_type == ConflictType::DateRangeViolation)
        .collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].severity, ConflictSeverity::Critical);
    assert_eq!(flagged[0].entity_id, "A1");
}

#[tokio::test]
async fn test_cancelled_project_assignment_is_flagged() {
    // 项目在指派之后被取消: 扫描必须标记而不是丢弃
    let store = Arc::new(create_test_store());
    store
        .insert_project(&project("PRJ1", Division::Plumbing, ProjectStatus::Cancelled))
        .unwrap();
    store
        .insert_phase(&phase("P1", "PRJ1", "2024-06-03", "2024-06-21", 2))
        .unwrap();
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-11", 8.0))
        .unwrap();

    let conflicts = api(&store).scan_all_conflicts().await.unwrap();

    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::DateRangeViolation);
    assert!(conflicts[0].description.contains("CANCELLED"));
}

#[tokio::test]
async fn test_phase_date_shift_creates_drift_conflict() {
    // 后期把阶段窗口改早, 既有指派漂移为日期越界
    let store = Arc::new(create_test_store());
    seed_single_phase(&store, 1);
    store
        .insert_employee(&employee("E1", Division::Plumbing))
        .unwrap();
    store
        .insert_assignment(&assignment("A1", "E1", "P1", "2024-06-20", 8.0))
        .unwrap();

    let api = api(&store);
    assert!(api.scan_all_conflicts().await.unwrap().is_empty());

    store
        .update_phase_dates("P1", date("2024-06-03"), date("2024-06-14"))
        .unwrap();
    api.clear_cache().unwrap();

    let conflicts = api.scan_all_conflicts().await.unwrap();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::DateRangeViolation);
}
