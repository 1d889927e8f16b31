// ==========================================
// 班组排程系统 - 演示入口
// ==========================================
// 用途: 打开 (或播种) 一个指派库, 跑全量冲突审计并输出 JSON 结果,
//       随后演示"变更后清缓存"契约
// 用法:
//   cargo run -- [db_path] [--seed]
// ==========================================

use chrono::{Duration, Utc};
use crew_scheduling_engine::{
    logging, Assignment, ConflictApi, Division, Employee, EngineConfig, LaborRequirement, Phase,
    Project, ProjectStatus, SqliteAssignmentStore,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    info!("==================================================");
    info!("{} - 冲突检测与指派校验引擎", crew_scheduling_engine::APP_NAME);
    info!("系统版本: {}", crew_scheduling_engine::VERSION);
    info!("==================================================");

    let mut args = std::env::args().skip(1);
    let db_path = args
        .next()
        .filter(|a| a != "--seed")
        .unwrap_or_else(|| "crew_scheduling.db".to_string());
    let seed = std::env::args().any(|a| a == "--seed");

    info!("使用数据库: {}", db_path);
    let store = Arc::new(SqliteAssignmentStore::open(&db_path)?);

    if seed {
        info!("播种演示数据...");
        seed_demo_data(&store)?;
    }

    let api = ConflictApi::new(store.clone(), EngineConfig::load_or_default());

    // ===== 全量冲突审计 =====
    let conflicts = api.scan_all_conflicts().await?;
    info!("检出冲突 {} 条", conflicts.len());

    for conflict in &conflicts {
        println!("{}", serde_json::to_string(conflict)?);
        let suggestions = api.get_resolution_suggestions(conflict).await?;
        for suggestion in &suggestions {
            println!("  -> {}", serde_json::to_string(suggestion)?);
        }
    }

    // ===== 预提交校验示例 =====
    if seed {
        let date = Utc::now().date_naive();
        let result = api.validate_assignment("P1", "E1", date, 4.0).await?;
        info!(
            is_valid = result.is_valid,
            blocking = result.conflicts.len(),
            warnings = result.warnings.len(),
            "预提交校验: P1/E1 追加 4h"
        );

        // ===== 变更后清缓存契约演示 =====
        store.delete_assignment("A2")?;
        api.clear_cache()?;
        let after = api.scan_all_conflicts().await?;
        info!(
            before = conflicts.len(),
            after = after.len(),
            "撤销指派 A2 并清缓存后重扫"
        );
    }

    Ok(())
}

/// 播种一组带有已知冲突的演示数据
fn seed_demo_data(store: &SqliteAssignmentStore) -> anyhow::Result<()> {
    let today = Utc::now().date_naive();
    let now = Utc::now().naive_utc();

    for employee in [
        employee("E1", "张伟", Division::Plumbing, None),
        employee("E2", "李娜", Division::Plumbing, None),
        employee("E3", "王强", Division::Electrical, Some(10.0)),
        employee("E4", "赵磊", Division::GeneralLabor, None),
    ] {
        store.insert_employee(&employee)?;
    }

    store.insert_project(&Project {
        project_id: "PRJ1".to_string(),
        name: "滨江一号楼".to_string(),
        division: Division::Plumbing,
        status: ProjectStatus::Active,
        start_date: today - Duration::days(10),
        end_date: today + Duration::days(60),
    })?;
    store.insert_project(&Project {
        project_id: "PRJ2".to_string(),
        name: "产业园二期".to_string(),
        division: Division::Electrical,
        status: ProjectStatus::Active,
        start_date: today,
        end_date: today + Duration::days(90),
    })?;

    store.insert_phase(&Phase {
        phase_id: "P1".to_string(),
        project_id: "PRJ1".to_string(),
        name: "给排水安装".to_string(),
        start_date: today - Duration::days(2),
        end_date: today + Duration::days(5),
        labor: LaborRequirement::CrewSize { crew_size: 3 },
        progress_percentage: 20.0,
    })?;
    store.insert_phase(&Phase {
        phase_id: "P2".to_string(),
        project_id: "PRJ2".to_string(),
        name: "强电桥架".to_string(),
        start_date: today + Duration::days(3),
        end_date: today + Duration::days(12),
        labor: LaborRequirement::Composition {
            needs_foreman: true,
            journeymen: 1,
            apprentices: 0,
        },
        progress_percentage: 0.0,
    })?;

    // A1/A2: 同日组合 12h, 制造一条重复派工
    // A4: 日期落在 P1 窗口之外, 制造一条日期越界
    for (id, employee_id, phase_id, offset, hours) in [
        ("A1", "E1", "P1", 0i64, 8.0),
        ("A2", "E1", "P1", 0, 4.0),
        ("A3", "E3", "P2", 3, 8.0),
        ("A4", "E2", "P1", 20, 8.0),
    ] {
        store.insert_assignment(&Assignment {
            assignment_id: id.to_string(),
            employee_id: employee_id.to_string(),
            phase_id: phase_id.to_string(),
            assignment_date: today + Duration::days(offset),
            hours_allocated: hours,
            created_by: "seed".to_string(),
            created_at: now,
        })?;
    }

    Ok(())
}

fn employee(id: &str, name: &str, division: Division, daily: Option<f64>) -> Employee {
    Employee {
        employee_id: id.to_string(),
        name: name.to_string(),
        division,
        is_active: true,
        weekly_capacity_hours: 40.0,
        daily_capacity_hours: daily,
        skills: vec![],
    }
}
