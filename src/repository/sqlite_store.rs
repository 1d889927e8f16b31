// ==========================================
// 班组排程系统 - SQLite 指派存储适配器
// ==========================================
// 职责: AssignmentStore 的 rusqlite 参考实现 (建表/类型化查询)
// 红线: 不含业务规则, 只做数据访问; 写方法仅供种子数据与测试使用,
//       引擎自身从不调用
// 约束: 所有查询参数化
// ==========================================

use crate::db::{configure_sqlite_connection, open_in_memory_connection, open_sqlite_connection};
use crate::domain::{
    Assignment, Division, Employee, LaborRequirement, Phase, PhaseWithProject, Project,
    ProjectStatus,
};
use crate::engine::time_window::TimeWindow;
use crate::engine::working_set::ScanScope;
use crate::repository::assignment_store::AssignmentStore;
use crate::repository::error::{StoreError, StoreResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// SqliteAssignmentStore - SQLite 存储适配器
// ==========================================
pub struct SqliteAssignmentStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteAssignmentStore {
    /// 打开数据库文件并确保表结构存在
    pub fn open(db_path: &str) -> StoreResult<Self> {
        let conn =
            open_sqlite_connection(db_path).map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// 内存库实例 (测试/演示用)
    pub fn in_memory() -> StoreResult<Self> {
        let conn =
            open_in_memory_connection().map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// 从已有连接创建 (会再次应用统一 PRAGMA, 幂等)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> StoreResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| StoreError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)
                .map_err(|e| StoreError::ConnectionError(e.to_string()))?;
        }
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// 获取数据库连接
    fn get_conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::LockError(e.to_string()))
    }

    /// 建表 (IF NOT EXISTS, 幂等)
    ///
    /// 注: assignment 对 employee/phase 不设外键 —— 员工停用、阶段改期、
    /// 项目取消造成的漂移引用正是引擎要标记的对象, 不能被库层拒之门外
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS employee (
                employee_id           TEXT PRIMARY KEY,
                name                  TEXT NOT NULL,
                division              TEXT NOT NULL,
                is_active             INTEGER NOT NULL DEFAULT 1,
                weekly_capacity_hours REAL NOT NULL,
                daily_capacity_hours  REAL,
                skills_json           TEXT NOT NULL DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS project (
                project_id TEXT PRIMARY KEY,
                name       TEXT NOT NULL,
                division   TEXT NOT NULL,
                status     TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS phase (
                phase_id            TEXT PRIMARY KEY,
                project_id          TEXT NOT NULL REFERENCES project(project_id),
                name                TEXT NOT NULL,
                start_date          TEXT NOT NULL,
                end_date            TEXT NOT NULL,
                labor_json          TEXT NOT NULL,
                progress_percentage REAL NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS assignment (
                assignment_id   TEXT PRIMARY KEY,
                employee_id     TEXT NOT NULL,
                phase_id        TEXT NOT NULL,
                assignment_date TEXT NOT NULL,
                hours_allocated REAL NOT NULL,
                created_by      TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_assignment_employee_date
                ON assignment(employee_id, assignment_date);
            CREATE INDEX IF NOT EXISTS idx_assignment_phase
                ON assignment(phase_id);
            CREATE INDEX IF NOT EXISTS idx_phase_project
                ON phase(project_id);
            "#,
        )?;
        Ok(())
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_employee(row: &Row<'_>) -> rusqlite::Result<Employee> {
        let division_raw: String = row.get("division")?;
        let division = Division::from_str(&division_raw).ok_or_else(|| {
            field_error("division", format!("未知工种: {division_raw}"))
        })?;
        let skills_json: String = row.get("skills_json")?;
        let skills: Vec<String> = serde_json::from_str(&skills_json)
            .map_err(|e| field_error("skills_json", e.to_string()))?;

        Ok(Employee {
            employee_id: row.get("employee_id")?,
            name: row.get("name")?,
            division,
            is_active: row.get("is_active")?,
            weekly_capacity_hours: row.get("weekly_capacity_hours")?,
            daily_capacity_hours: row.get("daily_capacity_hours")?,
            skills,
        })
    }

    fn map_project(row: &Row<'_>) -> rusqlite::Result<Project> {
        let division_raw: String = row.get("division")?;
        let division = Division::from_str(&division_raw).ok_or_else(|| {
            field_error("division", format!("未知工种: {division_raw}"))
        })?;
        let status_raw: String = row.get("status")?;
        let status = ProjectStatus::from_str(&status_raw).ok_or_else(|| {
            field_error("status", format!("未知项目状态: {status_raw}"))
        })?;

        Ok(Project {
            project_id: row.get("project_id")?,
            name: row.get("name")?,
            division,
            status,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
        })
    }

    fn map_phase(row: &Row<'_>) -> rusqlite::Result<Phase> {
        let labor_json: String = row.get("labor_json")?;
        let labor: LaborRequirement = serde_json::from_str(&labor_json)
            .map_err(|e| field_error("labor_json", e.to_string()))?;

        Ok(Phase {
            phase_id: row.get("phase_id")?,
            project_id: row.get("project_id")?,
            name: row.get("name")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            labor,
            progress_percentage: row.get("progress_percentage")?,
        })
    }

    fn map_assignment(row: &Row<'_>) -> rusqlite::Result<Assignment> {
        Ok(Assignment {
            assignment_id: row.get("assignment_id")?,
            employee_id: row.get("employee_id")?,
            phase_id: row.get("phase_id")?,
            assignment_date: row.get("assignment_date")?,
            hours_allocated: row.get("hours_allocated")?,
            created_by: row.get("created_by")?,
            created_at: row.get("created_at")?,
        })
    }

    // ==========================================
    // 写方法 (种子数据/测试专用, 引擎不调用)
    // ==========================================

    /// 插入或覆盖员工
    pub fn insert_employee(&self, employee: &Employee) -> StoreResult<()> {
        let skills_json = serde_json::to_string(&employee.skills)
            .map_err(|e| StoreError::FieldValueError {
                field: "skills".to_string(),
                message: e.to_string(),
            })?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO employee (
                employee_id, name, division, is_active,
                weekly_capacity_hours, daily_capacity_hours, skills_json
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                employee.employee_id,
                employee.name,
                employee.division.to_string(),
                employee.is_active,
                employee.weekly_capacity_hours,
                employee.daily_capacity_hours,
                skills_json,
            ],
        )?;
        Ok(())
    }

    /// 插入或覆盖项目
    pub fn insert_project(&self, project: &Project) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO project (
                project_id, name, division, status, start_date, end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                project.project_id,
                project.name,
                project.division.to_string(),
                project.status.to_string(),
                project.start_date,
                project.end_date,
            ],
        )?;
        Ok(())
    }

    /// 插入或覆盖阶段
    pub fn insert_phase(&self, phase: &Phase) -> StoreResult<()> {
        let labor_json = serde_json::to_string(&phase.labor)
            .map_err(|e| StoreError::FieldValueError {
                field: "labor".to_string(),
                message: e.to_string(),
            })?;
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO phase (
                phase_id, project_id, name, start_date, end_date,
                labor_json, progress_percentage
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                phase.phase_id,
                phase.project_id,
                phase.name,
                phase.start_date,
                phase.end_date,
                labor_json,
                phase.progress_percentage,
            ],
        )?;
        Ok(())
    }

    /// 插入或覆盖指派
    pub fn insert_assignment(&self, assignment: &Assignment) -> StoreResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO assignment (
                assignment_id, employee_id, phase_id, assignment_date,
                hours_allocated, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                assignment.assignment_id,
                assignment.employee_id,
                assignment.phase_id,
                assignment.assignment_date,
                assignment.hours_allocated,
                assignment.created_by,
                assignment.created_at,
            ],
        )?;
        Ok(())
    }

    /// 启用/停用员工
    pub fn set_employee_active(&self, employee_id: &str, is_active: bool) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE employee SET is_active = ?2 WHERE employee_id = ?1",
            params![employee_id, is_active],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Employee", employee_id));
        }
        Ok(())
    }

    /// 调整阶段窗口
    pub fn update_phase_dates(
        &self,
        phase_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE phase SET start_date = ?2, end_date = ?3 WHERE phase_id = ?1",
            params![phase_id, start_date, end_date],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Phase", phase_id));
        }
        Ok(())
    }

    /// 删除指派
    pub fn delete_assignment(&self, assignment_id: &str) -> StoreResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "DELETE FROM assignment WHERE assignment_id = ?1",
            params![assignment_id],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("Assignment", assignment_id));
        }
        Ok(())
    }
}

/// 行内字段转换失败 -> rusqlite 转换错误
fn field_error(field: &str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        format!("{field}: {message}").into(),
    )
}

// ==========================================
// AssignmentStore 实现
// ==========================================
#[async_trait]
impl AssignmentStore for SqliteAssignmentStore {
    async fn list_active_assignments(&self, scope: &ScanScope) -> StoreResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let mut rows = Vec::new();

        match scope.division {
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT assignment_id, employee_id, phase_id, assignment_date,
                           hours_allocated, created_by, created_at
                    FROM assignment
                    WHERE assignment_date BETWEEN ?1 AND ?2
                    ORDER BY assignment_date, assignment_id
                    "#,
                )?;
                let mapped = stmt.query_map(
                    params![scope.window.start, scope.window.end],
                    Self::map_assignment,
                )?;
                for row in mapped {
                    rows.push(row?);
                }
            }
            Some(division) => {
                // 工种过滤经由员工联查; 悬空员工引用不属于该工种范围
                let mut stmt = conn.prepare(
                    r#"
                    SELECT a.assignment_id, a.employee_id, a.phase_id, a.assignment_date,
                           a.hours_allocated, a.created_by, a.created_at
                    FROM assignment a
                    JOIN employee e ON e.employee_id = a.employee_id
                    WHERE a.assignment_date BETWEEN ?1 AND ?2
                      AND e.division = ?3
                    ORDER BY a.assignment_date, a.assignment_id
                    "#,
                )?;
                let mapped = stmt.query_map(
                    params![scope.window.start, scope.window.end, division.to_string()],
                    Self::map_assignment,
                )?;
                for row in mapped {
                    rows.push(row?);
                }
            }
        }

        Ok(rows)
    }

    async fn get_employee(&self, employee_id: &str) -> StoreResult<Employee> {
        let conn = self.get_conn()?;
        conn.query_row(
            r#"
            SELECT employee_id, name, division, is_active,
                   weekly_capacity_hours, daily_capacity_hours, skills_json
            FROM employee
            WHERE employee_id = ?1
            "#,
            params![employee_id],
            Self::map_employee,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("Employee", employee_id))
    }

    async fn list_employees(&self, employee_ids: &[String]) -> StoreResult<Vec<Employee>> {
        // 悬空ID直接跳过: 标记缺失引用是评估器的职责
        let mut employees = Vec::with_capacity(employee_ids.len());
        for id in employee_ids {
            match self.get_employee(id).await {
                Ok(e) => employees.push(e),
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(employees)
    }

    async fn get_phase(&self, phase_id: &str) -> StoreResult<PhaseWithProject> {
        let conn = self.get_conn()?;
        let phase = conn
            .query_row(
                r#"
                SELECT phase_id, project_id, name, start_date, end_date,
                       labor_json, progress_percentage
                FROM phase
                WHERE phase_id = ?1
                "#,
                params![phase_id],
                Self::map_phase,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Phase", phase_id))?;

        let project = conn
            .query_row(
                r#"
                SELECT project_id, name, division, status, start_date, end_date
                FROM project
                WHERE project_id = ?1
                "#,
                params![phase.project_id],
                Self::map_project,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("Project", &phase.project_id))?;

        Ok(PhaseWithProject { phase, project })
    }

    async fn get_assignment(&self, assignment_id: &str) -> StoreResult<Assignment> {
        let conn = self.get_conn()?;
        conn.query_row(
            r#"
            SELECT assignment_id, employee_id, phase_id, assignment_date,
                   hours_allocated, created_by, created_at
            FROM assignment
            WHERE assignment_id = ?1
            "#,
            params![assignment_id],
            Self::map_assignment,
        )
        .optional()?
        .ok_or_else(|| StoreError::not_found("Assignment", assignment_id))
    }

    async fn list_active_phases(&self, range: &TimeWindow) -> StoreResult<Vec<PhaseWithProject>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT p.phase_id, p.project_id, p.name, p.start_date, p.end_date,
                   p.labor_json, p.progress_percentage,
                   pr.project_id AS pr_project_id, pr.name AS pr_name,
                   pr.division AS pr_division, pr.status AS pr_status,
                   pr.start_date AS pr_start_date, pr.end_date AS pr_end_date
            FROM phase p
            JOIN project pr ON pr.project_id = p.project_id
            WHERE pr.status IN ('PLANNED', 'ACTIVE')
              AND p.start_date <= ?2
              AND p.end_date >= ?1
            ORDER BY p.phase_id
            "#,
        )?;

        let mapped = stmt.query_map(params![range.start, range.end], |row| {
            let labor_json: String = row.get("labor_json")?;
            let labor: LaborRequirement = serde_json::from_str(&labor_json)
                .map_err(|e| field_error("labor_json", e.to_string()))?;
            let division_raw: String = row.get("pr_division")?;
            let division = Division::from_str(&division_raw).ok_or_else(|| {
                field_error("division", format!("未知工种: {division_raw}"))
            })?;
            let status_raw: String = row.get("pr_status")?;
            let status = ProjectStatus::from_str(&status_raw).ok_or_else(|| {
                field_error("status", format!("未知项目状态: {status_raw}"))
            })?;

            Ok(PhaseWithProject {
                phase: Phase {
                    phase_id: row.get("phase_id")?,
                    project_id: row.get("project_id")?,
                    name: row.get("name")?,
                    start_date: row.get("start_date")?,
                    end_date: row.get("end_date")?,
                    labor,
                    progress_percentage: row.get("progress_percentage")?,
                },
                project: Project {
                    project_id: row.get("pr_project_id")?,
                    name: row.get("pr_name")?,
                    division,
                    status,
                    start_date: row.get("pr_start_date")?,
                    end_date: row.get("pr_end_date")?,
                },
            })
        })?;

        let mut phases = Vec::new();
        for row in mapped {
            phases.push(row?);
        }
        Ok(phases)
    }

    async fn list_assignments_for_employee(
        &self,
        employee_id: &str,
        range: &TimeWindow,
    ) -> StoreResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT assignment_id, employee_id, phase_id, assignment_date,
                   hours_allocated, created_by, created_at
            FROM assignment
            WHERE employee_id = ?1
              AND assignment_date BETWEEN ?2 AND ?3
            ORDER BY assignment_date, assignment_id
            "#,
        )?;
        let mapped = stmt.query_map(
            params![employee_id, range.start, range.end],
            Self::map_assignment,
        )?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row?);
        }
        Ok(rows)
    }

    async fn list_assignments_for_phase(&self, phase_id: &str) -> StoreResult<Vec<Assignment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT assignment_id, employee_id, phase_id, assignment_date,
                   hours_allocated, created_by, created_at
            FROM assignment
            WHERE phase_id = ?1
            ORDER BY assignment_date, assignment_id
            "#,
        )?;
        let mapped = stmt.query_map(params![phase_id], Self::map_assignment)?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row?);
        }
        Ok(rows)
    }

    async fn list_available_employees(
        &self,
        division: Option<Division>,
        _range: Option<&TimeWindow>,
    ) -> StoreResult<Vec<Employee>> {
        // 当前模式没有请假/歇工表, 日期区间暂不参与粗筛;
        // 精细的当日工时余量由建议器核对
        let conn = self.get_conn()?;
        let mut rows = Vec::new();

        match division {
            None => {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT employee_id, name, division, is_active,
                           weekly_capacity_hours, daily_capacity_hours, skills_json
                    FROM employee
                    WHERE is_active = 1
                    ORDER BY employee_id
                    "#,
                )?;
                let mapped = stmt.query_map([], Self::map_employee)?;
                for row in mapped {
                    rows.push(row?);
                }
            }
            Some(division) => {
                // 兼容工种: 精确匹配 + 普工
                let mut stmt = conn.prepare(
                    r#"
                    SELECT employee_id, name, division, is_active,
                           weekly_capacity_hours, daily_capacity_hours, skills_json
                    FROM employee
                    WHERE is_active = 1
                      AND division IN (?1, 'GENERAL_LABOR')
                    ORDER BY employee_id
                    "#,
                )?;
                let mapped = stmt.query_map(params![division.to_string()], Self::map_employee)?;
                for row in mapped {
                    rows.push(row?);
                }
            }
        }

        Ok(rows)
    }
}
