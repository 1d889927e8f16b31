// ==========================================
// 班组排程系统 - 项目与工程阶段领域模型
// ==========================================
// 不变量: 阶段窗口 start_date <= end_date, 且应落在项目工期内
// ==========================================

use crate::domain::types::{Division, ProjectStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Project - 项目
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,     // 项目ID
    pub name: String,           // 项目名称
    pub division: Division,     // 项目工种
    pub status: ProjectStatus,  // 生命周期状态
    pub start_date: NaiveDate,  // 开工日期
    pub end_date: NaiveDate,    // 竣工日期
}

// ==========================================
// LaborRequirement - 阶段人力需求
// ==========================================
// 两种表达: 整组人数, 或按角色构成 (工长/技工/学徒)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaborRequirement {
    /// 整组人数
    CrewSize { crew_size: u32 },
    /// 按角色构成
    Composition {
        needs_foreman: bool, // 是否需要工长
        journeymen: u32,     // 技工人数
        apprentices: u32,    // 学徒人数
    },
}

impl LaborRequirement {
    /// 需求总人数
    pub fn required_headcount(&self) -> u32 {
        match self {
            LaborRequirement::CrewSize { crew_size } => *crew_size,
            LaborRequirement::Composition {
                needs_foreman,
                journeymen,
                apprentices,
            } => u32::from(*needs_foreman) + journeymen + apprentices,
        }
    }
}

// ==========================================
// Phase - 工程阶段
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Phase {
    pub phase_id: String,            // 阶段ID
    pub project_id: String,          // 所属项目 (恰好一个)
    pub name: String,                // 阶段名称
    pub start_date: NaiveDate,       // 阶段开始
    pub end_date: NaiveDate,         // 阶段结束
    pub labor: LaborRequirement,     // 人力需求
    pub progress_percentage: f64,    // 进度百分比 [0,100]
}

// ==========================================
// PhaseWithProject - 阶段读模型 (携带所属项目)
// ==========================================
// 存储层 get_phase 返回的联查快照, 评估器据此做工种/生命周期判定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseWithProject {
    pub phase: Phase,
    pub project: Project,
}
