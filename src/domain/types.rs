// ==========================================
// 班组排程系统 - 领域类型定义
// ==========================================
// 职责: 封闭枚举 (工种/项目状态/冲突类型/严重等级/实体类型)
// 红线: 类别字段一律用枚举, 不用自由字符串
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工种 (Division)
// ==========================================
// 员工与项目各持有一个工种; 指派时要求兼容
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Division {
    Plumbing,     // 管道
    Electrical,   // 电气
    Hvac,         // 暖通
    Carpentry,    // 木工
    Masonry,      // 砌筑
    GeneralLabor, // 普工
}

impl Division {
    /// 判断员工工种是否可承接目标工种的工作
    ///
    /// 规则: 完全一致即兼容; 普工可承接任意工种
    pub fn is_compatible_with(&self, target: Division) -> bool {
        *self == target || *self == Division::GeneralLabor
    }

    /// 从数据库字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLUMBING" => Some(Division::Plumbing),
            "ELECTRICAL" => Some(Division::Electrical),
            "HVAC" => Some(Division::Hvac),
            "CARPENTRY" => Some(Division::Carpentry),
            "MASONRY" => Some(Division::Masonry),
            "GENERAL_LABOR" => Some(Division::GeneralLabor),
            _ => None,
        }
    }
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Division::Plumbing => write!(f, "PLUMBING"),
            Division::Electrical => write!(f, "ELECTRICAL"),
            Division::Hvac => write!(f, "HVAC"),
            Division::Carpentry => write!(f, "CARPENTRY"),
            Division::Masonry => write!(f, "MASONRY"),
            Division::GeneralLabor => write!(f, "GENERAL_LABOR"),
        }
    }
}

// ==========================================
// 项目状态 (Project Status)
// ==========================================
// 生命周期: Planned -> Active -> Complete / Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planned,   // 已立项
    Active,    // 施工中
    Cancelled, // 已取消
    Complete,  // 已竣工
}

impl ProjectStatus {
    /// 项目是否仍可承接指派 (取消/竣工的项目不再接受排程)
    pub fn accepts_assignments(&self) -> bool {
        matches!(self, ProjectStatus::Planned | ProjectStatus::Active)
    }

    /// 从数据库字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLANNED" => Some(ProjectStatus::Planned),
            "ACTIVE" => Some(ProjectStatus::Active),
            "CANCELLED" => Some(ProjectStatus::Cancelled),
            "COMPLETE" => Some(ProjectStatus::Complete),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Planned => write!(f, "PLANNED"),
            ProjectStatus::Active => write!(f, "ACTIVE"),
            ProjectStatus::Cancelled => write!(f, "CANCELLED"),
            ProjectStatus::Complete => write!(f, "COMPLETE"),
        }
    }
}

// ==========================================
// 冲突类型 (Conflict Type)
// ==========================================
// 每种类型对应一个独立的规则评估器
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    DoubleBooking,      // 重复派工 (同日/邻日工时冲突)
    Overallocation,     // 周工时超配
    SkillMismatch,      // 工种不匹配
    CapacityOverflow,   // 阶段人力配置溢出 (超员/临期缺员)
    DateRangeViolation, // 日期越界 / 生命周期失效
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictType::DoubleBooking => write!(f, "DOUBLE_BOOKING"),
            ConflictType::Overallocation => write!(f, "OVERALLOCATION"),
            ConflictType::SkillMismatch => write!(f, "SKILL_MISMATCH"),
            ConflictType::CapacityOverflow => write!(f, "CAPACITY_OVERFLOW"),
            ConflictType::DateRangeViolation => write!(f, "DATE_RANGE_VIOLATION"),
        }
    }
}

// ==========================================
// 冲突严重等级 (Conflict Severity)
// ==========================================
// 顺序: Low < Medium < High < Critical (全序, 枚举顺序即比较顺序)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictSeverity {
    Low,      // 提示
    Medium,   // 关注
    High,     // 紧急
    Critical, // 阻断
}

impl fmt::Display for ConflictSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictSeverity::Low => write!(f, "LOW"),
            ConflictSeverity::Medium => write!(f, "MEDIUM"),
            ConflictSeverity::High => write!(f, "HIGH"),
            ConflictSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 实体类型 (Entity Type)
// ==========================================
// 冲突记录中主要责任实体的类型标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Employee,   // 员工
    Project,    // 项目
    Phase,      // 工程阶段
    Assignment, // 指派
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Employee => write!(f, "EMPLOYEE"),
            EntityType::Project => write!(f, "PROJECT"),
            EntityType::Phase => write!(f, "PHASE"),
            EntityType::Assignment => write!(f, "ASSIGNMENT"),
        }
    }
}
