// ==========================================
// 班组排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、封闭枚举、派生结果类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod assignment;
pub mod conflict;
pub mod employee;
pub mod project;
pub mod types;

// 重导出核心类型
pub use assignment::Assignment;
pub use conflict::{Conflict, ResolutionSuggestion, SuggestedAction, ValidationResult};
pub use employee::Employee;
pub use project::{LaborRequirement, Phase, PhaseWithProject, Project};
pub use types::{ConflictSeverity, ConflictType, Division, EntityType, ProjectStatus};
