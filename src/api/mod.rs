// ==========================================
// 班组排程系统 - API 层
// ==========================================
// 职责: 对外暴露引擎契约与错误分类
// 红线: 权限/角色校验属于调用方边界层, 引擎内不感知角色
// ==========================================

pub mod conflict_api;
pub mod error;

pub use conflict_api::ConflictApi;
pub use error::{ApiError, ApiResult};
