// ==========================================
// 班组排程系统 - 核心库
// ==========================================
// 系统定位: 冲突检测与指派校验引擎 (纯计算层, 存储/传输由协作方负责)
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 存储适配层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 引擎参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ConflictSeverity, ConflictType, Division, EntityType, ProjectStatus};

// 领域实体
pub use domain::{
    Assignment, Conflict, Employee, LaborRequirement, Phase, PhaseWithProject, Project,
    ResolutionSuggestion, SuggestedAction, ValidationResult,
};

// 引擎
pub use engine::{
    AssignmentValidator, Clock, ConflictCache, ConflictScanner, FixedClock, ResolutionAdvisor,
    ScanScope, SystemClock, TimeWindow, WorkingSet,
};

// 存储适配
pub use repository::{AssignmentStore, SqliteAssignmentStore, StoreError, StoreResult};

// API
pub use api::{ApiError, ApiResult, ConflictApi};

// 配置
pub use config::EngineConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "班组排程系统";
