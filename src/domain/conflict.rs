// ==========================================
// 班组排程系统 - 冲突与校验结果模型
// ==========================================
// 冲突是派生数据: 由扫描计算得出, 只进缓存, 从不落库
// ==========================================

use crate::domain::types::{ConflictSeverity, ConflictType, EntityType};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

// ==========================================
// Conflict - 冲突记录
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub conflict_id: String,                  // 冲突ID (每次计算新生成)
    pub conflict_type: ConflictType,          // 冲突类型
    pub severity: ConflictSeverity,           // 严重等级
    pub entity_type: EntityType,              // 主要责任实体类型
    pub entity_id: String,                    // 主要责任实体ID
    pub related_entities: BTreeSet<String>,   // 关联实体ID集合 (有序, 便于去重)
    pub detected_at: DateTime<Utc>,           // 检出时间 (计算时刻, 非事件时刻)
    pub description: String,                  // 人读描述
}

impl Conflict {
    /// 构造冲突记录
    ///
    /// detected_at 由调用方的时钟注入, 同一次扫描内所有冲突共享同一时刻
    pub fn new(
        conflict_type: ConflictType,
        severity: ConflictSeverity,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        related_entities: impl IntoIterator<Item = String>,
        detected_at: DateTime<Utc>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            conflict_id: Uuid::new_v4().to_string(),
            conflict_type,
            severity,
            entity_type,
            entity_id: entity_id.into(),
            related_entities: related_entities.into_iter().collect(),
            detected_at,
            description: description.into(),
        }
    }

    /// 去重键: (类型, 排序后的 {主实体} ∪ 关联实体)
    ///
    /// 两条冲突的键相等即视为同一冲突, 保留严重等级更高的一条
    pub fn dedup_key(&self) -> (ConflictType, Vec<String>) {
        let mut ids: BTreeSet<String> = self.related_entities.clone();
        ids.insert(self.entity_id.clone());
        (self.conflict_type, ids.into_iter().collect())
    }

    /// 是否阻断性冲突 (预提交校验必须拒绝)
    ///
    /// 策略: DATE_RANGE_VIOLATION 与 DOUBLE_BOOKING 恒为阻断;
    /// CAPACITY_OVERFLOW 仅在硬上限 (High 及以上) 时阻断;
    /// SKILL_MISMATCH 与 OVERALLOCATION 恒为警告, 不因调用方角色升级
    pub fn is_blocking(&self) -> bool {
        match self.conflict_type {
            ConflictType::DateRangeViolation | ConflictType::DoubleBooking => true,
            ConflictType::CapacityOverflow => self.severity >= ConflictSeverity::High,
            ConflictType::SkillMismatch | ConflictType::Overallocation => false,
        }
    }
}

// ==========================================
// ValidationResult - 预提交校验结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,           // 是否放行
    pub conflicts: Vec<Conflict>, // 阻断性冲突 (is_valid=true 时必为空)
    pub warnings: Vec<Conflict>,  // 非阻断警告
}

impl ValidationResult {
    /// 通过 (可带警告)
    pub fn valid(warnings: Vec<Conflict>) -> Self {
        Self {
            is_valid: true,
            conflicts: Vec::new(),
            warnings,
        }
    }

    /// 拒绝
    pub fn invalid(conflicts: Vec<Conflict>, warnings: Vec<Conflict>) -> Self {
        Self {
            is_valid: false,
            conflicts,
            warnings,
        }
    }
}

// ==========================================
// SuggestedAction - 建议动作
// ==========================================
// 只读提案, 引擎不执行任何写操作; 采纳后须重新走预提交校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestedAction {
    /// 将指派移至阶段窗口内的另一天
    MoveToDate { date: NaiveDate },
    /// 改派给另一名合格员工
    ReassignEmployee { employee_id: String },
    /// 为缺员阶段补充员工
    AddEmployee { employee_id: String },
    /// 将指派日期调整进合法区间
    AdjustDateRange {
        earliest: NaiveDate,
        latest: NaiveDate,
    },
    /// 撤销指派 (项目已取消/员工已停用, 不存在合法区间)
    RemoveAssignment { assignment_id: String },
}

// ==========================================
// ResolutionSuggestion - 解决建议
// ==========================================
// 列表顺序即推荐顺序 (确定性比较器排序)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionSuggestion {
    pub action: SuggestedAction, // 建议动作
    pub description: String,     // 人读说明
}
