// ==========================================
// 班组排程系统 - 指派领域模型
// ==========================================
// 不变量: assignment_date 必须落在所属阶段窗口内 (由引擎检测, 不由存储层保证)
// 不变量: 0 < hours_allocated <= 24
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Assignment - 指派
// ==========================================
// 一名员工在某一天对某阶段的已承诺工时;
// 多日连续派工只记录首日 (assignment_date 为块首日)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,      // 指派ID
    pub employee_id: String,        // 员工ID
    pub phase_id: String,           // 阶段ID
    pub assignment_date: NaiveDate, // 派工日期 (单日, 或多日块首日)
    pub hours_allocated: f64,       // 当日分配工时 (>0, <=24)
    pub created_by: String,         // 创建人
    pub created_at: NaiveDateTime,  // 创建时间
}

impl Assignment {
    /// 单日工时是否在合法区间 (0, 24]
    pub fn hours_in_range(hours: f64) -> bool {
        hours > 0.0 && hours <= 24.0
    }
}
