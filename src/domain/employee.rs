// ==========================================
// 班组排程系统 - 员工领域模型
// ==========================================
// 员工记录由存储层拥有, 引擎只读快照
// ==========================================

use crate::domain::types::Division;
use serde::{Deserialize, Serialize};

// ==========================================
// Employee - 员工
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: String,                // 员工ID
    pub name: String,                       // 姓名
    pub division: Division,                 // 工种
    pub is_active: bool,                    // 是否在职
    pub weekly_capacity_hours: f64,         // 周工时上限
    pub daily_capacity_hours: Option<f64>,  // 日工时上限 (缺省走配置默认值)
    pub skills: Vec<String>,                // 技能/证书编码
}

impl Employee {
    /// 实际生效的日工时上限
    ///
    /// 员工未单独声明时退回配置默认值 (一般为 8 小时)
    pub fn effective_daily_capacity(&self, default_hours: f64) -> f64 {
        self.daily_capacity_hours.unwrap_or(default_hours)
    }

    /// 是否持有指定技能/证书
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_daily_capacity_fallback() {
        let mut e = Employee {
            employee_id: "E1".to_string(),
            name: "张三".to_string(),
            division: Division::Plumbing,
            is_active: true,
            weekly_capacity_hours: 40.0,
            daily_capacity_hours: None,
            skills: vec![],
        };
        assert_eq!(e.effective_daily_capacity(8.0), 8.0);

        e.daily_capacity_hours = Some(10.0);
        assert_eq!(e.effective_daily_capacity(8.0), 10.0);
    }
}
