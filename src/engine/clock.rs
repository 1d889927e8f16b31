// ==========================================
// 班组排程系统 - 时钟注入
// ==========================================
// 职责: 为 detected_at / 临期判定提供可注入的时间来源
// 目标: 避免引擎内散落 Utc::now(), 使扫描结果可复现、可测试
// ==========================================

use chrono::{DateTime, NaiveDate, Utc};

/// 时间来源
pub trait Clock: Send + Sync {
    /// 当前时刻（UTC）
    fn now(&self) -> DateTime<Utc>;

    /// 当前日期（UTC 日历日）
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

// ==========================================
// SystemClock - 系统时钟
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ==========================================
// FixedClock - 固定时钟（测试/演示用）
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// 以某日零点为固定时刻
    pub fn at_date(date: NaiveDate) -> Self {
        Self {
            instant: date.and_hms_opt(0, 0, 0).expect("合法时分秒").and_utc(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
