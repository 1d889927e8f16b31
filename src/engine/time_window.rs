// ==========================================
// 班组排程系统 - 时间窗工具
// ==========================================
// 职责: 闭区间日期窗口与重叠运算
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 非法时间窗（起点晚于终点）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("非法时间窗: start={start} 晚于 end={end}")]
pub struct InvalidWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// ==========================================
// TimeWindow - 闭区间日期窗口
// ==========================================
// 语义: [start, end] 双闭; start == end 为合法的单日窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// 构造时间窗, 拒绝倒置区间
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidWindow> {
        if start > end {
            return Err(InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// 单日窗口
    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// 两窗口是否至少共享一天
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// 日期是否落在窗口内
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 窗口覆盖的天数（闭区间, 单日窗口为 1）
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// 升序遍历窗口内每一天
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.days()).map(move |offset| start + Duration::days(offset))
    }
}
