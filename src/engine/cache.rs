// ==========================================
// 班组排程系统 - 冲突缓存
// ==========================================
// 职责: 按扫描范围指纹记忆扫描结果, 提供显式失效
// 契约: 任何指派/阶段/员工变更后, 调用方必须调用 clear(),
//       否则接受至多一个扫描周期的陈旧冲突数据 (无 TTL 过期)
// 并发: 单互斥锁串行化读/写/清空; 并发扫描后写覆盖先写 (结果等价)
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::Conflict;
use crate::engine::clock::Clock;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 缓存条目
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub conflicts: Vec<Conflict>,   // 扫描结果
    pub computed_at: DateTime<Utc>, // 计算时刻
}

// ==========================================
// ConflictCache - 冲突缓存
// ==========================================
// 显式拥有的组件实例: 时钟注入, 由扫描器在构造时持有, 不做进程级单例
pub struct ConflictCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl ConflictCache {
    /// 创建空缓存
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// 获取锁 (锁中毒视为内部错误, 不 panic)
    fn lock(&self) -> ApiResult<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|e| ApiError::Internal(format!("缓存锁获取失败: {e}")))
    }

    /// 读取指纹对应的缓存条目
    pub fn get(&self, fingerprint: &str) -> ApiResult<Option<CacheEntry>> {
        let entries = self.lock()?;
        let hit = entries.get(fingerprint).cloned();
        if hit.is_some() {
            tracing::debug!(fingerprint, "冲突缓存命中");
        } else {
            tracing::debug!(fingerprint, "冲突缓存未命中");
        }
        Ok(hit)
    }

    /// 写入扫描结果 (后写覆盖)
    pub fn put(&self, fingerprint: &str, conflicts: Vec<Conflict>) -> ApiResult<()> {
        let entry = CacheEntry {
            conflicts,
            computed_at: self.clock.now(),
        };
        let mut entries = self.lock()?;
        entries.insert(fingerprint.to_string(), entry);
        Ok(())
    }

    /// 无条件清空全部条目 (粗粒度失效)
    pub fn clear(&self) -> ApiResult<()> {
        let mut entries = self.lock()?;
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(dropped, "冲突缓存已清空");
        Ok(())
    }

    /// 当前条目数 (观测用)
    pub fn len(&self) -> ApiResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> ApiResult<bool> {
        Ok(self.lock()?.is_empty())
    }
}
