// ==========================================
// 班组排程系统 - 冲突引擎对外接口
// ==========================================
// 职责: 组装扫描器/校验器/建议器/缓存, 暴露四个引擎操作
// 说明: 不拥有任何传输格式; Conflict/ValidationResult 均可序列化,
//       由调用方 (HTTP层等) 自行转写
// ==========================================

use crate::api::error::ApiResult;
use crate::config::EngineConfig;
use crate::domain::{Conflict, ResolutionSuggestion, ValidationResult};
use crate::engine::{
    AssignmentValidator, Clock, ConflictCache, ConflictScanner, ResolutionAdvisor, ScanScope,
    SystemClock,
};
use crate::repository::AssignmentStore;
use chrono::NaiveDate;
use std::sync::Arc;

// ==========================================
// ConflictApi - 冲突引擎门面
// ==========================================
pub struct ConflictApi {
    scanner: ConflictScanner,
    validator: AssignmentValidator,
    advisor: ResolutionAdvisor,
    cache: Arc<ConflictCache>,
}

impl ConflictApi {
    /// 以系统时钟创建引擎实例
    pub fn new(store: Arc<dyn AssignmentStore>, config: EngineConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// 以注入时钟创建引擎实例 (测试/回放用)
    ///
    /// 缓存实例在此统一构造并传给扫描器, 不做进程级单例
    pub fn with_clock(
        store: Arc<dyn AssignmentStore>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = Arc::new(ConflictCache::new(clock.clone()));
        Self {
            scanner: ConflictScanner::new(
                store.clone(),
                cache.clone(),
                config.clone(),
                clock.clone(),
            ),
            validator: AssignmentValidator::new(store.clone(), config.clone(), clock.clone()),
            advisor: ResolutionAdvisor::new(store, config, clock),
            cache,
        }
    }

    /// 预提交校验一条拟新增指派 (永不走缓存, 每次现算)
    pub async fn validate_assignment(
        &self,
        phase_id: &str,
        employee_id: &str,
        date: NaiveDate,
        hours: f64,
    ) -> ApiResult<ValidationResult> {
        self.validator
            .validate_assignment(phase_id, employee_id, date, hours)
            .await
    }

    /// 全量冲突审计 (命中缓存则直接返回)
    pub async fn scan_all_conflicts(&self) -> ApiResult<Vec<Conflict>> {
        self.scanner.scan_all_conflicts().await
    }

    /// 按范围扫描冲突
    pub async fn scan_conflicts(&self, scope: &ScanScope) -> ApiResult<Vec<Conflict>> {
        self.scanner.scan_conflicts(scope).await
    }

    /// 为一条冲突生成排序后的解决建议
    pub async fn get_resolution_suggestions(
        &self,
        conflict: &Conflict,
    ) -> ApiResult<Vec<ResolutionSuggestion>> {
        self.advisor.get_resolution_suggestions(conflict).await
    }

    /// 无条件清空冲突缓存
    ///
    /// # 契约 (调用方必须遵守)
    /// 任何指派/阶段/员工的变更落库后必须调用本方法,
    /// 否则后续扫描可能返回至多一个扫描周期的陈旧冲突数据。
    /// 扫描进行中清空不会破坏状态: 在途扫描完成后会重新填充缓存
    pub fn clear_cache(&self) -> ApiResult<()> {
        self.cache.clear()
    }
}
