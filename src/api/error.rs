// ==========================================
// 班组排程系统 - API层错误类型
// ==========================================
// 职责: 定义引擎对外的错误分类, 转换存储层错误
// 约定: 检出的冲突是正常返回值, 不是错误;
//       扫描/校验要么返回完整结果, 要么整体失败, 不返回静默缺项的部分结果
// ==========================================

use crate::engine::time_window::InvalidWindow;
use crate::repository::error::StoreError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    /// 引用的员工/阶段/项目ID无法解析 (向调用方透出, 不吞掉)
    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 非法输入 (工时越界/倒置日期区间), 在任何评估器运行前拒绝
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 存储适配器未能返回数据; 本次请求即告失败, 引擎内不做重试
    #[error("存储不可用: {0}")]
    StoreUnavailable(String),

    /// 引擎内部故障 (锁中毒等)
    #[error("内部错误: {0}")]
    Internal(String),
}

// 存储层错误降级映射: NotFound 透传, 其余归为存储不可用
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} id={id}"))
            }
            other => ApiError::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<InvalidWindow> for ApiError {
    fn from(err: InvalidWindow) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
