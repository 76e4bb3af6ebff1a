// ==========================================
// OCIP/CCIP 合规评分系统 - API层错误类型
// ==========================================
// 职责: 汇总 仓储 / 配置 / 输出 三类错误, 提供面向命令行的错误消息
// 约束: 数据源不可用必须显式报错, 不得静默产出空报表
// ==========================================

use crate::config::ConfigError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    // ===== 数据源 =====
    /// 登记系统数据不可读 (表缺失或库文件不匹配)
    #[error("合规数据源不可用: {0}")]
    StoreUnavailable(String),

    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("配置错误: {0}")]
    ConfigError(#[from] ConfigError),

    // ===== 输出 =====
    #[error("文件写入失败: {path}: {source}")]
    OutputWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("序列化失败: {0}")]
    SerializationError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::TableMissing { table } => {
                ApiError::StoreUnavailable(format!("缺少数据表 {}", table))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::RowDecodeError { column, message } => {
                ApiError::DatabaseError(format!("列 {} 解码失败: {}", column, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for ApiError {
    fn from(err: csv::Error) -> Self {
        ApiError::SerializationError(format!("CSV: {}", err))
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
