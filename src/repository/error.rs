// ==========================================
// OCIP/CCIP 合规评分系统 - 仓储层错误类型
// ==========================================
// 读路径只读: 不存在写冲突, 错误集中在 连接 / 表缺失 / 行解码
// ==========================================

use thiserror::Error;

const NO_SUCH_TABLE: &str = "no such table: ";

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    /// 登记系统数据库缺少必需的表 (库文件不对或尚未初始化)
    #[error("数据表缺失: {table}")]
    TableMissing { table: String },

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    /// 列类型与预期不符 (如 contract_value 存了文本)
    #[error("行解码失败 (column={column}): {message}")]
    RowDecodeError { column: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => match msg.strip_prefix(NO_SUCH_TABLE) {
                Some(table) => RepositoryError::TableMissing {
                    table: table.trim().to_string(),
                },
                None => RepositoryError::DatabaseQueryError(msg),
            },
            rusqlite::Error::InvalidColumnType(_, column, ty) => RepositoryError::RowDecodeError {
                column,
                message: format!("unexpected type {}", ty),
            },
            rusqlite::Error::FromSqlConversionFailure(idx, _, source) => {
                RepositoryError::RowDecodeError {
                    column: format!("#{}", idx),
                    message: source.to_string(),
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
