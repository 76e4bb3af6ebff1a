// ==========================================
// OCIP/CCIP 合规评分系统 - 统保项目数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::program::Program;
use crate::domain::types::{EnrollmentStatus, ProgramType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const PROGRAM_COLUMNS: &str = r#"
    id, project_name, project_address, program_type, enrollment_status,
    bid_deduct_pct, contract_value, estimated_completion, contact_name, contact_email
"#;

// ==========================================
// ProgramRepository - 统保项目仓储
// ==========================================

/// 统保项目仓储
/// 职责: programs 表的只读查询
pub struct ProgramRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgramRepository {
    /// 创建新的项目仓储实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部项目 (按项目名称排序)
    pub fn list_all(&self) -> RepositoryResult<Vec<Program>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM programs ORDER BY project_name, id",
            PROGRAM_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let programs = stmt
            .query_map([], map_program_row)?
            .collect::<SqliteResult<Vec<Program>>>()?;

        Ok(programs)
    }

    /// 按项目编号查询
    ///
    /// # 返回
    /// - Ok(Some(Program)): 找到项目
    /// - Ok(None): 未找到
    /// - Err: 数据库错误
    pub fn find_by_id(&self, program_id: &str) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM programs WHERE id = ?1", PROGRAM_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;

        let program = stmt
            .query_row(params![program_id], map_program_row)
            .optional()?;

        Ok(program)
    }
}

fn map_program_row(row: &Row<'_>) -> SqliteResult<Program> {
    let program_type: Option<String> = row.get(3)?;
    let enrollment_status: Option<String> = row.get(4)?;

    Ok(Program {
        id: row.get(0)?,
        project_name: row.get(1)?,
        project_address: row.get(2)?,
        program_type: ProgramType::from_str(program_type.as_deref().unwrap_or("OCIP")),
        enrollment_status: EnrollmentStatus::from_str(
            enrollment_status.as_deref().unwrap_or("pending"),
        ),
        bid_deduct_pct: row.get(5)?,
        contract_value: row.get(6)?,
        estimated_completion: row.get(7)?,
        contact_name: row.get(8)?,
        contact_email: row.get(9)?,
    })
}
