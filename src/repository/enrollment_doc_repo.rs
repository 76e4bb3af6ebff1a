// ==========================================
// OCIP/CCIP 合规评分系统 - 登记文件数据仓储
// ==========================================

use crate::domain::program::EnrollmentDocument;
use crate::domain::types::DocumentStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// 登记文件仓储
/// 职责: enrollment_docs 表的只读查询
pub struct EnrollmentDocumentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EnrollmentDocumentRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部登记文件
    pub fn list_all(&self) -> RepositoryResult<Vec<EnrollmentDocument>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT program_id, document_type, status, submitted_date
            FROM enrollment_docs
            ORDER BY program_id, document_type
            "#,
        )?;

        let docs = stmt
            .query_map([], map_document_row)?
            .collect::<SqliteResult<Vec<EnrollmentDocument>>>()?;

        Ok(docs)
    }

    /// 查询单个项目的登记文件 (按文件类型排序)
    pub fn list_by_program(&self, program_id: &str) -> RepositoryResult<Vec<EnrollmentDocument>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT program_id, document_type, status, submitted_date
            FROM enrollment_docs
            WHERE program_id = ?1
            ORDER BY document_type
            "#,
        )?;

        let docs = stmt
            .query_map(params![program_id], map_document_row)?
            .collect::<SqliteResult<Vec<EnrollmentDocument>>>()?;

        Ok(docs)
    }
}

fn map_document_row(row: &Row<'_>) -> SqliteResult<EnrollmentDocument> {
    let status: Option<String> = row.get(2)?;

    Ok(EnrollmentDocument {
        program_id: row.get(0)?,
        document_type: row.get(1)?,
        status: DocumentStatus::from_str(status.as_deref().unwrap_or_default()),
        submitted_date: row.get(3)?,
    })
}
