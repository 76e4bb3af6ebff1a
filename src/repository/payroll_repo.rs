// ==========================================
// OCIP/CCIP 合规评分系统 - 工资申报数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: due_date 原样返回字符串, 格式校验交给引擎
// ==========================================

use crate::domain::program::PayrollReport;
use crate::domain::types::PayrollStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const PAYROLL_COLUMNS: &str =
    "id, program_id, due_date, status, payroll_amount, submitted_date";

// ==========================================
// PayrollReportRepository - 工资申报仓储
// ==========================================

/// 工资申报仓储
/// 职责: payroll_reports 表的只读查询
pub struct PayrollReportRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PayrollReportRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 查询全部申报 (按项目, 截止日升序)
    pub fn list_all(&self) -> RepositoryResult<Vec<PayrollReport>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM payroll_reports ORDER BY program_id, due_date, id",
            PAYROLL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let reports = stmt
            .query_map([], map_payroll_row)?
            .collect::<SqliteResult<Vec<PayrollReport>>>()?;

        Ok(reports)
    }

    /// 查询单个项目的申报 (截止日升序)
    pub fn list_by_program(&self, program_id: &str) -> RepositoryResult<Vec<PayrollReport>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM payroll_reports WHERE program_id = ?1 ORDER BY due_date, id",
            PAYROLL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let reports = stmt
            .query_map(params![program_id], map_payroll_row)?
            .collect::<SqliteResult<Vec<PayrollReport>>>()?;

        Ok(reports)
    }
}

fn map_payroll_row(row: &Row<'_>) -> SqliteResult<PayrollReport> {
    let status: Option<String> = row.get(3)?;

    Ok(PayrollReport {
        id: row.get(0)?,
        program_id: row.get(1)?,
        due_date: row.get(2)?,
        // NULL 状态既非 pending 也非 overdue
        status: PayrollStatus::from_str(status.as_deref().unwrap_or_default()),
        payroll_amount: row.get(4)?,
        submitted_date: row.get(5)?,
    })
}
