// ==========================================
// OCIP/CCIP 合规评分系统 - 只读数据源接口
// ==========================================
// 职责: 为引擎提供三类记录的只读访问, 屏蔽存储技术
// 实现: SqliteDataSource (数据库) / ComplianceSnapshot (内存快照)
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::domain::program::{EnrollmentDocument, PayrollReport, Program};
use crate::repository::enrollment_doc_repo::EnrollmentDocumentRepository;
use crate::repository::error::RepositoryResult;
use crate::repository::payroll_repo::PayrollReportRepository;
use crate::repository::program_repo::ProgramRepository;

// ==========================================
// Trait: ComplianceDataSource
// ==========================================

/// 合规数据源 (只读)
///
/// `program_id` 为 None 时返回全部记录; 为 Some 时只返回该项目的记录。
pub trait ComplianceDataSource {
    /// 项目列表 (按项目名称排序)
    fn programs(&self, program_id: Option<&str>) -> RepositoryResult<Vec<Program>>;

    /// 工资申报 (按截止日升序)
    fn payroll_reports(&self, program_id: Option<&str>) -> RepositoryResult<Vec<PayrollReport>>;

    /// 登记文件
    fn enrollment_documents(
        &self,
        program_id: Option<&str>,
    ) -> RepositoryResult<Vec<EnrollmentDocument>>;
}

// ==========================================
// SqliteDataSource - 数据库数据源
// ==========================================

/// 合规仓储集合
///
/// 聚合三个只读仓储, 共享同一数据库连接。
#[derive(Clone)]
pub struct SqliteDataSource {
    pub program_repo: Arc<ProgramRepository>,
    pub payroll_repo: Arc<PayrollReportRepository>,
    pub document_repo: Arc<EnrollmentDocumentRepository>,
}

impl SqliteDataSource {
    /// 从共享连接创建数据源
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            program_repo: Arc::new(ProgramRepository::from_connection(conn.clone())),
            payroll_repo: Arc::new(PayrollReportRepository::from_connection(conn.clone())),
            document_repo: Arc::new(EnrollmentDocumentRepository::from_connection(conn)),
        }
    }
}

impl ComplianceDataSource for SqliteDataSource {
    fn programs(&self, program_id: Option<&str>) -> RepositoryResult<Vec<Program>> {
        match program_id {
            Some(id) => Ok(self.program_repo.find_by_id(id)?.into_iter().collect()),
            None => self.program_repo.list_all(),
        }
    }

    fn payroll_reports(&self, program_id: Option<&str>) -> RepositoryResult<Vec<PayrollReport>> {
        match program_id {
            Some(id) => self.payroll_repo.list_by_program(id),
            None => self.payroll_repo.list_all(),
        }
    }

    fn enrollment_documents(
        &self,
        program_id: Option<&str>,
    ) -> RepositoryResult<Vec<EnrollmentDocument>> {
        match program_id {
            Some(id) => self.document_repo.list_by_program(id),
            None => self.document_repo.list_all(),
        }
    }
}

// ==========================================
// ComplianceSnapshot - 内存快照
// ==========================================

/// 单次计算使用的数据快照
///
/// 每次调用只从数据源读取一次, 之后的所有计算都基于该快照。
#[derive(Debug, Clone, Default)]
pub struct ComplianceSnapshot {
    pub programs: Vec<Program>,
    pub payroll_reports: Vec<PayrollReport>,
    pub enrollment_documents: Vec<EnrollmentDocument>,
}

impl ComplianceSnapshot {
    pub fn new(
        programs: Vec<Program>,
        payroll_reports: Vec<PayrollReport>,
        enrollment_documents: Vec<EnrollmentDocument>,
    ) -> Self {
        Self {
            programs,
            payroll_reports,
            enrollment_documents,
        }
    }

    /// 从数据源加载快照
    pub fn load(
        source: &dyn ComplianceDataSource,
        program_id: Option<&str>,
    ) -> RepositoryResult<Self> {
        let snapshot = Self {
            programs: source.programs(program_id)?,
            payroll_reports: source.payroll_reports(program_id)?,
            enrollment_documents: source.enrollment_documents(program_id)?,
        };

        tracing::debug!(
            programs = snapshot.programs.len(),
            payroll_reports = snapshot.payroll_reports.len(),
            enrollment_documents = snapshot.enrollment_documents.len(),
            "快照加载完成"
        );

        Ok(snapshot)
    }

    /// 指定项目的申报
    pub fn reports_for(&self, program_id: &str) -> Vec<&PayrollReport> {
        self.payroll_reports
            .iter()
            .filter(|r| r.program_id == program_id)
            .collect()
    }

    /// 指定项目的登记文件
    pub fn documents_for(&self, program_id: &str) -> Vec<&EnrollmentDocument> {
        self.enrollment_documents
            .iter()
            .filter(|d| d.program_id == program_id)
            .collect()
    }

    pub fn find_program(&self, program_id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == program_id)
    }
}

impl ComplianceDataSource for ComplianceSnapshot {
    fn programs(&self, program_id: Option<&str>) -> RepositoryResult<Vec<Program>> {
        let mut programs: Vec<Program> = self
            .programs
            .iter()
            .filter(|p| program_id.map_or(true, |id| p.id == id))
            .cloned()
            .collect();
        programs.sort_by(|a, b| a.project_name.cmp(&b.project_name).then(a.id.cmp(&b.id)));
        Ok(programs)
    }

    fn payroll_reports(&self, program_id: Option<&str>) -> RepositoryResult<Vec<PayrollReport>> {
        let mut reports: Vec<PayrollReport> = self
            .payroll_reports
            .iter()
            .filter(|r| program_id.map_or(true, |id| r.program_id == id))
            .cloned()
            .collect();
        reports.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
        Ok(reports)
    }

    fn enrollment_documents(
        &self,
        program_id: Option<&str>,
    ) -> RepositoryResult<Vec<EnrollmentDocument>> {
        Ok(self
            .enrollment_documents
            .iter()
            .filter(|d| program_id.map_or(true, |id| d.program_id == id))
            .cloned()
            .collect())
    }
}
