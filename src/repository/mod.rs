// ==========================================
// OCIP/CCIP 合规评分系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供只读数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod data_source;
pub mod enrollment_doc_repo;
pub mod error;
pub mod payroll_repo;
pub mod program_repo;

// 重导出核心仓储
pub use data_source::{ComplianceDataSource, ComplianceSnapshot, SqliteDataSource};
pub use enrollment_doc_repo::EnrollmentDocumentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use payroll_repo::PayrollReportRepository;
pub use program_repo::ProgramRepository;
