// ==========================================
// OCIP/CCIP 合规评分系统 - API 层
// ==========================================
// 职责: 提供报表与看板同步接口, 供命令行调用
// ==========================================

pub mod dto;
pub mod error;
pub mod report_api;
pub mod sync_api;

// 重导出核心类型
pub use dto::{
    DashboardProgram, DashboardStatus, DeadlineCheck, DeadlineCheckItem, DeadlineCheckSummary,
    FinancialSummary, FullSyncResult, ProgramDetail, WeeklyReport,
};
pub use error::{ApiError, ApiResult};
pub use report_api::ReportApi;
pub use sync_api::{DashboardSyncApi, DASHBOARD_FILE_NAME};
