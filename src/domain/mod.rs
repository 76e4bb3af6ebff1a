// ==========================================
// OCIP/CCIP 合规评分系统 - 领域模型层
// ==========================================
// 职责: 定义项目/申报/文件实体与派生指标
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod metrics;
pub mod program;
pub mod types;

// 重导出核心类型
pub use metrics::{Alert, ProgramMetrics};
pub use program::{EnrollmentDocument, PayrollReport, Program, DATE_FORMAT};
pub use types::{
    AlertPriority, AlertType, DocumentStatus, EnrollmentStatus, PayrollStatus, ProgramType,
};
