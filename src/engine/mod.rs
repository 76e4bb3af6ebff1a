// ==========================================
// OCIP/CCIP 合规评分系统 - 引擎层
// ==========================================
// 职责: 实现评分 / 截止期 / 节省测算 / 告警 / 汇总规则
// 红线: Engine 不拼 SQL, 只消费内存快照与基准日
// ==========================================

pub mod aggregate;
pub mod alert;
pub mod compliance;
pub mod deadline;
pub mod metrics;
pub mod savings;

// 重导出核心引擎
pub use aggregate::{
    DashboardSummary, FinancialTotals, ProgramTypeBreakdown, RecommendationPolicy, ReportSummary,
    UpcomingDeadline,
};
pub use alert::{AlertGenerator, AlertRule, RuleContext, DEFAULT_RULES};
pub use compliance::{ComplianceScoringEngine, OverdueCounting, ScoreBreakdown};
pub use deadline::{days_until, next_deadline};
pub use metrics::ProgramMetricsEngine;
pub use savings::estimated_savings;
