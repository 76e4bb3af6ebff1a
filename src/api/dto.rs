// ==========================================
// OCIP/CCIP 合规评分系统 - API 数据传输对象
// ==========================================
// 职责: 报表 / 看板同步的输出结构 (JSON 序列化形状即对外格式)
// ==========================================

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::metrics::{Alert, ProgramMetrics};
use crate::domain::program::{EnrollmentDocument, PayrollReport, Program};
use crate::domain::types::{AlertPriority, AlertType};
use crate::engine::aggregate::{
    DashboardSummary, FinancialTotals, ProgramTypeBreakdown, ReportSummary, UpcomingDeadline,
};

// ==========================================
// 报表
// ==========================================

/// 周合规报表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub report_date: NaiveDate,
    pub summary: ReportSummary,
    pub programs: Vec<ProgramMetrics>,
    pub compliance_issues: Vec<ProgramMetrics>,
    pub upcoming_deadlines: Vec<UpcomingDeadline>,
    pub recommendations: Vec<String>,
}

/// 截止期检查条目 (单份申报)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineCheckItem {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub message: String,
    pub program_id: String,
    pub project_name: String,
    pub program_type: String,
    pub due_date: NaiveDate,
    pub days_until: i64,
}

/// 截止期检查计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineCheckSummary {
    pub total_alerts: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

/// 截止期检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeadlineCheck {
    pub check_date: NaiveDate,
    pub horizon_days: i64,
    pub alerts: Vec<DeadlineCheckItem>,
    pub summary: DeadlineCheckSummary,
}

/// 财务汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub report_date: NaiveDate,
    pub totals: FinancialTotals,
    pub by_program_type: BTreeMap<String, ProgramTypeBreakdown>,
    pub top_programs: Vec<ProgramMetrics>,
}

// ==========================================
// 看板同步
// ==========================================

/// 看板中的单个项目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardProgram {
    #[serde(flatten)]
    pub program: Program,
    pub compliance_score: u8,
    /// 下一截止日
    pub payroll_due: Option<NaiveDate>,
    /// 预计节省金额 (取整)
    pub estimated_savings: i64,
    /// 展示状态 (enrolled 显示为 active)
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

impl DashboardProgram {
    pub fn from_metrics(metrics: &ProgramMetrics, synced_at: DateTime<Utc>) -> Self {
        Self {
            program: metrics.program.clone(),
            compliance_score: metrics.compliance_score,
            payroll_due: metrics.next_deadline,
            estimated_savings: metrics.estimated_savings as i64,
            status: metrics.program.enrollment_status.display_status(),
            last_updated: synced_at,
        }
    }
}

/// 看板状态文档 (api/wrapup-status.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardStatus {
    pub programs: Vec<DashboardProgram>,
    pub summary: DashboardSummary,
    pub alerts: Vec<Alert>,
    pub last_sync: DateTime<Utc>,
    pub sync_id: String,
}

/// 单项目明细文档 (api/programs/<id>.json)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramDetail {
    #[serde(flatten)]
    pub program: Program,
    pub compliance_score: u8,
    /// 按截止日降序
    pub payroll_reports: Vec<PayrollReport>,
    /// 按文件类型排序
    pub enrollment_docs: Vec<EnrollmentDocument>,
}

/// 全量同步结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullSyncResult {
    pub dashboard: DashboardStatus,
    pub detail_files: Vec<String>,
}
