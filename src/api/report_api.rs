// ==========================================
// OCIP/CCIP 合规评分系统 - 合规报表 API
// ==========================================
// 职责: 周报 / 截止期检查 / 财务汇总
// 流程: 数据源 → 快照 (一次读取) → 指标引擎 → 汇总折叠
// 口径: 逾期计数默认仅按状态 (report_overdue_counting)
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;

use crate::api::dto::{
    DeadlineCheck, DeadlineCheckItem, DeadlineCheckSummary, FinancialSummary, WeeklyReport,
};
use crate::api::error::ApiResult;
use crate::config::EngineConfig;
use crate::domain::metrics::ProgramMetrics;
use crate::domain::types::{AlertPriority, AlertType};
use crate::engine::aggregate;
use crate::engine::compliance::ComplianceScoringEngine;
use crate::engine::deadline::days_until;
use crate::engine::metrics::ProgramMetricsEngine;
use crate::i18n::t_with_args;
use crate::perf::PerfGuard;
use crate::repository::{ComplianceDataSource, ComplianceSnapshot};

// ==========================================
// ReportApi - 合规报表 API
// ==========================================
pub struct ReportApi {
    source: Arc<dyn ComplianceDataSource>,
    config: EngineConfig,
}

impl ReportApi {
    /// 创建新的 ReportApi 实例
    ///
    /// # 参数
    /// - source: 只读数据源
    /// - config: 引擎参数 (阈值 / 窗口 / 计数口径)
    pub fn new(source: Arc<dyn ComplianceDataSource>, config: EngineConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn metrics_engine(&self) -> ProgramMetricsEngine {
        ProgramMetricsEngine::new(ComplianceScoringEngine::new(
            self.config.report_overdue_counting,
        ))
    }

    fn load_metrics(&self, as_of: NaiveDate) -> ApiResult<Vec<ProgramMetrics>> {
        let snapshot = ComplianceSnapshot::load(self.source.as_ref(), None)?;
        Ok(self.metrics_engine().compute_all(&snapshot, as_of))
    }

    // ==========================================
    // 周报
    // ==========================================

    /// 生成周合规报表
    ///
    /// # 参数
    /// - as_of: 报表基准日
    pub fn weekly_report(&self, as_of: NaiveDate) -> ApiResult<WeeklyReport> {
        let _perf = PerfGuard::new("weekly_report");
        let metrics = self.load_metrics(as_of)?;

        let summary = aggregate::summarize(&metrics);
        let compliance_issues =
            aggregate::compliance_issues(&metrics, self.config.issue_score_threshold);
        let upcoming_deadlines =
            aggregate::upcoming_deadlines(&metrics, as_of, self.config.upcoming_window_days);
        let recommendations = aggregate::recommendations(
            &compliance_issues,
            &upcoming_deadlines,
            &self.config.recommendation_policy(),
        );

        tracing::info!(
            %as_of,
            programs = summary.total_programs,
            issues = compliance_issues.len(),
            upcoming = upcoming_deadlines.len(),
            "周报生成完成"
        );

        Ok(WeeklyReport {
            report_date: as_of,
            summary,
            programs: metrics,
            compliance_issues,
            upcoming_deadlines,
            recommendations,
        })
    }

    // ==========================================
    // 截止期检查
    // ==========================================

    /// 截止期检查
    ///
    /// 统计 [as_of, as_of + horizon_days] 内到期的 pending/overdue 申报, 按截止日排序。
    /// 关联不到项目的申报不计入。
    pub fn check_deadlines(&self, as_of: NaiveDate) -> ApiResult<DeadlineCheck> {
        let _perf = PerfGuard::new("check_deadlines");
        let snapshot = ComplianceSnapshot::load(self.source.as_ref(), None)?;
        let horizon_days = self.config.deadline_check_horizon_days;

        let mut due: Vec<_> = snapshot
            .payroll_reports
            .iter()
            .filter(|r| r.status.is_outstanding())
            .filter_map(|r| {
                let due_date = r.parsed_due_date()?;
                let days = days_until(due_date, as_of);
                if !(0..=horizon_days).contains(&days) {
                    return None;
                }
                let program = snapshot.find_program(&r.program_id)?;
                Some((due_date, days, r, program))
            })
            .collect();
        due.sort_by_key(|(due_date, ..)| *due_date);

        let alerts: Vec<DeadlineCheckItem> = due
            .into_iter()
            .map(|(due_date, days, report, program)| {
                let priority = aggregate::classify_deadline(days);
                DeadlineCheckItem {
                    alert_type: AlertType::Deadline,
                    priority,
                    message: deadline_check_message(priority, &program.project_name, days),
                    program_id: report.program_id.clone(),
                    project_name: program.project_name.clone(),
                    program_type: program.program_type.to_string(),
                    due_date,
                    days_until: days,
                }
            })
            .collect();

        let count = |p: AlertPriority| alerts.iter().filter(|a| a.priority == p).count();
        let summary = DeadlineCheckSummary {
            total_alerts: alerts.len(),
            critical: count(AlertPriority::Critical),
            high: count(AlertPriority::High),
            medium: count(AlertPriority::Medium),
        };

        tracing::info!(%as_of, horizon_days, alerts = summary.total_alerts, "截止期检查完成");

        Ok(DeadlineCheck {
            check_date: as_of,
            horizon_days,
            alerts,
            summary,
        })
    }

    // ==========================================
    // 财务汇总
    // ==========================================

    /// 财务汇总 (总额 / 按项目类型 / 节省金额排行)
    pub fn financial_summary(&self, as_of: NaiveDate) -> ApiResult<FinancialSummary> {
        let _perf = PerfGuard::new("financial_summary");
        let metrics = self.load_metrics(as_of)?;

        let totals = aggregate::financial_totals(&metrics);
        let by_program_type = aggregate::group_by_program_type(&metrics);
        let top_programs = aggregate::top_by_savings(&metrics, self.config.top_programs_limit);

        tracing::info!(
            %as_of,
            programs = totals.total_programs,
            types = by_program_type.len(),
            "财务汇总完成"
        );

        Ok(FinancialSummary {
            report_date: as_of,
            totals,
            by_program_type,
            top_programs,
        })
    }
}

fn deadline_check_message(priority: AlertPriority, name: &str, days: i64) -> String {
    let key = match priority {
        AlertPriority::Critical => "deadline_check.overdue",
        AlertPriority::High => "deadline_check.urgent",
        AlertPriority::Medium => "deadline_check.upcoming",
        AlertPriority::Low => "deadline_check.scheduled",
    };
    t_with_args(key, &[("name", name), ("days", &days.abs().to_string())])
}
