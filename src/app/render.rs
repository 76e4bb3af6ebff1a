// ==========================================
// OCIP/CCIP 合规评分系统 - 输出渲染
// ==========================================
// 职责: 将报表 / 同步结果渲染为 控制台文本 / JSON / CSV
// 约束: 金额展示取整并加千分位; 文案走 i18n
// ==========================================

use serde::Serialize;

use crate::api::dto::{DashboardStatus, DeadlineCheck, FinancialSummary, ProgramDetail, WeeklyReport};
use crate::api::error::ApiResult;
use crate::domain::metrics::Alert;
use crate::domain::types::AlertPriority;
use crate::i18n::{format_thousands, t, t_with_args};

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    Csv,
}

fn priority_marker(priority: AlertPriority) -> &'static str {
    match priority {
        AlertPriority::Critical => "[!!]",
        AlertPriority::High => "[! ]",
        AlertPriority::Medium => "[~ ]",
        AlertPriority::Low => "[  ]",
    }
}

fn heading(out: &mut String, title: &str, width: usize) {
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&"=".repeat(width));
    out.push('\n');
}

fn line(out: &mut String, label: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("{}: {}\n", label, value));
}

/// JSON (格式化)
pub fn to_json<T: Serialize>(value: &T) -> ApiResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

// ==========================================
// 控制台
// ==========================================

/// 周报
pub fn weekly_console(report: &WeeklyReport) -> String {
    let mut out = String::new();
    let s = &report.summary;

    heading(&mut out, &t("console.weekly_title"), 50);
    line(&mut out, &t("console.report_date"), report.report_date);
    line(&mut out, &t("console.total_programs"), s.total_programs);
    line(&mut out, &t("console.active_programs"), s.active_programs);
    line(&mut out, &t("console.average_compliance"), format!("{:.1}%", s.avg_compliance_score));
    line(
        &mut out,
        &t("console.total_savings"),
        format!("${}", format_thousands(s.total_estimated_savings)),
    );

    if !report.compliance_issues.is_empty() {
        out.push('\n');
        out.push_str(&t_with_args(
            "console.compliance_issues",
            &[("count", &report.compliance_issues.len().to_string())],
        ));
        out.push('\n');
        for issue in &report.compliance_issues {
            out.push_str(&format!(
                "  • {}: {}%\n",
                issue.program.project_name, issue.compliance_score
            ));
        }
    }

    if !report.upcoming_deadlines.is_empty() {
        out.push('\n');
        out.push_str(&t_with_args(
            "console.upcoming_deadlines",
            &[("count", &report.upcoming_deadlines.len().to_string())],
        ));
        out.push('\n');
        for d in &report.upcoming_deadlines {
            let text = t_with_args(
                "console.due_in",
                &[
                    ("name", &d.program),
                    ("days", &d.days_until.to_string()),
                    ("date", &d.deadline.to_string()),
                ],
            );
            out.push_str(&format!("  • {}\n", text));
        }
    }

    out.push('\n');
    out.push_str(&format!("{}:\n", t("console.recommendations")));
    for rec in &report.recommendations {
        out.push_str(&format!("  • {}\n", rec));
    }
    out
}

/// 截止期检查
pub fn deadlines_console(check: &DeadlineCheck) -> String {
    let mut out = String::new();
    let title = t_with_args("console.deadline_title", &[("date", &check.check_date.to_string())]);
    heading(&mut out, &title, 40);
    line(&mut out, &t("console.total_alerts"), check.summary.total_alerts);
    out.push_str(&format!(
        "Critical: {} | High: {} | Medium: {}\n",
        check.summary.critical, check.summary.high, check.summary.medium
    ));

    if check.alerts.is_empty() {
        out.push('\n');
        out.push_str(&t_with_args(
            "console.no_deadlines",
            &[("days", &check.horizon_days.to_string())],
        ));
        out.push('\n');
    } else {
        out.push_str(&format!("\n{}:\n", t("console.alert_details")));
        for alert in &check.alerts {
            out.push_str(&format!("  {} {}\n", priority_marker(alert.priority), alert.message));
        }
    }
    out
}

/// 财务汇总
pub fn financial_console(summary: &FinancialSummary) -> String {
    let mut out = String::new();
    let totals = &summary.totals;
    let title = t_with_args("console.financial_title", &[("date", &summary.report_date.to_string())]);
    heading(&mut out, &title, 45);
    line(
        &mut out,
        &t("console.total_contract_value"),
        format!("${}", format_thousands(totals.total_contract_value)),
    );
    line(
        &mut out,
        &t("console.total_savings"),
        format!("${}", format_thousands(totals.total_estimated_savings)),
    );
    line(&mut out, &t("console.savings_rate"), format!("{:.1}%", totals.savings_percentage));

    out.push_str(&format!("\n{}:\n", t("console.by_program_type")));
    for (program_type, data) in &summary.by_program_type {
        let text = t_with_args(
            "console.type_line",
            &[
                ("type", program_type),
                ("count", &data.count.to_string()),
                ("savings", &format_thousands(data.estimated_savings)),
                ("deduct", &format!("{:.1}", data.avg_bid_deduct)),
            ],
        );
        out.push_str(&format!("  {}\n", text));
    }

    out.push_str(&format!(
        "\n{}:\n",
        t_with_args("console.top_programs", &[("count", &summary.top_programs.len().to_string())])
    ));
    for (i, m) in summary.top_programs.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {}: ${}\n",
            i + 1,
            m.program.project_name,
            format_thousands(m.estimated_savings)
        ));
    }
    out
}

/// 预警列表
pub fn alerts_console(alerts: &[Alert]) -> String {
    let mut out = t_with_args("console.generated_alerts", &[("count", &alerts.len().to_string())]);
    out.push_str(":\n");
    for alert in alerts {
        out.push_str(&format!("  {} {}\n", priority_marker(alert.priority), alert.message));
    }
    out
}

/// 看板同步摘要
pub fn dashboard_console(dashboard: &DashboardStatus, path: &str) -> String {
    let s = &dashboard.summary;
    let mut out = String::new();
    out.push_str(&t_with_args("console.synced_to", &[("path", path)]));
    out.push('\n');
    out.push_str(&format!("\n{}:\n", t("console.summary")));
    out.push_str(&format!("   {}: {}\n", t("console.active_programs"), s.active_programs));
    out.push_str(&format!(
        "   {}: ${}\n",
        t("console.total_contract_value"),
        format_thousands(s.total_contract_value as f64)
    ));
    out.push_str(&format!(
        "   {}: ${}\n",
        t("console.estimated_savings"),
        format_thousands(s.estimated_total_savings as f64)
    ));
    out.push_str(&format!("   {}: {}%\n", t("console.average_compliance"), s.avg_compliance_score));
    out.push_str(&format!("   {}: {}\n", t("console.active_alerts"), dashboard.alerts.len()));
    out
}

/// 单项目明细
pub fn detail_console(detail: &ProgramDetail) -> String {
    let mut out = String::new();
    let p = &detail.program;
    heading(&mut out, &format!("{} ({})", p.project_name, p.id), 50);
    out.push_str(&format!(
        "{} | {} | {}%\n",
        p.program_type,
        p.enrollment_status.display_status(),
        detail.compliance_score
    ));
    for r in &detail.payroll_reports {
        out.push_str(&format!("  payroll {} {}\n", r.due_date, r.status));
    }
    for d in &detail.enrollment_docs {
        out.push_str(&format!("  doc {} {}\n", d.document_type, d.status));
    }
    out
}

// ==========================================
// CSV
// ==========================================

#[derive(Serialize)]
struct ProgramRow<'a> {
    program_id: &'a str,
    project_name: &'a str,
    program_type: String,
    enrollment_status: String,
    compliance_score: u8,
    next_deadline: String,
    contract_value: f64,
    estimated_savings: i64,
}

#[derive(Serialize)]
struct DeadlineRow<'a> {
    program_id: &'a str,
    project_name: &'a str,
    due_date: String,
    days_until: i64,
    priority: String,
    message: &'a str,
}

#[derive(Serialize)]
struct ProgramTypeRow<'a> {
    program_type: &'a str,
    count: usize,
    contract_value: f64,
    estimated_savings: f64,
    avg_bid_deduct: f64,
}

#[derive(Serialize)]
struct AlertRow<'a> {
    #[serde(rename = "type")]
    alert_type: String,
    priority: String,
    program_id: &'a str,
    message: &'a str,
}

fn write_csv<R: Serialize>(rows: impl IntoIterator<Item = R>) -> ApiResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::api::ApiError::SerializationError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| crate::api::ApiError::SerializationError(e.to_string()))
}

/// 周报 CSV (每个项目一行)
pub fn weekly_csv(report: &WeeklyReport) -> ApiResult<String> {
    write_csv(report.programs.iter().map(|m| ProgramRow {
        program_id: &m.program.id,
        project_name: &m.program.project_name,
        program_type: m.program.program_type.to_string(),
        enrollment_status: m.program.enrollment_status.to_string(),
        compliance_score: m.compliance_score,
        next_deadline: m.next_deadline.map(|d| d.to_string()).unwrap_or_default(),
        contract_value: m.program.contract_value_or_zero(),
        estimated_savings: m.estimated_savings as i64,
    }))
}

/// 截止期检查 CSV
pub fn deadlines_csv(check: &DeadlineCheck) -> ApiResult<String> {
    write_csv(check.alerts.iter().map(|a| DeadlineRow {
        program_id: &a.program_id,
        project_name: &a.project_name,
        due_date: a.due_date.to_string(),
        days_until: a.days_until,
        priority: a.priority.to_string(),
        message: &a.message,
    }))
}

/// 财务汇总 CSV (按项目类型)
pub fn financial_csv(summary: &FinancialSummary) -> ApiResult<String> {
    write_csv(summary.by_program_type.iter().map(|(k, v)| ProgramTypeRow {
        program_type: k,
        count: v.count,
        contract_value: v.contract_value,
        estimated_savings: v.estimated_savings,
        avg_bid_deduct: v.avg_bid_deduct,
    }))
}

/// 预警 CSV
pub fn alerts_csv(alerts: &[Alert]) -> ApiResult<String> {
    write_csv(alerts.iter().map(|a| AlertRow {
        alert_type: a.alert_type.to_string(),
        priority: a.priority.to_string(),
        program_id: &a.program_id,
        message: &a.message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AlertType;

    #[test]
    fn test_alerts_csv_has_header_and_rows() {
        let alerts = vec![Alert {
            alert_type: AlertType::Deadline,
            priority: AlertPriority::High,
            message: "Metro Office Complex payroll report is 11 days overdue".to_string(),
            program_id: "WU-2026-002".to_string(),
        }];
        let csv = alerts_csv(&alerts).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("type,priority,program_id,message"));
        assert_eq!(
            lines.next(),
            Some("deadline,high,WU-2026-002,Metro Office Complex payroll report is 11 days overdue")
        );
    }

    #[test]
    fn test_empty_csv_is_empty() {
        assert_eq!(alerts_csv(&[]).unwrap(), "");
    }
}
