// ==========================================
// OCIP/CCIP 合规评分系统 - 汇总与建议
// ==========================================
// 职责: 基于 Vec<ProgramMetrics> 的纯折叠计算
// - 周报汇总 / 合规问题 / 临近截止 / 建议
// - 按项目类型分组 / 节省金额排行
// - 看板汇总 / 截止期分级
// 约束: 除以 0 一律返回 0, 不报错
// ==========================================

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::metrics::ProgramMetrics;
use crate::domain::types::{AlertPriority, EnrollmentStatus};
use crate::engine::deadline::days_until;
use crate::i18n::t_with_args;

// ==========================================
// 输出结构
// ==========================================

/// 周报汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_programs: usize,
    pub active_programs: usize,
    /// 平均合规分 (保留 1 位小数, 无项目时为 0)
    pub avg_compliance_score: f64,
    pub total_contract_value: f64,
    pub total_estimated_savings: f64,
}

/// 临近截止条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingDeadline {
    pub program_id: String,
    pub program: String,
    pub deadline: NaiveDate,
    pub days_until: i64,
}

/// 按项目类型分组的财务统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramTypeBreakdown {
    pub count: usize,
    pub contract_value: f64,
    pub estimated_savings: f64,
    pub avg_bid_deduct: f64,
}

/// 财务总计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTotals {
    pub total_programs: usize,
    pub total_contract_value: f64,
    pub total_estimated_savings: f64,
    /// 节省金额占合同总额百分比 (合同总额为 0 时为 0)
    pub savings_percentage: f64,
}

/// 看板汇总 (金额与平均分为整数)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_programs: usize,
    pub active_programs: usize,
    pub pending_enrollment: usize,
    pub upcoming_deadlines: usize,
    pub total_contract_value: i64,
    pub estimated_total_savings: i64,
    pub avg_compliance_score: i64,
}

/// 建议生成参数
#[derive(Debug, Clone, Copy)]
pub struct RecommendationPolicy {
    pub issue_score_threshold: u8,
    pub urgent_window_days: i64,
    pub high_value_threshold: f64,
}

// ==========================================
// 周报
// ==========================================

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// 平均合规分 (无项目时为 0)
pub fn average_score(metrics: &[ProgramMetrics]) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }
    let total: f64 = metrics.iter().map(|m| f64::from(m.compliance_score)).sum();
    total / metrics.len() as f64
}

/// 周报汇总
pub fn summarize(metrics: &[ProgramMetrics]) -> ReportSummary {
    ReportSummary {
        total_programs: metrics.len(),
        active_programs: metrics
            .iter()
            .filter(|m| m.program.enrollment_status.is_active())
            .count(),
        avg_compliance_score: round1(average_score(metrics)),
        total_contract_value: metrics.iter().map(|m| m.program.contract_value_or_zero()).sum(),
        total_estimated_savings: metrics.iter().map(|m| m.estimated_savings).sum(),
    }
}

/// 合规分低于阈值的项目
pub fn compliance_issues(metrics: &[ProgramMetrics], threshold: u8) -> Vec<ProgramMetrics> {
    metrics
        .iter()
        .filter(|m| m.compliance_score < threshold)
        .cloned()
        .collect()
}

/// 临近截止的项目 (days_until <= window_days, 含已逾期)
pub fn upcoming_deadlines(
    metrics: &[ProgramMetrics],
    as_of: NaiveDate,
    window_days: i64,
) -> Vec<UpcomingDeadline> {
    metrics
        .iter()
        .filter_map(|m| {
            let deadline = m.next_deadline?;
            let days = days_until(deadline, as_of);
            (days <= window_days).then(|| UpcomingDeadline {
                program_id: m.program.id.clone(),
                program: m.program.project_name.clone(),
                deadline,
                days_until: days,
            })
        })
        .collect()
}

/// 生成建议
///
/// 触发顺序: 低合规 → 紧急截止 → 高价值风险; 均未触发时输出"一切正常"
pub fn recommendations(
    issues: &[ProgramMetrics],
    deadlines: &[UpcomingDeadline],
    policy: &RecommendationPolicy,
) -> Vec<String> {
    let mut out = Vec::new();

    if !issues.is_empty() {
        out.push(t_with_args(
            "recommendation.low_compliance",
            &[
                ("count", &issues.len().to_string()),
                ("threshold", &policy.issue_score_threshold.to_string()),
            ],
        ));
    }

    let urgent = deadlines
        .iter()
        .filter(|d| d.days_until <= policy.urgent_window_days)
        .count();
    if urgent > 0 {
        out.push(t_with_args(
            "recommendation.urgent_deadlines",
            &[
                ("count", &urgent.to_string()),
                ("days", &policy.urgent_window_days.to_string()),
            ],
        ));
    }

    let high_value_at_risk = issues
        .iter()
        .any(|m| m.program.contract_value_or_zero() > policy.high_value_threshold);
    if high_value_at_risk {
        out.push(t_with_args("recommendation.high_value_at_risk", &[]));
    }

    if out.is_empty() {
        out.push(t_with_args("recommendation.all_clear", &[]));
    }

    out
}

// ==========================================
// 财务
// ==========================================

/// 按项目类型分组
pub fn group_by_program_type(metrics: &[ProgramMetrics]) -> BTreeMap<String, ProgramTypeBreakdown> {
    let mut groups: BTreeMap<String, (ProgramTypeBreakdown, f64)> = BTreeMap::new();

    for m in metrics {
        let (entry, deduct_total) = groups
            .entry(m.program.program_type.to_string())
            .or_default();
        entry.count += 1;
        entry.contract_value += m.program.contract_value_or_zero();
        entry.estimated_savings += m.estimated_savings;
        *deduct_total += m.program.bid_deduct_pct_or_zero();
    }

    groups
        .into_iter()
        .map(|(key, (mut breakdown, deduct_total))| {
            if breakdown.count > 0 {
                breakdown.avg_bid_deduct = deduct_total / breakdown.count as f64;
            }
            (key, breakdown)
        })
        .collect()
}

/// 财务总计
pub fn financial_totals(metrics: &[ProgramMetrics]) -> FinancialTotals {
    let total_contract_value: f64 = metrics.iter().map(|m| m.program.contract_value_or_zero()).sum();
    let total_estimated_savings: f64 = metrics.iter().map(|m| m.estimated_savings).sum();
    let savings_percentage = if total_contract_value > 0.0 {
        total_estimated_savings / total_contract_value * 100.0
    } else {
        0.0
    };

    FinancialTotals {
        total_programs: metrics.len(),
        total_contract_value,
        total_estimated_savings,
        savings_percentage,
    }
}

/// 节省金额前 N 的项目 (降序, 同额保持输入顺序)
pub fn top_by_savings(metrics: &[ProgramMetrics], limit: usize) -> Vec<ProgramMetrics> {
    let mut sorted = metrics.to_vec();
    sorted.sort_by(|a, b| b.estimated_savings.total_cmp(&a.estimated_savings));
    sorted.truncate(limit);
    sorted
}

// ==========================================
// 看板
// ==========================================

/// 看板汇总
///
/// 平均分只统计合规分大于 0 的项目; 临近截止统计 days_until <= horizon_days (含已逾期)
pub fn dashboard_summary(
    metrics: &[ProgramMetrics],
    as_of: NaiveDate,
    horizon_days: i64,
) -> DashboardSummary {
    let scored: Vec<f64> = metrics
        .iter()
        .filter(|m| m.compliance_score > 0)
        .map(|m| f64::from(m.compliance_score))
        .collect();
    let avg_compliance_score = if scored.is_empty() {
        0
    } else {
        (scored.iter().sum::<f64>() / scored.len() as f64) as i64
    };

    DashboardSummary {
        total_programs: metrics.len(),
        active_programs: metrics
            .iter()
            .filter(|m| m.program.enrollment_status.display_status() == "active")
            .count(),
        pending_enrollment: metrics
            .iter()
            .filter(|m| m.program.enrollment_status == EnrollmentStatus::Pending)
            .count(),
        upcoming_deadlines: metrics
            .iter()
            .filter_map(|m| m.days_until_deadline(as_of))
            .filter(|days| *days <= horizon_days)
            .count(),
        total_contract_value: metrics
            .iter()
            .map(|m| m.program.contract_value_or_zero())
            .sum::<f64>() as i64,
        estimated_total_savings: metrics.iter().map(|m| m.estimated_savings as i64).sum(),
        avg_compliance_score,
    }
}

// ==========================================
// 截止期分级 (截止期检查)
// ==========================================

/// 截止期检查的优先级
///
/// - < 0: critical
/// - 0..=2: high
/// - 3..=7: medium
/// - > 7: low
pub fn classify_deadline(days_until: i64) -> AlertPriority {
    match days_until {
        d if d < 0 => AlertPriority::Critical,
        0..=2 => AlertPriority::High,
        3..=7 => AlertPriority::Medium,
        _ => AlertPriority::Low,
    }
}
