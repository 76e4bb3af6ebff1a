// ==========================================
// OCIP/CCIP 合规评分系统 - 合规评分引擎
// ==========================================
// 职责: 登记文件完成度 + 逾期申报扣分 → 0-100 合规分
// 输入: 单项目的登记文件与工资申报 + 计算基准日
// 输出: ScoreBreakdown (可解释的分项)
// ==========================================
// 公式:
//   doc_score = 50                         (无文件, 视为暂不要求)
//             = completed / total * 70     (有文件)
//   penalty   = 15 * (overdue + 已过期的 pending)
//   score     = clamp(doc_score + 30 - penalty, 0, 100) 取整
// ==========================================

use crate::domain::program::{EnrollmentDocument, PayrollReport};
use crate::domain::types::PayrollStatus;
use crate::repository::ComplianceSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 无登记文件时的中性文件分
pub const NEUTRAL_DOC_SCORE: f64 = 50.0;
/// 文件完成度满分
pub const DOC_SCORE_WEIGHT: f64 = 70.0;
/// 项目存在即获得的基础分
pub const BASELINE_CREDIT: f64 = 30.0;
/// 每份逾期申报扣分 (不封顶)
pub const OVERDUE_PENALTY: f64 = 15.0;

// ==========================================
// 逾期计数口径
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdueCounting {
    /// 仅统计 status = overdue
    StatusOnly,
    /// status = overdue, 另加 status = pending 且截止日已过
    ///
    /// 两部分不去重: 状态数据不一致时同一申报可能被计两次
    StatusAndPastDue,
}

impl OverdueCounting {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "status_only" => Some(OverdueCounting::StatusOnly),
            "status_and_past_due" | "strict" => Some(OverdueCounting::StatusAndPastDue),
            _ => None,
        }
    }
}

// ==========================================
// ScoreBreakdown - 评分分项
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub total_docs: usize,
    pub completed_docs: usize,
    pub overdue_reports: usize,
    pub past_due_pending_reports: usize,
    pub doc_score: f64,
    pub penalty: f64,
    pub raw_score: f64,
    /// 最终得分 (0-100)
    pub score: u8,
}

// ==========================================
// ComplianceScoringEngine - 合规评分引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct ComplianceScoringEngine {
    counting: OverdueCounting,
}

impl ComplianceScoringEngine {
    /// 构造函数
    ///
    /// # 参数
    /// - `counting`: 逾期计数口径
    pub fn new(counting: OverdueCounting) -> Self {
        Self { counting }
    }

    /// 计算单项目合规分
    ///
    /// # 参数
    /// - `documents`: 该项目的登记文件
    /// - `reports`: 该项目的工资申报
    /// - `as_of`: 计算基准日 (判断 pending 是否已过期)
    ///
    /// # 返回
    /// ScoreBreakdown, 无错误路径 (缺失数据按 0 计)
    pub fn score<'a, D, R>(&self, documents: D, reports: R, as_of: NaiveDate) -> ScoreBreakdown
    where
        D: IntoIterator<Item = &'a EnrollmentDocument>,
        R: IntoIterator<Item = &'a PayrollReport>,
    {
        // 1. 文件完成度
        let (total_docs, completed_docs) = documents
            .into_iter()
            .fold((0usize, 0usize), |(total, completed), doc| {
                (total + 1, completed + usize::from(doc.is_completed()))
            });

        let doc_score = if total_docs == 0 {
            NEUTRAL_DOC_SCORE
        } else {
            completed_docs as f64 / total_docs as f64 * DOC_SCORE_WEIGHT
        };

        // 2. 逾期申报
        let mut overdue_reports = 0;
        let mut past_due_pending_reports = 0;
        for report in reports {
            match report.status {
                PayrollStatus::Overdue => overdue_reports += 1,
                PayrollStatus::Pending if self.counting == OverdueCounting::StatusAndPastDue => {
                    match report.parsed_due_date() {
                        Some(due) if due < as_of => past_due_pending_reports += 1,
                        Some(_) => {}
                        None => tracing::warn!(
                            program_id = %report.program_id,
                            report_id = report.id,
                            due_date = %report.due_date,
                            "截止日期格式错误, 不参与逾期计数"
                        ),
                    }
                }
                _ => {}
            }
        }

        let penalty = (overdue_reports + past_due_pending_reports) as f64 * OVERDUE_PENALTY;

        // 3. 汇总并截断
        let raw_score = doc_score + BASELINE_CREDIT - penalty;
        let score = raw_score.clamp(0.0, 100.0) as u8;

        ScoreBreakdown {
            total_docs,
            completed_docs,
            overdue_reports,
            past_due_pending_reports,
            doc_score,
            penalty,
            raw_score,
            score,
        }
    }

    /// 按项目编号从快照计算合规分
    ///
    /// 未知项目按空集合计算 (不报错)
    pub fn score_program(
        &self,
        snapshot: &ComplianceSnapshot,
        program_id: &str,
        as_of: NaiveDate,
    ) -> u8 {
        let breakdown = self.score(
            snapshot.documents_for(program_id),
            snapshot.reports_for(program_id),
            as_of,
        );
        tracing::debug!(
            program_id,
            score = breakdown.score,
            doc_score = breakdown.doc_score,
            penalty = breakdown.penalty,
            "合规分计算完成"
        );
        breakdown.score
    }
}

impl Default for ComplianceScoringEngine {
    fn default() -> Self {
        Self::new(OverdueCounting::StatusAndPastDue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::DocumentStatus;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 12).unwrap()
    }

    fn docs(completed: usize, total: usize) -> Vec<EnrollmentDocument> {
        (0..total)
            .map(|i| {
                let status = if i < completed {
                    DocumentStatus::Completed
                } else {
                    DocumentStatus::Pending
                };
                EnrollmentDocument::new("P1", &format!("doc_{}", i), status)
            })
            .collect()
    }

    fn no_docs() -> Vec<EnrollmentDocument> {
        Vec::new()
    }

    fn no_reports() -> Vec<PayrollReport> {
        Vec::new()
    }

    fn overdue(n: usize) -> Vec<PayrollReport> {
        (0..n)
            .map(|i| PayrollReport::new(i as i64, "P1", "2026-02-01", PayrollStatus::Overdue))
            .collect()
    }

    #[test]
    fn test_all_documents_completed_scores_100() {
        let engine = ComplianceScoringEngine::default();
        let result = engine.score(&docs(3, 3), &no_reports(), as_of());
        assert_eq!(result.doc_score, 70.0);
        assert_eq!(result.raw_score, 100.0);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_nothing_completed_and_two_overdue_scores_zero() {
        let engine = ComplianceScoringEngine::default();
        let result = engine.score(&docs(0, 2), &overdue(2), as_of());
        assert_eq!(result.doc_score, 0.0);
        assert_eq!(result.penalty, 30.0);
        assert_eq!(result.raw_score, 0.0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_zero_documents_is_neutral() {
        let engine = ComplianceScoringEngine::default();
        let result = engine.score(&no_docs(), &no_reports(), as_of());
        assert_eq!(result.doc_score, 50.0);
        assert_eq!(result.score, 80);

        let penalized = engine.score(&no_docs(), &overdue(1), as_of());
        assert_eq!(penalized.doc_score, 50.0);
        assert_eq!(penalized.score, 65);
    }

    #[test]
    fn test_penalty_is_uncapped_and_clamped_at_zero() {
        let engine = ComplianceScoringEngine::default();
        let result = engine.score(&docs(3, 3), &overdue(7), as_of());
        assert!(result.raw_score < 0.0);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_fractional_score_is_truncated() {
        let engine = ComplianceScoringEngine::default();
        // 2/3 * 70 = 46.67 → 76.67 → 76
        let result = engine.score(&docs(2, 3), &no_reports(), as_of());
        assert_eq!(result.score, 76);
    }

    #[test]
    fn test_past_due_pending_counts_only_in_strict_mode() {
        let reports = vec![
            PayrollReport::new(1, "P1", "2026-03-01", PayrollStatus::Pending),
            PayrollReport::new(2, "P1", "2026-04-01", PayrollStatus::Pending),
            PayrollReport::new(3, "P1", "not-a-date", PayrollStatus::Pending),
        ];

        let strict = ComplianceScoringEngine::new(OverdueCounting::StatusAndPastDue);
        let result = strict.score(&docs(3, 3), &reports, as_of());
        assert_eq!(result.past_due_pending_reports, 1);
        assert_eq!(result.score, 85);

        let lenient = ComplianceScoringEngine::new(OverdueCounting::StatusOnly);
        assert_eq!(lenient.score(&docs(3, 3), &reports, as_of()).score, 100);
    }

    #[test]
    fn test_score_is_monotonic() {
        let engine = ComplianceScoringEngine::default();
        for overdue_count in 0..8 {
            let mut previous = 0;
            for completed in 0..=5 {
                let s = engine.score(&docs(completed, 5), &overdue(overdue_count), as_of()).score;
                assert!(s >= previous);
                assert!(s <= 100);
                previous = s;
            }
        }
        for completed in 0..=5 {
            let mut previous = 100;
            for overdue_count in 0..8 {
                let s = engine.score(&docs(completed, 5), &overdue(overdue_count), as_of()).score;
                assert!(s <= previous);
                previous = s;
            }
        }
    }

    #[test]
    fn test_overdue_counting_parse() {
        assert_eq!(
            OverdueCounting::from_str("status_only"),
            Some(OverdueCounting::StatusOnly)
        );
        assert_eq!(
            OverdueCounting::from_str("STRICT"),
            Some(OverdueCounting::StatusAndPastDue)
        );
        assert_eq!(OverdueCounting::from_str("lenient"), None);
    }
}
