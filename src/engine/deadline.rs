// ==========================================
// OCIP/CCIP 合规评分系统 - 截止期解析
// ==========================================
// 职责: 求单项目最近的未结申报截止日
// 口径: status ∈ {pending, overdue}, 取最小截止日
// 边界: 日期格式错误的记录跳过 (记录 warn), 无结果返回 None
// ==========================================

use crate::domain::program::PayrollReport;
use chrono::NaiveDate;

/// 最近未结申报截止日
///
/// 同一日期的多条记录之间不区分先后。
pub fn next_deadline<'a, R>(reports: R) -> Option<NaiveDate>
where
    R: IntoIterator<Item = &'a PayrollReport>,
{
    reports
        .into_iter()
        .filter(|r| r.status.is_outstanding())
        .filter_map(|r| {
            let parsed = r.parsed_due_date();
            if parsed.is_none() {
                tracing::warn!(
                    program_id = %r.program_id,
                    report_id = r.id,
                    due_date = %r.due_date,
                    "截止日期格式错误, 已跳过"
                );
            }
            parsed
        })
        .min()
}

/// 距离截止日的天数 (负数表示已逾期)
pub fn days_until(due: NaiveDate, as_of: NaiveDate) -> i64 {
    (due - as_of).num_days()
}
