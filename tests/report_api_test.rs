// ==========================================
// ReportApi 集成测试
// ==========================================
// 测试目标: 周报 / 截止期检查 / 财务汇总 (演示数据, 固定基准日)
// ==========================================


use std::sync::Arc;

use test_helpers::{date, reference_date};
use wrapup_compliance::api::{ApiError, ReportApi};
use wrapup_compliance::config::{config_keys, ConfigManager, EngineConfig};
use wrapup_compliance::domain::types::{AlertPriority, AlertType};
use wrapup_compliance::logging;
use wrapup_compliance::repository::SqliteDataSource;

fn demo_report_api() -> (tempfile::NamedTempFile, ReportApi) {
    let (temp_file, _db_path, conn) = test_helpers::create_demo_db();
    let api = ReportApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
    );
    (temp_file, api)
}

fn score_of(report: &wrapup_compliance::api::WeeklyReport, id: &str) -> u8 {
    report
        .programs
        .iter()
        .find(|m| m.program.id == id)
        .map(|m| m.compliance_score)
        .unwrap()
}

// ==========================================
// 周报
// ==========================================

#[test]
fn test_weekly_report_on_demo_data() {
    logging::init_test();
    let (_temp_file, api) = demo_report_api();

    let report = api.weekly_report(reference_date()).unwrap();

    assert_eq!(report.report_date, reference_date());
    assert_eq!(report.summary.total_programs, 4);
    assert_eq!(report.summary.active_programs, 3);
    assert_eq!(report.summary.avg_compliance_score, 64.0);
    assert_eq!(report.summary.total_estimated_savings as i64, 452_650);

    // 仅按状态计逾期
    assert_eq!(score_of(&report, "WU-2026-001"), 100);
    assert_eq!(score_of(&report, "WU-2026-002"), 15);
    assert_eq!(score_of(&report, "WU-2026-003"), 65);
    assert_eq!(score_of(&report, "WU-2026-004"), 76);

    let issue_ids: Vec<_> = report
        .compliance_issues
        .iter()
        .map(|m| m.program.id.as_str())
        .collect();
    assert_eq!(issue_ids, vec!["WU-2026-003", "WU-2026-002"]);

    // 已逾期的也计入临近截止
    let upcoming: Vec<_> = report
        .upcoming_deadlines
        .iter()
        .map(|d| (d.program_id.as_str(), d.days_until))
        .collect();
    assert_eq!(upcoming, vec![("WU-2026-002", -11), ("WU-2026-001", 3)]);

    // 低合规 + 紧急截止 + 高价值风险
    assert_eq!(report.recommendations.len(), 3);
}

#[test]
fn test_weekly_report_status_only_ignores_past_due_pending() {
    let (_temp_file, api) = demo_report_api();

    // 03-15 与 03-20 的 pending 申报已过期, 但周报口径不扣分
    let report = api.weekly_report(date(2026, 3, 25)).unwrap();
    assert_eq!(score_of(&report, "WU-2026-001"), 100);
    assert_eq!(score_of(&report, "WU-2026-004"), 76);
}

#[test]
fn test_weekly_report_respects_configured_counting() {
    let (_temp_file, db_path, conn) = test_helpers::create_demo_db();
    test_helpers::set_config(
        &conn.lock().unwrap(),
        config_keys::REPORT_OVERDUE_COUNTING,
        "status_and_past_due",
    );
    let config = ConfigManager::new(&db_path).unwrap().load_engine_config().unwrap();

    let api = ReportApi::new(Arc::new(SqliteDataSource::from_connection(conn)), config);
    let report = api.weekly_report(date(2026, 3, 25)).unwrap();
    assert_eq!(score_of(&report, "WU-2026-001"), 85);
    assert_eq!(score_of(&report, "WU-2026-004"), 61);
}

#[test]
fn test_weekly_report_on_empty_store() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let api = ReportApi::new(
        Arc::new(SqliteDataSource::from_connection(test_helpers::open_shared(&db_path))),
        EngineConfig::default(),
    );

    let report = api.weekly_report(reference_date()).unwrap();
    assert_eq!(report.summary.total_programs, 0);
    assert_eq!(report.summary.avg_compliance_score, 0.0);
    assert!(report.compliance_issues.is_empty());
    assert_eq!(report.recommendations.len(), 1);
}

#[test]
fn test_unavailable_store_is_an_error() {
    let temp_file = tempfile::NamedTempFile::new().unwrap();
    let conn = test_helpers::open_shared(temp_file.path().to_str().unwrap());
    let api = ReportApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
    );

    assert!(matches!(
        api.weekly_report(reference_date()),
        Err(ApiError::StoreUnavailable(_))
    ));
}

// ==========================================
// 截止期检查
// ==========================================

#[test]
fn test_check_deadlines_window_and_priorities() {
    logging::init_test();
    let (_temp_file, api) = demo_report_api();

    let check = api.check_deadlines(reference_date()).unwrap();
    let items: Vec<_> = check
        .alerts
        .iter()
        .map(|a| (a.program_id.as_str(), a.due_date, a.days_until, a.priority))
        .collect();

    // 03-01 已逾期不在窗口内; 04 月份的申报超出 14 天
    assert_eq!(
        items,
        vec![
            ("WU-2026-001", date(2026, 3, 15), 3, AlertPriority::Medium),
            ("WU-2026-004", date(2026, 3, 20), 8, AlertPriority::Low),
        ]
    );
    assert!(check.alerts.iter().all(|a| a.alert_type == AlertType::Deadline));
    assert_eq!(check.summary.total_alerts, 2);
    assert_eq!(check.summary.critical, 0);
    assert_eq!(check.summary.high, 0);
    assert_eq!(check.summary.medium, 1);
}

#[test]
fn test_check_deadlines_due_within_two_days_is_high() {
    let (_temp_file, api) = demo_report_api();

    let check = api.check_deadlines(date(2026, 3, 13)).unwrap();
    assert_eq!(check.alerts[0].program_id, "WU-2026-001");
    assert_eq!(check.alerts[0].days_until, 2);
    assert_eq!(check.alerts[0].priority, AlertPriority::High);
    assert_eq!(check.summary.high, 1);
}

#[test]
fn test_check_deadlines_skips_orphan_reports() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared(&db_path);
    test_helpers::insert_payroll(&conn.lock().unwrap(), "NO-SUCH-PROGRAM", "2026-03-14", "pending");

    let api = ReportApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
    );
    let check = api.check_deadlines(reference_date()).unwrap();
    assert!(check.alerts.is_empty());
    assert_eq!(check.summary.total_alerts, 0);
}

// ==========================================
// 财务汇总
// ==========================================

#[test]
fn test_financial_summary() {
    let (_temp_file, api) = demo_report_api();

    let summary = api.financial_summary(reference_date()).unwrap();
    assert_eq!(summary.totals.total_programs, 4);
    assert_eq!(summary.totals.total_contract_value, 11_800_000.0);
    assert_eq!(summary.totals.total_estimated_savings as i64, 452_650);
    assert!((summary.totals.savings_percentage - 3.836).abs() < 0.001);

    let ocip = &summary.by_program_type["OCIP"];
    assert_eq!(ocip.count, 3);
    assert_eq!(ocip.contract_value, 10_150_000.0);
    assert!((ocip.avg_bid_deduct - 3.7667).abs() < 0.001);
    assert_eq!(summary.by_program_type["CCIP"].count, 1);

    let top: Vec<_> = summary
        .top_programs
        .iter()
        .map(|m| m.program.id.as_str())
        .collect();
    assert_eq!(
        top,
        vec!["WU-2026-003", "WU-2026-004", "WU-2026-001", "WU-2026-002"]
    );
}

#[test]
fn test_financial_summary_on_empty_store() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let api = ReportApi::new(
        Arc::new(SqliteDataSource::from_connection(test_helpers::open_shared(&db_path))),
        EngineConfig::default(),
    );

    let summary = api.financial_summary(reference_date()).unwrap();
    assert_eq!(summary.totals.savings_percentage, 0.0);
    assert!(summary.by_program_type.is_empty());
    assert!(summary.top_programs.is_empty());
}
