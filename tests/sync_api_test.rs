// ==========================================
// DashboardSyncApi 集成测试
// ==========================================
// 测试目标: 看板状态文档 / 单项目明细 / 全量同步落盘
// ==========================================


use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use test_helpers::reference_date;
use wrapup_compliance::api::{ApiError, DashboardSyncApi, DASHBOARD_FILE_NAME};
use wrapup_compliance::config::EngineConfig;
use wrapup_compliance::domain::types::{DocumentStatus, PayrollStatus};
use wrapup_compliance::domain::{EnrollmentDocument, PayrollReport, Program};
use wrapup_compliance::logging;
use wrapup_compliance::repository::{
    ComplianceDataSource, ComplianceSnapshot, RepositoryResult, SqliteDataSource,
};

fn demo_sync_api() -> (tempfile::NamedTempFile, TempDir, DashboardSyncApi) {
    let (temp_file, _db_path, conn) = test_helpers::create_demo_db();
    let web_root = TempDir::new().unwrap();
    let api = DashboardSyncApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
        web_root.path(),
    );
    (temp_file, web_root, api)
}

fn sync_api_over(conn: Arc<std::sync::Mutex<rusqlite::Connection>>) -> (TempDir, DashboardSyncApi) {
    let web_root = TempDir::new().unwrap();
    let api = DashboardSyncApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
        web_root.path(),
    );
    (web_root, api)
}

/// 记录项目列表读取次数的数据源
struct CountingSource {
    inner: ComplianceSnapshot,
    program_loads: Arc<AtomicUsize>,
}

impl ComplianceDataSource for CountingSource {
    fn programs(&self, program_id: Option<&str>) -> RepositoryResult<Vec<Program>> {
        self.program_loads.fetch_add(1, Ordering::SeqCst);
        self.inner.programs(program_id)
    }

    fn payroll_reports(&self, program_id: Option<&str>) -> RepositoryResult<Vec<PayrollReport>> {
        self.inner.payroll_reports(program_id)
    }

    fn enrollment_documents(
        &self,
        program_id: Option<&str>,
    ) -> RepositoryResult<Vec<EnrollmentDocument>> {
        self.inner.enrollment_documents(program_id)
    }
}

// ==========================================
// 看板状态
// ==========================================

#[test]
fn test_build_dashboard_summary() {
    logging::init_test();
    let (_temp_file, _web_root, api) = demo_sync_api();
    let synced_at = Utc.with_ymd_and_hms(2026, 3, 12, 9, 0, 0).unwrap();

    let dashboard = api.build_dashboard(reference_date(), synced_at).unwrap();

    assert_eq!(dashboard.last_sync, synced_at);
    assert_eq!(dashboard.programs.len(), 4);
    assert_eq!(dashboard.alerts.len(), 5);

    let summary = &dashboard.summary;
    assert_eq!(summary.total_programs, 4);
    assert_eq!(summary.active_programs, 3);
    assert_eq!(summary.pending_enrollment, 1);
    assert_eq!(summary.upcoming_deadlines, 3);
    assert_eq!(summary.total_contract_value, 11_800_000);
    assert_eq!(summary.estimated_total_savings, 452_650);
    assert_eq!(summary.avg_compliance_score, 64);

    // enrolled 展示为 active
    let riverside = dashboard
        .programs
        .iter()
        .find(|p| p.program.id == "WU-2026-001")
        .unwrap();
    assert_eq!(riverside.status, "active");
    assert_eq!(riverside.estimated_savings, 99_750);
    assert_eq!(riverside.payroll_due, Some(test_helpers::date(2026, 3, 15)));
    assert_eq!(riverside.last_updated, synced_at);
}

#[test]
fn test_each_build_gets_a_new_sync_id() {
    let (_temp_file, _web_root, api) = demo_sync_api();
    let first = api.build_dashboard(reference_date(), Utc::now()).unwrap();
    let second = api.build_dashboard(reference_date(), Utc::now()).unwrap();
    assert_ne!(first.sync_id, second.sync_id);
}

#[test]
fn test_sync_dashboard_writes_status_document() {
    logging::init_test();
    let (_temp_file, web_root, api) = demo_sync_api();

    let dashboard = api.sync_dashboard(reference_date()).unwrap();

    let path = web_root.path().join("api").join(DASHBOARD_FILE_NAME);
    assert_eq!(api.dashboard_path(), path);
    let body = fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();

    for key in ["programs", "summary", "alerts", "last_sync", "sync_id"] {
        assert!(json.get(key).is_some(), "缺少字段 {}", key);
    }
    assert_eq!(json["sync_id"], dashboard.sync_id.as_str());
    assert_eq!(json["summary"]["estimated_total_savings"], 452_650);

    // 项目字段平铺, 预警类型字段名为 type
    let first = &json["programs"][0];
    assert_eq!(first["id"], "WU-2026-004");
    assert_eq!(first["project_name"], "Healthcare Campus");
    assert_eq!(first["compliance_score"], 76);
    assert_eq!(first["payroll_due"], "2026-03-20");
    assert_eq!(json["alerts"][0]["type"], "financial");
    assert_eq!(json["alerts"][0]["priority"], "medium");
}

#[test]
fn test_generate_alerts_writes_nothing() {
    let (_temp_file, web_root, api) = demo_sync_api();

    let alerts = api.generate_alerts(reference_date()).unwrap();
    assert_eq!(alerts.len(), 5);
    assert!(!web_root.path().join("api").exists());
}

#[test]
fn test_sync_into_unwritable_root_fails() {
    let (_temp_file, _db_path, conn) = test_helpers::create_demo_db();
    let blocker = tempfile::NamedTempFile::new().unwrap();

    // web 根目录是普通文件, 无法创建 api/ 目录
    let api = DashboardSyncApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
        blocker.path(),
    );
    assert!(matches!(
        api.sync_dashboard(reference_date()),
        Err(ApiError::OutputWriteError { .. })
    ));
}

// ==========================================
// 单项目明细
// ==========================================

#[test]
fn test_program_detail() {
    let (_temp_file, _web_root, api) = demo_sync_api();

    let detail = api
        .program_detail("WU-2026-004", reference_date())
        .unwrap()
        .unwrap();

    assert_eq!(detail.program.project_name, "Healthcare Campus");
    assert_eq!(detail.compliance_score, 76);

    let due_dates: Vec<_> = detail
        .payroll_reports
        .iter()
        .map(|r| r.due_date.as_str())
        .collect();
    assert_eq!(due_dates, vec!["2026-04-20", "2026-03-20"]);
    assert!(detail
        .payroll_reports
        .iter()
        .all(|r| r.status == PayrollStatus::Pending));

    let doc_types: Vec<_> = detail
        .enrollment_docs
        .iter()
        .map(|d| d.document_type.as_str())
        .collect();
    assert_eq!(
        doc_types,
        vec!["enrollment_form", "insurance_verification", "loss_history"]
    );
}

#[test]
fn test_program_detail_unknown_id() {
    let (_temp_file, _web_root, api) = demo_sync_api();
    assert!(api
        .program_detail("WU-2026-404", reference_date())
        .unwrap()
        .is_none());
}

// ==========================================
// 全量同步
// ==========================================

#[test]
fn test_full_sync_writes_detail_files() {
    logging::init_test();
    let (_temp_file, web_root, api) = demo_sync_api();

    let result = api.full_sync(reference_date()).unwrap();

    assert!(api.dashboard_path().exists());
    assert_eq!(result.detail_files.len(), 4);
    for id in ["WU-2026-001", "WU-2026-002", "WU-2026-003", "WU-2026-004"] {
        let path = web_root
            .path()
            .join("api")
            .join("programs")
            .join(format!("{}.json", id));
        assert!(path.exists(), "缺少明细文件 {}", id);
    }

    let body = fs::read_to_string(api.program_detail_path("WU-2026-002")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["id"], "WU-2026-002");
    assert_eq!(json["compliance_score"], 15);
    assert_eq!(json["payroll_reports"][0]["status"], "overdue");
    assert_eq!(json["enrollment_docs"].as_array().unwrap().len(), 2);
}

#[test]
fn test_full_sync_skips_unsafe_program_ids() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared(&db_path);
    {
        let c = conn.lock().unwrap();
        test_helpers::insert_program(&c, "A-1", "Alpha", "OCIP", "enrolled", 3.0, 1_000_000.0);
        test_helpers::insert_program(&c, "../escape", "Beta", "OCIP", "enrolled", 3.0, 1_000_000.0);
    }
    let web_root = TempDir::new().unwrap();
    let api = DashboardSyncApi::new(
        Arc::new(SqliteDataSource::from_connection(conn)),
        EngineConfig::default(),
        web_root.path(),
    );

    let result = api.full_sync(reference_date()).unwrap();
    assert_eq!(result.dashboard.programs.len(), 2);
    assert_eq!(result.detail_files.len(), 1);
    assert!(!web_root.path().join("api").join("escape.json").exists());
}

#[test]
fn test_full_sync_reads_the_source_once() {
    let (_temp_file, _db_path, conn) = test_helpers::create_demo_db();
    let demo = ComplianceSnapshot::load(&SqliteDataSource::from_connection(conn), None).unwrap();
    let program_loads = Arc::new(AtomicUsize::new(0));
    let web_root = TempDir::new().unwrap();
    let api = DashboardSyncApi::new(
        Arc::new(CountingSource {
            inner: demo,
            program_loads: program_loads.clone(),
        }),
        EngineConfig::default(),
        web_root.path(),
    );

    let result = api.full_sync(reference_date()).unwrap();
    assert_eq!(result.detail_files.len(), 4);
    assert_eq!(program_loads.load(Ordering::SeqCst), 1);

    // 明细与看板口径一致
    let body = fs::read_to_string(api.program_detail_path("WU-2026-004")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["compliance_score"], 76);
    assert_eq!(json["payroll_reports"][0]["due_date"], "2026-04-20");
}

// ==========================================
// 未识别的状态
// ==========================================

#[test]
fn test_unrecognised_payroll_status_is_not_a_deadline() {
    logging::init_test();
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared(&db_path);
    {
        let c = conn.lock().unwrap();
        test_helpers::insert_program(&c, "C-1", "Closed Yard", "OCIP", "enrolled", 3.0, 1_000_000.0);
        test_helpers::insert_payroll(&c, "C-1", "2026-03-01", "cancelled");
    }
    let (_web_root, api) = sync_api_over(conn);

    let result = api.full_sync(reference_date()).unwrap();
    let program = &result.dashboard.programs[0];
    assert_eq!(program.payroll_due, None);
    assert_eq!(program.compliance_score, 80);
    assert!(result.dashboard.alerts.is_empty());
    assert_eq!(result.dashboard.summary.upcoming_deadlines, 0);

    // 明细中保留原始状态
    let body = fs::read_to_string(api.program_detail_path("C-1")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["payroll_reports"][0]["status"], "cancelled");
}

#[test]
fn test_document_status_match_is_case_sensitive() {
    let (_temp_file, db_path) = test_helpers::create_test_db().unwrap();
    let conn = test_helpers::open_shared(&db_path);
    {
        let c = conn.lock().unwrap();
        test_helpers::insert_program(&c, "D-1", "Dock Annex", "CCIP", "active", 2.0, 500_000.0);
        test_helpers::insert_doc(&c, "D-1", "enrollment_form", "completed");
        test_helpers::insert_doc(&c, "D-1", "loss_history", "Completed");
    }
    let (_web_root, api) = sync_api_over(conn);

    let detail = api.program_detail("D-1", reference_date()).unwrap().unwrap();
    // 1/2 完成: 35 + 30
    assert_eq!(detail.compliance_score, 65);
    assert_eq!(
        detail.enrollment_docs[1].status,
        DocumentStatus::Other("Completed".to_string())
    );
}
