// ==========================================
// OCIP/CCIP 合规评分系统 - 看板同步 API
// ==========================================
// 职责: 生成看板状态文档 / 预警 / 单项目明细, 并写入 web 根目录
// 输出: <web_root>/api/wrapup-status.json
//       <web_root>/api/programs/<program_id>.json
// 口径: 逾期计数默认 状态 + 已过截止日的 pending (sync_overdue_counting)
// ==========================================

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::dto::{DashboardProgram, DashboardStatus, FullSyncResult, ProgramDetail};
use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::metrics::{Alert, ProgramMetrics};
use crate::engine::aggregate;
use crate::engine::alert::AlertGenerator;
use crate::engine::compliance::ComplianceScoringEngine;
use crate::engine::metrics::ProgramMetricsEngine;
use crate::perf::PerfGuard;
use crate::repository::{ComplianceDataSource, ComplianceSnapshot};

/// 看板状态文件名
pub const DASHBOARD_FILE_NAME: &str = "wrapup-status.json";

// ==========================================
// DashboardSyncApi - 看板同步 API
// ==========================================
pub struct DashboardSyncApi {
    source: Arc<dyn ComplianceDataSource>,
    config: EngineConfig,
    web_root: PathBuf,
    alert_generator: AlertGenerator,
}

impl DashboardSyncApi {
    /// 创建新的 DashboardSyncApi 实例
    ///
    /// # 参数
    /// - source: 只读数据源
    /// - config: 引擎参数
    /// - web_root: 看板输出根目录 (文件写入其下的 api/ 目录)
    pub fn new(
        source: Arc<dyn ComplianceDataSource>,
        config: EngineConfig,
        web_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            config,
            web_root: web_root.into(),
            alert_generator: AlertGenerator::new(),
        }
    }

    /// 替换预警规则集
    pub fn with_alert_generator(mut self, alert_generator: AlertGenerator) -> Self {
        self.alert_generator = alert_generator;
        self
    }

    /// api/ 输出目录
    pub fn api_dir(&self) -> PathBuf {
        self.web_root.join("api")
    }

    /// 看板状态文件路径
    pub fn dashboard_path(&self) -> PathBuf {
        self.api_dir().join(DASHBOARD_FILE_NAME)
    }

    /// 单项目明细文件路径
    pub fn program_detail_path(&self, program_id: &str) -> PathBuf {
        self.api_dir()
            .join("programs")
            .join(format!("{}.json", program_id))
    }

    fn scoring_engine(&self) -> ComplianceScoringEngine {
        ComplianceScoringEngine::new(self.config.sync_overdue_counting)
    }

    // ==========================================
    // 计算 (不落盘)
    // ==========================================

    fn load_snapshot(&self, program_id: Option<&str>) -> ApiResult<ComplianceSnapshot> {
        Ok(ComplianceSnapshot::load(self.source.as_ref(), program_id)?)
    }

    fn metrics_from(&self, snapshot: &ComplianceSnapshot, as_of: NaiveDate) -> Vec<ProgramMetrics> {
        let metrics = ProgramMetricsEngine::new(self.scoring_engine()).compute_all(snapshot, as_of);
        tracing::debug!(programs = metrics.len(), "项目指标计算完成");
        metrics
    }

    /// 全部项目的派生指标
    pub fn programs_data(&self, as_of: NaiveDate) -> ApiResult<Vec<ProgramMetrics>> {
        let snapshot = self.load_snapshot(None)?;
        Ok(self.metrics_from(&snapshot, as_of))
    }

    /// 仅生成预警
    pub fn generate_alerts(&self, as_of: NaiveDate) -> ApiResult<Vec<Alert>> {
        let _perf = PerfGuard::new("generate_alerts");
        let metrics = self.programs_data(as_of)?;
        let alerts = self.alert_generator.generate(&metrics, as_of);
        tracing::info!(%as_of, alerts = alerts.len(), "预警生成完成");
        Ok(alerts)
    }

    /// 组装看板状态文档
    pub fn build_dashboard(
        &self,
        as_of: NaiveDate,
        synced_at: DateTime<Utc>,
    ) -> ApiResult<DashboardStatus> {
        let snapshot = self.load_snapshot(None)?;
        Ok(self.dashboard_from(&snapshot, as_of, synced_at))
    }

    fn dashboard_from(
        &self,
        snapshot: &ComplianceSnapshot,
        as_of: NaiveDate,
        synced_at: DateTime<Utc>,
    ) -> DashboardStatus {
        let metrics = self.metrics_from(snapshot, as_of);
        let alerts = self.alert_generator.generate(&metrics, as_of);
        let summary =
            aggregate::dashboard_summary(&metrics, as_of, self.config.sync_upcoming_horizon_days);

        DashboardStatus {
            programs: metrics
                .iter()
                .map(|m| DashboardProgram::from_metrics(m, synced_at))
                .collect(),
            summary,
            alerts,
            last_sync: synced_at,
            sync_id: Uuid::new_v4().to_string(),
        }
    }

    /// 单项目明细
    ///
    /// # 返回
    /// - Ok(None): 项目不存在
    pub fn program_detail(
        &self,
        program_id: &str,
        as_of: NaiveDate,
    ) -> ApiResult<Option<ProgramDetail>> {
        let snapshot = self.load_snapshot(Some(program_id))?;
        let detail = self.detail_from(&snapshot, program_id, as_of);
        if detail.is_none() {
            tracing::debug!(program_id, "项目不存在");
        }
        Ok(detail)
    }

    /// 从快照组装单项目明细 (申报按截止日降序, 文件按类型排序)
    fn detail_from(
        &self,
        snapshot: &ComplianceSnapshot,
        program_id: &str,
        as_of: NaiveDate,
    ) -> Option<ProgramDetail> {
        let program = snapshot.find_program(program_id)?.clone();

        let compliance_score = self
            .scoring_engine()
            .score_program(snapshot, program_id, as_of);

        let mut payroll_reports: Vec<_> =
            snapshot.reports_for(program_id).into_iter().cloned().collect();
        payroll_reports.sort_by(|a, b| b.due_date.cmp(&a.due_date).then(a.id.cmp(&b.id)));

        let mut enrollment_docs: Vec<_> =
            snapshot.documents_for(program_id).into_iter().cloned().collect();
        enrollment_docs.sort_by(|a, b| a.document_type.cmp(&b.document_type));

        Some(ProgramDetail {
            program,
            compliance_score,
            payroll_reports,
            enrollment_docs,
        })
    }

    // ==========================================
    // 同步 (落盘)
    // ==========================================

    /// 同步看板状态文档
    pub fn sync_dashboard(&self, as_of: NaiveDate) -> ApiResult<DashboardStatus> {
        let _perf = PerfGuard::new("sync_dashboard");
        let snapshot = self.load_snapshot(None)?;
        let dashboard = self.dashboard_from(&snapshot, as_of, Utc::now());
        self.write_dashboard(&dashboard, as_of)?;
        Ok(dashboard)
    }

    fn write_dashboard(&self, dashboard: &DashboardStatus, as_of: NaiveDate) -> ApiResult<()> {
        let path = self.dashboard_path();
        write_json(&path, dashboard)?;

        tracing::info!(
            %as_of,
            programs = dashboard.programs.len(),
            alerts = dashboard.alerts.len(),
            sync_id = %dashboard.sync_id,
            path = %path.display(),
            "看板数据同步完成"
        );
        Ok(())
    }

    /// 全量同步: 看板状态 + 每个项目的明细文档
    ///
    /// 看板与明细基于同一份快照, 数据源只读取一次。
    pub fn full_sync(&self, as_of: NaiveDate) -> ApiResult<FullSyncResult> {
        let _perf = PerfGuard::new("full_sync");
        let snapshot = self.load_snapshot(None)?;
        let dashboard = self.dashboard_from(&snapshot, as_of, Utc::now());
        self.write_dashboard(&dashboard, as_of)?;

        let mut detail_files = Vec::with_capacity(dashboard.programs.len());
        for entry in &dashboard.programs {
            let program_id = &entry.program.id;
            if !is_safe_file_stem(program_id) {
                tracing::warn!(program_id = %program_id, "项目编号不能作为文件名, 跳过明细输出");
                continue;
            }

            if let Some(detail) = self.detail_from(&snapshot, program_id, as_of) {
                let path = self.program_detail_path(program_id);
                write_json(&path, &detail)?;
                detail_files.push(path.display().to_string());
            }
        }

        tracing::info!(
            programs = dashboard.programs.len(),
            details = detail_files.len(),
            "全量同步完成"
        );

        Ok(FullSyncResult {
            dashboard,
            detail_files,
        })
    }
}

fn is_safe_file_stem(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

/// 写入格式化 JSON (自动创建父目录)
fn write_json<T: Serialize>(path: &Path, value: &T) -> ApiResult<()> {
    let to_write_error = |source: std::io::Error| ApiError::OutputWriteError {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(to_write_error)?;
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).map_err(to_write_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_stem() {
        assert!(is_safe_file_stem("WU-2026-001"));
        assert!(!is_safe_file_stem("../etc"));
        assert!(!is_safe_file_stem("a/b"));
        assert!(!is_safe_file_stem(""));
        assert!(!is_safe_file_stem(".."));
    }
}
