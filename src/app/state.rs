// ==========================================
// OCIP/CCIP 合规评分系统 - 应用状态
// ==========================================
// 职责: 定位数据库 / 打开共享连接 / 加载配置 / 组装 API 实例
// 定位顺序: 显式路径 → WRAPUP_DB_PATH → 候选路径 → 临时目录演示库
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ApiError, ApiResult, DashboardSyncApi, ReportApi};
use crate::config::{env_value, ConfigManager, EngineConfig, DB_PATH_ENV};
use crate::db::{open_sqlite_connection, warn_on_schema_mismatch};
use crate::demo::seed_demo_data;
use crate::i18n::t_with_args;
use crate::repository::{ComplianceDataSource, SqliteDataSource};

/// 演示库文件名 (位于系统临时目录)
pub const DEMO_DB_FILE_NAME: &str = "wrapup_demo.db";

// ==========================================
// 数据库定位
// ==========================================

/// 数据库来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbSource {
    /// 命令行显式指定
    Explicit,
    /// WRAPUP_DB_PATH
    Environment,
    /// 候选路径命中
    Discovered,
    /// 未找到, 使用演示库
    Demo,
}

/// 定位结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDb {
    pub path: PathBuf,
    pub source: DbSource,
}

/// 登记系统数据库的候选路径 (按优先级)
pub fn candidate_db_paths() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from("/workspace/output/wrapup.db")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".openclaw/workspace/output/wrapup.db"));
    }
    candidates.push(PathBuf::from("../output/wrapup.db"));
    candidates
}

/// 演示库路径
pub fn demo_db_path() -> PathBuf {
    std::env::temp_dir().join(DEMO_DB_FILE_NAME)
}

/// 定位数据库
///
/// # 参数
/// - explicit: 命令行显式指定的路径
///
/// # 返回
/// - Err(ApiError::NotFound): 显式路径或环境变量指向的文件不存在
pub fn resolve_db_path(explicit: Option<&Path>) -> ApiResult<ResolvedDb> {
    resolve_db_path_from(explicit, env_value(DB_PATH_ENV), &candidate_db_paths())
}

fn resolve_db_path_from(
    explicit: Option<&Path>,
    env_path: Option<String>,
    candidates: &[PathBuf],
) -> ApiResult<ResolvedDb> {
    let required = explicit
        .map(|p| (p.to_path_buf(), DbSource::Explicit))
        .or_else(|| env_path.map(|p| (PathBuf::from(p), DbSource::Environment)));

    if let Some((path, source)) = required {
        if !path.exists() {
            let path = path.display().to_string();
            return Err(ApiError::NotFound(t_with_args(
                "common.db_not_found",
                &[("path", &path)],
            )));
        }
        return Ok(ResolvedDb { path, source });
    }

    if let Some(path) = candidates.iter().find(|p| p.exists()) {
        return Ok(ResolvedDb {
            path: path.clone(),
            source: DbSource::Discovered,
        });
    }

    Ok(ResolvedDb {
        path: demo_db_path(),
        source: DbSource::Demo,
    })
}

// ==========================================
// AppState - 应用状态
// ==========================================

/// 应用状态
///
/// 持有共享连接, 所有仓储与 API 实例共用同一连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 数据库来源
    pub db_source: DbSource,

    /// 引擎参数
    pub config: EngineConfig,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 只读数据源
    pub data_source: Arc<dyn ComplianceDataSource>,

    /// 报表API
    pub report_api: Arc<ReportApi>,

    /// 看板同步API
    pub sync_api: Arc<DashboardSyncApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - resolved: 数据库定位结果 (演示库会先写入演示数据)
    /// - web_root: 看板输出根目录
    pub fn new(resolved: ResolvedDb, web_root: impl Into<PathBuf>) -> ApiResult<Self> {
        let db_path = resolved.path.to_string_lossy().to_string();
        tracing::info!(db_path = %db_path, source = ?resolved.source, "初始化AppState");

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::DatabaseConnectionError(format!("{}: {}", db_path, e)))?;

        if resolved.source == DbSource::Demo {
            seed_demo_data(&conn)?;
            eprintln!("{}", t_with_args("common.demo_db_created", &[("path", &db_path)]));
        } else {
            warn_on_schema_mismatch(&conn);
        }

        Self::from_connection(db_path, resolved.source, Arc::new(Mutex::new(conn)), web_root)
    }

    /// 从已有连接组装 (测试使用)
    pub fn from_connection(
        db_path: String,
        db_source: DbSource,
        conn: Arc<Mutex<Connection>>,
        web_root: impl Into<PathBuf>,
    ) -> ApiResult<Self> {
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone())?);
        let config = config_manager.load_engine_config()?;

        let data_source: Arc<dyn ComplianceDataSource> =
            Arc::new(SqliteDataSource::from_connection(conn));

        let report_api = Arc::new(ReportApi::new(data_source.clone(), config.clone()));
        let sync_api = Arc::new(DashboardSyncApi::new(
            data_source.clone(),
            config.clone(),
            web_root,
        ));

        Ok(Self {
            db_path,
            db_source,
            config,
            config_manager,
            data_source,
            report_api,
            sync_api,
        })
    }
}
