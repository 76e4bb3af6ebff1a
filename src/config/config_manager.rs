// ==========================================
// OCIP/CCIP 合规评分系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope, 仅使用 global)
// 缺表或缺键一律回落默认值; 值格式错误返回 ConfigError
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection, table_exists};
use crate::engine::aggregate::RecommendationPolicy;
use crate::engine::compliance::OverdueCounting;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use thiserror::Error;

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 周报
    pub const ISSUE_SCORE_THRESHOLD: &str = "report.issue_score_threshold";
    pub const UPCOMING_WINDOW_DAYS: &str = "report.upcoming_window_days";
    pub const URGENT_WINDOW_DAYS: &str = "report.urgent_window_days";
    pub const HIGH_VALUE_THRESHOLD: &str = "report.high_value_threshold";
    pub const TOP_PROGRAMS_LIMIT: &str = "report.top_programs_limit";

    // 截止期检查
    pub const DEADLINE_CHECK_HORIZON_DAYS: &str = "deadline_check.horizon_days";

    // 看板同步
    pub const SYNC_UPCOMING_HORIZON_DAYS: &str = "sync.upcoming_horizon_days";

    // 逾期计数口径
    pub const REPORT_OVERDUE_COUNTING: &str = "scoring.report_overdue_counting";
    pub const SYNC_OVERDUE_COUNTING: &str = "scoring.sync_overdue_counting";

    pub const ALL: [&str; 9] = [
        ISSUE_SCORE_THRESHOLD,
        UPCOMING_WINDOW_DAYS,
        URGENT_WINDOW_DAYS,
        HIGH_VALUE_THRESHOLD,
        TOP_PROGRAMS_LIMIT,
        DEADLINE_CHECK_HORIZON_DAYS,
        SYNC_UPCOMING_HORIZON_DAYS,
        REPORT_OVERDUE_COUNTING,
        SYNC_OVERDUE_COUNTING,
    ];
}

// ==========================================
// ConfigError - 配置错误
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值格式错误: {key} = {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("未知配置键: {0}")]
    UnknownKey(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// EngineConfig - 引擎参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub issue_score_threshold: u8,
    pub upcoming_window_days: i64,
    pub urgent_window_days: i64,
    pub high_value_threshold: f64,
    pub top_programs_limit: usize,
    pub deadline_check_horizon_days: i64,
    pub sync_upcoming_horizon_days: i64,
    pub report_overdue_counting: OverdueCounting,
    pub sync_overdue_counting: OverdueCounting,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            issue_score_threshold: 70,
            upcoming_window_days: 7,
            urgent_window_days: 3,
            high_value_threshold: 2_000_000.0,
            top_programs_limit: 5,
            deadline_check_horizon_days: 14,
            sync_upcoming_horizon_days: 14,
            report_overdue_counting: OverdueCounting::StatusOnly,
            sync_overdue_counting: OverdueCounting::StatusAndPastDue,
        }
    }
}

impl EngineConfig {
    /// 周报建议参数
    pub fn recommendation_policy(&self) -> RecommendationPolicy {
        RecommendationPolicy {
            issue_score_threshold: self.issue_score_threshold,
            urgent_window_days: self.urgent_window_days,
            high_value_threshold: self.high_value_threshold,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在 (或 config_kv 表不存在)
    pub fn get_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;
        if !table_exists(&conn, "config_kv")? {
            return Ok(None);
        }

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 写入配置值 (UPSERT, global scope)
    ///
    /// 写入前按键校验格式, 未知键或格式错误直接拒绝
    pub fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_value(key, value)?;

        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取全部 global 配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut snapshot = BTreeMap::new();
        if !table_exists(&conn, "config_kv")? {
            return Ok(snapshot);
        }

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 加载引擎参数 (缺失项取默认值)
    pub fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        use config_keys::*;

        let defaults = EngineConfig::default();
        let config = EngineConfig {
            issue_score_threshold: self
                .get_parsed(ISSUE_SCORE_THRESHOLD)?
                .unwrap_or(defaults.issue_score_threshold),
            upcoming_window_days: self
                .get_parsed(UPCOMING_WINDOW_DAYS)?
                .unwrap_or(defaults.upcoming_window_days),
            urgent_window_days: self
                .get_parsed(URGENT_WINDOW_DAYS)?
                .unwrap_or(defaults.urgent_window_days),
            high_value_threshold: self
                .get_parsed(HIGH_VALUE_THRESHOLD)?
                .unwrap_or(defaults.high_value_threshold),
            top_programs_limit: self
                .get_parsed(TOP_PROGRAMS_LIMIT)?
                .unwrap_or(defaults.top_programs_limit),
            deadline_check_horizon_days: self
                .get_parsed(DEADLINE_CHECK_HORIZON_DAYS)?
                .unwrap_or(defaults.deadline_check_horizon_days),
            sync_upcoming_horizon_days: self
                .get_parsed(SYNC_UPCOMING_HORIZON_DAYS)?
                .unwrap_or(defaults.sync_upcoming_horizon_days),
            report_overdue_counting: self
                .get_counting(REPORT_OVERDUE_COUNTING)?
                .unwrap_or(defaults.report_overdue_counting),
            sync_overdue_counting: self
                .get_counting(SYNC_OVERDUE_COUNTING)?
                .unwrap_or(defaults.sync_overdue_counting),
        };

        tracing::debug!(?config, "引擎参数已加载");
        Ok(config)
    }

    fn get_parsed<T: FromStr>(&self, key: &str) -> ConfigResult<Option<T>> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(raw) => parse_value::<T>(key, &raw).map(Some),
        }
    }

    fn get_counting(&self, key: &str) -> ConfigResult<Option<OverdueCounting>> {
        match self.get_value(key)? {
            None => Ok(None),
            Some(raw) => OverdueCounting::from_str(&raw)
                .map(Some)
                .ok_or(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw,
                }),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// 按键校验配置值格式
fn validate_value(key: &str, value: &str) -> ConfigResult<()> {
    use config_keys::*;

    match key {
        ISSUE_SCORE_THRESHOLD => parse_value::<u8>(key, value).map(|_| ()),
        UPCOMING_WINDOW_DAYS
        | URGENT_WINDOW_DAYS
        | DEADLINE_CHECK_HORIZON_DAYS
        | SYNC_UPCOMING_HORIZON_DAYS => parse_value::<i64>(key, value).map(|_| ()),
        HIGH_VALUE_THRESHOLD => parse_value::<f64>(key, value).map(|_| ()),
        TOP_PROGRAMS_LIMIT => parse_value::<usize>(key, value).map(|_| ()),
        REPORT_OVERDUE_COUNTING | SYNC_OVERDUE_COUNTING => OverdueCounting::from_str(value)
            .map(|_| ())
            .ok_or(ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        _ => Err(ConfigError::UnknownKey(key.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_schema;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = manager().load_engine_config().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.issue_score_threshold, 70);
        assert_eq!(config.report_overdue_counting, OverdueCounting::StatusOnly);
        assert_eq!(config.sync_overdue_counting, OverdueCounting::StatusAndPastDue);
    }

    #[test]
    fn test_defaults_without_config_table() {
        let conn = Connection::open_in_memory().unwrap();
        let mgr = ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        assert_eq!(mgr.load_engine_config().unwrap(), EngineConfig::default());
        assert!(mgr.get_config_snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_set_value_overrides_default() {
        let mgr = manager();
        mgr.set_value(config_keys::ISSUE_SCORE_THRESHOLD, "80").unwrap();
        mgr.set_value(config_keys::REPORT_OVERDUE_COUNTING, "strict").unwrap();
        mgr.set_value(config_keys::ISSUE_SCORE_THRESHOLD, "75").unwrap();

        let config = mgr.load_engine_config().unwrap();
        assert_eq!(config.issue_score_threshold, 75);
        assert_eq!(config.report_overdue_counting, OverdueCounting::StatusAndPastDue);
        assert_eq!(mgr.get_config_snapshot().unwrap().len(), 2);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mgr = manager();
        assert!(matches!(
            mgr.set_value(config_keys::TOP_PROGRAMS_LIMIT, "five"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            mgr.set_value("report.unknown", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_malformed_stored_value_is_error() {
        let mgr = manager();
        {
            let conn = mgr.get_conn().unwrap();
            conn.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, 'abc')",
                params![config_keys::UPCOMING_WINDOW_DAYS],
            )
            .unwrap();
        }

        match mgr.load_engine_config() {
            Err(ConfigError::InvalidValue { key, .. }) => {
                assert_eq!(key, config_keys::UPCOMING_WINDOW_DAYS)
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }
}
