// ==========================================
// OCIP/CCIP 合规评分系统 - 性能埋点
// ==========================================
// 职责: SQL 语句计数 / 慢 SQL 日志 / 报表与同步操作耗时
// 开关: WRAPUP_PERF_SQL=1 安装 SQLite trace/profile 回调
//       WRAPUP_SLOW_SQL_MS 慢 SQL 阈值 (默认 50)
//       WRAPUP_SLOW_OP_MS  慢操作阈值 (默认 2000, 0 关闭)
// ==========================================

use rusqlite::Connection;
use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub const PERF_SQL_ENV: &str = "WRAPUP_PERF_SQL";
pub const SLOW_SQL_MS_ENV: &str = "WRAPUP_SLOW_SQL_MS";
pub const SLOW_OP_MS_ENV: &str = "WRAPUP_SLOW_OP_MS";

static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(50);

// 计数按线程隔离: 一次报表调用在单线程内完成
thread_local! {
    static COUNTERS: Cell<Counters> = const { Cell::new(Counters::ZERO) };
}

#[derive(Debug, Clone, Copy)]
struct Counters {
    depth: u32,
    sql: u64,
    slow_sql: u64,
}

impl Counters {
    const ZERO: Counters = Counters {
        depth: 0,
        sql: 0,
        slow_sql: 0,
    };
}

fn update(f: impl FnOnce(&mut Counters)) {
    COUNTERS.with(|c| {
        let mut v = c.get();
        f(&mut v);
        c.set(v);
    });
}

fn current() -> Counters {
    COUNTERS.with(|c| c.get())
}

// ==========================================
// PerfSettings - 埋点开关
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfSettings {
    pub sql_tracing: bool,
    pub slow_sql_ms: u64,
    pub slow_op_ms: u64,
}

impl Default for PerfSettings {
    fn default() -> Self {
        Self {
            sql_tracing: false,
            slow_sql_ms: 50,
            slow_op_ms: 2000,
        }
    }
}

impl PerfSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sql_tracing: std::env::var(PERF_SQL_ENV)
                .map(|v| is_true(&v))
                .unwrap_or(defaults.sql_tracing),
            slow_sql_ms: env_millis(SLOW_SQL_MS_ENV).unwrap_or(defaults.slow_sql_ms),
            slow_op_ms: env_millis(SLOW_OP_MS_ENV).unwrap_or(defaults.slow_op_ms),
        }
    }
}

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_millis(name: &str) -> Option<u64> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.trim().replace('\n', " ");
    if s.chars().count() <= max_len {
        return s;
    }
    let head: String = s.chars().take(max_len).collect();
    format!("{}…", head)
}

// ==========================================
// SQLite 回调
// ==========================================

/// 按环境变量安装 SQL 埋点
pub fn install_sqlite_tracing(conn: &mut Connection) {
    install_sqlite_tracing_with(conn, PerfSettings::from_env());
}

/// 按给定开关安装 SQL 埋点 (关闭时移除已有回调)
pub fn install_sqlite_tracing_with(conn: &mut Connection, settings: PerfSettings) {
    if !settings.sql_tracing {
        conn.trace(None);
        conn.profile(None);
        return;
    }

    SLOW_SQL_THRESHOLD_MS.store(settings.slow_sql_ms, Ordering::Relaxed);
    conn.trace(Some(on_sql_statement));
    conn.profile(Some(on_sql_profile));
    tracing::debug!(slow_sql_ms = settings.slow_sql_ms, "SQL 埋点已开启");
}

fn on_sql_statement(_sql: &str) {
    update(|c| {
        if c.depth > 0 {
            c.sql = c.sql.saturating_add(1);
        }
    });
}

fn on_sql_profile(sql: &str, duration: Duration) {
    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold == 0 || ms < threshold {
        return;
    }

    tracing::warn!(
        target: "slow_sql",
        duration_ms = ms,
        sql = %truncate_sql(sql, 420),
        "慢 SQL"
    );
    update(|c| {
        if c.depth > 0 {
            c.slow_sql = c.slow_sql.saturating_add(1);
        }
    });
}

// ==========================================
// PerfGuard - 操作级统计
// ==========================================

/// 单次操作的统计快照
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfStats {
    pub elapsed_ms: u64,
    pub sql_count: u64,
    pub slow_sql_count: u64,
}

/// 操作耗时 Guard, 析构时输出 perf 日志
///
/// ```ignore
/// let _perf = PerfGuard::new("weekly_report");
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    base: Counters,
    slow_op_ms: u64,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self::with_slow_threshold(op, env_millis(SLOW_OP_MS_ENV).unwrap_or(2000))
    }

    pub fn with_slow_threshold(op: &'static str, slow_op_ms: u64) -> Self {
        update(|c| c.depth = c.depth.saturating_add(1));
        Self {
            op,
            start: Instant::now(),
            base: current(),
            slow_op_ms,
        }
    }

    /// 截至当前的统计
    pub fn stats(&self) -> PerfStats {
        let now = current();
        PerfStats {
            elapsed_ms: self.start.elapsed().as_millis() as u64,
            sql_count: now.sql.saturating_sub(self.base.sql),
            slow_sql_count: now.slow_sql.saturating_sub(self.base.slow_sql),
        }
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let stats = self.stats();

        if self.slow_op_ms > 0 && stats.elapsed_ms >= self.slow_op_ms {
            tracing::warn!(
                target: "perf",
                op = self.op,
                elapsed_ms = stats.elapsed_ms,
                sql_count = stats.sql_count,
                "操作耗时超过阈值"
            );
        } else {
            tracing::debug!(
                target: "perf",
                op = self.op,
                elapsed_ms = stats.elapsed_ms,
                sql_count = stats.sql_count,
                slow_sql_count = stats.slow_sql_count,
                "done"
            );
        }

        update(|c| c.depth = c.depth.saturating_sub(1));
    }
}
