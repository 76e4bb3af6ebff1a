// ==========================================
// OCIP/CCIP 合规评分系统 - 配置层
// ==========================================
// 职责: 引擎参数管理 (阈值 / 窗口 / 逾期计数口径)
// 存储: config_kv 表
// 环境变量: 数据库路径 / 看板输出根目录 / 语言
// ==========================================

pub mod config_manager;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult, EngineConfig};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "WRAPUP_DB_PATH";
/// 看板输出根目录环境变量
pub const WEB_ROOT_ENV: &str = "WRAPUP_WEB_ROOT";
/// 语言环境变量
pub const LOCALE_ENV: &str = "WRAPUP_LOCALE";

/// 看板输出根目录默认值
pub const DEFAULT_WEB_ROOT: &str = "web";

/// 读取非空环境变量
pub fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
