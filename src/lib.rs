// ==========================================
// OCIP/CCIP 合规评分系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 统保项目合规评分与预警 (只读登记系统数据, 输出报表与看板文件)
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 评分 / 截止期 / 预警 / 汇总
pub mod engine;

// 配置层 - 引擎参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 演示数据
pub mod demo;

// 日志系统
pub mod logging;

// 性能埋点
pub mod perf;

// 国际化
pub mod i18n;

// API 层 - 业务接口
pub mod api;

// 应用层 - 命令行集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AlertPriority, AlertType, DocumentStatus, EnrollmentStatus, PayrollStatus, ProgramType,
};

// 领域实体
pub use domain::{Alert, EnrollmentDocument, PayrollReport, Program, ProgramMetrics};

// 引擎
pub use engine::{AlertGenerator, ComplianceScoringEngine, OverdueCounting, ProgramMetricsEngine};

// 数据源
pub use repository::{ComplianceDataSource, ComplianceSnapshot, SqliteDataSource};

// API
pub use api::{ApiError, ApiResult, DashboardSyncApi, ReportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "OCIP/CCIP Wrap-up Compliance";
