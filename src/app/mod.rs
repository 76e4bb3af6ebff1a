// ==========================================
// OCIP/CCIP 合规评分系统 - 应用层
// ==========================================
// 职责: 连接命令行与后端 (数据库定位 / API 组装 / 输出渲染)
// ==========================================

pub mod render;
pub mod state;

// 重导出
pub use render::OutputFormat;
pub use state::{
    candidate_db_paths, demo_db_path, resolve_db_path, AppState, DbSource,
    ResolvedDb,
};
