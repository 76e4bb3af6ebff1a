// ==========================================
// OCIP/CCIP 合规评分系统 - 演示库重置工具
// ==========================================
// 用法: seed_demo_db [db_path]
// 已存在的库文件先备份为 <db_path>.bak.<时间戳> 再删除, 然后建表并写入演示数据
// ==========================================

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use wrapup_compliance::app::demo_db_path;
use wrapup_compliance::db::open_sqlite_connection;
use wrapup_compliance::demo::seed_demo_data;
use wrapup_compliance::logging::{self, LogFormat};

fn main() -> Result<()> {
    logging::init(LogFormat::from_env());

    let db_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| demo_db_path().to_string_lossy().to_string());

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)
        .with_context(|| format!("failed to open {}", db_path))?;
    let counts = seed_demo_data(&conn).context("failed to seed demo data")?;

    eprintln!(
        "Seeded {}: {} programs, {} payroll reports, {} enrollment docs",
        db_path, counts.programs, counts.payroll_reports, counts.enrollment_docs
    );
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<()> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path).with_context(|| format!("failed to back up {}", db_path))?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}
