// ==========================================
// OCIP/CCIP 合规评分系统 - 演示数据
// ==========================================
// 职责: 在找不到登记系统数据库时, 写入一套固定演示数据
// 数据: 4 个项目 / 7 份工资申报 / 10 份登记文件
// ==========================================

use rusqlite::{params, Connection};

use crate::db::ensure_schema;

/// (id, 项目名称, 地址, 类型, 登记状态, 投标扣减%, 合同额, 预计完工, 联系人, 邮箱)
const DEMO_PROGRAMS: [(&str, &str, &str, &str, &str, f64, f64, &str, &str, &str); 4] = [
    (
        "WU-2026-001",
        "Riverside Development Phase II",
        "1245 Riverside Dr, Dallas TX",
        "OCIP",
        "enrolled",
        3.5,
        2_850_000.0,
        "2026-08-15",
        "Sarah Chen",
        "s.chen@riverside.com",
    ),
    (
        "WU-2026-002",
        "Metro Office Complex",
        "890 Metro Blvd, Phoenix AZ",
        "CCIP",
        "pending",
        4.2,
        1_650_000.0,
        "2026-06-30",
        "Mike Rodriguez",
        "mrodriguez@metroffice.com",
    ),
    (
        "WU-2026-003",
        "Industrial Park Expansion",
        "3400 Industrial Way, Seattle WA",
        "OCIP",
        "active",
        3.8,
        4_200_000.0,
        "2026-12-15",
        "Jennifer Walsh",
        "j.walsh@indpark.com",
    ),
    (
        "WU-2026-004",
        "Healthcare Campus",
        "720 Medical Center Dr, Denver CO",
        "OCIP",
        "enrolled",
        4.0,
        3_100_000.0,
        "2026-10-30",
        "David Kumar",
        "d.kumar@healthcampus.org",
    ),
];

/// (项目, 截止日, 状态, 工资额, 提交日)
const DEMO_PAYROLL_REPORTS: [(&str, &str, &str, f64, Option<&str>); 7] = [
    ("WU-2026-001", "2026-03-15", "pending", 125_000.0, None),
    ("WU-2026-001", "2026-04-15", "pending", 0.0, None),
    ("WU-2026-002", "2026-03-01", "overdue", 85_000.0, None),
    ("WU-2026-003", "2026-03-10", "submitted", 180_000.0, Some("2026-03-08")),
    ("WU-2026-003", "2026-04-10", "pending", 0.0, None),
    ("WU-2026-004", "2026-03-20", "pending", 95_000.0, None),
    ("WU-2026-004", "2026-04-20", "pending", 0.0, None),
];

/// (项目, 文件类型, 状态, 提交日)
const DEMO_ENROLLMENT_DOCS: [(&str, &str, &str, Option<&str>); 10] = [
    ("WU-2026-001", "enrollment_form", "completed", Some("2026-01-15")),
    ("WU-2026-001", "insurance_verification", "completed", Some("2026-01-18")),
    ("WU-2026-001", "loss_history", "completed", Some("2026-01-20")),
    ("WU-2026-002", "enrollment_form", "pending", None),
    ("WU-2026-002", "insurance_verification", "not_started", None),
    ("WU-2026-003", "enrollment_form", "completed", Some("2026-02-01")),
    ("WU-2026-003", "waiver_request", "pending", None),
    ("WU-2026-004", "enrollment_form", "completed", Some("2026-02-10")),
    ("WU-2026-004", "insurance_verification", "completed", Some("2026-02-12")),
    ("WU-2026-004", "loss_history", "pending", None),
];

/// 写入条数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DemoSeedCounts {
    pub programs: usize,
    pub payroll_reports: usize,
    pub enrollment_docs: usize,
}

/// 建表并写入演示数据 (单事务)
///
/// 项目按主键覆盖写入; 申报与文件表先清空对应项目的旧记录再写入, 重复调用结果一致。
pub fn seed_demo_data(conn: &Connection) -> rusqlite::Result<DemoSeedCounts> {
    ensure_schema(conn)?;
    let tx = conn.unchecked_transaction()?;

    for (id, name, address, program_type, status, pct, value, completion, contact, email) in
        DEMO_PROGRAMS
    {
        tx.execute(
            "INSERT OR REPLACE INTO programs
             (id, project_name, project_address, program_type, enrollment_status,
              bid_deduct_pct, contract_value, estimated_completion, contact_name, contact_email)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![id, name, address, program_type, status, pct, value, completion, contact, email],
        )?;
        tx.execute("DELETE FROM payroll_reports WHERE program_id = ?1", params![id])?;
        tx.execute("DELETE FROM enrollment_docs WHERE program_id = ?1", params![id])?;
    }

    for (program_id, due_date, status, amount, submitted) in DEMO_PAYROLL_REPORTS {
        tx.execute(
            "INSERT INTO payroll_reports (program_id, due_date, status, payroll_amount, submitted_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![program_id, due_date, status, amount, submitted],
        )?;
    }

    for (program_id, document_type, status, submitted) in DEMO_ENROLLMENT_DOCS {
        tx.execute(
            "INSERT INTO enrollment_docs (program_id, document_type, status, submitted_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![program_id, document_type, status, submitted],
        )?;
    }

    tx.commit()?;

    let counts = DemoSeedCounts {
        programs: DEMO_PROGRAMS.len(),
        payroll_reports: DEMO_PAYROLL_REPORTS.len(),
        enrollment_docs: DEMO_ENROLLMENT_DOCS.len(),
    };
    tracing::info!(?counts, "演示数据写入完成");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_seed_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        let counts = seed_demo_data(&conn).unwrap();
        assert_eq!(counts.programs, 4);

        seed_demo_data(&conn).unwrap();
        assert_eq!(count(&conn, "programs"), 4);
        assert_eq!(count(&conn, "payroll_reports"), 7);
        assert_eq!(count(&conn, "enrollment_docs"), 10);
    }
}
