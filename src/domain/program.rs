// ==========================================
// OCIP/CCIP 合规评分系统 - 统保项目领域模型
// ==========================================
// 对齐: programs / payroll_reports / enrollment_docs 三张表
// 红线: 引擎只读, 不修改任何记录
// ==========================================

use crate::domain::types::{DocumentStatus, EnrollmentStatus, PayrollStatus, ProgramType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 日期存储格式 (与数据库一致)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ==========================================
// Program - 统保项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    // ===== 主键 =====
    pub id: String, // 项目编号, 如 WU-2026-001

    // ===== 基本信息 =====
    pub project_name: String,
    pub project_address: Option<String>,
    pub program_type: ProgramType,
    pub enrollment_status: EnrollmentStatus,

    // ===== 财务 =====
    pub bid_deduct_pct: Option<f64>, // 投标扣减比例 (0-100)
    pub contract_value: Option<f64>, // 合同金额

    // ===== 进度与联系人 =====
    pub estimated_completion: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
}

impl Program {
    /// 创建最小字段的项目记录
    pub fn new(id: &str, project_name: &str, program_type: ProgramType) -> Self {
        Self {
            id: id.to_string(),
            project_name: project_name.to_string(),
            project_address: None,
            program_type,
            enrollment_status: EnrollmentStatus::Pending,
            bid_deduct_pct: None,
            contract_value: None,
            estimated_completion: None,
            contact_name: None,
            contact_email: None,
        }
    }

    /// 合同金额 (缺失按 0)
    pub fn contract_value_or_zero(&self) -> f64 {
        self.contract_value.unwrap_or(0.0)
    }

    /// 投标扣减比例 (缺失按 0)
    pub fn bid_deduct_pct_or_zero(&self) -> f64 {
        self.bid_deduct_pct.unwrap_or(0.0)
    }
}

// ==========================================
// EnrollmentDocument - 登记文件
// ==========================================
// 每个项目多份, 实际上 (program_id, document_type) 唯一
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentDocument {
    pub program_id: String,
    pub document_type: String, // 自由分类, 如 enrollment_form
    pub status: DocumentStatus,
    pub submitted_date: Option<String>,
}

impl EnrollmentDocument {
    pub fn new(program_id: &str, document_type: &str, status: DocumentStatus) -> Self {
        Self {
            program_id: program_id.to_string(),
            document_type: document_type.to_string(),
            status,
            submitted_date: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == DocumentStatus::Completed
    }
}

// ==========================================
// PayrollReport - 工资申报
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollReport {
    pub id: i64,
    pub program_id: String,
    /// 原始截止日期字符串 (YYYY-MM-DD), 可能格式错误
    pub due_date: String,
    pub status: PayrollStatus,
    /// 申报金额 (未知时可能为 0 或空)
    pub payroll_amount: Option<f64>,
    pub submitted_date: Option<String>,
}

impl PayrollReport {
    pub fn new(id: i64, program_id: &str, due_date: &str, status: PayrollStatus) -> Self {
        Self {
            id,
            program_id: program_id.to_string(),
            due_date: due_date.to_string(),
            status,
            payroll_amount: None,
            submitted_date: None,
        }
    }

    /// 解析截止日期
    ///
    /// # 返回
    /// - Some(NaiveDate): 格式正确
    /// - None: 格式错误 (调用方跳过该记录)
    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.due_date.trim(), DATE_FORMAT).ok()
    }
}
