// ==========================================
// OCIP/CCIP 合规评分系统 - 领域类型定义
// ==========================================
// 存储格式: 数据库中以小写字符串保存 (program_type 除外, 为大写)
// 解析策略: 申报/文件状态精确匹配, 未知值原样保留为 Other;
//           其余枚举容错解析, 未知值回落到 schema 默认值并记录 warn
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 项目类型 (Program Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProgramType {
    #[serde(rename = "OCIP")]
    Ocip, // 业主统保
    #[serde(rename = "CCIP")]
    Ccip, // 总包统保
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramType::Ocip => write!(f, "OCIP"),
            ProgramType::Ccip => write!(f, "CCIP"),
        }
    }
}

impl ProgramType {
    /// 从字符串解析项目类型
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "OCIP" => ProgramType::Ocip,
            "CCIP" => ProgramType::Ccip,
            other => {
                tracing::warn!(value = other, "未知项目类型, 按 OCIP 处理");
                ProgramType::Ocip // schema 默认值
            }
        }
    }
}

// ==========================================
// 投保登记状态 (Enrollment Status)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,  // 待登记
    Enrolled, // 已登记
    Active,   // 生效中
    #[serde(untagged)]
    Other(String), // 其他外部状态 (原样保留)
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrollmentStatus::Pending => write!(f, "pending"),
            EnrollmentStatus::Enrolled => write!(f, "enrolled"),
            EnrollmentStatus::Active => write!(f, "active"),
            EnrollmentStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl EnrollmentStatus {
    /// 从字符串解析登记状态
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "pending" => EnrollmentStatus::Pending,
            "enrolled" => EnrollmentStatus::Enrolled,
            "active" => EnrollmentStatus::Active,
            _ => EnrollmentStatus::Other(s.trim().to_string()),
        }
    }

    /// 是否计入"在保"项目 (enrolled 或 active)
    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Enrolled | EnrollmentStatus::Active)
    }

    /// 看板展示状态: enrolled 映射为 active, 其余原样输出
    pub fn display_status(&self) -> String {
        match self {
            EnrollmentStatus::Enrolled => "active".to_string(),
            other => other.to_string(),
        }
    }
}

// ==========================================
// 登记文件状态 (Document Status)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    NotStarted, // 未开始
    Pending,    // 处理中
    Completed,  // 已完成
    #[serde(untagged)]
    Other(String), // 未识别的外部状态 (原样保留, 不计为完成)
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentStatus::NotStarted => write!(f, "not_started"),
            DocumentStatus::Pending => write!(f, "pending"),
            DocumentStatus::Completed => write!(f, "completed"),
            DocumentStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl DocumentStatus {
    /// 从字符串解析文件状态 (精确匹配, 大小写敏感)
    pub fn from_str(s: &str) -> Self {
        match s {
            "not_started" => DocumentStatus::NotStarted,
            "pending" => DocumentStatus::Pending,
            "completed" => DocumentStatus::Completed,
            other => {
                tracing::warn!(value = other, "未知文件状态, 原样保留");
                DocumentStatus::Other(other.to_string())
            }
        }
    }
}

// ==========================================
// 工资申报状态 (Payroll Report Status)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayrollStatus {
    Pending,   // 待申报
    Overdue,   // 已逾期
    Submitted, // 已提交
    #[serde(untagged)]
    Other(String), // 未识别的外部状态 (如 cancelled), 不视为未结
}

impl fmt::Display for PayrollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayrollStatus::Pending => write!(f, "pending"),
            PayrollStatus::Overdue => write!(f, "overdue"),
            PayrollStatus::Submitted => write!(f, "submitted"),
            PayrollStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

impl PayrollStatus {
    /// 从字符串解析申报状态 (精确匹配, 大小写敏感)
    pub fn from_str(s: &str) -> Self {
        match s {
            "pending" => PayrollStatus::Pending,
            "overdue" => PayrollStatus::Overdue,
            "submitted" => PayrollStatus::Submitted,
            other => {
                tracing::warn!(value = other, "未知申报状态, 原样保留");
                PayrollStatus::Other(other.to_string())
            }
        }
    }

    /// 是否为未结申报 (仅 pending / overdue)
    pub fn is_outstanding(&self) -> bool {
        matches!(self, PayrollStatus::Pending | PayrollStatus::Overdue)
    }
}

// ==========================================
// 预警类型 (Alert Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Deadline,   // 截止期
    Compliance, // 合规
    Financial,  // 财务
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertType::Deadline => write!(f, "deadline"),
            AlertType::Compliance => write!(f, "compliance"),
            AlertType::Financial => write!(f, "financial"),
        }
    }
}

// ==========================================
// 预警优先级 (Alert Priority)
// ==========================================
// 顺序: Low < Medium < High < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertPriority::Low => write!(f, "low"),
            AlertPriority::Medium => write!(f, "medium"),
            AlertPriority::High => write!(f, "high"),
            AlertPriority::Critical => write!(f, "critical"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrollment_status_parsing() {
        assert_eq!(EnrollmentStatus::from_str("Enrolled"), EnrollmentStatus::Enrolled);
        assert_eq!(
            EnrollmentStatus::from_str("suspended"),
            EnrollmentStatus::Other("suspended".to_string())
        );
        assert!(EnrollmentStatus::Active.is_active());
        assert!(!EnrollmentStatus::Pending.is_active());
        assert_eq!(EnrollmentStatus::Enrolled.display_status(), "active");
        assert_eq!(EnrollmentStatus::Pending.display_status(), "pending");
    }

    #[test]
    fn test_status_fallbacks() {
        assert_eq!(ProgramType::from_str("ccip"), ProgramType::Ccip);
        assert_eq!(ProgramType::from_str("??"), ProgramType::Ocip);
        assert!(PayrollStatus::Overdue.is_outstanding());
        assert!(!PayrollStatus::Submitted.is_outstanding());
    }

    #[test]
    fn test_unknown_statuses_are_kept_verbatim() {
        let cancelled = PayrollStatus::from_str("cancelled");
        assert_eq!(cancelled, PayrollStatus::Other("cancelled".to_string()));
        assert!(!cancelled.is_outstanding());
        assert_eq!(cancelled.to_string(), "cancelled");

        // 大小写不同视为未知状态
        assert_eq!(
            PayrollStatus::from_str("Pending"),
            PayrollStatus::Other("Pending".to_string())
        );
        assert_eq!(
            DocumentStatus::from_str("Completed"),
            DocumentStatus::Other("Completed".to_string())
        );
        assert_eq!(
            serde_json::to_string(&PayrollStatus::Other("void".to_string())).unwrap(),
            "\"void\""
        );
        assert_eq!(
            serde_json::from_str::<PayrollStatus>("\"void\"").unwrap(),
            PayrollStatus::Other("void".to_string())
        );
        assert_eq!(
            serde_json::from_str::<PayrollStatus>("\"overdue\"").unwrap(),
            PayrollStatus::Overdue
        );
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(serde_json::to_string(&ProgramType::Ccip).unwrap(), "\"CCIP\"");
        assert_eq!(
            serde_json::to_string(&DocumentStatus::NotStarted).unwrap(),
            "\"not_started\""
        );
        assert_eq!(
            serde_json::to_string(&EnrollmentStatus::Other("closed".to_string())).unwrap(),
            "\"closed\""
        );
        assert!(AlertPriority::High > AlertPriority::Medium);
    }
}
