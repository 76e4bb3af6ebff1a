// ==========================================
// OCIP/CCIP 合规评分系统 - 派生指标与预警
// ==========================================
// 说明: 以下对象均为计算结果, 不落库
// ==========================================

use crate::domain::program::Program;
use crate::domain::types::{AlertPriority, AlertType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ProgramMetrics - 单项目派生指标
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramMetrics {
    #[serde(flatten)]
    pub program: Program,

    /// 合规分 (0-100)
    pub compliance_score: u8,

    /// 最近未结申报截止日 (无则为空)
    pub next_deadline: Option<NaiveDate>,

    /// 预计节省金额 (未取整)
    pub estimated_savings: f64,
}

impl ProgramMetrics {
    /// 距离截止日天数 (负数表示已逾期)
    pub fn days_until_deadline(&self, as_of: NaiveDate) -> Option<i64> {
        self.next_deadline.map(|d| (d - as_of).num_days())
    }
}

// ==========================================
// Alert - 预警
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub message: String,
    pub program_id: String,
}
