// ==========================================
// OCIP/CCIP 合规评分系统 - 预警生成引擎
// ==========================================
// 职责: 将项目派生指标转换为分类、分级的预警
// 规则: 声明式规则表, 固定顺序逐条评估, 规则之间相互独立
// ==========================================
// | 规则                 | 条件                              | 类型       | 优先级 |
// |----------------------|-----------------------------------|------------|--------|
// | deadline_overdue     | days_until < 0                    | deadline   | high   |
// | deadline_due_soon    | 0 <= days_until <= 3              | deadline   | high   |
// | deadline_upcoming    | 4 <= days_until <= 7              | deadline   | medium |
// | compliance_critical  | score < 40                        | compliance | high   |
// | compliance_warning   | 40 <= score < 60                  | compliance | medium |
// | high_value_at_risk   | contract > 3,000,000 且 score < 80 | financial  | medium |
// ==========================================

use crate::domain::metrics::{Alert, ProgramMetrics};
use crate::domain::types::{AlertPriority, AlertType};
use crate::i18n::{format_thousands, t_with_args};
use chrono::NaiveDate;

pub const DUE_SOON_DAYS: i64 = 3;
pub const UPCOMING_DAYS: i64 = 7;
pub const COMPLIANCE_CRITICAL_BELOW: u8 = 40;
pub const COMPLIANCE_WARNING_BELOW: u8 = 60;
pub const HIGH_VALUE_CONTRACT: f64 = 3_000_000.0;
pub const HIGH_VALUE_SCORE_BELOW: u8 = 80;

// ==========================================
// RuleContext - 规则评估上下文
// ==========================================
pub struct RuleContext<'a> {
    pub metrics: &'a ProgramMetrics,
    /// 距离下一截止日天数 (无截止日为 None)
    pub days_until: Option<i64>,
}

impl<'a> RuleContext<'a> {
    pub fn new(metrics: &'a ProgramMetrics, as_of: NaiveDate) -> Self {
        Self {
            metrics,
            days_until: metrics.days_until_deadline(as_of),
        }
    }

    fn name(&self) -> &str {
        &self.metrics.program.project_name
    }

    fn score(&self) -> u8 {
        self.metrics.compliance_score
    }

    fn deadline_label(&self) -> String {
        self.metrics
            .next_deadline
            .map(|d| d.format("%B %d").to_string())
            .unwrap_or_default()
    }
}

// ==========================================
// AlertRule - 声明式规则
// ==========================================
#[derive(Clone, Copy)]
pub struct AlertRule {
    pub id: &'static str,
    pub alert_type: AlertType,
    pub priority: AlertPriority,
    pub condition: fn(&RuleContext<'_>) -> bool,
    pub message: fn(&RuleContext<'_>) -> String,
}

impl std::fmt::Debug for AlertRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertRule")
            .field("id", &self.id)
            .field("alert_type", &self.alert_type)
            .field("priority", &self.priority)
            .finish()
    }
}

impl AlertRule {
    /// 评估单条规则
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Alert> {
        if !(self.condition)(ctx) {
            return None;
        }
        Some(Alert {
            alert_type: self.alert_type,
            priority: self.priority,
            message: (self.message)(ctx),
            program_id: ctx.metrics.program.id.clone(),
        })
    }
}

/// 默认规则表 (评估顺序即表顺序)
pub const DEFAULT_RULES: [AlertRule; 6] = [
    AlertRule {
        id: "deadline_overdue",
        alert_type: AlertType::Deadline,
        priority: AlertPriority::High,
        condition: |ctx| matches!(ctx.days_until, Some(d) if d < 0),
        message: |ctx| {
            let days = ctx.days_until.unwrap_or(0).abs().to_string();
            t_with_args("alert.deadline_overdue", &[("name", ctx.name()), ("days", &days)])
        },
    },
    AlertRule {
        id: "deadline_due_soon",
        alert_type: AlertType::Deadline,
        priority: AlertPriority::High,
        condition: |ctx| matches!(ctx.days_until, Some(d) if (0..=DUE_SOON_DAYS).contains(&d)),
        message: |ctx| {
            let days = ctx.days_until.unwrap_or(0).to_string();
            let date = ctx.deadline_label();
            t_with_args(
                "alert.deadline_due_soon",
                &[("name", ctx.name()), ("days", &days), ("date", &date)],
            )
        },
    },
    AlertRule {
        id: "deadline_upcoming",
        alert_type: AlertType::Deadline,
        priority: AlertPriority::Medium,
        condition: |ctx| {
            matches!(ctx.days_until, Some(d) if (DUE_SOON_DAYS + 1..=UPCOMING_DAYS).contains(&d))
        },
        message: |ctx| {
            let days = ctx.days_until.unwrap_or(0).to_string();
            let date = ctx.deadline_label();
            t_with_args(
                "alert.deadline_upcoming",
                &[("name", ctx.name()), ("days", &days), ("date", &date)],
            )
        },
    },
    AlertRule {
        id: "compliance_critical",
        alert_type: AlertType::Compliance,
        priority: AlertPriority::High,
        condition: |ctx| ctx.score() < COMPLIANCE_CRITICAL_BELOW,
        message: |ctx| t_with_args("alert.compliance_critical", &[("name", ctx.name())]),
    },
    AlertRule {
        id: "compliance_warning",
        alert_type: AlertType::Compliance,
        priority: AlertPriority::Medium,
        condition: |ctx| {
            (COMPLIANCE_CRITICAL_BELOW..COMPLIANCE_WARNING_BELOW).contains(&ctx.score())
        },
        message: |ctx| t_with_args("alert.compliance_warning", &[("name", ctx.name())]),
    },
    AlertRule {
        id: "high_value_at_risk",
        alert_type: AlertType::Financial,
        priority: AlertPriority::Medium,
        condition: |ctx| {
            ctx.metrics.program.contract_value_or_zero() > HIGH_VALUE_CONTRACT
                && ctx.score() < HIGH_VALUE_SCORE_BELOW
        },
        message: |ctx| {
            let amount = format_thousands(ctx.metrics.program.contract_value_or_zero());
            let score = ctx.score().to_string();
            t_with_args(
                "alert.high_value_at_risk",
                &[("name", ctx.name()), ("amount", &amount), ("score", &score)],
            )
        },
    },
];

// ==========================================
// AlertGenerator - 预警生成器
// ==========================================
#[derive(Debug, Clone)]
pub struct AlertGenerator {
    rules: Vec<AlertRule>,
}

impl AlertGenerator {
    /// 使用默认规则表
    pub fn new() -> Self {
        Self::with_rules(DEFAULT_RULES.to_vec())
    }

    /// 使用自定义规则表
    pub fn with_rules(rules: Vec<AlertRule>) -> Self {
        Self { rules }
    }

    /// 生成预警
    ///
    /// # 参数
    /// - `programs`: 项目派生指标 (输出顺序与输入一致)
    /// - `as_of`: 计算基准日
    ///
    /// # 返回
    /// 预警列表; 同一项目可触发零到多条
    pub fn generate(&self, programs: &[ProgramMetrics], as_of: NaiveDate) -> Vec<Alert> {
        let alerts: Vec<Alert> = programs
            .iter()
            .flat_map(|metrics| self.evaluate_program(metrics, as_of))
            .collect();

        tracing::debug!(
            programs = programs.len(),
            alerts = alerts.len(),
            "预警生成完成"
        );
        alerts
    }

    /// 单项目预警
    pub fn evaluate_program(&self, metrics: &ProgramMetrics, as_of: NaiveDate) -> Vec<Alert> {
        let ctx = RuleContext::new(metrics, as_of);
        self.rules
            .iter()
            .filter_map(|rule| rule.evaluate(&ctx))
            .collect()
    }
}

impl Default for AlertGenerator {
    fn default() -> Self {
        Self::new()
    }
}
