// ==========================================
// OCIP/CCIP 合规评分系统 - 项目指标组合
// ==========================================
// 职责: 对快照中的每个项目计算 合规分 / 下一截止日 / 预计节省
// 输入: ComplianceSnapshot + 计算基准日
// 输出: Vec<ProgramMetrics> (顺序与快照项目顺序一致)
// ==========================================

use crate::domain::metrics::ProgramMetrics;
use crate::domain::program::Program;
use crate::engine::compliance::ComplianceScoringEngine;
use crate::engine::deadline::next_deadline;
use crate::engine::savings::estimated_savings;
use crate::repository::ComplianceSnapshot;
use chrono::NaiveDate;

pub struct ProgramMetricsEngine {
    scoring: ComplianceScoringEngine,
}

impl ProgramMetricsEngine {
    pub fn new(scoring: ComplianceScoringEngine) -> Self {
        Self { scoring }
    }

    /// 计算快照内全部项目的派生指标
    pub fn compute_all(&self, snapshot: &ComplianceSnapshot, as_of: NaiveDate) -> Vec<ProgramMetrics> {
        snapshot
            .programs
            .iter()
            .map(|program| self.compute(snapshot, program, as_of))
            .collect()
    }

    /// 计算单个项目的派生指标
    pub fn compute(
        &self,
        snapshot: &ComplianceSnapshot,
        program: &Program,
        as_of: NaiveDate,
    ) -> ProgramMetrics {
        ProgramMetrics {
            program: program.clone(),
            compliance_score: self.scoring.score_program(snapshot, &program.id, as_of),
            next_deadline: next_deadline(snapshot.reports_for(&program.id)),
            estimated_savings: estimated_savings(program.contract_value, program.bid_deduct_pct),
        }
    }
}
