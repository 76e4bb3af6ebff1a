// ==========================================
// OCIP/CCIP 合规评分系统 - 节省金额测算
// ==========================================
// 公式: contract_value * bid_deduct_pct / 100
// 缺失值按 0 处理; 计算内不取整, 展示层自行截断
// ==========================================

/// 预计节省金额
pub fn estimated_savings(contract_value: Option<f64>, bid_deduct_pct: Option<f64>) -> f64 {
    contract_value.unwrap_or(0.0) * bid_deduct_pct.unwrap_or(0.0) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_program_savings() {
        let savings = estimated_savings(Some(2_850_000.0), Some(3.5));
        assert!((savings - 99_750.0).abs() < 1e-6);
        assert_eq!(savings as i64, 99_750);
    }

    #[test]
    fn test_zero_or_missing_inputs() {
        assert_eq!(estimated_savings(Some(0.0), Some(4.2)), 0.0);
        assert_eq!(estimated_savings(Some(1_650_000.0), Some(0.0)), 0.0);
        assert_eq!(estimated_savings(None, Some(4.2)), 0.0);
        assert_eq!(estimated_savings(Some(1_650_000.0), None), 0.0);
    }

    #[test]
    fn test_no_rounding() {
        assert!((estimated_savings(Some(1_000.0), Some(3.333)) - 33.33).abs() < 1e-9);
    }
}
