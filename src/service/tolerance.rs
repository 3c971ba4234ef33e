use crate::config::MatchingConfig;
use crate::models::Amounts;
use bigdecimal::BigDecimal;

/// 金额容差比较 (四列同时满足才算匹配)
#[derive(Debug, Clone, PartialEq)]
pub struct Tolerance {
    pub taxable: BigDecimal,
    pub tax: BigDecimal,
}

impl Tolerance {
    pub fn new(taxable: BigDecimal, tax: BigDecimal) -> Self {
        Self { taxable, tax }
    }

    pub fn from_config(config: &MatchingConfig) -> Self {
        Self::new(config.taxable_tolerance.clone(), config.tax_tolerance.clone())
    }

    pub fn matches(&self, a: &Amounts, b: &Amounts) -> bool {
        is_close(&a.taxable, &b.taxable, &self.taxable)
            && is_close(&a.igst, &b.igst, &self.tax)
            && is_close(&a.cgst, &b.cgst, &self.tax)
            && is_close(&a.sgst, &b.sgst, &self.tax)
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::from_config(&MatchingConfig::default())
    }
}

/// |a - b| <= tol
pub fn is_close(a: &BigDecimal, b: &BigDecimal, tol: &BigDecimal) -> bool {
    (a - b).abs() <= *tol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amounts(taxable: i64, igst: i64, cgst: i64, sgst: i64) -> Amounts {
        Amounts::new(
            BigDecimal::from(taxable),
            BigDecimal::from(igst),
            BigDecimal::from(cgst),
            BigDecimal::from(sgst),
        )
    }

    #[test]
    fn boundaries_are_inclusive() {
        let tol = Tolerance::default();
        assert!(tol.matches(&amounts(1000, 180, 0, 0), &amounts(1005, 182, 2, 0)));
        assert!(tol.matches(&amounts(1005, 180, 0, 0), &amounts(1000, 178, 0, 2)));
    }

    #[test]
    fn any_column_outside_tolerance_fails() {
        let tol = Tolerance::default();
        let base = amounts(1000, 180, 90, 90);
        assert!(!tol.matches(&base, &amounts(1006, 180, 90, 90)));
        assert!(!tol.matches(&base, &amounts(1000, 183, 90, 90)));
        assert!(!tol.matches(&base, &amounts(1000, 180, 87, 90)));
        assert!(!tol.matches(&base, &amounts(1000, 180, 90, 93)));
    }
}
