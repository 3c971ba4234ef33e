use super::invoice::MatchLabel;
use super::ledger::Ledger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单表统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    pub total: usize,
    pub unmatched: usize,
    pub matched_breakdown: BTreeMap<MatchLabel, usize>,
}

impl TableStats {
    pub fn matched(&self) -> usize {
        self.matched_breakdown.values().sum()
    }
}

/// 双方统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub portal: TableStats,
    pub books: TableStats,
}

/// 对账结果 (生成后不再修改)
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    pub portal: Ledger,
    pub books: Ledger,
    pub stats: Statistics,
}
