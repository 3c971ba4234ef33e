use crate::models::{Ledger, Statistics, TableStats};

/// 统计单表的匹配结果分布
pub fn table_stats(ledger: &Ledger) -> TableStats {
    let mut stats = TableStats {
        total: ledger.len(),
        ..Default::default()
    };

    for rec in &ledger.records {
        if rec.is_unmatched() {
            stats.unmatched += 1;
        } else {
            *stats.matched_breakdown.entry(rec.label).or_insert(0) += 1;
        }
    }

    stats
}

pub fn statistics(portal: &Ledger, books: &Ledger) -> Statistics {
    Statistics {
        portal: table_stats(portal),
        books: table_stats(books),
    }
}
