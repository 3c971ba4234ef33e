use crate::config::MatchingConfig;
use crate::error::RecoError;
use crate::models::{
    Amounts, InvoiceRecord, Ledger, MatchLabel, RawTable, ReconciliationResult, Side,
};
use crate::service::normalizer::normalize_table;
use crate::service::party_matcher::match_party_wise;
use crate::service::stats::statistics;
use crate::service::tolerance::Tolerance;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use tracing::info;

/// 单个阶段新打上标签的记录数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseOutcome {
    pub portal: usize,
    pub books: usize,
}

/// 对账服务: 标准化 -> 五阶段匹配 -> 统计
///
/// 整个计算是同步且 CPU 密集的，在异步运行时中调用时应放到阻塞线程上执行。
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: MatchingConfig,
    tolerance: Tolerance,
}

impl Reconciler {
    pub fn new(config: MatchingConfig) -> Self {
        let tolerance = Tolerance::from_config(&config);
        Self { config, tolerance }
    }

    pub fn reconcile(
        &self,
        portal: RawTable,
        books: RawTable,
    ) -> Result<ReconciliationResult, RecoError> {
        let mut portal = normalize_table(Side::Portal, portal)?;
        let mut books = normalize_table(Side::Books, books)?;

        info!(
            "开始对账: Portal {} 行, Books {} 行",
            portal.len(),
            books.len()
        );

        self.run_phases(&mut portal, &mut books);

        let stats = statistics(&portal, &books);
        info!(
            "对账完成: Portal 未匹配 {}/{}, Books 未匹配 {}/{}",
            stats.portal.unmatched, stats.portal.total, stats.books.unmatched, stats.books.total
        );

        Ok(ReconciliationResult { portal, books, stats })
    }

    /// 按顺序执行五个匹配阶段，每个阶段只处理仍未匹配的记录
    pub fn run_phases(&self, portal: &mut Ledger, books: &mut Ledger) {
        let tol = &self.tolerance;

        let out = match_exact(portal, books, tol);
        info!("[Phase 1] Exact match: portal {}, books {}", out.portal, out.books);

        let out = match_many_portal_to_one_book(portal, books, tol);
        info!("[Phase 2] Multiple invoice in Portal: portal {}, books {}", out.portal, out.books);

        let out = match_one_portal_to_many_books(portal, books, tol);
        info!("[Phase 3] Multiple invoice in Books: portal {}, books {}", out.portal, out.books);

        let out = match_gstin_wise(portal, books, tol);
        info!("[Phase 4] GSTIN wise: portal {}, books {}", out.portal, out.books);

        let out = match_party_wise(portal, books, &self.config, tol);
        info!("[Phase 5] Party wise: portal {}, books {}", out.portal, out.books);
    }
}

/// 使用默认参数对账
pub fn reconcile(portal: RawTable, books: RawTable) -> Result<ReconciliationResult, RecoError> {
    Reconciler::default().reconcile(portal, books)
}

/// 仅在记录仍未匹配时写入标签，返回是否写入
pub(crate) fn assign(record: &mut InvoiceRecord, label: MatchLabel) -> usize {
    if record.is_unmatched() {
        record.label = label;
        1
    } else {
        0
    }
}

fn apply_pairs(
    portal: &mut Ledger,
    books: &mut Ledger,
    pairs: &[(usize, usize)],
    label: MatchLabel,
) -> PhaseOutcome {
    let mut out = PhaseOutcome::default();
    for &(pi, bi) in pairs {
        out.portal += assign(&mut portal.records[pi], label);
        out.books += assign(&mut books.records[bi], label);
    }
    out
}

/// Phase 1: (GSTIN, 发票号) 相同且金额在容差内
///
/// 键不保证唯一，重复键产生的每一对都独立判断。
pub fn match_exact(portal: &mut Ledger, books: &mut Ledger, tol: &Tolerance) -> PhaseOutcome {
    let mut books_by_key: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for (bi, b) in books.unmatched() {
        books_by_key.entry(b.key()).or_default().push(bi);
    }

    let mut pairs = Vec::new();
    for (pi, p) in portal.unmatched() {
        let Some(candidates) = books_by_key.get(&p.key()) else {
            continue;
        };
        for &bi in candidates {
            if tol.matches(&p.amounts, &books.records[bi].amounts) {
                pairs.push((pi, bi));
            }
        }
    }

    apply_pairs(portal, books, &pairs, MatchLabel::ExactMatched)
}

/// Phase 2: 多条 Portal 记录合计对应一条 Books 记录
pub fn match_many_portal_to_one_book(
    portal: &mut Ledger,
    books: &mut Ledger,
    tol: &Tolerance,
) -> PhaseOutcome {
    let (grouped, single) = match_multi_invoice(portal, books, tol, MatchLabel::MultiInvoicePortal);
    PhaseOutcome {
        portal: grouped,
        books: single,
    }
}

/// Phase 3: 一条 Portal 记录对应多条 Books 记录合计
pub fn match_one_portal_to_many_books(
    portal: &mut Ledger,
    books: &mut Ledger,
    tol: &Tolerance,
) -> PhaseOutcome {
    let (grouped, single) = match_multi_invoice(books, portal, tol, MatchLabel::MultiInvoiceBooks);
    PhaseOutcome {
        portal: single,
        books: grouped,
    }
}

/// 按键汇总 `grouped` 一方，与 `single` 一方逐条比较。
///
/// 匹配时先给 single 记录打上标签，再确认 grouped 一方该键下未匹配记录多于一条；
/// 否则撤销标签，留给后续阶段处理。返回 (grouped 标记数, single 标记数)。
fn match_multi_invoice(
    grouped: &mut Ledger,
    single: &mut Ledger,
    tol: &Tolerance,
    label: MatchLabel,
) -> (usize, usize) {
    let mut sums: IndexMap<(String, String), (Amounts, Vec<usize>)> = IndexMap::new();
    for (gi, g) in grouped.unmatched() {
        let (gstin, invoice) = g.key();
        let entry = sums
            .entry((gstin.to_string(), invoice.to_string()))
            .or_insert_with(|| (Amounts::default(), Vec::new()));
        entry.0.add(&g.amounts);
        entry.1.push(gi);
    }

    let candidates: Vec<(usize, usize)> = single
        .unmatched()
        .filter_map(|(si, s)| {
            let (gstin, invoice) = s.key();
            let idx = sums.get_index_of(&(gstin.to_string(), invoice.to_string()))?;
            let (total, _) = &sums[idx];
            tol.matches(&s.amounts, total).then_some((si, idx))
        })
        .collect();

    let (mut grouped_count, mut single_count) = (0, 0);
    for (si, idx) in candidates {
        single.records[si].label = label;

        let siblings: Vec<usize> = sums[idx]
            .1
            .iter()
            .copied()
            .filter(|&gi| grouped.records[gi].is_unmatched())
            .collect();

        if siblings.len() > 1 {
            for gi in siblings {
                grouped_count += assign(&mut grouped.records[gi], label);
            }
            single_count += 1;
        } else {
            single.records[si].label = MatchLabel::Unmatched;
        }
    }

    (grouped_count, single_count)
}

/// Phase 4: 同一 GSTIN 下发票号不同但金额一致
///
/// 按原始顺序遍历 Portal 记录，取第一条可用的 Books 记录配对 (贪心，一对一)。
pub fn match_gstin_wise(portal: &mut Ledger, books: &mut Ledger, tol: &Tolerance) -> PhaseOutcome {
    let mut books_by_gstin: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (bi, b) in books.unmatched() {
        books_by_gstin.entry(b.gstin.as_str()).or_default().push(bi);
    }

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut pairs = Vec::new();

    for (pi, p) in portal.unmatched() {
        let Some(candidates) = books_by_gstin.get(p.gstin.as_str()) else {
            continue;
        };

        let found = candidates.iter().copied().find(|bi| {
            let b = &books.records[*bi];
            !claimed.contains(bi)
                && b.invoice_number != p.invoice_number
                && tol.matches(&p.amounts, &b.amounts)
        });

        if let Some(bi) = found {
            claimed.insert(bi);
            pairs.push((pi, bi));
        }
    }

    apply_pairs(portal, books, &pairs, MatchLabel::GstinWiseMatched)
}
