use crate::config::MatchingConfig;
use crate::models::{Amounts, Ledger, MatchLabel};
use crate::service::matcher::{assign, PhaseOutcome};
use crate::service::similarity::ratio_chars;
use crate::service::tolerance::Tolerance;
use std::collections::BTreeMap;

/// 按标准化名称汇总的未匹配记录
#[derive(Debug, Clone, Default)]
struct NameGroup {
    chars: Vec<char>,
    amounts: Amounts,
    members: Vec<usize>,
}

fn group_by_name(ledger: &Ledger) -> BTreeMap<String, NameGroup> {
    let mut groups: BTreeMap<String, NameGroup> = BTreeMap::new();
    for (idx, rec) in ledger.unmatched() {
        let group = groups
            .entry(rec.normalized_name.clone())
            .or_insert_with(|| NameGroup {
                chars: rec.normalized_name.chars().collect(),
                ..Default::default()
            });
        group.amounts.add(&rec.amounts);
        group.members.push(idx);
    }
    groups
}

/// 短名称且长度差过大时跳过，不计算相似度
pub fn is_pruned(p_len: usize, b_len: usize, config: &MatchingConfig) -> bool {
    p_len.abs_diff(b_len) > config.prune_length_gap && p_len < config.prune_short_name_len
}

/// Phase 5: 按名称模糊匹配
///
/// 名称相似度超过阈值且汇总金额在容差内时，双方该名称下所有未匹配记录都标记为
/// `PartyWiseMatched`。不做最优选择，所有满足条件的名称对都会生效。
pub fn match_party_wise(
    portal: &mut Ledger,
    books: &mut Ledger,
    config: &MatchingConfig,
    tol: &Tolerance,
) -> PhaseOutcome {
    let mut out = PhaseOutcome::default();
    if portal.unmatched_count() == 0 || books.unmatched_count() == 0 {
        return out;
    }

    let portal_groups = group_by_name(portal);
    let books_groups = group_by_name(books);
    tracing::debug!(
        "名称分组: Portal {} 个, Books {} 个",
        portal_groups.len(),
        books_groups.len()
    );

    for (p_name, p_group) in &portal_groups {
        for (b_name, b_group) in &books_groups {
            if is_pruned(p_group.chars.len(), b_group.chars.len(), config) {
                continue;
            }

            let score = ratio_chars(&p_group.chars, &b_group.chars);
            if score <= config.name_similarity_threshold {
                continue;
            }
            if !tol.matches(&p_group.amounts, &b_group.amounts) {
                continue;
            }

            tracing::debug!("名称匹配: '{}' ~ '{}' ({:.3})", p_name, b_name, score);
            for &pi in &p_group.members {
                out.portal += assign(&mut portal.records[pi], MatchLabel::PartyWiseMatched);
            }
            for &bi in &b_group.members {
                out.books += assign(&mut books.records[bi], MatchLabel::PartyWiseMatched);
            }
        }
    }

    out
}
