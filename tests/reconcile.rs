use bigdecimal::BigDecimal;
use gst_reco::io::{read_table, read_table_path, write_ledger_path};
use gst_reco::models::{InvoiceRecord, Ledger, TableStats};
use gst_reco::{reconcile, MatchLabel, MatchingConfig, RawTable, Reconciler, RecoError};
use std::collections::BTreeMap;

const HEADER: &str = "GSTIN,Name,Invoice number,Invoice Date,Taxable Value,IGST,CGST,SGST";

fn table(rows: &[&str]) -> RawTable {
    let mut data = String::from(HEADER);
    data.push('\n');
    for row in rows {
        data.push_str(row);
        data.push('\n');
    }
    read_table(data.as_bytes()).unwrap()
}

fn labels(ledger: &Ledger) -> Vec<MatchLabel> {
    ledger.records.iter().map(|r| r.label).collect()
}

fn breakdown(pairs: &[(MatchLabel, usize)]) -> BTreeMap<MatchLabel, usize> {
    pairs.iter().copied().collect()
}

fn within(a: &InvoiceRecord, b: &InvoiceRecord) -> bool {
    let five = BigDecimal::from(5);
    let two = BigDecimal::from(2);
    (&a.amounts.taxable - &b.amounts.taxable).abs() <= five
        && (&a.amounts.igst - &b.amounts.igst).abs() <= two
        && (&a.amounts.cgst - &b.amounts.cgst).abs() <= two
        && (&a.amounts.sgst - &b.amounts.sgst).abs() <= two
}

fn assert_coverage(stats: &TableStats) {
    assert_eq!(stats.unmatched + stats.matched(), stats.total);
}

// -------------------------------------------------------------------------
// 端到端场景
// -------------------------------------------------------------------------

#[test]
fn identical_records_are_exact_matched() {
    let row = "29AAA,Acme,INV1,01-04-2024,1000,180,0,0";
    let result = reconcile(table(&[row]), table(&[row])).unwrap();

    assert_eq!(labels(&result.portal), vec![MatchLabel::ExactMatched]);
    assert_eq!(labels(&result.books), vec![MatchLabel::ExactMatched]);
    for stats in [&result.stats.portal, &result.stats.books] {
        assert_eq!(stats.total, 1);
        assert_eq!(stats.unmatched, 0);
        assert_eq!(stats.matched_breakdown, breakdown(&[(MatchLabel::ExactMatched, 1)]));
    }
}

#[test]
fn split_portal_invoice_matches_single_book_entry() {
    let portal = table(&[
        "29AAA,Acme,INV2,01-04-2024,500,90,0,0",
        "29AAA,Acme,INV2,01-04-2024,500,90,0,0",
    ]);
    let books = table(&["29AAA,Acme,INV2,01-04-2024,1000,180,0,0"]);

    let result = reconcile(portal, books).unwrap();

    assert_eq!(labels(&result.portal), vec![MatchLabel::MultiInvoicePortal; 2]);
    assert_eq!(labels(&result.books), vec![MatchLabel::MultiInvoicePortal]);
}

#[test]
fn amount_mismatch_on_same_key_stays_unmatched() {
    let result = reconcile(
        table(&["29AAA,Acme,INV3,01-04-2024,700,0,0,0"]),
        table(&["29AAA,Acme,INV3,01-04-2024,100,0,0,0"]),
    )
    .unwrap();

    assert_eq!(labels(&result.portal), vec![MatchLabel::Unmatched]);
    assert_eq!(labels(&result.books), vec![MatchLabel::Unmatched]);
    assert!(result.stats.portal.matched_breakdown.is_empty());
    assert!(result.stats.books.matched_breakdown.is_empty());
}

#[test]
fn abbreviated_party_names_are_party_wise_matched() {
    let result = reconcile(
        table(&["27BBB,ABC PVT LTD,P-1,01-04-2024,2500,0,225,225"]),
        table(&["27CCC,ABC PRIVATE LIMITED,B-9,02-04-2024,2500,0,225,225"]),
    )
    .unwrap();

    assert_eq!(result.portal.records[0].normalized_name, "ABC PRIVATE LIMITED");
    assert_eq!(labels(&result.portal), vec![MatchLabel::PartyWiseMatched]);
    assert_eq!(labels(&result.books), vec![MatchLabel::PartyWiseMatched]);
}

// -------------------------------------------------------------------------
// 全流程
// -------------------------------------------------------------------------

fn mixed_tables() -> (RawTable, RawTable) {
    let portal = table(&[
        "29AAA,Alpha Traders,INV1,,1000,180,0,0",
        "29AAA,Alpha Traders,INV2,,500,90,0,0",
        "29AAA,Alpha Traders,INV2,,500,90,0,0",
        "29AAA,Alpha Traders,INV4,,300,0,27,27",
        "29AAA,Alpha Traders,INV7,,800,144,0,0",
        "27XYZ,Beta Pvt Ltd,X1,,2000,0,180,180",
        "29AAA,Alpha Traders,INV3,,700,0,0,0",
    ]);
    let books = table(&[
        "29aaa ,Alpha Traders,INV1.0,,1003,181,0,0",
        "29AAA,Alpha Traders,INV2,,1000,180,0,0",
        "29AAA,Alpha Traders,INV4,,100,0,9,9",
        "29AAA,Alpha Traders,INV4,,200,0,18,18",
        "29AAA,Alpha Traders,INV8,,801,145,0,0",
        "27QQQ,Beta Private Limited,Y1,,2001,0,181,180",
        "29AAA,Alpha Traders,INV3,,100,0,0,0",
    ]);
    (portal, books)
}

#[test]
fn every_phase_claims_its_records() {
    let (portal, books) = mixed_tables();
    let result = reconcile(portal, books).unwrap();

    assert_eq!(
        labels(&result.portal),
        vec![
            MatchLabel::ExactMatched,
            MatchLabel::MultiInvoicePortal,
            MatchLabel::MultiInvoicePortal,
            MatchLabel::MultiInvoiceBooks,
            MatchLabel::GstinWiseMatched,
            MatchLabel::PartyWiseMatched,
            MatchLabel::Unmatched,
        ]
    );
    assert_eq!(
        labels(&result.books),
        vec![
            MatchLabel::ExactMatched,
            MatchLabel::MultiInvoicePortal,
            MatchLabel::MultiInvoiceBooks,
            MatchLabel::MultiInvoiceBooks,
            MatchLabel::GstinWiseMatched,
            MatchLabel::PartyWiseMatched,
            MatchLabel::Unmatched,
        ]
    );

    assert_eq!(result.stats.portal.total, 7);
    assert_eq!(result.stats.portal.unmatched, 1);
    assert_eq!(
        result.stats.portal.matched_breakdown,
        breakdown(&[
            (MatchLabel::ExactMatched, 1),
            (MatchLabel::MultiInvoicePortal, 2),
            (MatchLabel::MultiInvoiceBooks, 1),
            (MatchLabel::GstinWiseMatched, 1),
            (MatchLabel::PartyWiseMatched, 1),
        ])
    );
    assert_eq!(
        result.stats.books.matched_breakdown,
        breakdown(&[
            (MatchLabel::ExactMatched, 1),
            (MatchLabel::MultiInvoicePortal, 1),
            (MatchLabel::MultiInvoiceBooks, 2),
            (MatchLabel::GstinWiseMatched, 1),
            (MatchLabel::PartyWiseMatched, 1),
        ])
    );
}

#[test]
fn result_properties_hold() {
    let (portal, books) = mixed_tables();
    let result = reconcile(portal, books).unwrap();
    let (p, b) = (&result.portal.records, &result.books.records);

    assert_coverage(&result.stats.portal);
    assert_coverage(&result.stats.books);

    for pr in p.iter().filter(|r| r.label == MatchLabel::ExactMatched) {
        assert!(b.iter().any(|br| br.label == MatchLabel::ExactMatched
            && br.key() == pr.key()
            && within(pr, br)));
    }

    for pr in p.iter().filter(|r| r.label == MatchLabel::GstinWiseMatched) {
        assert!(b.iter().any(|br| br.label == MatchLabel::GstinWiseMatched
            && br.gstin == pr.gstin
            && br.invoice_number != pr.invoice_number
            && within(pr, br)));
    }

    let multi = [
        (p, MatchLabel::MultiInvoicePortal),
        (b, MatchLabel::MultiInvoiceBooks),
    ];
    for (records, label) in multi {
        for rec in records.iter().filter(|r| r.label == label) {
            let siblings = records
                .iter()
                .filter(|o| o.label == label && o.key() == rec.key())
                .count();
            assert!(siblings > 1, "{:?} without sibling at row {}", label, rec.row_index);
        }
    }
}

#[test]
fn reverted_multi_invoice_book_falls_through_to_gstin_wise() {
    // books[0] 消耗了 INV9 的两条 Portal 记录，books[1] 在 Phase 2 被撤销，
    // 之后在 Phase 4 与发票号不同的 INV5 配对
    let portal = table(&[
        "29AAA,Acme,INV9,,60,0,0,0",
        "29AAA,Acme,INV9,,40,0,0,0",
        "29AAA,Acme,INV5,,100,0,0,0",
    ]);
    let books = table(&[
        "29AAA,Acme,INV9,,100,0,0,0",
        "29AAA,Acme,INV9,,100,0,0,0",
    ]);

    let result = reconcile(portal, books).unwrap();

    assert_eq!(
        labels(&result.portal),
        vec![
            MatchLabel::MultiInvoicePortal,
            MatchLabel::MultiInvoicePortal,
            MatchLabel::GstinWiseMatched,
        ]
    );
    assert_eq!(
        labels(&result.books),
        vec![MatchLabel::MultiInvoicePortal, MatchLabel::GstinWiseMatched]
    );
}

#[test]
fn reverted_multi_invoice_portal_falls_through_to_party_wise() {
    // portal[1] 在 Phase 3 被撤销；books[2] 的 GSTIN 不同，Phase 4 无法配对，最后按名称匹配
    let portal = table(&[
        "29AAA,Acme Traders,INV9,,100,0,0,0",
        "29AAA,Acme Traders,INV9,,100,0,0,0",
    ]);
    let books = table(&[
        "29AAA,Acme Traders,INV9,,30,0,0,0",
        "29AAA,Acme Traders,INV9,,70,0,0,0",
        "24AAA,Acme Traders,K1,,100,0,0,0",
    ]);

    let result = reconcile(portal, books).unwrap();

    assert_eq!(
        labels(&result.portal),
        vec![MatchLabel::MultiInvoiceBooks, MatchLabel::PartyWiseMatched]
    );
    assert_eq!(
        labels(&result.books),
        vec![
            MatchLabel::MultiInvoiceBooks,
            MatchLabel::MultiInvoiceBooks,
            MatchLabel::PartyWiseMatched,
        ]
    );
}

#[test]
fn extreme_exponent_amount_is_coerced_to_zero() {
    let result = reconcile(
        table(&["29AAA,Acme,INV1,,1e2000000000,0,0,0"]),
        table(&["29AAA,Acme,INV1,,1,0,0,0"]),
    )
    .unwrap();

    assert_eq!(result.portal.records[0].amounts.taxable, BigDecimal::from(0));
    assert_eq!(labels(&result.portal), vec![MatchLabel::ExactMatched]);
}

#[test]
fn tighter_tolerance_changes_outcome() {
    let config = MatchingConfig {
        taxable_tolerance: BigDecimal::from(1),
        ..Default::default()
    };
    let result = Reconciler::new(config)
        .reconcile(
            table(&["29AAA,Acme,INV1,,1000,180,0,0"]),
            table(&["29AAA,Acme,INV1,,1003,180,0,0"]),
        )
        .unwrap();

    assert_eq!(result.stats.portal.unmatched, 1);
    assert_eq!(result.stats.books.unmatched, 1);
}

#[test]
fn empty_tables_reconcile_cleanly() {
    let result = reconcile(table(&[]), table(&["29AAA,Acme,INV1,,1,0,0,0"])).unwrap();

    assert_eq!(result.stats.portal.total, 0);
    assert_eq!(result.stats.books.unmatched, 1);
}

// -------------------------------------------------------------------------
// 表结构与导入导出
// -------------------------------------------------------------------------

#[test]
fn missing_column_aborts_with_column_name() {
    let header = "GSTIN,Name,Invoice number,Taxable Value,IGST,CGST,SGST\n";
    let portal = read_table(header.as_bytes()).unwrap();
    let err = reconcile(portal, table(&[])).unwrap_err();

    assert!(matches!(&err, RecoError::Schema { column, .. } if column == "Invoice Date"));
    assert_eq!(err.to_string(), "Portal data: missing required column 'Invoice Date'");
}

#[test]
fn padded_headers_are_accepted() {
    let data = " GSTIN ,Name , Invoice number,Invoice Date,Taxable Value ,IGST,CGST,SGST\n\
                29AAA,Acme,INV1,,1000,180,0,0\n";
    let portal = read_table(data.as_bytes()).unwrap();
    let result = reconcile(portal, table(&["29AAA,Acme,INV1,,1000,180,0,0"])).unwrap();

    assert_eq!(result.stats.portal.unmatched, 0);
}

#[test]
fn annotated_csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (portal, books) = mixed_tables();
    let result = reconcile(portal, books).unwrap();

    let path = dir.path().join("books.csv");
    write_ledger_path(&result.books, &path).unwrap();
    let written = read_table_path(&path).unwrap();

    assert_eq!(written.headers.last().map(String::as_str), Some("Remarks"));
    assert_eq!(written.rows.len(), 7);
    assert_eq!(written.rows[0][0], "29AAA");
    assert_eq!(written.rows[0][2], "INV1");
    assert_eq!(written.rows[0][8], "Exact Matched");
    assert_eq!(written.rows[6][8], "");
}
