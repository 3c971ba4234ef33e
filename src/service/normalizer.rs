use crate::error::RecoError;
use crate::models::{Amounts, InvoiceRecord, Ledger, MatchLabel, RawTable, Side};
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

pub const COL_GSTIN: &str = "GSTIN";
pub const COL_NAME: &str = "Name";
pub const COL_INVOICE_NUMBER: &str = "Invoice number";
pub const COL_INVOICE_DATE: &str = "Invoice Date";
pub const COL_TAXABLE: &str = "Taxable Value";
pub const COL_IGST: &str = "IGST";
pub const COL_CGST: &str = "CGST";
pub const COL_SGST: &str = "SGST";
/// 输出结果列 (输入中若已存在则忽略)
pub const COL_REMARKS: &str = "Remarks";

/// 必需列，按检查顺序排列
pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_GSTIN,
    COL_NAME,
    COL_INVOICE_NUMBER,
    COL_INVOICE_DATE,
    COL_TAXABLE,
    COL_IGST,
    COL_CGST,
    COL_SGST,
];

/// 必需列在表头中的位置
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex {
    pub gstin: usize,
    pub name: usize,
    pub invoice_number: usize,
    pub invoice_date: usize,
    pub taxable: usize,
    pub igst: usize,
    pub cgst: usize,
    pub sgst: usize,
}

impl ColumnIndex {
    /// 在已去空白的表头中定位必需列，缺失时返回第一个缺失列
    pub fn locate(side: Side, headers: &[String]) -> Result<Self, RecoError> {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| RecoError::Schema {
                    table: side,
                    column: column.to_string(),
                })
        };

        Ok(Self {
            gstin: find(COL_GSTIN)?,
            name: find(COL_NAME)?,
            invoice_number: find(COL_INVOICE_NUMBER)?,
            invoice_date: find(COL_INVOICE_DATE)?,
            taxable: find(COL_TAXABLE)?,
            igst: find(COL_IGST)?,
            cgst: find(COL_CGST)?,
            sgst: find(COL_SGST)?,
        })
    }
}

/// 标准化一张原始表
pub fn normalize_table(side: Side, raw: RawTable) -> Result<Ledger, RecoError> {
    let headers: Vec<String> = raw.headers.iter().map(|h| h.trim().to_string()).collect();
    let cols = ColumnIndex::locate(side, &headers)?;

    let mut records = Vec::with_capacity(raw.rows.len());
    let mut coerced = 0usize;

    for (row_index, mut cells) in raw.rows.into_iter().enumerate() {
        if cells.len() < headers.len() {
            cells.resize(headers.len(), String::new());
        }

        let mut amount = |idx: usize| {
            let (value, ok) = parse_amount(&cells[idx]);
            if !ok {
                coerced += 1;
            }
            value
        };
        let amounts = Amounts::new(
            amount(cols.taxable),
            amount(cols.igst),
            amount(cols.cgst),
            amount(cols.sgst),
        );

        records.push(InvoiceRecord {
            row_index,
            gstin: normalize_gstin(&cells[cols.gstin]),
            party_name: cells[cols.name].clone(),
            normalized_name: normalize_name(&cells[cols.name]),
            invoice_number: normalize_invoice_number(&cells[cols.invoice_number]),
            invoice_date: cells[cols.invoice_date].clone(),
            amounts,
            label: MatchLabel::Unmatched,
            cells,
        });
    }

    if coerced > 0 {
        tracing::debug!("{}: {} 个金额单元格无法解析，按 0 处理", side, coerced);
    }

    Ok(Ledger {
        side,
        headers,
        records,
    })
}

pub fn normalize_gstin(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 去掉数值型单元格导出时产生的 ".0" 后缀
pub fn normalize_invoice_number(raw: &str) -> String {
    let s = raw.trim().to_uppercase();
    match s.strip_suffix(".0") {
        Some(stripped) => stripped.to_string(),
        None => s,
    }
}

/// 名称标准化: 大写、去标点、展开常见缩写、压缩空白
pub fn normalize_name(raw: &str) -> String {
    let expanded = raw
        .to_uppercase()
        .replace(['.', ','], "")
        .replace('&', "AND")
        .replace("PVT", "PRIVATE")
        .replace("LTD", "LIMITED");

    let tokens: Vec<&str> = expanded.split_whitespace().collect();
    let last = tokens.len().saturating_sub(1);
    tokens
        .iter()
        .enumerate()
        .map(|(i, t)| {
            // 中间位置单独的 "P" 视为 PRIVATE
            if *t == "P" && i > 0 && i < last {
                "PRIVATE"
            } else {
                t
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 科学计数法指数的绝对值上限，超出视为无法解析
const MAX_EXPONENT: u64 = 64;

/// 解析金额，无法解析时返回 (0, false)；空单元格视为 0 且不计入告警
pub fn parse_amount(raw: &str) -> (BigDecimal, bool) {
    let s = raw.trim();
    if s.is_empty() {
        return (BigDecimal::zero(), true);
    }

    // 极端指数会让 BigDecimal 的 scale 溢出或在比较时展开成巨大整数
    if let Some(pos) = s.find(['e', 'E']) {
        match s[pos + 1..].parse::<i64>() {
            Ok(exp) if exp.unsigned_abs() <= MAX_EXPONENT => {}
            _ => return (BigDecimal::zero(), false),
        }
    }

    match BigDecimal::from_str(s) {
        Ok(v) => (v, true),
        Err(_) => (BigDecimal::zero(), false),
    }
}
