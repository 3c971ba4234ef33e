use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 对账双方: 税局平台数据 / 账簿数据
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Portal,
    Books,
}

impl Side {
    /// 对应的工作表名称
    pub fn sheet_name(&self) -> &'static str {
        match self {
            Side::Portal => "Portal data",
            Side::Books => "Books data",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// 匹配结果标签
///
/// 序列化时使用输出表 `Remarks` 列中的文字，统计结果的 key 与之一致。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MatchLabel {
    #[default]
    #[serde(rename = "")]
    Unmatched,
    #[serde(rename = "Exact Matched")]
    ExactMatched,
    #[serde(rename = "Matched with multiple invoice in Portal data")]
    MultiInvoicePortal,
    #[serde(rename = "Matched with multiple invoice in Books data")]
    MultiInvoiceBooks,
    #[serde(rename = "GSTIN Wise matched")]
    GstinWiseMatched,
    #[serde(rename = "Party wise matched")]
    PartyWiseMatched,
}

impl MatchLabel {
    pub fn remark(&self) -> &'static str {
        match self {
            MatchLabel::Unmatched => "",
            MatchLabel::ExactMatched => "Exact Matched",
            MatchLabel::MultiInvoicePortal => "Matched with multiple invoice in Portal data",
            MatchLabel::MultiInvoiceBooks => "Matched with multiple invoice in Books data",
            MatchLabel::GstinWiseMatched => "GSTIN Wise matched",
            MatchLabel::PartyWiseMatched => "Party wise matched",
        }
    }

    pub fn is_unmatched(&self) -> bool {
        matches!(self, MatchLabel::Unmatched)
    }
}

/// 四个金额列: 应税金额 + 三种税额
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amounts {
    pub taxable: BigDecimal,
    pub igst: BigDecimal,
    pub cgst: BigDecimal,
    pub sgst: BigDecimal,
}

impl Amounts {
    pub fn new(taxable: BigDecimal, igst: BigDecimal, cgst: BigDecimal, sgst: BigDecimal) -> Self {
        Self { taxable, igst, cgst, sgst }
    }

    /// 逐列累加
    pub fn add(&mut self, other: &Amounts) {
        self.taxable = &self.taxable + &other.taxable;
        self.igst = &self.igst + &other.igst;
        self.cgst = &self.cgst + &other.cgst;
        self.sgst = &self.sgst + &other.sgst;
    }
}

impl Default for Amounts {
    fn default() -> Self {
        Self {
            taxable: BigDecimal::zero(),
            igst: BigDecimal::zero(),
            cgst: BigDecimal::zero(),
            sgst: BigDecimal::zero(),
        }
    }
}

/// 单张发票记录 (标准化后)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// 在原始表中的行号 (从0开始)
    pub row_index: usize,
    pub gstin: String,
    pub party_name: String,
    /// 仅用于模糊匹配分组，不输出
    pub normalized_name: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub amounts: Amounts,
    pub label: MatchLabel,
    /// 原始单元格，输出时保留其余列
    pub cells: Vec<String>,
}

impl InvoiceRecord {
    pub fn is_unmatched(&self) -> bool {
        self.label.is_unmatched()
    }

    /// 精确匹配键 (GSTIN, 发票号)
    pub fn key(&self) -> (&str, &str) {
        (&self.gstin, &self.invoice_number)
    }
}
