use super::invoice::{InvoiceRecord, Side};

/// 原始表格: 表头 + 字符串单元格 (由导入层产生)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

/// 标准化后的一方账簿
#[derive(Debug, Clone)]
pub struct Ledger {
    pub side: Side,
    /// 去除首尾空白后的表头
    pub headers: Vec<String>,
    pub records: Vec<InvoiceRecord>,
}

impl Ledger {
    pub fn unmatched(&self) -> impl Iterator<Item = (usize, &InvoiceRecord)> {
        self.records.iter().enumerate().filter(|(_, r)| r.is_unmatched())
    }

    pub fn unmatched_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_unmatched()).count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
