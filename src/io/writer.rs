use crate::error::RecoError;
use crate::models::{InvoiceRecord, Ledger};
use crate::service::normalizer::{
    ColumnIndex, COL_CGST, COL_GSTIN, COL_IGST, COL_INVOICE_DATE, COL_INVOICE_NUMBER, COL_NAME,
    COL_REMARKS, COL_SGST, COL_TAXABLE,
};
use std::io::Write;
use std::path::Path;

/// 输出带 `Remarks` 列的对账结果
///
/// 保留原有列顺序，关键列写入标准化后的值，名称和日期按原文输出；
/// 原表中的 `Remarks` 列被替换。
pub fn write_ledger<W: Write>(ledger: &Ledger, wtr: W) -> Result<(), RecoError> {
    let cols = ColumnIndex::locate(ledger.side, &ledger.headers)?;
    let keep: Vec<usize> = (0..ledger.headers.len())
        .filter(|&i| ledger.headers[i] != COL_REMARKS)
        .collect();

    let mut writer = csv::Writer::from_writer(wtr);

    let mut header_row: Vec<&str> = keep.iter().map(|&i| ledger.headers[i].as_str()).collect();
    header_row.push(COL_REMARKS);
    writer.write_record(&header_row)?;

    for rec in &ledger.records {
        let mut row: Vec<String> = keep
            .iter()
            .map(|&i| cell_value(rec, &cols, &ledger.headers[i], i))
            .collect();
        row.push(rec.label.remark().to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

fn cell_value(rec: &InvoiceRecord, cols: &ColumnIndex, header: &str, idx: usize) -> String {
    // 同名列只替换第一次出现的位置
    match header {
        COL_GSTIN if idx == cols.gstin => rec.gstin.clone(),
        COL_NAME if idx == cols.name => rec.party_name.clone(),
        COL_INVOICE_NUMBER if idx == cols.invoice_number => rec.invoice_number.clone(),
        COL_INVOICE_DATE if idx == cols.invoice_date => rec.invoice_date.clone(),
        COL_TAXABLE if idx == cols.taxable => rec.amounts.taxable.to_string(),
        COL_IGST if idx == cols.igst => rec.amounts.igst.to_string(),
        COL_CGST if idx == cols.cgst => rec.amounts.cgst.to_string(),
        COL_SGST if idx == cols.sgst => rec.amounts.sgst.to_string(),
        _ => rec.cells.get(idx).cloned().unwrap_or_default(),
    }
}

pub fn write_ledger_path(ledger: &Ledger, path: &Path) -> Result<(), RecoError> {
    let file = std::fs::File::create(path)?;
    write_ledger(ledger, file)?;
    tracing::info!("写出 {}: {} 行", path.display(), ledger.len());
    Ok(())
}
