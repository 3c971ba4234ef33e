use crate::error::RecoError;
use crate::models::RawTable;
use std::io::Read;
use std::path::Path;

/// 读取 CSV 为原始表格 (首行为表头，允许行长度不一致)
///
/// 表头空白由标准化阶段处理，这里保持原样。
pub fn read_table<R: Read>(rdr: R) -> Result<RawTable, RecoError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_reader(rdr);

    let headers = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

pub fn read_table_path(path: &Path) -> Result<RawTable, RecoError> {
    let file = std::fs::File::open(path)?;
    let table = read_table(file)?;
    tracing::info!("读取 {}: {} 行", path.display(), table.rows.len());
    Ok(table)
}
