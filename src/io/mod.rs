pub mod reader;
pub mod writer;

pub use reader::{read_table, read_table_path};
pub use writer::{write_ledger, write_ledger_path};
