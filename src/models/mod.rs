pub mod invoice;
pub mod ledger;
pub mod result;

pub use invoice::{Amounts, InvoiceRecord, MatchLabel, Side};
pub use ledger::{Ledger, RawTable};
pub use result::{ReconciliationResult, Statistics, TableStats};
