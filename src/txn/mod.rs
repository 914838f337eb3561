//! Transaction records and the span transform

mod record;
mod transform;

pub use record::{FinancialTxn, ObjectEnvelope, TxnStatus};
pub use transform::{
    hex_id, parse_amount, span_to_txn, string_attr, AMOUNT_ATTR, CURRENCY_ATTR, DEFAULT_CURRENCY,
};
