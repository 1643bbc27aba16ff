pub mod category;
pub mod transaction;

pub use category::Category;
pub use transaction::{NewTransaction, Transaction, TransactionDraft, TransactionType};
