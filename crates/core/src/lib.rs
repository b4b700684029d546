pub mod error;
pub mod money;
pub mod period;
pub mod transaction;

pub use error::ValidationError;
pub use money::Money;
pub use period::DateRange;
pub use transaction::{Transaction, TransactionId};
