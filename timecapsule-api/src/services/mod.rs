pub mod receipt_store;

pub use receipt_store::{ReceiptStore, StorageError};
