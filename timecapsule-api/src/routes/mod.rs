pub(crate) mod entries;
pub(crate) mod error;
pub(crate) mod files;
pub(crate) mod receipts;

pub(crate) use error::ApiError;
