mod attachment_flow;
mod draft;
mod error;
pub mod models;
mod validator;

pub use attachment_flow::AttachmentFlow;
pub use draft::EntryDraft;
pub use error::{AttachmentFlowError, EntryValidationError};
pub use validator::{validate_entry, CandidateEntry, EntryInterval, ValidatedEntry};
