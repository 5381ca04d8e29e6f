use thiserror::Error;

/// Errors raised when a candidate time entry fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EntryValidationError {
    #[error("started at date must be older than ended at date")]
    InvalidRange,
    #[error("duration must be at least 5 minutes")]
    TooShort,
    #[error("you have a previous entry with the same timeframe")]
    OverlapConflict,
}

/// Errors raised by illegal transitions of the receipt attachment flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachmentFlowError {
    #[error("an upload is already in flight for this entry")]
    UploadInFlight,
    #[error("a receipt image has already been uploaded for this entry")]
    AlreadyUploaded,
    #[error("no receipt image has been uploaded for this entry")]
    NothingUploaded,
    #[error("no upload is in progress for this entry")]
    NotUploading,
    #[error("receipt metadata has not been submitted yet")]
    NotSubmitted,
}
