use super::AttachmentFlowError;

/// Receipt attachment workflow for a single time entry.
///
/// One image at a time moves through select → upload → metadata submission.
/// Each transition consumes the current state and returns the next one, so
/// an illegal step can never leave the flow half-moved. Failures fall back
/// to the prior stable state: a failed upload returns to `FileSelected`, a
/// failed metadata submission returns to `Uploaded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttachmentFlow {
    /// No file chosen yet.
    #[default]
    Idle,
    /// Exactly one image file chosen; the user may still clear it.
    FileSelected { file_name: String },
    /// Binary transfer in flight. `percent` is monotonically non-decreasing
    /// and drives UI feedback only.
    Uploading { file_name: String, percent: u8 },
    /// Storage holds the object; metadata entry is unlocked.
    Uploaded { object_key: String },
    /// Metadata persisted together with the object key. Resetting returns
    /// the flow to `Idle` for the next image.
    Submitted { object_key: String },
}

impl AttachmentFlow {
    /// Choose the image to upload. Selecting again replaces the pending file.
    pub fn select_file(self, file_name: impl Into<String>) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Idle | Self::FileSelected { .. } => Ok(Self::FileSelected {
                file_name: file_name.into(),
            }),
            Self::Uploading { .. } => Err(AttachmentFlowError::UploadInFlight),
            Self::Uploaded { .. } | Self::Submitted { .. } => {
                Err(AttachmentFlowError::AlreadyUploaded)
            }
        }
    }

    /// Drop the pending file and return to `Idle`.
    pub fn clear_selection(self) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Idle | Self::FileSelected { .. } => Ok(Self::Idle),
            Self::Uploading { .. } => Err(AttachmentFlowError::UploadInFlight),
            Self::Uploaded { .. } | Self::Submitted { .. } => {
                Err(AttachmentFlowError::AlreadyUploaded)
            }
        }
    }

    /// Start transferring the selected file. Without a selection this is a
    /// no-op: the flow stays `Idle`.
    pub fn begin_upload(self) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Idle => Ok(Self::Idle),
            Self::FileSelected { file_name } => Ok(Self::Uploading {
                file_name,
                percent: 0,
            }),
            Self::Uploading { .. } => Err(AttachmentFlowError::UploadInFlight),
            Self::Uploaded { .. } | Self::Submitted { .. } => {
                Err(AttachmentFlowError::AlreadyUploaded)
            }
        }
    }

    /// Record transfer progress. Progress never goes backwards and is
    /// clamped to 100.
    pub fn progress(self, percent: u8) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Uploading {
                file_name,
                percent: current,
            } => Ok(Self::Uploading {
                file_name,
                percent: percent.clamp(current, 100),
            }),
            _ => Err(AttachmentFlowError::NotUploading),
        }
    }

    /// Storage accepted the object; metadata entry is now unlocked.
    pub fn complete_upload(
        self,
        object_key: impl Into<String>,
    ) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Uploading { .. } => Ok(Self::Uploaded {
                object_key: object_key.into(),
            }),
            _ => Err(AttachmentFlowError::NotUploading),
        }
    }

    /// The transfer failed; fall back to the selected file.
    pub fn fail_upload(self) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Uploading { file_name, .. } => Ok(Self::FileSelected { file_name }),
            _ => Err(AttachmentFlowError::NotUploading),
        }
    }

    /// Submit metadata against the uploaded object.
    pub fn submit_metadata(self) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Uploaded { object_key } => Ok(Self::Submitted { object_key }),
            _ => Err(AttachmentFlowError::NothingUploaded),
        }
    }

    /// Persisting the metadata failed; the object is still stored, so fall
    /// back to `Uploaded` and let the user retry.
    pub fn fail_submission(self) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Submitted { object_key } => Ok(Self::Uploaded { object_key }),
            _ => Err(AttachmentFlowError::NotSubmitted),
        }
    }

    /// After a successful submission, make room for the next image.
    pub fn reset(self) -> Result<Self, AttachmentFlowError> {
        match self {
            Self::Submitted { .. } => Ok(Self::Idle),
            _ => Err(AttachmentFlowError::NotSubmitted),
        }
    }

    /// The stored object key, once an upload has completed.
    pub fn object_key(&self) -> Option<&str> {
        match self {
            Self::Uploaded { object_key } | Self::Submitted { object_key } => Some(object_key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded() -> AttachmentFlow {
        AttachmentFlow::Idle
            .select_file("receipt.png")
            .unwrap()
            .begin_upload()
            .unwrap()
            .complete_upload("receipts/abc-receipt.png")
            .unwrap()
    }

    #[test]
    fn upload_without_selection_is_a_noop() {
        let flow = AttachmentFlow::Idle.begin_upload().unwrap();
        assert_eq!(flow, AttachmentFlow::Idle);
    }

    #[test]
    fn happy_path_ends_back_at_idle_with_no_residual_file() {
        let flow = uploaded().submit_metadata().unwrap().reset().unwrap();
        assert_eq!(flow, AttachmentFlow::Idle);
        assert_eq!(flow.object_key(), None);
    }

    #[test]
    fn metadata_submission_requires_uploaded_state() {
        assert_eq!(
            AttachmentFlow::Idle.submit_metadata().unwrap_err(),
            AttachmentFlowError::NothingUploaded
        );
        assert_eq!(
            AttachmentFlow::Idle
                .select_file("receipt.png")
                .unwrap()
                .submit_metadata()
                .unwrap_err(),
            AttachmentFlowError::NothingUploaded
        );
    }

    #[test]
    fn second_upload_cannot_start_while_one_is_in_flight() {
        let in_flight = AttachmentFlow::Idle
            .select_file("receipt.png")
            .unwrap()
            .begin_upload()
            .unwrap();
        assert_eq!(
            in_flight.select_file("other.png").unwrap_err(),
            AttachmentFlowError::UploadInFlight
        );
    }

    #[test]
    fn progress_is_monotonic_and_clamped() {
        let flow = AttachmentFlow::Idle
            .select_file("receipt.png")
            .unwrap()
            .begin_upload()
            .unwrap()
            .progress(40)
            .unwrap();
        assert!(matches!(flow, AttachmentFlow::Uploading { percent: 40, .. }));

        // a stale lower value never moves the bar backwards
        let flow = flow.progress(10).unwrap();
        assert!(matches!(flow, AttachmentFlow::Uploading { percent: 40, .. }));

        let flow = flow.progress(200).unwrap();
        assert!(matches!(
            flow,
            AttachmentFlow::Uploading { percent: 100, .. }
        ));
    }

    #[test]
    fn failed_upload_returns_to_file_selected() {
        let flow = AttachmentFlow::Idle
            .select_file("receipt.png")
            .unwrap()
            .begin_upload()
            .unwrap()
            .fail_upload()
            .unwrap();
        assert_eq!(
            flow,
            AttachmentFlow::FileSelected {
                file_name: "receipt.png".to_string()
            }
        );
    }

    #[test]
    fn failed_submission_returns_to_uploaded() {
        let flow = uploaded().submit_metadata().unwrap();
        let flow = flow.fail_submission().unwrap();
        assert_eq!(flow.object_key(), Some("receipts/abc-receipt.png"));
        assert!(matches!(flow, AttachmentFlow::Uploaded { .. }));
    }

    #[test]
    fn clearing_selection_returns_to_idle() {
        let flow = AttachmentFlow::Idle
            .select_file("receipt.png")
            .unwrap()
            .clear_selection()
            .unwrap();
        assert_eq!(flow, AttachmentFlow::Idle);
    }

    #[test]
    fn uploaded_object_key_is_exposed() {
        assert_eq!(uploaded().object_key(), Some("receipts/abc-receipt.png"));
    }
}
