use serde::{Deserialize, Serialize};
use strum::Display;

/// Whether an entry is billable work for a client or internal time.
///
/// External entries must carry a client and a billing number. Stored as
/// lowercase text; the same spelling is used on the wire and in log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EntryType {
    Internal,
    External,
}

impl EntryType {
    pub fn from_internal_flag(internal_entry: bool) -> Self {
        if internal_entry {
            Self::Internal
        } else {
            Self::External
        }
    }
}

/// Workflow tag of a time entry. New entries always start out unauthorized;
/// authorization and invoicing flip the column elsewhere, so reads must
/// handle all three values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum EntryStatus {
    Unauthorized,
    Authorized,
    Invoiced,
}

#[cfg(test)]
mod tests {
    use super::*;

    // The lowercase spelling is shared by the database column, the JSON
    // field and user-facing messages.
    #[test]
    fn entry_enums_render_lowercase() {
        assert_eq!(EntryType::Internal.to_string(), "internal");
        assert_eq!(EntryType::External.to_string(), "external");
        assert_eq!(EntryStatus::Unauthorized.to_string(), "unauthorized");
        assert_eq!(EntryStatus::Authorized.to_string(), "authorized");
        assert_eq!(EntryStatus::Invoiced.to_string(), "invoiced");
    }
}
