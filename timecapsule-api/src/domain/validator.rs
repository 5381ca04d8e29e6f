use time::{Duration, OffsetDateTime};

use super::{
    models::{EntryStatus, EntryType},
    EntryValidationError,
};

/// Shortest entry a user is allowed to submit.
pub const MIN_ENTRY_DURATION: Duration = Duration::minutes(5);

/// A submission as received from the client, before any decision is made.
#[derive(Debug, Clone, Copy)]
pub struct CandidateEntry {
    pub started_at: OffsetDateTime,
    pub ended_at: OffsetDateTime,
    pub internal_entry: bool,
}

/// An already persisted `[started_at, ended_at)` interval of the same user.
#[derive(Debug, Clone, Copy)]
pub struct EntryInterval {
    pub started_at: OffsetDateTime,
    pub ended_at: OffsetDateTime,
}

/// A candidate that passed all checks, with its derived type and
/// initial workflow status.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedEntry {
    pub started_at: OffsetDateTime,
    pub ended_at: OffsetDateTime,
    pub entry_type: EntryType,
    pub status: EntryStatus,
}

/// Decides whether a candidate time entry may be persisted.
///
/// Pure over its inputs: checks ordering, minimum duration and overlap
/// against the user's existing entries (half-open interval semantics, so
/// back-to-back entries are allowed). On success derives the entry type
/// from the internal flag and tags the entry `unauthorized`.
pub fn validate_entry(
    candidate: &CandidateEntry,
    existing: &[EntryInterval],
) -> Result<ValidatedEntry, EntryValidationError> {
    if candidate.started_at >= candidate.ended_at {
        return Err(EntryValidationError::InvalidRange);
    }

    if candidate.ended_at - candidate.started_at < MIN_ENTRY_DURATION {
        return Err(EntryValidationError::TooShort);
    }

    if existing.iter().any(|entry| overlaps(candidate, entry)) {
        return Err(EntryValidationError::OverlapConflict);
    }

    Ok(ValidatedEntry {
        started_at: candidate.started_at,
        ended_at: candidate.ended_at,
        entry_type: EntryType::from_internal_flag(candidate.internal_entry),
        status: EntryStatus::Unauthorized,
    })
}

fn overlaps(candidate: &CandidateEntry, existing: &EntryInterval) -> bool {
    let (s, e) = (candidate.started_at, candidate.ended_at);
    let (db_s, db_e) = (existing.started_at, existing.ended_at);

    // start falls inside, end falls inside, or candidate swallows the entry
    (s >= db_s && s < db_e) || (e > db_s && e <= db_e) || (s <= db_s && e >= db_e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn candidate(
        started_at: OffsetDateTime,
        ended_at: OffsetDateTime,
        internal_entry: bool,
    ) -> CandidateEntry {
        CandidateEntry {
            started_at,
            ended_at,
            internal_entry,
        }
    }

    fn interval(started_at: OffsetDateTime, ended_at: OffsetDateTime) -> EntryInterval {
        EntryInterval {
            started_at,
            ended_at,
        }
    }

    #[test]
    fn rejects_start_after_end() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 10:00 UTC),
                datetime!(2024-09-02 09:00 UTC),
                false,
            ),
            &[],
        );
        assert_eq!(result.unwrap_err(), EntryValidationError::InvalidRange);
    }

    #[test]
    fn rejects_start_equal_to_end() {
        let at = datetime!(2024-09-02 10:00 UTC);
        let result = validate_entry(&candidate(at, at, false), &[]);
        assert_eq!(result.unwrap_err(), EntryValidationError::InvalidRange);
    }

    #[test]
    fn rejects_entries_shorter_than_five_minutes() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 10:00 UTC),
                datetime!(2024-09-02 10:04:59 UTC),
                false,
            ),
            &[],
        );
        assert_eq!(result.unwrap_err(), EntryValidationError::TooShort);
    }

    #[test]
    fn accepts_exactly_five_minutes() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 10:00 UTC),
                datetime!(2024-09-02 10:05 UTC),
                false,
            ),
            &[],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_candidate_starting_inside_existing_entry() {
        // existing [09:00, 10:00), candidate [09:30, 10:30)
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 09:30 UTC),
                datetime!(2024-09-02 10:30 UTC),
                false,
            ),
            &[interval(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
            )],
        );
        assert_eq!(result.unwrap_err(), EntryValidationError::OverlapConflict);
    }

    #[test]
    fn rejects_candidate_ending_inside_existing_entry() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 08:30 UTC),
                datetime!(2024-09-02 09:30 UTC),
                false,
            ),
            &[interval(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
            )],
        );
        assert_eq!(result.unwrap_err(), EntryValidationError::OverlapConflict);
    }

    #[test]
    fn rejects_candidate_containing_existing_entry() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 08:00 UTC),
                datetime!(2024-09-02 11:00 UTC),
                false,
            ),
            &[interval(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
            )],
        );
        assert_eq!(result.unwrap_err(), EntryValidationError::OverlapConflict);
    }

    #[test]
    fn rejects_identical_timeframe() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
                false,
            ),
            &[interval(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
            )],
        );
        assert_eq!(result.unwrap_err(), EntryValidationError::OverlapConflict);
    }

    #[test]
    fn accepts_adjacent_entry() {
        // existing [09:00, 10:00), candidate [10:00, 11:00) — back-to-back is fine
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 10:00 UTC),
                datetime!(2024-09-02 11:00 UTC),
                false,
            ),
            &[interval(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
            )],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn accepts_disjoint_entry() {
        let result = validate_entry(
            &candidate(
                datetime!(2024-09-02 12:00 UTC),
                datetime!(2024-09-02 13:00 UTC),
                false,
            ),
            &[interval(
                datetime!(2024-09-02 09:00 UTC),
                datetime!(2024-09-02 10:00 UTC),
            )],
        );
        assert!(result.is_ok());
    }

    #[test]
    fn derives_type_and_initial_status() {
        let internal = validate_entry(
            &candidate(
                datetime!(2024-09-02 10:00 UTC),
                datetime!(2024-09-02 11:00 UTC),
                true,
            ),
            &[],
        )
        .unwrap();
        assert_eq!(internal.entry_type, EntryType::Internal);
        assert_eq!(internal.status, EntryStatus::Unauthorized);

        let external = validate_entry(
            &candidate(
                datetime!(2024-09-02 10:00 UTC),
                datetime!(2024-09-02 11:00 UTC),
                false,
            ),
            &[],
        )
        .unwrap();
        assert_eq!(external.entry_type, EntryType::External);
    }
}
