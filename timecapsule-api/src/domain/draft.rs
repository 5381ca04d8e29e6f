use time::{Date, OffsetDateTime};

/// The three linked date fields of the entry form.
///
/// The form keeps one entry date and two clock times; picking any of them
/// recomputes the dependent fields. A submitted entry always has both times
/// on the entry date, so the pair can never silently drift across days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryDraft {
    date_of_entry: Option<Date>,
    started_at: Option<OffsetDateTime>,
    ended_at: Option<OffsetDateTime>,
}

impl EntryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pick the entry date: both times move onto it, keeping their clock time.
    pub fn with_entry_date(self, date: Date) -> Self {
        Self {
            date_of_entry: Some(date),
            started_at: self.started_at.map(|t| t.replace_date(date)),
            ended_at: self.ended_at.map(|t| t.replace_date(date)),
        }
    }

    /// Pick the start time: the end time follows it until picked explicitly.
    pub fn with_started_at(self, started_at: OffsetDateTime) -> Self {
        let aligned = match self.date_of_entry {
            Some(date) => started_at.replace_date(date),
            None => started_at,
        };
        Self {
            started_at: Some(aligned),
            ended_at: Some(aligned),
            ..self
        }
    }

    /// Pick the end time; the start time is left alone.
    pub fn with_ended_at(self, ended_at: OffsetDateTime) -> Self {
        let aligned = match self.date_of_entry {
            Some(date) => ended_at.replace_date(date),
            None => ended_at,
        };
        Self {
            ended_at: Some(aligned),
            ..self
        }
    }

    /// The resolved `(started_at, ended_at)` pair, once all fields are set.
    pub fn times(&self) -> Option<(OffsetDateTime, OffsetDateTime)> {
        Some((self.started_at?, self.ended_at?))
    }
}
