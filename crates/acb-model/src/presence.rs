use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Half-open interval `[first, death)` during which a subject contributes
/// panel rows. `death == None` means no recorded death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceWindow {
    pub first: NaiveDate,
    pub death: Option<NaiveDate>,
}

impl PresenceWindow {
    pub fn new(first: NaiveDate, death: Option<NaiveDate>) -> Self {
        Self { first, death }
    }

    /// Membership test with `alive_until` standing in for a missing death date.
    pub fn contains(&self, date: NaiveDate, alive_until: NaiveDate) -> bool {
        let end = self.death.unwrap_or(alive_until);
        self.first <= date && date < end
    }
}
