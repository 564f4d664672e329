//! Timeline censoring.
//!
//! A row is kept when its representative date lies in the subject's presence
//! window `[first, death)`. Subjects without a recorded death are treated as
//! alive until the sentinel date, the latest representative date in the
//! panel, so the final period itself is never retained for them.

use std::collections::BTreeMap;

use acb_model::{PresenceWindow, SubjectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::panel::EnrichedPanel;

/// Treatment of subjects that have no presence window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsentWindowPolicy {
    /// Drop all of the subject's rows.
    #[default]
    Exclude,
    /// Treat the subject as present from their first row until the
    /// sentinel date.
    AlwaysPresent,
}

#[derive(Debug, Clone)]
pub struct CensorOutcome {
    pub panel: EnrichedPanel,
    /// Stand-in death date; `None` only for an empty panel.
    pub sentinel: Option<NaiveDate>,
    /// Rows dropped for falling outside the subject's window.
    pub outside_window: usize,
    /// Rows dropped because the subject has no window.
    pub without_window: usize,
}

impl CensorOutcome {
    pub fn dropped(&self) -> usize {
        self.outside_window + self.without_window
    }
}

/// Keep the rows inside each subject's presence window.
pub fn censor(
    panel: EnrichedPanel,
    windows: &BTreeMap<SubjectId, PresenceWindow>,
    policy: AbsentWindowPolicy,
) -> CensorOutcome {
    let Some(sentinel) = panel.max_date() else {
        return CensorOutcome {
            panel,
            sentinel: None,
            outside_window: 0,
            without_window: 0,
        };
    };

    let mut outside_window = 0usize;
    let mut without_window = 0usize;
    let panel = panel.filter(|record| match windows.get(&record.subject) {
        Some(window) => {
            let keep = window.contains(record.date(), sentinel);
            if !keep {
                outside_window += 1;
            }
            keep
        }
        None => {
            let keep = match policy {
                AbsentWindowPolicy::Exclude => false,
                AbsentWindowPolicy::AlwaysPresent => record.date() < sentinel,
            };
            if !keep {
                without_window += 1;
            }
            keep
        }
    });

    debug!(
        %sentinel,
        rows = panel.len(),
        outside_window,
        without_window,
        "panel censored"
    );
    CensorOutcome {
        panel,
        sentinel: Some(sentinel),
        outside_window,
        without_window,
    }
}
