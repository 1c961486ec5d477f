//! The closed set of event categories a scrape cycle can produce.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The classification of a scrape outcome relative to the prior observation.
///
/// Channel subscriptions are validated against this enum at configuration
/// load time; an unrecognized category name fails deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// The watcher produced a value for the first time.
    FirstScrape,
    /// The extracted value is identical (or numerically equal) to the
    /// previous one.
    NoChange,
    /// The extracted value differs textually and at least one side does not
    /// parse as a number.
    Change,
    /// Both values parse as numbers and the new one is greater.
    NumericUp,
    /// Both values parse as numbers and the new one is smaller.
    NumericDown,
    /// The element was not found on the page.
    Error,
}

impl EventCategory {
    /// Whether this category is a refinement of [`EventCategory::Change`].
    ///
    /// A channel subscribed to `change` also receives `numeric_up` and
    /// `numeric_down` events.
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Change | Self::NumericUp | Self::NumericDown)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FirstScrape => "first_scrape",
            Self::NoChange => "no_change",
            Self::Change => "change",
            Self::NumericUp => "numeric_up",
            Self::NumericDown => "numeric_down",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}
