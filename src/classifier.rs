//! The value classifier: a pure comparison of the previously observed value
//! against a fresh extraction result, producing an event category and a
//! human-readable message.

use crate::{extractor::ExtractResult, models::EventCategory};

/// The outcome of classifying a scrape result.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The category of change that occurred.
    pub category: EventCategory,
    /// The message delivered to subscribed channels and log output.
    pub message: String,
}

/// Coerces a raw extracted string to a float for numeric comparison.
///
/// Strips every character that is not an ASCII digit or `.`, then parses the
/// remainder. Returns `None` when nothing numeric is left or the stripped
/// string is not a valid number (e.g. `"1.2.3"`).
pub fn coerce_to_float(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if stripped.is_empty() {
        return None;
    }
    stripped.parse().ok()
}

/// Classifies a fresh extraction result against the previous observation.
///
/// `previous` is the last observed value (`None` means never observed) and
/// `previously_scraped` records whether any scrape has completed before,
/// which only affects the phrasing of the not-found message.
pub fn classify(
    previous: Option<&str>,
    previously_scraped: bool,
    current: &ExtractResult,
) -> Classification {
    let current = match current {
        ExtractResult::NotFound => {
            let message = if previously_scraped {
                "Element not found".to_string()
            } else {
                "Element not found on first scrape".to_string()
            };
            return Classification { category: EventCategory::Error, message };
        }
        ExtractResult::Found(text) => text,
    };

    let previous = match previous {
        None => {
            return Classification {
                category: EventCategory::FirstScrape,
                message: format!("First scrape: {current}"),
            };
        }
        Some(previous) => previous,
    };

    if previous == current {
        return Classification {
            category: EventCategory::NoChange,
            message: format!("No change: {current}"),
        };
    }

    if let (Some(old), Some(new)) = (coerce_to_float(previous), coerce_to_float(current)) {
        if new > old {
            return Classification {
                category: EventCategory::NumericUp,
                message: format!("Value increased from {previous} to {current}"),
            };
        }
        if new < old {
            return Classification {
                category: EventCategory::NumericDown,
                message: format!("Value decreased from {previous} to {current}"),
            };
        }
        // Numerically equal despite different raw text, e.g. "$10.00" vs
        // "$10.0". Treated as no change; the raw text is still persisted.
        return Classification {
            category: EventCategory::NoChange,
            message: format!("No change: {current}"),
        };
    }

    Classification {
        category: EventCategory::Change,
        message: format!("Value changed from {previous} to {current}"),
    }
}
