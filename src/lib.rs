#![warn(missing_docs)]
//! Vigil watches web pages for changes to a target element's text and
//! notifies configured channels when the value changes.

pub mod classifier;
pub mod config;
pub mod extractor;
pub mod models;
pub mod notification;
pub mod persistence;
pub mod registry;
pub mod scheduler;
pub mod test_helpers;
