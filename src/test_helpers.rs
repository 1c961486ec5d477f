//! A set of helpers for testing

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::extractor::{DriverError, PageDriver};

/// One scripted page load for the [`FakePageDriver`].
#[derive(Debug, Clone)]
pub enum ScriptedPage {
    /// Navigation succeeds; the element's text is the given value, or `None`
    /// when the selector matches nothing.
    Element(Option<String>),
    /// Navigation fails with a transport-level error.
    NavigationError,
}

/// A scripted stand-in for the browser session.
///
/// Each `goto` consumes the next scripted page; subsequent element lookups
/// observe that page. Navigating past the end of the script is an error, so
/// tests fail loudly when a cycle extracts more often than expected.
pub struct FakePageDriver {
    pages: Mutex<VecDeque<ScriptedPage>>,
    current: Mutex<Option<String>>,
    goto_calls: AtomicUsize,
}

impl FakePageDriver {
    /// Creates a driver that will serve the given pages in order.
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            current: Mutex::new(None),
            goto_calls: AtomicUsize::new(0),
        }
    }

    /// The number of navigations performed so far.
    pub fn goto_calls(&self) -> usize {
        self.goto_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageDriver for FakePageDriver {
    async fn goto(&self, _url: &str) -> Result<(), DriverError> {
        self.goto_calls.fetch_add(1, Ordering::SeqCst);
        let page = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DriverError::ScriptResult("scripted pages exhausted".to_string()))?;
        match page {
            ScriptedPage::Element(text) => {
                *self.current.lock().unwrap() = text;
                Ok(())
            }
            ScriptedPage::NavigationError => {
                Err(DriverError::ScriptResult("scripted navigation failure".to_string()))
            }
        }
    }

    async fn element_text(&self, _selector: &str) -> Result<Option<String>, DriverError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn scroll_to_bottom(&self) -> Result<(), DriverError> {
        Ok(())
    }

    async fn page_height(&self) -> Result<u64, DriverError> {
        Ok(0)
    }

    async fn close(&self) -> Result<(), DriverError> {
        Ok(())
    }
}
