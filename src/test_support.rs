use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::fetch::{FetchError, PageFetcher};

/// Serves canned page text and records every URL it was asked for.
/// URLs without a canned page fail with [`FetchError::Status`] 404, and
/// strings without a scheme fail the way reqwest rejects them before sending.
#[derive(Default)]
pub struct FakeFetcher {
    pub pages: HashMap<String, String>,
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakeFetcher {
    pub fn with_page(mut self, url: &str, content: &str) -> Self {
        self.pages.insert(url.to_string(), content.to_string());
        self
    }

    /// Handle on the call log that stays valid after the fetcher is moved.
    pub fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if !url.contains("://") {
            let err = reqwest::Client::new().get(url).build().unwrap_err();
            return Err(FetchError::Request(err));
        }
        match self.pages.get(url) {
            Some(content) if content.is_empty() => Err(FetchError::Empty),
            Some(content) => Ok(content.clone()),
            None => Err(FetchError::Status(404)),
        }
    }
}
