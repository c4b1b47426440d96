//! In-memory browser and HTTP fakes for unit tests.

use crate::error::{FetchError, LoadError};
use crate::scrapers::articles::PageFetcher;
use crate::scrapers::scroll::{BrowserLauncher, RenderedPage};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Default)]
pub struct FakePageState {
    pub html: String,
    pub heights: Vec<u64>,
    pub grow_forever: bool,
    pub height_reads: usize,
    pub scrolls: u32,
    pub navigated_to: Option<String>,
    pub closed: bool,
    pub fail_navigation: bool,
    pub stall_navigation: bool,
    pub fail_snapshot: bool,
}

/// A rendered page whose height follows a script.
///
/// Reads past the end of `heights` repeat the last value unless the page is
/// set to grow forever.
#[derive(Debug, Clone)]
pub struct FakePage {
    state: Arc<Mutex<FakePageState>>,
}

impl FakePage {
    pub fn with_heights(heights: Vec<u64>) -> Self {
        Self::from_state(FakePageState {
            html: "<html><body></body></html>".to_string(),
            heights,
            ..Default::default()
        })
    }

    pub fn growing() -> Self {
        Self::from_state(FakePageState {
            html: "<html><body></body></html>".to_string(),
            grow_forever: true,
            ..Default::default()
        })
    }

    /// A page that stops growing straight away and renders `html`.
    pub fn with_html(html: &str) -> Self {
        Self::from_state(FakePageState {
            html: html.to_string(),
            heights: vec![1000],
            ..Default::default()
        })
    }

    fn from_state(state: FakePageState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn failing_navigation(self) -> Self {
        self.state.lock().unwrap().fail_navigation = true;
        self
    }

    /// Navigation never completes.
    pub fn stalled_navigation(self) -> Self {
        self.state.lock().unwrap().stall_navigation = true;
        self
    }

    pub fn failing_snapshot(self) -> Self {
        self.state.lock().unwrap().fail_snapshot = true;
        self
    }

    pub fn state(&self) -> FakePageState {
        self.state.lock().unwrap().clone()
    }
}

impl RenderedPage for FakePage {
    async fn navigate(&mut self, url: &str) -> Result<(), LoadError> {
        let stalled = {
            let mut state = self.state.lock().unwrap();
            state.navigated_to = Some(url.to_string());
            if state.fail_navigation {
                return Err(LoadError::Browser("navigation timed out".to_string()));
            }
            state.stall_navigation
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn page_height(&mut self) -> Result<u64, LoadError> {
        let mut state = self.state.lock().unwrap();
        let read = state.height_reads;
        state.height_reads += 1;
        if state.grow_forever {
            return Ok(100 * (read as u64 + 1));
        }
        Ok(state
            .heights
            .get(read)
            .or(state.heights.last())
            .copied()
            .unwrap_or(0))
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), LoadError> {
        self.state.lock().unwrap().scrolls += 1;
        Ok(())
    }

    async fn snapshot(&mut self) -> Result<String, LoadError> {
        let state = self.state.lock().unwrap();
        if state.fail_snapshot {
            return Err(LoadError::Browser("target closed".to_string()));
        }
        Ok(state.html.clone())
    }

    async fn close(&mut self) -> Result<(), LoadError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Hands out a single prepared [`FakePage`].
pub struct FakeLauncher {
    page: Option<FakePage>,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self { page: Some(page) }
    }

    pub fn failing() -> Self {
        Self { page: None }
    }

    pub fn state(&self) -> FakePageState {
        self.page.as_ref().map(FakePage::state).unwrap_or_default()
    }
}

impl BrowserLauncher for FakeLauncher {
    type Page = FakePage;

    async fn launch(&self) -> Result<FakePage, LoadError> {
        self.page
            .clone()
            .ok_or_else(|| LoadError::Launch("chrome not found".to_string()))
    }
}

#[derive(Debug, Clone)]
pub enum FakeResponse {
    Body(String),
    Timeout,
}

/// Serves canned article bodies and records the order of requests.
#[derive(Debug, Default)]
pub struct FakeFetcher {
    responses: HashMap<String, FakeResponse>,
    requested: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, url: &str, body: &str) -> Self {
        self.responses
            .insert(url.to_string(), FakeResponse::Body(body.to_string()));
        self
    }

    pub fn timeout(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), FakeResponse::Timeout);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(FakeResponse::Body(body)) => Ok(body.clone()),
            Some(FakeResponse::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            }),
        }
    }
}

/// Collects formatted `tracing` output so tests can assert on log lines.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Route events on the current thread here until the guard is dropped.
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.lock().unwrap()).into_owned()
    }

    /// Lines logged at `level`, e.g. `"WARN"`.
    pub fn lines_at(&self, level: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.trim_start().starts_with(level))
            .map(String::from)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
