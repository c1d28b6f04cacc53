use tracing::warn;

/// Launches the authorize URL in the user's browser.
pub trait UrlOpener: Send + Sync {
    /// Returns whether a launch was attempted successfully.
    fn open(&self, url: &str) -> bool;
}

/// Opens URLs with the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> bool {
        match open::that(url) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Could not open browser");
                false
            }
        }
    }
}

/// Records URLs instead of opening them.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: std::sync::Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// URLs "opened" so far.
    pub fn opened(&self) -> Vec<String> {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> bool {
        self.opened
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(url.to_string());
        true
    }
}
