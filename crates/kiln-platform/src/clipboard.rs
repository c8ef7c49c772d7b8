//! Text clipboard for the `clipboard-read` / `clipboard-write` ops.

use kiln_common::PlatformError;
use tracing::debug;

/// System clipboard, connected on first use.
///
/// Connecting can fail on headless sessions; a failed attempt is retried on
/// the next call instead of being remembered.
#[derive(Default)]
pub struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn connect(&mut self) -> Result<&mut arboard::Clipboard, PlatformError> {
        if self.inner.is_none() {
            debug!("connecting to system clipboard");
            self.inner = Some(arboard::Clipboard::new().map_err(clipboard_error)?);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| PlatformError::ClipboardError("clipboard unavailable".into()))
    }

    /// Current text contents. A clipboard holding no text reads as empty.
    pub fn read_text(&mut self) -> Result<String, PlatformError> {
        text_or_empty(self.connect()?.get_text())
    }

    pub fn write_text(&mut self, text: &str) -> Result<(), PlatformError> {
        self.connect()?
            .set_text(text.to_owned())
            .map_err(clipboard_error)
    }
}

fn text_or_empty(read: Result<String, arboard::Error>) -> Result<String, PlatformError> {
    match read {
        Ok(text) => Ok(text),
        Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
        Err(e) => Err(clipboard_error(e)),
    }
}

fn clipboard_error(e: arboard::Error) -> PlatformError {
    PlatformError::ClipboardError(e.to_string())
}
