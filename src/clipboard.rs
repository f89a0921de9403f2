use crate::error::AtlasError;

/// Miejsce, do którego trafia link po "udostępnieniu"
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), AtlasError>;
}

/// Systemowy schowek (arboard); uchwyt otwierany przy pierwszym użyciu
#[derive(Default)]
pub struct SystemClipboard {
    #[cfg(not(target_os = "android"))]
    inner: Option<arboard::Clipboard>,
}

impl ClipboardSink for SystemClipboard {
    #[cfg(not(target_os = "android"))]
    fn set_text(&mut self, text: &str) -> Result<(), AtlasError> {
        let mut clipboard = match self.inner.take() {
            Some(c) => c,
            None => arboard::Clipboard::new().map_err(|e| AtlasError::Clipboard(e.to_string()))?,
        };
        let result = clipboard
            .set_text(text.to_string())
            .map_err(|e| AtlasError::Clipboard(e.to_string()));
        self.inner = Some(clipboard);
        result
    }

    #[cfg(target_os = "android")]
    fn set_text(&mut self, _text: &str) -> Result<(), AtlasError> {
        Err(AtlasError::Clipboard("clipboard not supported on Android".into()))
    }
}
