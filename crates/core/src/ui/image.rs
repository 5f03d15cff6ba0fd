//! Image loading with a single fallback source.

/// Load state of an image with an optional fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState {
    Loading,
    Loaded,
    Errored,
    FallbackLoading,
    FallbackLoaded,
}

/// Tracks which source an image element should show.
///
/// The primary source gets one attempt; on error the fallback (if any) gets
/// one attempt; a second error is terminal.
#[derive(Debug, Clone)]
pub struct FallbackImage {
    src: String,
    fallback: Option<String>,
    state: ImageState,
}

impl FallbackImage {
    pub fn new(src: impl Into<String>, fallback: Option<String>) -> Self {
        Self { src: src.into(), fallback, state: ImageState::Loading }
    }

    pub fn state(&self) -> ImageState {
        self.state
    }

    /// Source the element should currently point at. `None` once both failed.
    pub fn current_src(&self) -> Option<&str> {
        match self.state {
            ImageState::Loading | ImageState::Loaded => Some(&self.src),
            ImageState::FallbackLoading | ImageState::FallbackLoaded => self.fallback.as_deref(),
            ImageState::Errored => None,
        }
    }

    /// Whether the image has painted (either source).
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, ImageState::Loaded | ImageState::FallbackLoaded)
    }

    pub fn on_load(&mut self) {
        self.state = match self.state {
            ImageState::Loading => ImageState::Loaded,
            ImageState::FallbackLoading => ImageState::FallbackLoaded,
            other => other,
        };
    }

    pub fn on_error(&mut self) {
        self.state = match self.state {
            ImageState::Loading => match self.fallback.as_deref() {
                Some(fallback) if fallback != self.src => ImageState::FallbackLoading,
                _ => ImageState::Errored,
            },
            ImageState::FallbackLoading => ImageState::Errored,
            other => other,
        };
    }
}
