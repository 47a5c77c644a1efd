//! Error types for marquee-core.
//!
//! Render-time problems (a missing variable, a bad transform, an
//! out-of-range value) never abort a tick — they degrade to placeholder
//! output and a log line. `MarqueeError` therefore only travels on the
//! page-build path, where a broken descriptor must reach the host.

/// Error type for marquee-core operations.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    /// A referenced variable is not in the store.
    #[error("variable `{0}` not found")]
    MissingVariable(String),

    /// A transform request could not be applied.
    #[error("bad transform `{0}`: {1}")]
    BadTransform(String, String),

    /// A format template could not be filled in.
    #[error("format error: {0}")]
    BadFormat(String),

    /// A font pack is unusable (e.g. missing the `'?'` fallback glyph).
    #[error("font error: {0}")]
    Font(String),

    /// A widget references a font the page does not define.
    #[error("unknown font `{0}`")]
    UnknownFont(String),

    /// A canvas or sequence references a widget the page does not define.
    #[error("unknown widget `{0}`")]
    UnknownWidget(String),

    /// A widget record is missing mandatory fields or carries bad values.
    #[error("invalid widget spec for `{0}`: {1}")]
    InvalidWidgetSpec(String, String),

    /// Canvas nesting forms a cycle.
    #[error("canvas cycle involving `{0}`")]
    CyclicCanvas(String),

    /// A conditional expression failed to parse.
    #[error("conditional error: {0}")]
    Conditional(String),

    /// The page descriptor as a whole is unusable.
    #[error("page error: {0}")]
    Page(String),
}

/// Result type alias for marquee-core operations.
pub type Result<T> = std::result::Result<T, MarqueeError>;
