use thiserror::Error;

/// Fatal pipeline errors. Everything recoverable (missing DOM elements,
/// a dead "load more" control) is handled in place with sentinel defaults
/// or an early stop; these variants are the three failures that abort the
/// whole run.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("image fetch from {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("image decode for {url} failed: {reason}")]
    Decode { url: String, reason: String },
}
