use thiserror::Error;

use crate::auth::AuthError;

#[derive(Error, Debug)]
pub enum YouTubeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("video not found (id = {0})")]
    VideoNotFound(String),

    #[error("no active live chat (id = {0})")]
    NotLive(String),

    #[error("YouTube API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse response: {0}")]
    Parse(String),
}
