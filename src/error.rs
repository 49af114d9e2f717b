use thiserror::Error;

/// Failure to obtain bars for one instrument.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider} API error ({code}): {msg}")]
    Api {
        provider: &'static str,
        code: String,
        msg: String,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Failure to deliver the digest.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("channel rejected message (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Configuration value outside its allowed range.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Invalid(String),
}

/// Collapse an error body onto one short line for logs and error messages.
pub fn compact_body(body: &str) -> String {
    let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() > 180 {
        let cut: String = normalized.chars().take(180).collect();
        format!("{}...", cut)
    } else {
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_body_flattens_whitespace() {
        assert_eq!(compact_body("  a\n b\t\tc "), "a b c");
    }

    #[test]
    fn compact_body_truncates_long_bodies() {
        let long = "x".repeat(500);
        let out = compact_body(&long);
        assert_eq!(out.len(), 183);
        assert!(out.ends_with("..."));
    }
}
