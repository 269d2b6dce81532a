//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use validator::Validate;

use crate::error::DeblogError;

/// Validate a request body, returning a DeblogError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), DeblogError> {
    body.validate().map_err(|e| DeblogError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a peer hostname before it enters the directory.
///
/// Accepts `host` or `host:port`. Rejects empty strings, whitespace and
/// control characters, characters that are not host-legal, and the local
/// instance's own hostname (a node federating with itself would echo every
/// post back into its own cache).
pub fn validate_hostname(hostname: &str, own_hostname: &str) -> Result<(), DeblogError> {
    if hostname.is_empty() {
        return Err(DeblogError::Validation {
            message: "Hostname cannot be empty".into(),
        });
    }

    if hostname.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(DeblogError::Validation {
            message: "Hostname cannot contain whitespace or control characters".into(),
        });
    }

    let (host, port) = match hostname.rsplit_once(':') {
        Some((h, p)) => (h, Some(p)),
        None => (hostname, None),
    };

    if host.is_empty()
        || !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(DeblogError::Validation {
            message: "Hostname contains invalid characters".into(),
        });
    }

    if let Some(port) = port {
        if port.is_empty() || port.parse::<u16>().is_err() {
            return Err(DeblogError::Validation {
                message: "Hostname has an invalid port".into(),
            });
        }
    }

    if hostname.eq_ignore_ascii_case(own_hostname) {
        return Err(DeblogError::Validation {
            message: "Cannot add this instance as its own peer".into(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_hostname;

    const SELF: &str = "blog-a.example";

    #[test]
    fn accepts_plain_and_ported_hostnames() {
        assert!(validate_hostname("blog-b.example", SELF).is_ok());
        assert!(validate_hostname("blog-b.example:5000", SELF).is_ok());
        assert!(validate_hostname("10.0.0.2:8080", SELF).is_ok());
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert!(validate_hostname("", SELF).is_err());
        assert!(validate_hostname("blog b.example", SELF).is_err());
        assert!(validate_hostname("blog-b.example\n", SELF).is_err());
        assert!(validate_hostname("\tblog-b.example", SELF).is_err());
    }

    #[test]
    fn rejects_illegal_characters() {
        assert!(validate_hostname("http://blog-b.example", SELF).is_err());
        assert!(validate_hostname("blog-b.example/path", SELF).is_err());
        assert!(validate_hostname("blog_b.example", SELF).is_err());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(validate_hostname("blog-b.example:", SELF).is_err());
        assert!(validate_hostname("blog-b.example:http", SELF).is_err());
        assert!(validate_hostname("blog-b.example:99999", SELF).is_err());
    }

    #[test]
    fn rejects_own_hostname() {
        assert!(validate_hostname("blog-a.example", SELF).is_err());
        assert!(validate_hostname("BLOG-A.EXAMPLE", SELF).is_err());
    }
}
