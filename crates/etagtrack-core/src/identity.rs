use sha2::{Digest, Sha256};

/// Length of a client identifier: 18 hex characters, short enough to ride
/// unobtrusively inside an ETag while staying distinguishable for demo use.
pub const IDENTIFIER_LEN: usize = 18;

/// Recover an identifier from an echoed `If-None-Match` value.
///
/// The server issues the identifier quoted (`ETag: "<id>"`), and caches or
/// intermediaries may add a weak prefix (`W/`) or a quality-like suffix
/// (`"<id>.0"`), so the echo is normalised before use: strip the `W/` prefix
/// and surrounding quotes, then drop every backslash, forward slash, and
/// period, then truncate to [`IDENTIFIER_LEN`].
///
/// Returns `None` when the cleaned value is shorter than [`IDENTIFIER_LEN`] —
/// such a value cannot be one of ours, and the caller should fall back to
/// fresh derivation rather than mint an attacker-chosen identifier.
pub fn sanitize_validator(raw: &str) -> Option<String> {
    let trimmed = raw
        .trim()
        .trim_start_matches("W/")
        .trim_matches('"');

    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '\\' | '/' | '.'))
        .take(IDENTIFIER_LEN)
        .collect();

    if cleaned.chars().count() < IDENTIFIER_LEN {
        return None;
    }
    Some(cleaned)
}

/// Derive a fresh identifier from first-contact fingerprint material.
///
/// Formula: `sha256(secret + hex(sha256(addr)) + hex(sha256(user_agent)))`,
/// truncated to the first [`IDENTIFIER_LEN`] hex characters. Folding in the
/// server secret keeps outsiders from recomputing a victim's identifier from
/// observed address and user-agent alone. Deterministic for fixed inputs;
/// empty inputs hash like any other string, so this never fails.
pub fn fingerprint_identifier(secret: &str, addr: &str, user_agent: &str) -> String {
    let addr_digest = hex::encode(Sha256::digest(addr.as_bytes()));
    let ua_digest = hex::encode(Sha256::digest(user_agent.as_bytes()));
    let combined = format!("{secret}{addr_digest}{ua_digest}");
    let mut id = hex::encode(Sha256::digest(combined.as_bytes()));
    id.truncate(IDENTIFIER_LEN);
    id
}

/// Compute the identifier for a request: reuse the echoed validator when one
/// survives sanitization, otherwise derive from fingerprint material.
pub fn derive_identifier(
    validator: Option<&str>,
    secret: &str,
    addr: &str,
    user_agent: &str,
) -> String {
    if let Some(id) = validator.and_then(sanitize_validator) {
        return id;
    }
    fingerprint_identifier(secret, addr, user_agent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_18_hex_chars() {
        let id = fingerprint_identifier("s3cr3t", "1.2.3.4", "TestAgent/1.0");
        assert_eq!(id.len(), IDENTIFIER_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = fingerprint_identifier("s3cr3t", "1.2.3.4", "TestAgent/1.0");
        let b = fingerprint_identifier("s3cr3t", "1.2.3.4", "TestAgent/1.0");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_differs_when_user_agent_differs() {
        let a = fingerprint_identifier("s3cr3t", "1.2.3.4", "TestAgent/1.0");
        let b = fingerprint_identifier("s3cr3t", "1.2.3.4", "TestAgent/2.0");
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_differs_when_secret_differs() {
        let a = fingerprint_identifier("secret-one", "1.2.3.4", "TestAgent/1.0");
        let b = fingerprint_identifier("secret-two", "1.2.3.4", "TestAgent/1.0");
        assert_ne!(a, b);
    }

    #[test]
    fn sanitize_round_trips_quoted_validator() {
        let id = "AAAAAAAAAAAAAAAAAA";
        assert_eq!(sanitize_validator("\"AAAAAAAAAAAAAAAAAA\"").as_deref(), Some(id));
    }

    #[test]
    fn sanitize_round_trips_quoted_validator_with_suffix() {
        let id = "AAAAAAAAAAAAAAAAAA";
        assert_eq!(sanitize_validator("\"AAAAAAAAAAAAAAAAAA.0\"").as_deref(), Some(id));
    }

    #[test]
    fn sanitize_round_trips_weak_validator() {
        let id = "abcdef012345678901";
        assert_eq!(sanitize_validator("W/\"abcdef012345678901\"").as_deref(), Some(id));
    }

    #[test]
    fn sanitize_strips_slashes_and_backslashes() {
        assert_eq!(
            sanitize_validator("ab\\cd/ef.0123456789012345").as_deref(),
            Some("abcdef012345678901")
        );
    }

    #[test]
    fn sanitize_rejects_short_input() {
        assert_eq!(sanitize_validator("\"short\""), None);
        assert_eq!(sanitize_validator(""), None);
        // Long enough raw, but too short once the strip set is removed.
        assert_eq!(sanitize_validator("................abcd"), None);
    }

    #[test]
    fn sanitize_truncates_overlong_input() {
        let sanitized = sanitize_validator("\"AAAAAAAAAAAAAAAAAABBBB\"");
        assert_eq!(sanitized.as_deref(), Some("AAAAAAAAAAAAAAAAAA"));
    }

    #[test]
    fn derive_prefers_echoed_validator() {
        let id = derive_identifier(
            Some("\"AAAAAAAAAAAAAAAAAA\""),
            "s3cr3t",
            "1.2.3.4",
            "TestAgent/1.0",
        );
        assert_eq!(id, "AAAAAAAAAAAAAAAAAA");
    }

    #[test]
    fn derive_falls_back_to_fingerprint_on_garbage() {
        let fresh = fingerprint_identifier("s3cr3t", "1.2.3.4", "TestAgent/1.0");
        let id = derive_identifier(Some("\"...\""), "s3cr3t", "1.2.3.4", "TestAgent/1.0");
        assert_eq!(id, fresh);
        let id = derive_identifier(None, "s3cr3t", "1.2.3.4", "TestAgent/1.0");
        assert_eq!(id, fresh);
    }
}
