//! Challenge header parsing and scheme description

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqcap_core::{Error, Result, MAX_COMBINED_CREDENTIAL_LEN};

/// Static description of a negotiated authentication scheme variant
#[derive(Debug, Clone)]
pub struct SchemeDescriptor {
    /// Signature this scheme answers to in challenge headers,
    /// e.g. `Negotiate`
    pub signature: &'static str,
    /// Whether credentials may be attached before any server challenge
    pub supports_preauth: bool,
    /// Kerberos-like variants can authenticate the server back to the
    /// client, which changes downstream connection-reuse decisions
    pub kerberos_like: bool,
    /// Cap on combined username+password+domain length
    pub max_credential_len: usize,
}

impl SchemeDescriptor {
    #[must_use]
    pub fn negotiate() -> Self {
        Self {
            signature: "Negotiate",
            supports_preauth: true,
            kerberos_like: true,
            max_credential_len: MAX_COMBINED_CREDENTIAL_LEN,
        }
    }

    #[must_use]
    pub fn ntlm_like() -> Self {
        Self {
            signature: "NTLM",
            supports_preauth: false,
            kerberos_like: false,
            max_credential_len: MAX_COMBINED_CREDENTIAL_LEN,
        }
    }
}

/// Parsed challenge for one scheme signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Challenge {
    /// The header does not offer this scheme at all
    NotOffered,
    /// Bare signature: first leg, no continuation blob yet
    Initial,
    /// Signature followed by a base64 continuation blob
    Continuation(Vec<u8>),
}

/// Extract this scheme's portion of a challenge header.
///
/// Headers may concatenate several schemes separated by commas
/// (`Negotiate, NTLM, Basic realm="x"`); only the segment matching
/// `signature` is considered. A segment carrying a blob that does not
/// decode is a protocol violation.
pub fn parse_challenge(header: &str, signature: &str) -> Result<Challenge> {
    for segment in header.split(',') {
        let segment = segment.trim();
        let Some(head) = segment.get(..signature.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(signature) {
            continue;
        }
        let rest = &segment[signature.len()..];
        if rest.is_empty() {
            return Ok(Challenge::Initial);
        }
        if !rest.starts_with(' ') {
            // Different scheme sharing a prefix, e.g. "Negotiate2"
            continue;
        }
        let blob = rest.trim_start();
        if blob.is_empty() {
            return Ok(Challenge::Initial);
        }
        return BASE64
            .decode(blob)
            .map(Challenge::Continuation)
            .map_err(|_| Error::malformed_challenge(signature, header));
    }
    Ok(Challenge::NotOffered)
}

/// Render an outgoing token as an authorization header value
#[must_use]
pub fn authorization_header(signature: &str, token: &[u8]) -> String {
    format!("{} {}", signature, BASE64.encode(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_signature_is_initial() {
        let challenge = parse_challenge("Negotiate", "Negotiate").expect("header parses");
        assert_eq!(challenge, Challenge::Initial);
    }

    #[test]
    fn blob_is_decoded() {
        let header = format!("Negotiate {}", BASE64.encode(b"blobA"));
        let challenge = parse_challenge(&header, "Negotiate").expect("header parses");
        assert_eq!(challenge, Challenge::Continuation(b"blobA".to_vec()));
    }

    #[test]
    fn scheme_extracted_from_multi_scheme_header() {
        let header = format!("NTLM, Negotiate {}, Basic realm=\"x\"", BASE64.encode(b"tok"));
        let challenge = parse_challenge(&header, "Negotiate").expect("header parses");
        assert_eq!(challenge, Challenge::Continuation(b"tok".to_vec()));

        let ntlm = parse_challenge(&header, "NTLM").expect("header parses");
        assert_eq!(ntlm, Challenge::Initial);
    }

    #[test]
    fn signature_match_is_case_insensitive() {
        let challenge = parse_challenge("negotiate", "Negotiate").expect("header parses");
        assert_eq!(challenge, Challenge::Initial);
    }

    #[test]
    fn prefix_sharing_scheme_is_not_confused() {
        let challenge = parse_challenge("NegotiateX abc", "Negotiate").expect("header parses");
        assert_eq!(challenge, Challenge::NotOffered);
    }

    #[test]
    fn absent_scheme_is_not_offered() {
        let challenge = parse_challenge("Basic realm=\"x\"", "Negotiate").expect("header parses");
        assert_eq!(challenge, Challenge::NotOffered);
    }

    #[test]
    fn undecodable_blob_is_a_protocol_violation() {
        let err = parse_challenge("Negotiate !!!not-base64!!!", "Negotiate")
            .expect_err("malformed blob must fail");
        assert!(matches!(
            err,
            reqcap_core::Error::MalformedChallenge { .. }
        ));
    }

    #[test]
    fn authorization_header_round_trips() {
        let header = authorization_header("Negotiate", b"blobA");
        let parsed = parse_challenge(&header, "Negotiate").expect("own output parses");
        assert_eq!(parsed, Challenge::Continuation(b"blobA".to_vec()));
    }
}
