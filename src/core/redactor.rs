// src/core/redactor.rs

use crate::constants::{IP_PATTERN, OCID_PATTERN, REDACTED_IP, REDACTED_OCID};
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;

lazy_static! {
    static ref OCID_RE: Option<Regex> = Regex::new(OCID_PATTERN).ok();
    static ref IP_RE: Option<Regex> = Regex::new(IP_PATTERN).ok();
}

/// Replaces OCID-shaped and IPv4-shaped substrings with fixed markers.
///
/// The markers never match either pattern, so `redact(redact(x)) == redact(x)`.
/// If a pattern somehow failed to compile the whole text is withheld rather
/// than passed through unredacted.
pub fn redact(text: &str) -> Cow<'_, str> {
    let (Some(ocid_re), Some(ip_re)) = (OCID_RE.as_ref(), IP_RE.as_ref()) else {
        log::error!("Redaction patterns failed to compile; withholding output.");
        return Cow::Borrowed("[REDACTED]");
    };

    match ocid_re.replace_all(text, REDACTED_OCID) {
        Cow::Borrowed(unchanged) => ip_re.replace_all(unchanged, REDACTED_IP),
        Cow::Owned(owned) => Cow::Owned(ip_re.replace_all(&owned, REDACTED_IP).into_owned()),
    }
}

/// The output sink filter for one invocation.
///
/// `enabled` follows the `--redact/--no-redact` toggle and governs what the
/// user sees on the terminal. Log lines call [`redact`] directly and are
/// redacted regardless of the toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redactor {
    enabled: bool,
}

impl Default for Redactor {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Redactor {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.enabled {
            redact(text)
        } else {
            Cow::Borrowed(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacts_ocids_and_ips() {
        let text = "instance ocid1.instance.oc1.iad.abcdefg123 at 10.0.0.12 ok";
        assert_eq!(
            redact(text),
            "instance [REDACTED_OCID] at [REDACTED_IP] ok"
        );
    }

    #[test]
    fn test_redacts_regionless_ocid() {
        let text = "compartment: ocid1.compartment.oc1..aaaaexample";
        assert_eq!(redact(text), "compartment: [REDACTED_OCID]");
    }

    #[test]
    fn test_redaction_is_case_insensitive() {
        assert_eq!(redact("OCID1.TENANCY.OC1..AAAA"), "[REDACTED_OCID]");
    }

    #[test]
    fn test_redaction_is_idempotent() {
        let text = "ocid1.vcn.oc1.phx.xyz 192.168.1.1 and ocid1.subnet.oc1..q";
        let once = redact(text).into_owned();
        let twice = redact(&once).into_owned();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_text_is_borrowed() {
        assert!(matches!(redact("nothing to hide"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_disabled_redactor_passes_through() {
        let text = "10.1.2.3";
        assert_eq!(Redactor::new(false).apply(text), "10.1.2.3");
        assert_eq!(Redactor::default().apply(text), "[REDACTED_IP]");
    }
}
