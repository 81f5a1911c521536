//! DOM content change detection.
//!
//! Filtering UIs re-render their result list without any reliable "done"
//! event, so the harness snapshots the container markup, fingerprints it, and
//! polls until the digest differs. A fingerprint supports equality and
//! nothing else.
//!
//! Known limitation: a re-render that produces byte-identical markup hashes
//! to the same digest and is invisible here (false negative). Callers that
//! care about meaning, not markup, must follow a change wait with a semantic
//! check; see the filter waiter.

use crate::result::RecorrerResult;
use crate::wait::{self, WaitOptions};
use sha2::{Digest, Sha256};

/// Digest of a DOM content snapshot. Compare for equality, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    /// The lowercase hex digest
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fingerprint a content snapshot. Pure and deterministic: equal input,
/// equal digest, on every run and every platform.
#[must_use]
pub fn fingerprint(content: &str) -> ContentFingerprint {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    ContentFingerprint(format!("{result:x}"))
}

/// Poll `fetch_current` until its fingerprint differs from `previous`.
///
/// Returns the first differing digest. Fetch errors abort the wait; an
/// unchanged digest through the deadline times out with the options'
/// message.
pub fn wait_for_change<F>(
    previous: &ContentFingerprint,
    mut fetch_current: F,
    options: &WaitOptions,
) -> RecorrerResult<ContentFingerprint>
where
    F: FnMut() -> RecorrerResult<String>,
{
    let mut latest: Option<ContentFingerprint> = None;
    wait::wait_for(
        || {
            let current = fingerprint(&fetch_current()?);
            if current == *previous {
                Ok(false)
            } else {
                latest = Some(current);
                Ok(true)
            }
        },
        options,
    )?;
    // The closure stored a digest before the wait resolved.
    latest.ok_or_else(|| crate::result::RecorrerError::script("change wait resolved without a digest"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(40).with_poll_interval(1)
    }

    mod fingerprint_tests {
        use super::*;

        #[test]
        fn deterministic_for_equal_input() {
            assert_eq!(fingerprint("<div>QA</div>"), fingerprint("<div>QA</div>"));
        }

        #[test]
        fn differs_for_different_input() {
            assert_ne!(fingerprint("<div>QA</div>"), fingerprint("<div>QA </div>"));
        }

        #[test]
        fn digest_is_lowercase_hex() {
            let digest = fingerprint("jobs");
            assert_eq!(digest.as_hex().len(), 64);
            assert!(digest
                .as_hex()
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }

        #[test]
        fn empty_content_is_a_valid_snapshot() {
            let digest = fingerprint("");
            assert_eq!(digest, fingerprint(""));
            assert_ne!(digest, fingerprint(" "));
        }
    }

    mod wait_for_change_tests {
        use super::*;

        #[test]
        fn resolves_on_first_differing_snapshot() {
            let previous = fingerprint("before");
            let mut polls = 0u32;
            let next = wait_for_change(
                &previous,
                || {
                    polls += 1;
                    if polls < 3 {
                        Ok("before".to_string())
                    } else {
                        Ok("after".to_string())
                    }
                },
                &fast(),
            )
            .unwrap();
            assert_eq!(next, fingerprint("after"));
        }

        #[test]
        fn unchanged_content_times_out() {
            let previous = fingerprint("same");
            let err = wait_for_change(
                &previous,
                || Ok("same".to_string()),
                &fast().with_message("job list did not re-render"),
            )
            .unwrap_err();
            assert!(err.is_timeout());
            assert!(err.to_string().contains("job list did not re-render"));
        }

        #[test]
        fn fetch_error_aborts() {
            let previous = fingerprint("x");
            let err = wait_for_change(
                &previous,
                || Err(crate::result::RecorrerError::script("stale element")),
                &fast(),
            )
            .unwrap_err();
            assert!(!err.is_timeout());
        }

        #[test]
        fn identical_rerender_is_invisible() {
            // The documented false negative: same markup, same digest.
            let previous = fingerprint("<li>row</li>");
            let err = wait_for_change(&previous, || Ok("<li>row</li>".to_string()), &fast())
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn fingerprint_is_pure(content in ".*") {
                prop_assert_eq!(fingerprint(&content), fingerprint(&content));
            }
        }
    }
}
