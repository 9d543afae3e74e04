//! Email address pattern used by the checkout form.

use std::sync::LazyLock;

use regex::Regex;

/// Address pattern accepted by the checkout form: lowercase local part,
/// dotted domain, 2-4 letter top-level domain.
pub const EMAIL_PATTERN: &str = r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,4}$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Whether `s` matches [`EMAIL_PATTERN`].
#[must_use]
pub fn matches_pattern(s: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(s))
}
