//! Field validators for the registration flow.
//!
//! Strict-reject: an input either matches the expected format exactly or the
//! state machine re-prompts. Nothing is sanitized or partially accepted.

use std::sync::LazyLock;

use regex::Regex;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z ]{1,100}$").expect("valid name pattern"));

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Z0-9]{3,4}$").expect("valid title pattern"));

static DEPARTMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-zA-Z0-9 ]{2,5}$").expect("valid department pattern"));

/// Letters and spaces only, 1–100 characters.
pub fn valid_name(input: &str) -> bool {
    NAME_RE.is_match(input)
}

/// Alphanumeric, 3–4 characters. Expects the already upper-cased token.
pub fn valid_title(input: &str) -> bool {
    TITLE_RE.is_match(input)
}

/// Alphanumeric and spaces, 2–5 characters.
pub fn valid_department(input: &str) -> bool {
    DEPARTMENT_RE.is_match(input)
}
