//! Field sanitization.
//!
//! # Responsibilities
//! - Remove `<script>` blocks, HTML tags and inline event handlers
//! - Normalise whitespace per field
//! - Restrict phone numbers to dialable characters
//!
//! # Design Decisions
//! - Script blocks are removed before tag stripping so their bodies do not
//!   survive as plain text
//! - Event handler removal runs on tag-stripped text and repeats until no
//!   fragment is left
//! - Every field sanitizer is idempotent
//!
//! # Residual Risk
//! This is a regex filter, not an HTML parser. Markup obfuscated with
//! entities, unusual encodings or unterminated tags (`<script` with no
//! closing `>`) passes through as text. The validator rejects messages that
//! still carry script markers, and responses never render submissions as
//! HTML.

use std::sync::LazyLock;

use regex::Regex;

use crate::submission::Submission;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script block pattern")
});

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("html tag pattern"));

static QUOTED_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)on\w+\s*=\s*["'][^"']*["']"#).expect("quoted handler pattern")
});

static UNQUOTED_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)on\w+\s*=\s*[^\s>]*").expect("unquoted handler pattern")
});

static HORIZONTAL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("horizontal run pattern"));

static HORIZONTAL_ANY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("horizontal whitespace pattern"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("newline run pattern"));

static PHONE_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9+\s\-()]").expect("phone charset pattern"));

/// Remove every `<...>` tag.
pub fn strip_tags(input: &str) -> String {
    HTML_TAG.replace_all(input, "").into_owned()
}

/// Remove complete `<script>...</script>` blocks.
pub fn remove_script_blocks(input: &str) -> String {
    SCRIPT_BLOCK.replace_all(input, "").into_owned()
}

/// Remove `on<word>=...` attribute fragments, quoted or not.
pub fn remove_event_handlers(input: &str) -> String {
    let mut current = input.to_string();
    while UNQUOTED_HANDLER.is_match(&current) {
        let unquoted = QUOTED_HANDLER.replace_all(&current, "");
        current = UNQUOTED_HANDLER.replace_all(&unquoted, "").into_owned();
    }
    current
}

/// True if the text still carries an `on<word>=` fragment.
pub fn contains_event_handler(input: &str) -> bool {
    UNQUOTED_HANDLER.is_match(input)
}

fn remove_markup(input: &str) -> String {
    let without_scripts = remove_script_blocks(input);
    remove_event_handlers(&strip_tags(&without_scripts))
}

/// Sanitize a name.
///
/// Leading and trailing spaces are kept so this can run on partially typed
/// input without eating the space the user just entered.
pub fn sanitize_name(input: &str) -> String {
    HORIZONTAL_RUN
        .replace_all(&remove_markup(input), " ")
        .into_owned()
}

pub fn sanitize_email(input: &str) -> String {
    strip_tags(input).trim().to_lowercase()
}

pub fn sanitize_phone(input: &str) -> String {
    let stripped = strip_tags(input);
    PHONE_DISALLOWED
        .replace_all(&stripped, "")
        .trim()
        .to_string()
}

/// Sanitize a free-text message, keeping paragraph breaks.
pub fn sanitize_message(input: &str) -> String {
    let cleaned = remove_markup(input);
    let spaced = HORIZONTAL_ANY.replace_all(&cleaned, " ");
    EXCESS_NEWLINES
        .replace_all(&spaced, "\n\n")
        .trim()
        .to_string()
}

/// Sanitize every present field of a submission in place.
pub fn sanitize_submission(submission: &mut Submission) {
    if let Some(name) = submission.name.as_mut() {
        *name = sanitize_name(name);
    }
    if let Some(email) = submission.email.as_mut() {
        *email = sanitize_email(email);
    }
    if let Some(phone) = submission.phone.as_mut() {
        *phone = sanitize_phone(phone);
    }
    if let Some(message) = submission.message.as_mut() {
        *message = sanitize_message(message);
    }
}
