use std::sync::OnceLock;

use regex::Regex;

// Compiled once, reused for every form submission
static URL_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static BARE_ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn url_patterns() -> &'static [Regex] {
    URL_PATTERNS.get_or_init(|| {
        [
            r"(?:https?://)?(?:www\.)?youtube\.com/watch\?v=([^&]+)",
            r"(?:https?://)?(?:www\.)?youtu\.be/([^?]+)",
            r"(?:https?://)?(?:www\.)?youtube\.com/embed/([^?]+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("Invalid video URL pattern"))
        .collect()
    })
}

/// Extract the video ID from the usual YouTube URL shapes, or accept a bare
/// 11-character ID. Returns `None` when the input is not recognizable, which
/// the app uses to reject the form before spending a network round-trip.
pub fn extract_video_id(input: &str) -> Option<&str> {
    let input = input.trim();

    for pattern in url_patterns() {
        if let Some(captures) = pattern.captures(input) {
            if let Some(id) = captures.get(1) {
                return Some(id.as_str());
            }
        }
    }

    let bare_id = BARE_ID_PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("Invalid video ID pattern"));
    if bare_id.is_match(input) {
        return Some(input);
    }

    None
}
