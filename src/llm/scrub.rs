//! Scrubbing for vendor error text before it reaches logs.
//!
//! Vendors occasionally echo the request's Authorization header or key query
//! parameter back inside error bodies. Anything after a known key marker is
//! redacted, and logged error bodies are truncated.

use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;

/// Prefixes/markers that introduce a secret token in vendor error text.
/// `sk-or-` before `sk-` so OpenRouter keys redact as one token.
const SECRET_MARKERS: [&str; 6] = ["sk-or-", "sk-", "AIza", "Bearer ", "Token ", "key="];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str) -> bool {
    let mut modified = false;
    let mut search_from = 0;
    loop {
        let Some(rel) = scrubbed[search_from..].find(marker) else {
            break;
        };

        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Skip bare markers without a token value.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        scrubbed.replace_range(start..end, "[REDACTED]");
        modified = true;
        search_from = start + "[REDACTED]".len();
    }

    modified
}

/// Redact anything that looks like a vendor credential.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    if !SECRET_MARKERS.iter().any(|marker| input.contains(marker)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    let mut modified = false;
    for marker in SECRET_MARKERS {
        modified |= scrub_after_marker(&mut scrubbed, marker);
    }

    if modified {
        Cow::Owned(scrubbed)
    } else {
        Cow::Borrowed(input)
    }
}

/// Scrub and truncate a vendor error body so it is safe to log.
pub fn sanitize_api_error(error_text: &str) -> String {
    let scrubbed = scrub_secret_patterns(error_text);
    let mut sanitized: String = scrubbed.chars().take(MAX_API_ERROR_CHARS).collect();
    if scrubbed.chars().count() > MAX_API_ERROR_CHARS {
        sanitized.push('…');
    }
    sanitized
}
