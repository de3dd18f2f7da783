//! Positional snippet / highlighter (spec §4.6, strategy B).
//!
//! Normalizes content and the query text with [`remove_diacritics`] for
//! matching, then marks every match of every query word by its *original*
//! byte offsets so the returned snippet preserves diacritics, punctuation
//! and casing exactly as stored.

use crate::text::remove_diacritics;

/// Target excerpt half-width (spec §4.6: "120 characters to each side").
const HALF_WINDOW_CHARS: usize = 120;
/// Hard cap on the no-match fallback prefix (spec §4.6: "240 characters").
const FALLBACK_CHARS: usize = 240;

/// One character of normalized content, paired with the original byte
/// range it came from.
struct NormalizedChar {
    normalized: char,
    orig_start: usize,
    orig_end: usize,
}

fn build_normalized(content: &str) -> Vec<NormalizedChar> {
    content
        .char_indices()
        .filter(|(_, c)| !crate::text::is_diacritic(*c))
        .map(|(idx, c)| {
            let end = idx + c.len_utf8();
            let normalized = c.to_lowercase().next().unwrap_or(c);
            NormalizedChar {
                normalized,
                orig_start: idx,
                orig_end: end,
            }
        })
        .collect()
}

/// Extract query words for highlighting from a raw (pre-escape) query
/// string: split on ASCII space, strip wildcard operators, drop anything
/// that becomes empty.
fn query_words(query_text: &str) -> Vec<Vec<char>> {
    query_text
        .split(' ')
        .map(|w| w.chars().filter(|c| *c != '*' && *c != '?').collect::<String>())
        .map(|w| remove_diacritics(&w.to_lowercase()))
        .filter(|w| !w.is_empty())
        .map(|w| w.chars().collect())
        .collect()
}

fn find_all(haystack: &[NormalizedChar], needle: &[char]) -> Vec<(usize, usize)> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for start in 0..=(haystack.len() - needle.len()) {
        if haystack[start..start + needle.len()]
            .iter()
            .zip(needle.iter())
            .all(|(h, n)| h.normalized == *n)
        {
            matches.push((start, start + needle.len()));
        }
    }
    matches
}

/// Build a bounded, highlighted excerpt of `content` for `query_text`
/// (the raw query string before escaping, so plain words can be recovered).
pub fn build_snippet(content: &str, query_text: &str) -> String {
    let normalized = build_normalized(content);
    let words = query_words(query_text);

    let mut all_matches: Vec<(usize, usize)> = words
        .iter()
        .flat_map(|w| find_all(&normalized, w))
        .collect();
    all_matches.sort_unstable();

    let Some(&(first_start, first_end)) = all_matches.first() else {
        tracing::debug!("no query-word match in stored content, falling back to prefix snippet");
        return fallback_prefix(content);
    };

    let window_start = first_start.saturating_sub(HALF_WINDOW_CHARS);
    let window_end = (first_end + HALF_WINDOW_CHARS).min(normalized.len());

    let window_matches: Vec<(usize, usize)> = all_matches
        .into_iter()
        .filter(|&(s, e)| s >= window_start && e <= window_end)
        .collect();

    render_window(content, &normalized, window_start, window_end, &window_matches)
}

fn render_window(
    content: &str,
    normalized: &[NormalizedChar],
    window_start: usize,
    window_end: usize,
    matches: &[(usize, usize)],
) -> String {
    if window_start >= window_end || normalized.is_empty() {
        return fallback_prefix(content);
    }

    let orig_start = normalized[window_start].orig_start;
    let orig_end = normalized[window_end - 1].orig_end;

    let mut out = String::new();
    if window_start > 0 {
        out.push_str("...");
    }

    let mut cursor = orig_start;
    for &(m_start, m_end) in matches {
        let m_orig_start = normalized[m_start].orig_start;
        let m_orig_end = normalized[m_end - 1].orig_end;
        if m_orig_start < cursor {
            continue;
        }
        out.push_str(&content[cursor..m_orig_start]);
        out.push_str("<mark>");
        out.push_str(&content[m_orig_start..m_orig_end]);
        out.push_str("</mark>");
        cursor = m_orig_end;
    }
    out.push_str(&content[cursor..orig_end]);

    if window_end < normalized.len() {
        out.push_str("...");
    }

    out
}

fn fallback_prefix(content: &str) -> String {
    let char_count = content.chars().count();
    if char_count <= FALLBACK_CHARS {
        return content.to_string();
    }

    let prefix: String = content.chars().take(FALLBACK_CHARS).collect();
    format!("{prefix}...")
}
