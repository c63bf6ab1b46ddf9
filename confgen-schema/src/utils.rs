//! Camel-case splitting and property-name derivation helpers

/// Split a camel-case identifier into its humps.
///
/// An uppercase run stays together until the last capital before a lowercase
/// letter, which starts the next hump (`"DNSConfig"` -> `["DNS", "Config"]`).
pub fn camel_humps(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let mut end = i + 1;
        if chars[i].is_uppercase() {
            while end < chars.len() && chars[end].is_uppercase() {
                end += 1;
            }
            if end - i > 1 {
                // uppercase run: the final capital belongs to the next hump
                // when it is followed by lowercase
                if end < chars.len() && !chars[end].is_uppercase() {
                    end -= 1;
                }
            } else {
                while end < chars.len() && !chars[end].is_uppercase() {
                    end += 1;
                }
            }
        } else {
            while end < chars.len() && !chars[end].is_uppercase() {
                end += 1;
            }
        }
        segments.push(chars[i..end].iter().collect());
        i = end;
    }
    segments
}

/// Hyphenate a camel-case identifier: `maxRetryCount` -> `max-retry-count`.
pub fn hyphenate(s: &str) -> String {
    hyphen_join(&camel_humps(s))
}

/// Join segments lowercased with `-` between them.
pub fn hyphen_join<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Join segments in lower-camel case: `["My", "Service"]` -> `"myService"`.
pub fn lower_camel_join<S: AsRef<str>>(segments: &[S]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let segment = segment.as_ref();
        if i == 0 {
            let mut chars = segment.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_lowercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push_str(segment);
        }
    }
    out
}

/// Strip the first matching candidate suffix from the end of `segments`.
///
/// Candidates are tried in the given order and each is a sequence of
/// case-insensitive segments; the first that matches wins and the rest are
/// never consulted.
pub fn without_suffix<'a>(segments: &'a [String], candidates: &[&[&str]]) -> &'a [String] {
    for candidate in candidates {
        if candidate.len() > segments.len() {
            continue;
        }
        let tail = &segments[segments.len() - candidate.len()..];
        let matches = tail
            .iter()
            .zip(candidate.iter())
            .all(|(seg, cand)| seg.eq_ignore_ascii_case(cand));
        if matches {
            return &segments[..segments.len() - candidate.len()];
        }
    }
    segments
}
