//! Content-text tag scanning
//!
//! This is the tag path used by the tag index. It reads tags straight from
//! raw text (hashtags anywhere plus the frontmatter `tags:` entry) and keeps
//! one entry per occurrence. It deliberately does not share code with
//! [`crate::extract::extract_tags`], which works from host metadata, so the
//! two may disagree on edge cases.

use regex::Regex;
use std::sync::LazyLock;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|\s)#([\w/-]+)").unwrap());
static FRONTMATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---").unwrap());
static TAGS_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^tags:[ \t]*(.*)$").unwrap());
static DASH_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]*-[ \t]*(.+)$").unwrap());

const PALETTE: [&str; 15] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#e67e22", "#34495e",
    "#16a085", "#27ae60", "#2980b9", "#8e44ad", "#c0392b", "#d35400", "#7f8c8d",
];

/// Every tag occurrence in `text`, hashtags first, then frontmatter entries.
pub fn scan_content_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = HASHTAG_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .filter(|name| !name.chars().all(|c| c.is_ascii_digit()))
        .collect();
    tags.extend(frontmatter_tags(text));
    tags
}

fn frontmatter_tags(text: &str) -> Vec<String> {
    let Some(block) = FRONTMATTER_RE.captures(text) else {
        return Vec::new();
    };
    let yaml = block.get(1).map(|m| m.as_str()).unwrap_or_default();
    let Some(entry) = TAGS_KEY_RE.captures(yaml) else {
        return Vec::new();
    };
    let Some(value_match) = entry.get(1) else {
        return Vec::new();
    };
    let value = value_match.as_str().trim();

    let raw: Vec<&str> = if let Some(inline) = value.strip_prefix('[') {
        inline.trim_end_matches(']').split(',').collect()
    } else if value.is_empty() {
        // Dash list on the following lines
        yaml[value_match.end()..]
            .lines()
            .skip(1)
            .map_while(|line| DASH_ITEM_RE.captures(line).and_then(|c| c.get(1)))
            .map(|m| m.as_str())
            .collect()
    } else {
        vec![value]
    };

    raw.into_iter()
        .map(|t| t.trim().trim_matches(|c: char| c == '"' || c == '\'').trim_start_matches('#'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Stable display colour for a tag.
///
/// 32-bit rolling hash (`h = h * 31 + c` over UTF-16 units, wrapping) mapped
/// onto a fixed 15-colour palette.
pub fn tag_color(tag: &str) -> &'static str {
    let hash = tag
        .encode_utf16()
        .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
    PALETTE[(hash.unsigned_abs() % PALETTE.len() as u32) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_hashtags_keeps_occurrences() {
        let tags = scan_content_tags("#a text #b\n#a again, issue #12 and a#no\n# Heading");
        assert_eq!(tags, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_scan_frontmatter_inline_list() {
        let tags = scan_content_tags("---\ntags: [x, \"y\"]\n---\nbody #z");
        assert_eq!(tags, vec!["z", "x", "y"]);
    }

    #[test]
    fn test_scan_frontmatter_dash_list() {
        let text = "---\ntitle: t\ntags:\n  - one\n  - two/sub\nother: 1\n---\n";
        assert_eq!(scan_content_tags(text), vec!["one", "two/sub"]);
    }

    #[test]
    fn test_scan_frontmatter_single_value() {
        assert_eq!(scan_content_tags("---\ntags: solo\n---\n"), vec!["solo"]);
    }

    #[test]
    fn test_tag_color_is_deterministic() {
        assert_eq!(tag_color("project"), tag_color("project"));
        assert!(PALETTE.contains(&tag_color("")));
        assert!(PALETTE.contains(&tag_color("a-very/long-hierarchical/tag-name")));
    }

    #[test]
    fn test_tag_color_known_value() {
        // "ab" hashes to 97 * 31 + 98 = 3105, 3105 % 15 = 0
        assert_eq!(tag_color("ab"), PALETTE[0]);
    }
}
