//! Pure text transformations used by the extractor.
//!
//! Cleaning applies a fixed sequence of regex rewrites, each one to the
//! output of the previous. Later patterns assume the earlier ones already
//! ran, so the order in [`clean_content`] must not change.

use super::models::{Block, BlockKind, Link, LinkKind};
use crate::vault::{Frontmatter, StructuralMetadata};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static FRONTMATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A---\r?\n.*?\r?\n---[ \t]*(?:\r?\n|\z)").unwrap());
static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]*)?\]\]").unwrap());
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());
static HEADING_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap());
static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").unwrap());
static ITALIC_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\n]+)\*").unwrap());
static HIGHLIGHT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"==([^=\n]+)==").unwrap());
static STRIKE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~([^~\n]+)~~").unwrap());
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#[\w-]+").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# (.+)$").unwrap());
static CODE_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").unwrap());
static CALLOUT_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^>\s*\[![\w-]+\]").unwrap());

/// Strip Markdown structure from a raw note, keeping readable text.
///
/// Wiki-link display text is dropped in favour of the target.
pub fn clean_content(raw: &str) -> String {
    let text = FRONTMATTER_RE.replace(raw, "");
    let text = WIKI_LINK_RE.replace_all(&text, "${1}");
    let text = MARKDOWN_LINK_RE.replace_all(&text, "${1}");
    let text = HEADING_MARKER_RE.replace_all(&text, "");
    let text = BOLD_RE.replace_all(&text, "${1}");
    let text = ITALIC_RE.replace_all(&text, "${1}");
    let text = HIGHLIGHT_RE.replace_all(&text, "${1}");
    let text = STRIKE_RE.replace_all(&text, "${1}");
    let text = HASHTAG_RE.replace_all(&text, "");
    let text = BLANK_RUN_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

/// Resolve a note title: frontmatter `title`, then the first `# ` heading,
/// then the fallback name.
pub fn resolve_title(frontmatter: &Frontmatter, raw: &str, fallback_name: &str) -> String {
    if let Some(title) = frontmatter.get("title").and_then(|v| v.as_str()) {
        if !title.trim().is_empty() {
            return title.to_string();
        }
    }

    if let Some(caps) = H1_RE.captures(raw) {
        let heading = caps[1].trim();
        if !heading.is_empty() {
            return heading.to_string();
        }
    }

    fallback_name.to_string()
}

/// Tags from the host metadata plus the frontmatter `tags` field.
///
/// Frontmatter may hold a list or a single string; a single string is split
/// on commas. Leading `#` is dropped from every name.
pub fn extract_tags(metadata: &StructuralMetadata, frontmatter: &Frontmatter) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();
    let mut add = |raw: &str| {
        let name = raw.trim().trim_start_matches('#');
        if !name.is_empty() {
            tags.insert(name.to_string());
        }
    };

    for tag in &metadata.tags {
        add(&tag.tag);
    }

    match frontmatter.get("tags") {
        Some(serde_json::Value::Array(items)) => {
            for item in items {
                match item {
                    serde_json::Value::String(s) => add(s),
                    serde_json::Value::Number(n) => add(&n.to_string()),
                    _ => {}
                }
            }
        }
        Some(serde_json::Value::String(s)) => s.split(',').for_each(&mut add),
        _ => {}
    }

    tags
}

/// Links and embeds from the host metadata, in that order.
pub fn extract_links(metadata: &StructuralMetadata) -> Vec<Link> {
    let links = metadata.links.iter().map(|l| (l, LinkKind::Internal));
    let embeds = metadata.embeds.iter().map(|l| (l, LinkKind::Embed));

    links
        .chain(embeds)
        .map(|(reference, kind)| Link {
            target: reference.link.clone(),
            display_text: reference
                .display_text
                .clone()
                .unwrap_or_else(|| reference.link.clone()),
            kind,
            position: reference.position,
        })
        .collect()
}

/// Code, callout and table blocks of the raw text.
///
/// Each scan keeps its own order of appearance; the scans are concatenated
/// rather than merged into document order.
pub fn extract_blocks(raw: &str) -> Vec<Block> {
    let mut blocks = code_blocks(raw);
    blocks.extend(callout_blocks(raw));
    blocks.extend(table_blocks(raw));
    blocks
}

fn code_blocks(raw: &str) -> Vec<Block> {
    CODE_BLOCK_RE
        .captures_iter(raw)
        .map(|caps| Block::new(BlockKind::Code, caps[1].trim()))
        .collect()
}

fn callout_blocks(raw: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<&str>> = None;

    for line in raw.lines() {
        if CALLOUT_START_RE.is_match(line) {
            if let Some(body) = current.take() {
                blocks.push(finish_callout(&body));
            }
            current = Some(vec![line]);
        } else if let Some(body) = current.as_mut() {
            if line.starts_with('>') {
                body.push(line);
            } else {
                blocks.push(finish_callout(body));
                current = None;
            }
        }
    }
    if let Some(body) = current {
        blocks.push(finish_callout(&body));
    }

    blocks
}

fn finish_callout(lines: &[&str]) -> Block {
    let body = lines
        .iter()
        .map(|&line| {
            let line = line.strip_prefix('>').unwrap_or(line);
            line.strip_prefix(' ').unwrap_or(line)
        })
        .collect::<Vec<_>>()
        .join("\n");
    Block::new(BlockKind::Callout, body.trim())
}

fn table_blocks(raw: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut run: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let trimmed = line.trim();
        if trimmed.len() >= 2 && trimmed.starts_with('|') && trimmed.ends_with('|') {
            run.push(trimmed);
        } else {
            flush_table(&mut run, &mut blocks);
        }
    }
    flush_table(&mut run, &mut blocks);

    blocks
}

fn flush_table(run: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if run.len() >= 2 {
        blocks.push(Block::new(BlockKind::Table, run.join("\n")));
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::{LinkRef, TagRef};
    use serde_json::json;

    fn frontmatter(pairs: &[(&str, serde_json::Value)]) -> Frontmatter {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_clean_content_strips_markup() {
        let raw = "---\ntitle: x\n---\n# Heading\nSome **bold**, *italic*, ==marked== and ~~gone~~ words.\nSee [[Target|shown]] and [site](https://example.com) #tag\n\n\n\nEnd";
        let cleaned = clean_content(raw);

        assert_eq!(
            cleaned,
            "Heading\nSome bold, italic, marked and gone words.\nSee Target and site \n\nEnd"
        );
        for marker in ["**", "==", "~~", "[[", "]]", "#"] {
            assert!(!cleaned.contains(marker), "found {marker}");
        }
    }

    #[test]
    fn test_emphasis_does_not_span_lines() {
        assert_eq!(
            clean_content("Cost is 5 * 3\n\nSee *this* now"),
            "Cost is 5 * 3\n\nSee this now"
        );
        assert_eq!(
            clean_content("a == b\n\n==marked== and ~~old\nnew~~"),
            "a == b\n\nmarked and ~~old\nnew~~"
        );
    }

    #[test]
    fn test_clean_content_only_strips_leading_frontmatter() {
        let cleaned = clean_content("Intro\n---\nnot: frontmatter\n---\n");
        assert!(cleaned.starts_with("Intro"));
        assert!(cleaned.contains("not: frontmatter"));
    }

    #[test]
    fn test_title_precedence() {
        let raw = "# Heading Title\nbody";
        let with_title = frontmatter(&[("title", json!("X"))]);
        assert_eq!(resolve_title(&with_title, raw, "file"), "X");

        let empty_title = frontmatter(&[("title", json!("  "))]);
        assert_eq!(resolve_title(&empty_title, raw, "file"), "Heading Title");

        assert_eq!(resolve_title(&Frontmatter::new(), "no heading\n## Sub", "file"), "file");
    }

    #[test]
    fn test_title_uses_first_h1_anywhere() {
        let raw = "intro\n## Sub\n# First\n# Second";
        assert_eq!(resolve_title(&Frontmatter::new(), raw, "f"), "First");
    }

    #[test]
    fn test_extract_tags_merges_and_dedups() {
        let metadata = StructuralMetadata {
            tags: vec![TagRef {
                tag: "#a".into(),
                position: None,
            }],
            ..Default::default()
        };
        let fm = frontmatter(&[("tags", json!(["a", "a", "b"]))]);
        let tags = extract_tags(&metadata, &fm);
        assert_eq!(tags.len(), 2);
        assert!(tags.contains("a") && tags.contains("b"));
    }

    #[test]
    fn test_extract_tags_single_string_frontmatter() {
        let fm = frontmatter(&[("tags", json!("one, #two"))]);
        let tags = extract_tags(&StructuralMetadata::default(), &fm);
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn test_extract_links_kinds_and_display_fallback() {
        let metadata = StructuralMetadata {
            links: vec![LinkRef {
                link: "Other".into(),
                display_text: None,
                position: None,
            }],
            embeds: vec![LinkRef {
                link: "pic.png".into(),
                display_text: Some("Picture".into()),
                position: None,
            }],
            ..Default::default()
        };
        let links = extract_links(&metadata);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].kind, LinkKind::Internal);
        assert_eq!(links[0].display_text, "Other");
        assert_eq!(links[1].kind, LinkKind::Embed);
        assert_eq!(links[1].display_text, "Picture");
    }

    #[test]
    fn test_blocks_are_grouped_by_scan() {
        let raw = "| a | b |\n|---|---|\n\n> [!note] Title\n> body line\nafter\n\n```rust\nfn main() {}\n```\n";
        let blocks = extract_blocks(raw);
        let kinds: Vec<_> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, vec![BlockKind::Code, BlockKind::Callout, BlockKind::Table]);

        assert_eq!(blocks[0].content, "fn main() {}");
        assert_eq!(blocks[1].content, "[!note] Title\nbody line");
        assert_eq!(blocks[2].content, "| a | b |\n|---|---|");
    }

    #[test]
    fn test_single_table_line_is_not_a_table() {
        assert!(extract_blocks("| lonely |\ntext").is_empty());
    }
}
