//! Structural metadata parser
//!
//! Produces the same [`StructuralMetadata`] a note-taking host would hand
//! over: frontmatter, headings, inline tags, wiki-links, embeds and relative
//! Markdown links, each with its span in the raw text. Used by the
//! filesystem vault and as the extractor's fallback when the host supplies
//! nothing. Fenced code is skipped.

use super::models::{Frontmatter, HeadingRef, LinkRef, Position, Span, StructuralMetadata, TagRef};
use regex::Regex;
use std::sync::LazyLock;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.*?)[ \t]*$").unwrap());
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/-]+)").unwrap());
static WIKI_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\[\]]+?)\]\]").unwrap());
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]+)\)").unwrap());

/// A leading `---` frontmatter block.
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterBlock {
    /// Parsed key/values; `None` when the YAML is malformed or not a mapping
    pub values: Option<Frontmatter>,
    /// Byte offset of the first body character
    pub body_offset: usize,
    /// Line index of the first body line
    pub body_line: usize,
}

/// Locate and parse a frontmatter block at the very start of `text`.
pub fn split_frontmatter(text: &str) -> Option<FrontmatterBlock> {
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    let mut line_no = 1;
    for line in lines {
        if line.trim_end() == "---" {
            return Some(FrontmatterBlock {
                values: parse_yaml_mapping(&text[yaml_start..offset]),
                body_offset: offset + line.len(),
                body_line: line_no + 1,
            });
        }
        offset += line.len();
        line_no += 1;
    }
    None
}

/// Parse a YAML document into a frontmatter map.
pub fn parse_yaml_mapping(yaml: &str) -> Option<Frontmatter> {
    match serde_yaml::from_str::<serde_json::Value>(yaml) {
        Ok(serde_json::Value::Object(map)) => Some(map.into_iter().collect()),
        Ok(serde_json::Value::Null) => Some(Frontmatter::new()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed frontmatter");
            None
        }
    }
}

/// Parse the structural metadata of a raw note.
pub fn parse_structural_metadata(text: &str) -> StructuralMetadata {
    let mut metadata = StructuralMetadata::default();

    let (mut offset, mut line_no) = match split_frontmatter(text) {
        Some(block) => {
            metadata.frontmatter = block.values;
            (block.body_offset, block.body_line)
        }
        None => (0, 0),
    };

    let mut in_fence = false;
    for raw_line in text[offset..].split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        } else if !in_fence {
            scan_line(line, line_no, offset, &mut metadata);
        }

        offset += raw_line.len();
        line_no += 1;
    }

    metadata
}

fn scan_line(line: &str, line_no: usize, line_offset: usize, metadata: &mut StructuralMetadata) {
    let span = |start: usize, end: usize| Span {
        start: Position {
            line: line_no,
            col: start,
            offset: line_offset + start,
        },
        end: Position {
            line: line_no,
            col: end,
            offset: line_offset + end,
        },
    };

    if let Some(caps) = HEADING_RE.captures(line) {
        let text = caps[2].to_string();
        if !text.is_empty() {
            metadata.headings.push(HeadingRef {
                heading: text,
                level: caps[1].len() as u8,
                position: Some(span(0, line.len())),
            });
        }
    }

    for caps in TAG_RE.captures_iter(line) {
        let Some(name) = caps.get(1) else { continue };
        // Purely numeric hashes (#1, #2024) are not tags
        if name.as_str().chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        metadata.tags.push(TagRef {
            tag: format!("#{}", name.as_str()),
            position: Some(span(name.start() - 1, name.end())),
        });
    }

    for caps in WIKI_LINK_RE.captures_iter(line) {
        let Some(whole) = caps.get(0) else { continue };
        let inner = &caps[2];
        let (target, display) = match inner.split_once('|') {
            Some((target, display)) => (target.trim(), Some(display.trim().to_string())),
            None => (inner.trim(), None),
        };
        let link = LinkRef {
            link: target.to_string(),
            display_text: display,
            position: Some(span(whole.start(), whole.end())),
        };
        if caps[1].is_empty() {
            metadata.links.push(link);
        } else {
            metadata.embeds.push(link);
        }
    }

    for caps in MARKDOWN_LINK_RE.captures_iter(line) {
        let url = &caps[3];
        if is_external(url) {
            continue;
        }
        let Some(whole) = caps.get(0) else { continue };
        let link = LinkRef {
            link: url.to_string(),
            display_text: Some(caps[2].to_string()).filter(|d| !d.is_empty()),
            position: Some(span(whole.start(), whole.end())),
        };
        if caps[1].is_empty() {
            metadata.links.push(link);
        } else {
            metadata.embeds.push(link);
        }
    }
}

fn is_external(url: &str) -> bool {
    url.contains("://") || url.starts_with("mailto:") || url.starts_with('#')
}
