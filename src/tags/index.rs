//! Vault-wide tag index
//!
//! [`TagIndex`] owns a [`TagCache`] for one vault session. Queries refresh
//! the cache only when its freshness window has passed. Rename and delete
//! rewrite note text through the vault and clear the cache before they
//! return, so the next query always rescans.

use super::cache::{TagCache, DEFAULT_TAG_CACHE_TTL};
use super::models::{RelatedTag, TagMetadata, TagPair, TagStatistics};
use super::scan::scan_content_tags;
use crate::error::{BatchOutcome, Error, Result};
use crate::vault::VaultStore;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

const RELATED_TAG_LIMIT: usize = 10;
const SUGGESTION_LIMIT: usize = 5;
const SUGGESTION_THRESHOLD: f64 = 0.3;
const PRESENCE_BOOST: f64 = 0.3;
const HEADING_BOOST: f64 = 0.2;

static SPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());
static TRAILING_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)[ \t]+$").unwrap());
/// One whole hashtag; group 1 is the leading whitespace, group 2 the name.
static HASHTAG_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(^|\s)#([\w/-]+)").unwrap());
static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#{1,6}\s").unwrap());

/// Tag analytics and bulk tag edits over one vault.
pub struct TagIndex {
    vault: Arc<dyn VaultStore>,
    cache: Mutex<TagCache>,
    ttl: Duration,
}

impl TagIndex {
    pub fn new(vault: Arc<dyn VaultStore>) -> Self {
        Self::with_ttl(vault, DEFAULT_TAG_CACHE_TTL)
    }

    pub fn with_ttl(vault: Arc<dyn VaultStore>, ttl: Duration) -> Self {
        Self {
            vault,
            cache: Mutex::new(TagCache::default()),
            ttl,
        }
    }

    /// Rescan every note now, regardless of cache age.
    pub async fn refresh(&self) {
        let mut cache = self.cache.lock().await;
        self.rebuild(&mut cache).await;
    }

    /// Drop the cached snapshot; the next query rescans.
    pub async fn invalidate(&self) {
        self.cache.lock().await.invalidate();
    }

    /// Lock the cache, rescanning first if it is stale.
    async fn ensure_fresh(&self) -> MutexGuard<'_, TagCache> {
        let mut cache = self.cache.lock().await;
        if !cache.is_fresh(self.ttl) {
            self.rebuild(&mut cache).await;
        }
        cache
    }

    async fn rebuild(&self, cache: &mut TagCache) {
        let paths = match self.vault.list_note_paths().await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(error = %e, "Vault unavailable, tag index is empty");
                cache.replace(HashMap::new(), 0);
                return;
            }
        };

        let mut entries: HashMap<String, TagMetadata> = HashMap::new();
        let mut file_count = 0;
        for path in &paths {
            let text = match self.vault.read_note_text(path).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "Skipping note during tag scan");
                    continue;
                }
            };
            file_count += 1;

            for name in scan_content_tags(&text) {
                let entry = entries
                    .entry(name.clone())
                    .or_insert_with(|| TagMetadata::new(&name));
                entry.count += 1;
                entry.notes.push(path.clone());
            }
        }

        tracing::debug!(tags = entries.len(), files = file_count, "Tag index refreshed");
        cache.replace(entries, file_count);
    }

    /// Every tag, most used first (ties by name).
    pub async fn all_tags(&self) -> Vec<TagMetadata> {
        let cache = self.ensure_fresh().await;
        by_frequency(&cache.entries).into_iter().cloned().collect()
    }

    /// Tags used at least `min_count` times, most used first.
    pub async fn tags_by_frequency(&self, min_count: usize) -> Vec<TagMetadata> {
        let cache = self.ensure_fresh().await;
        by_frequency(&cache.entries)
            .into_iter()
            .filter(|t| t.count >= min_count)
            .cloned()
            .collect()
    }

    pub async fn tag(&self, name: &str) -> Option<TagMetadata> {
        let cache = self.ensure_fresh().await;
        cache.entries.get(normalize(name)).cloned()
    }

    /// Tags sharing notes with `tag`, strongest first, at most ten.
    ///
    /// Overlap counts distinct shared notes; strength divides it by the
    /// larger occurrence count of the two tags. Tags with no shared note are
    /// left out.
    pub async fn related_tags(&self, tag: &str) -> Vec<RelatedTag> {
        let cache = self.ensure_fresh().await;
        let Some(target) = cache.entries.get(normalize(tag)) else {
            return Vec::new();
        };
        let target_notes = target.distinct_notes();

        let mut related: Vec<RelatedTag> = cache
            .entries
            .values()
            .filter(|other| other.name != target.name)
            .filter_map(|other| {
                let overlap = other
                    .distinct_notes()
                    .intersection(&target_notes)
                    .count();
                if overlap == 0 {
                    return None;
                }
                Some(RelatedTag {
                    name: other.name.clone(),
                    strength: overlap as f64 / target.count.max(other.count) as f64,
                    shared_notes: overlap,
                })
            })
            .collect();

        related.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.name.cmp(&b.name))
        });
        related.truncate(RELATED_TAG_LIMIT);
        related
    }

    /// Known tags worth adding to `content`, best first, at most five.
    pub async fn suggest_tags(&self, content: &str, existing: &[String]) -> Vec<String> {
        let cache = self.ensure_fresh().await;
        score_suggestions(cache.entries.keys().map(String::as_str), content, existing)
    }

    /// Suggestions for a note already in the vault.
    pub async fn suggest_tags_for(&self, path: &str) -> Result<Vec<String>> {
        let text = self.vault.read_note_text(path).await?;
        let existing = scan_content_tags(&text);
        Ok(self.suggest_tags(&text, &existing).await)
    }

    /// Nested tags grouped under their parent prefix; flat tags are left out.
    pub async fn hierarchy(&self) -> BTreeMap<String, Vec<String>> {
        let cache = self.ensure_fresh().await;
        let names: BTreeSet<&str> = cache.entries.keys().map(String::as_str).collect();

        let mut tree: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for name in names {
            if let Some((parent, _)) = name.rsplit_once('/') {
                tree.entry(parent.to_string())
                    .or_default()
                    .push(name.to_string());
            }
        }
        tree
    }

    pub async fn statistics(&self) -> TagStatistics {
        let cache = self.ensure_fresh().await;
        let ordered = by_frequency(&cache.entries);
        let total_usage: usize = ordered.iter().map(|t| t.count).sum();

        TagStatistics {
            total_tags: ordered.len(),
            total_usage,
            file_count: cache.file_count,
            average_tags_per_note: if cache.file_count == 0 {
                0.0
            } else {
                total_usage as f64 / cache.file_count as f64
            },
            most_used: ordered.first().map(|t| t.name.clone()),
            least_used: ordered.last().map(|t| t.name.clone()),
            hierarchical_tags: ordered.iter().filter(|t| t.name.contains('/')).count(),
        }
    }

    /// Tag pairs sharing the most notes.
    pub async fn top_tag_pairs(&self, limit: usize) -> Vec<TagPair> {
        let cache = self.ensure_fresh().await;
        let mut tags: Vec<(&str, BTreeSet<&str>)> = cache
            .entries
            .values()
            .map(|t| (t.name.as_str(), t.distinct_notes()))
            .collect();
        tags.sort_by(|a, b| a.0.cmp(b.0));

        let mut pairs = Vec::new();
        for (i, (first, first_notes)) in tags.iter().enumerate() {
            for (second, second_notes) in &tags[i + 1..] {
                let shared = first_notes.intersection(second_notes).count();
                if shared > 0 {
                    pairs.push(TagPair {
                        first: first.to_string(),
                        second: second.to_string(),
                        shared_notes: shared,
                    });
                }
            }
        }

        pairs.sort_by(|a, b| {
            b.shared_notes
                .cmp(&a.shared_notes)
                .then_with(|| a.first.cmp(&b.first))
                .then_with(|| a.second.cmp(&b.second))
        });
        pairs.truncate(limit);
        pairs
    }

    /// Replace `#old` with `#new` in every note. Returns the rewritten paths.
    ///
    /// Only inline hashtags are rewritten; frontmatter tag lists are left as is.
    pub async fn rename_tag(&self, old: &str, new: &str) -> Result<BatchOutcome<String>> {
        let old = normalize(old);
        let new = normalize(new);
        if new.is_empty() || new.chars().any(char::is_whitespace) {
            return Err(Error::Validation(format!("invalid tag name: {:?}", new)));
        }

        check_tag_name(old)?;
        let outcome = self.rewrite_notes(old, Some(new)).await;
        tracing::info!(
            from = %old,
            to = %new,
            notes = outcome.items.len(),
            "Renamed tag"
        );
        Ok(outcome)
    }

    /// Remove `#tag` from every note and tidy the whitespace it leaves.
    pub async fn delete_tag(&self, tag: &str) -> Result<BatchOutcome<String>> {
        let tag = normalize(tag);
        check_tag_name(tag)?;
        let outcome = self.rewrite_notes(tag, None).await;
        tracing::info!(tag = %tag, notes = outcome.items.len(), "Deleted tag");
        Ok(outcome)
    }

    /// Rewrite every occurrence of `#tag`, renaming it to `replacement` or
    /// removing it when `replacement` is `None`.
    async fn rewrite_notes(&self, tag: &str, replacement: Option<&str>) -> BatchOutcome<String> {
        let mut outcome = BatchOutcome::new();

        let paths = match self.vault.list_note_paths().await {
            Ok(paths) => paths,
            Err(e) => {
                tracing::warn!(error = %e, "Vault unavailable, no notes rewritten");
                Vec::new()
            }
        };

        for path in paths {
            match self.rewrite_note(&path, tag, replacement).await {
                Ok(true) => outcome.items.push(path),
                Ok(false) => {}
                Err(e) => outcome.record(&path, Err(e)),
            }
        }

        self.invalidate().await;
        outcome
    }

    async fn rewrite_note(
        &self,
        path: &str,
        tag: &str,
        replacement: Option<&str>,
    ) -> Result<bool> {
        let text = self.vault.read_note_text(path).await?;

        let mut changed = false;
        let mut rewritten = HASHTAG_TOKEN_RE
            .replace_all(&text, |caps: &Captures| {
                if &caps[2] != tag {
                    return caps[0].to_string();
                }
                changed = true;
                match replacement {
                    Some(new) => format!("{}#{}", &caps[1], new),
                    None => caps[1].to_string(),
                }
            })
            .into_owned();
        if !changed {
            return Ok(false);
        }

        if replacement.is_none() {
            rewritten = SPACE_RUN_RE.replace_all(&rewritten, " ").into_owned();
            rewritten = TRAILING_SPACE_RE.replace_all(&rewritten, "").into_owned();
        }

        self.vault.write_note_text(path, &rewritten).await?;
        tracing::debug!(path = %path, "Rewrote note tags");
        Ok(true)
    }
}

fn normalize(tag: &str) -> &str {
    tag.trim().trim_start_matches('#')
}

fn check_tag_name(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(Error::Validation("tag name is empty".into()));
    }
    Ok(())
}

fn by_frequency(entries: &HashMap<String, TagMetadata>) -> Vec<&TagMetadata> {
    let mut ordered: Vec<&TagMetadata> = entries.values().collect();
    ordered.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    ordered
}

/// Relevance of each known tag to `content`.
///
/// `min(1, occurrences / words * 100 + 0.3 if present + 0.2 per heading
/// line mentioning the tag)`, matched case-insensitively. Tags already on
/// the note are skipped.
fn score_suggestions<'a>(
    known: impl Iterator<Item = &'a str>,
    content: &str,
    existing: &[String],
) -> Vec<String> {
    let lowered = content.to_lowercase();
    let word_count = content.split_whitespace().count();
    let heading_lines = heading_lines(&lowered);
    let existing: BTreeSet<String> = existing
        .iter()
        .map(|t| normalize(t).to_lowercase())
        .collect();

    let mut scored: Vec<(f64, &str)> = known
        .filter_map(|name| {
            let needle = name.to_lowercase();
            if needle.is_empty() || existing.contains(&needle) {
                return None;
            }

            let occurrences = lowered.matches(needle.as_str()).count();
            let frequency = if word_count == 0 {
                0.0
            } else {
                occurrences as f64 / word_count as f64 * 100.0
            };
            let presence = if occurrences > 0 { PRESENCE_BOOST } else { 0.0 };
            let headings = heading_lines
                .iter()
                .filter(|line| line.contains(needle.as_str()))
                .count() as f64
                * HEADING_BOOST;

            let score = (frequency + presence + headings).min(1.0);
            (score > SUGGESTION_THRESHOLD).then_some((score, name))
        })
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(SUGGESTION_LIMIT)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Markdown heading lines; a line opening with a hashtag is not one.
fn heading_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| HEADING_LINE_RE.is_match(line))
        .collect()
}
