//! Pairwise relationship inference
//!
//! Every unordered pair of notes is compared once. A pair may yield up to
//! three edges, one per [`RelationshipKind`].

use super::models::{RelationshipEdge, RelationshipKind};
use crate::extract::Note;
use std::collections::HashSet;

/// Content similarity must exceed this to produce an edge.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Words of this length or shorter are ignored by content similarity.
const MIN_WORD_LEN: usize = 3;

/// Infer relationship edges between all pairs of `notes`.
///
/// Direct links match a link target against the other note's title, not its
/// path, so two notes sharing a title are indistinguishable here.
pub fn infer_relationships(notes: &[Note]) -> Vec<RelationshipEdge> {
    let word_sets: Vec<HashSet<String>> = notes
        .iter()
        .map(|n| significant_words(&n.content))
        .collect();
    let mut edges = Vec::new();

    for i in 0..notes.len() {
        for j in (i + 1)..notes.len() {
            let (a, b) = (&notes[i], &notes[j]);
            let edge = |kind, strength| RelationshipEdge {
                source: a.path.clone(),
                target: b.path.clone(),
                kind,
                strength,
            };

            if links_to(a, &b.title) || links_to(b, &a.title) {
                edges.push(edge(RelationshipKind::DirectLink, 1.0));
            }

            let shared = shared_tag_strength(a, b);
            if shared > 0.0 {
                edges.push(edge(RelationshipKind::SharedTags, shared));
            }

            let similarity = jaccard(&word_sets[i], &word_sets[j]);
            if similarity > SIMILARITY_THRESHOLD {
                edges.push(edge(RelationshipKind::ContentSimilarity, similarity));
            }
        }
    }

    tracing::debug!(notes = notes.len(), edges = edges.len(), "Inferred relationships");
    edges
}

fn links_to(note: &Note, title: &str) -> bool {
    note.links.iter().any(|link| link.target == title)
}

/// `|A ∩ B| / max(|A|, |B|)`, zero when either note has no tags.
pub fn shared_tag_strength(a: &Note, b: &Note) -> f64 {
    let larger = a.tags.len().max(b.tags.len());
    if larger == 0 {
        return 0.0;
    }
    a.tags.intersection(&b.tags).count() as f64 / larger as f64
}

/// Lower-cased whitespace tokens longer than three characters.
pub fn significant_words(content: &str) -> HashSet<String> {
    content
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > MIN_WORD_LEN)
        .collect()
}

/// Jaccard index of two word sets; zero when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{note, note_with_links};

    #[test]
    fn test_direct_link_emitted_once_per_pair() {
        let a = note_with_links("a.md", "Alpha", &["Beta"]);
        let b = note_with_links("b.md", "Beta", &["Alpha"]);
        let edges = infer_relationships(&[a, b]);

        let direct: Vec<_> = edges
            .iter()
            .filter(|e| e.kind == RelationshipKind::DirectLink)
            .collect();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].source, "a.md");
        assert_eq!(direct[0].target, "b.md");
        assert_eq!(direct[0].strength, 1.0);
    }

    #[test]
    fn test_shared_tag_strength() {
        let a = note("a.md", "A", &["x", "y"], "");
        let b = note("b.md", "B", &["y", "z"], "");
        let edges = infer_relationships(&[a, b]);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, RelationshipKind::SharedTags);
        assert_eq!(edges[0].strength, 0.5);
    }

    #[test]
    fn test_content_similarity_threshold() {
        let a = note("a.md", "A", &[], "rust ownership borrowing lifetimes");
        let b = note("b.md", "B", &[], "rust ownership borrowing traits");
        let c = note("c.md", "C", &[], "gardening tomatoes");
        let edges = infer_relationships(&[a, b, c]);

        // three shared words out of five distinct ones
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, RelationshipKind::ContentSimilarity);
        assert!((edges[0].strength - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_pair_can_emit_all_three_kinds() {
        let mut a = note("a.md", "Alpha", &["t"], "shared words here today");
        a.links = note_with_links("a.md", "Alpha", &["Beta"]).links;
        let b = note("b.md", "Beta", &["t"], "shared words here today");
        let edges = infer_relationships(&[a, b]);

        let kinds: Vec<_> = edges.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RelationshipKind::DirectLink,
                RelationshipKind::SharedTags,
                RelationshipKind::ContentSimilarity
            ]
        );
    }

    #[test]
    fn test_empty_content_is_not_similar() {
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
        let notes = [note("a.md", "A", &[], ""), note("b.md", "B", &[], "")];
        assert!(infer_relationships(&notes).is_empty());
    }
}
