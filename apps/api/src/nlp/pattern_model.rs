//! Pattern-based entity model loaded from an EntityRuler-style artifact directory.
//!
//! Layout:
//!
//! ```text
//! nlp_model/
//!   meta.json                    optional: name, version, phrase_matcher_attr
//!   entity_ruler/patterns.jsonl  or patterns.jsonl at the top level
//! ```
//!
//! Each non-blank line of the patterns file is one JSON object:
//!
//! ```text
//! {"label": "SKILL", "pattern": "machine learning"}
//! {"label": "SKILL", "pattern": [{"LOWER": "machine"}, {"LOWER": "learning"}]}
//! ```
//!
//! Phrase patterns follow `phrase_matcher_attr` (`ORTH` = exact case, the
//! default; `LOWER` = case-insensitive). Token patterns are case-insensitive
//! only when every token uses `LOWER`. Case folding is Unicode lower-casing,
//! so `{"LOWER": "zürich"}` also finds `ZÜRICH`.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use aho_corasick::{AhoCorasick, MatchKind};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::nlp::entity::Entity;
use crate::nlp::recognizer::EntityRecognizer;

const META_FILE: &str = "meta.json";
const PATTERN_FILES: [&str; 2] = ["entity_ruler/patterns.jsonl", "patterns.jsonl"];

// ────────────────────────────────────────────────────────────────────────────
// Errors + artifact metadata
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model directory not found: {0}")]
    NotFound(PathBuf),

    #[error("no patterns file in {0} (expected entity_ruler/patterns.jsonl or patterns.jsonl)")]
    MissingPatterns(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid meta.json: {0}")]
    Meta(#[source] serde_json::Error),

    #[error("invalid pattern on line {line}: {reason}")]
    InvalidPattern { line: usize, reason: String },

    #[error("model contains no patterns")]
    Empty,

    #[error("failed to build matcher: {0}")]
    Build(#[from] aho_corasick::BuildError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub phrase_matcher_attr: Option<String>,
}

impl ModelMeta {
    fn phrases_ignore_case(&self) -> bool {
        self.phrase_matcher_attr
            .as_deref()
            .is_some_and(|attr| attr.eq_ignore_ascii_case("LOWER"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pattern file lines
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PatternLine {
    label: String,
    pattern: PatternSpec,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatternSpec {
    Phrase(String),
    Tokens(Vec<TokenSpec>),
}

#[derive(Debug, Deserialize)]
struct TokenSpec {
    #[serde(rename = "LOWER")]
    lower: Option<String>,
    #[serde(rename = "ORTH")]
    orth: Option<String>,
    #[serde(rename = "TEXT")]
    text: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Compiled matchers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct CompiledPattern {
    label: String,
    phrase: String,
}

/// One automaton plus the mapping from its pattern ids back to `PatternModel::patterns`.
///
/// Case-insensitive phrases are stored folded, and that automaton runs over
/// `FoldedText` rather than the raw text.
struct Matcher {
    automaton: AhoCorasick,
    pattern_ids: Vec<usize>,
}

impl Matcher {
    fn build(patterns: &[CompiledPattern], ids: Vec<usize>) -> Result<Option<Self>, ModelError> {
        if ids.is_empty() {
            return Ok(None);
        }
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::Standard)
            .build(ids.iter().map(|&i| patterns[i].phrase.as_str()))?;
        Ok(Some(Self {
            automaton,
            pattern_ids: ids,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    start: usize,
    end: usize,
    pattern: usize,
}

/// Lower-cased copy of a text. `spans[i]` is the byte range of the original
/// char that produced byte `i` of `folded`.
struct FoldedText {
    folded: String,
    spans: Vec<(usize, usize)>,
}

impl FoldedText {
    fn new(text: &str) -> Self {
        let mut folded = String::with_capacity(text.len());
        let mut spans = Vec::with_capacity(text.len());
        for (start, ch) in text.char_indices() {
            let end = start + ch.len_utf8();
            for lower in ch.to_lowercase() {
                folded.push(lower);
                spans.resize(folded.len(), (start, end));
            }
        }
        Self { folded, spans }
    }

    /// Maps a non-empty match in `folded` back to original byte offsets.
    fn original_range(&self, start: usize, end: usize) -> (usize, usize) {
        (self.spans[start].0, self.spans[end - 1].1)
    }
}

/// Char-wise Unicode lower-casing, the same fold `FoldedText` applies.
fn fold_case(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Model
// ────────────────────────────────────────────────────────────────────────────

/// Gazetteer-style recognizer: every pattern is a literal phrase tied to a label.
pub struct PatternModel {
    name: String,
    labels: Vec<String>,
    patterns: Vec<CompiledPattern>,
    exact: Option<Matcher>,
    folded: Option<Matcher>,
}

impl PatternModel {
    /// Loads the artifact directory at `dir`.
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        if !dir.is_dir() {
            return Err(ModelError::NotFound(dir.to_path_buf()));
        }

        let meta_path = dir.join(META_FILE);
        let meta = if meta_path.is_file() {
            let raw = read_file(&meta_path)?;
            serde_json::from_str(&raw).map_err(ModelError::Meta)?
        } else {
            ModelMeta::default()
        };

        let patterns_path = PATTERN_FILES
            .iter()
            .map(|p| dir.join(p))
            .find(|p| p.is_file())
            .ok_or_else(|| ModelError::MissingPatterns(dir.to_path_buf()))?;
        let jsonl = read_file(&patterns_path)?;

        let fallback_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "pattern_model".to_string());

        Self::from_jsonl(&jsonl, meta, &fallback_name)
    }

    /// Builds a model from the contents of a patterns file.
    pub fn from_jsonl(jsonl: &str, meta: ModelMeta, fallback_name: &str) -> Result<Self, ModelError> {
        let phrases_ignore_case = meta.phrases_ignore_case();
        let mut patterns = Vec::new();
        let mut exact_ids = Vec::new();
        let mut folded_ids = Vec::new();

        for (idx, line) in jsonl.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parsed: PatternLine =
                serde_json::from_str(line).map_err(|e| ModelError::InvalidPattern {
                    line: line_no,
                    reason: e.to_string(),
                })?;
            let (phrase, ignore_case) = compile_pattern(parsed.pattern, phrases_ignore_case)
                .map_err(|reason| ModelError::InvalidPattern {
                    line: line_no,
                    reason,
                })?;

            let label = parsed.label.trim().to_string();
            if label.is_empty() {
                return Err(ModelError::InvalidPattern {
                    line: line_no,
                    reason: "label is empty".to_string(),
                });
            }

            let id = patterns.len();
            patterns.push(CompiledPattern { label, phrase });
            if ignore_case {
                folded_ids.push(id);
            } else {
                exact_ids.push(id);
            }
        }

        if patterns.is_empty() {
            return Err(ModelError::Empty);
        }

        let mut seen = HashSet::new();
        let labels = patterns
            .iter()
            .filter(|p| seen.insert(p.label.as_str()))
            .map(|p| p.label.clone())
            .collect();

        let exact = Matcher::build(&patterns, exact_ids)?;
        let folded = Matcher::build(&patterns, folded_ids)?;

        let name = match (meta.name, meta.version) {
            (Some(name), Some(version)) => format!("{name}@{version}"),
            (Some(name), None) => name,
            (None, _) => fallback_name.to_string(),
        };

        debug!("Compiled {} patterns for model {name}", patterns.len());

        Ok(Self {
            name,
            labels,
            patterns,
            exact,
            folded,
        })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    fn candidates(&self, text: &str) -> Vec<Candidate> {
        let mut out = Vec::new();

        if let Some(matcher) = &self.exact {
            for m in matcher.automaton.find_overlapping_iter(text) {
                let range = (m.start(), m.end());
                self.push_candidate(&mut out, text, matcher, m.pattern().as_usize(), range);
            }
        }

        if let Some(matcher) = &self.folded {
            let folded = FoldedText::new(text);
            for m in matcher.automaton.find_overlapping_iter(folded.folded.as_str()) {
                let range = folded.original_range(m.start(), m.end());
                self.push_candidate(&mut out, text, matcher, m.pattern().as_usize(), range);
            }
        }

        out
    }

    fn push_candidate(
        &self,
        out: &mut Vec<Candidate>,
        text: &str,
        matcher: &Matcher,
        automaton_id: usize,
        (start, end): (usize, usize),
    ) {
        let pattern = matcher.pattern_ids[automaton_id];
        if on_word_boundaries(text, start, end, &self.patterns[pattern].phrase) {
            out.push(Candidate { start, end, pattern });
        }
    }
}

impl EntityRecognizer for PatternModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn recognize(&self, text: &str) -> Vec<Entity> {
        resolve_overlaps(self.candidates(text))
            .into_iter()
            .map(|c| {
                Entity::new(
                    &text[c.start..c.end],
                    self.patterns[c.pattern].label.as_str(),
                    c.start,
                    c.end,
                )
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String, ModelError> {
    std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns the literal phrase and whether it matches case-insensitively.
fn compile_pattern(spec: PatternSpec, phrases_ignore_case: bool) -> Result<(String, bool), String> {
    let (phrase, ignore_case) = match spec {
        PatternSpec::Phrase(phrase) if phrases_ignore_case => (fold_case(phrase.trim()), true),
        PatternSpec::Phrase(phrase) => (phrase.trim().to_string(), false),
        PatternSpec::Tokens(tokens) => {
            if tokens.is_empty() {
                return Err("token pattern is empty".to_string());
            }
            let mut words = Vec::with_capacity(tokens.len());
            let mut all_lower = true;
            for token in tokens {
                if let Some(lower) = token.lower {
                    words.push(fold_case(&lower));
                } else if let Some(exact) = token.orth.or(token.text) {
                    all_lower = false;
                    words.push(exact);
                } else {
                    return Err("token must set one of LOWER, ORTH or TEXT".to_string());
                }
            }
            (words.join(" "), all_lower)
        }
    };

    if phrase.is_empty() {
        return Err("pattern is empty".to_string());
    }
    Ok((phrase, ignore_case))
}

/// A match must not cut through a word: an alphanumeric edge of the phrase may
/// not touch another alphanumeric character in the text.
fn on_word_boundaries(text: &str, start: usize, end: usize, phrase: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric();

    let starts_with_word = phrase.chars().next().is_some_and(is_word);
    let ends_with_word = phrase.chars().next_back().is_some_and(is_word);

    let before_ok = !starts_with_word
        || text
            .get(..start)
            .and_then(|s| s.chars().next_back())
            .map_or(true, |c| !is_word(c));
    let after_ok = !ends_with_word
        || text
            .get(end..)
            .and_then(|s| s.chars().next())
            .map_or(true, |c| !is_word(c));

    before_ok && after_ok
}

/// Keeps the longest non-overlapping spans. Ties go to the earlier start, then
/// to the pattern listed first in the artifact. Output is ordered by start.
///
/// Kept spans are disjoint, so ordering them by start also orders their ends
/// and only the two neighbours of a candidate can overlap it.
fn resolve_overlaps(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        (b.end - b.start)
            .cmp(&(a.end - a.start))
            .then(a.start.cmp(&b.start))
            .then(a.pattern.cmp(&b.pattern))
    });

    let mut kept: BTreeMap<usize, Candidate> = BTreeMap::new();
    for c in candidates {
        let clear_before = kept
            .range(..=c.start)
            .next_back()
            .map_or(true, |(_, k)| k.end <= c.start);
        let clear_after = kept
            .range(c.start..)
            .next()
            .map_or(true, |(_, k)| k.start >= c.end);
        if clear_before && clear_after {
            kept.insert(c.start, c);
        }
    }
    kept.into_values().collect()
}
