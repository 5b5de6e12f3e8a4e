//! Collects candidates from every strategy that ran for a request.

use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::config::CompletionConfig;
use crate::item::{Candidate, CompletionList, SymbolKey};

/// Decides whether a candidate's lookup string matches the typed prefix.
///
/// Matches plain prefixes (case-insensitively unless configured otherwise)
/// and camel humps: `AL` and `ArrLi` both match `ArrayList`.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: String,
    case_sensitive: bool,
}

impl PrefixMatcher {
    pub fn new(prefix: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            prefix: prefix.into(),
            case_sensitive,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.prefix.is_empty() {
            return true;
        }
        let plain = if self.case_sensitive {
            name.starts_with(&self.prefix)
        } else {
            name.to_lowercase().starts_with(&self.prefix.to_lowercase())
        };
        plain || camel_hump_matches(&self.prefix, name, self.case_sensitive)
    }
}

fn camel_hump_matches(prefix: &str, name: &str, case_sensitive: bool) -> bool {
    let name: Vec<char> = name.chars().collect();
    let mut chars = prefix.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    match name.first() {
        Some(&c) if c == first || (!case_sensitive && c.eq_ignore_ascii_case(&first)) => {}
        _ => return false,
    }
    let mut i = 1;
    for c in chars {
        if name.get(i) == Some(&c) {
            i += 1;
        } else if c.is_uppercase() {
            match name[i..].iter().position(|&n| n == c) {
                Some(p) => i += p + 1,
                None => return false,
            }
        } else {
            return false;
        }
    }
    true
}

/// Accumulates candidates for one request.
///
/// Candidates whose lookup does not match the prefix are dropped. Two
/// candidates for the same [`SymbolKey`] collapse into the higher-ranked
/// one. Once the request is cancelled `add` refuses further candidates and
/// returns `false` so producers can stop early.
pub struct CompletionResultSink<'c> {
    matcher: PrefixMatcher,
    items: Vec<Candidate>,
    by_key: FxHashMap<SymbolKey, usize>,
    cancel: &'c CancellationToken,
    max_results: usize,
    excluded: Option<String>,
    cancelled: bool,
}

impl<'c> CompletionResultSink<'c> {
    pub fn new(prefix: &str, config: &CompletionConfig, cancel: &'c CancellationToken) -> Self {
        Self {
            matcher: PrefixMatcher::new(prefix, config.case_sensitive),
            items: Vec::new(),
            by_key: FxHashMap::default(),
            cancel,
            max_results: config.max_results,
            excluded: None,
            cancelled: false,
        }
    }

    /// Drop candidates whose lookup contains `text`; used for the dummy
    /// identifier, which can leak into scopes of the patched tree.
    pub fn exclude(mut self, text: &str) -> Self {
        self.excluded = Some(text.to_string());
        self
    }

    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }

    pub fn matcher(&self) -> &PrefixMatcher {
        &self.matcher
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled || self.cancel.is_cancelled()
    }

    /// Offer a candidate. Returns `false` once the request is cancelled.
    pub fn add(&mut self, candidate: Candidate) -> bool {
        if self.is_cancelled() {
            self.cancelled = true;
            return false;
        }
        if !self.matcher.matches(&candidate.lookup) {
            return true;
        }
        if let Some(excluded) = &self.excluded {
            if candidate.lookup.contains(excluded.as_str()) {
                return true;
            }
        }
        match self.by_key.get(&candidate.symbol) {
            Some(&i) => {
                if candidate.rank > self.items[i].rank {
                    trace!(lookup = %candidate.lookup, "replacing lower-ranked duplicate");
                    self.items[i] = candidate;
                }
            }
            None => {
                self.by_key.insert(candidate.symbol.clone(), self.items.len());
                self.items.push(candidate);
            }
        }
        true
    }

    /// Add every candidate from `candidates`, stopping at cancellation.
    pub fn add_all(&mut self, candidates: impl IntoIterator<Item = Candidate>) -> bool {
        for candidate in candidates {
            if !self.add(candidate) {
                return false;
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sort by rank (highest first), then lookup, then tail, and cut the
    /// list to `max_results`.
    pub fn finish(self) -> CompletionList {
        let incomplete = self.is_cancelled();
        let mut items = self.items;
        items.sort_by(|a, b| {
            b.rank
                .cmp(&a.rank)
                .then_with(|| a.lookup.cmp(&b.lookup))
                .then_with(|| a.tail.cmp(&b.tail))
        });
        let truncated = self.max_results > 0 && items.len() > self.max_results;
        if truncated {
            items.truncate(self.max_results);
        }
        CompletionList {
            prefix: self.matcher.prefix,
            items,
            incomplete: incomplete || truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{rank, CandidateKind};

    fn class(name: &str, rank: u32) -> Candidate {
        Candidate::new(name, CandidateKind::Class, SymbolKey::Class(format!("p.{name}")))
            .with_rank(rank)
    }

    #[test]
    fn prefix_and_camel_hump_matching() {
        let matcher = PrefixMatcher::new("arr", false);
        assert!(matcher.matches("ArrayList"));
        assert!(!matcher.matches("LinkedList"));

        let humps = PrefixMatcher::new("AL", false);
        assert!(humps.matches("ArrayList"));
        assert!(humps.matches("AbstractList"));
        assert!(!humps.matches("Array"));

        assert!(PrefixMatcher::new("ArrLi", false).matches("ArrayList"));
        assert!(!PrefixMatcher::new("arr", true).matches("ArrayList"));
        assert!(PrefixMatcher::new("", true).matches("anything"));
    }

    #[test]
    fn duplicates_keep_highest_rank() {
        let cancel = CancellationToken::new();
        let mut sink = CompletionResultSink::new("", &CompletionConfig::default(), &cancel);
        sink.add(class("ArrayList", rank::CLASS));
        sink.add(class("ArrayList", rank::SMART_EXACT).with_tail(" (p)"));
        sink.add(class("ArrayList", rank::SMART_INHERITOR));
        let list = sink.finish();
        assert_eq!(list.len(), 1);
        assert_eq!(list.items[0].rank, rank::SMART_EXACT);
        assert_eq!(list.items[0].tail.as_deref(), Some(" (p)"));
    }

    #[test]
    fn sorted_by_rank_then_lookup() {
        let cancel = CancellationToken::new();
        let mut sink = CompletionResultSink::new("", &CompletionConfig::default(), &cancel);
        sink.add(class("Zeta", rank::CLASS));
        sink.add(class("Alpha", rank::CLASS));
        sink.add(Candidate::keyword("this"));
        assert_eq!(sink.finish().lookups(), vec!["this", "Alpha", "Zeta"]);
    }

    #[test]
    fn non_matching_and_excluded_candidates_are_dropped() {
        let cancel = CancellationToken::new();
        let mut sink = CompletionResultSink::new("Li", &CompletionConfig::default(), &cancel)
            .exclude("Rulezzz");
        assert!(sink.add(class("ArrayList", rank::CLASS)));
        assert!(sink.add(class("LinkedList", rank::CLASS)));
        assert!(sink.add(class("LiRulezzz", rank::CLASS)));
        assert_eq!(sink.finish().lookups(), vec!["LinkedList"]);
    }

    #[test]
    fn cancelled_sink_refuses_candidates() {
        let cancel = CancellationToken::new();
        let mut sink = CompletionResultSink::new("", &CompletionConfig::default(), &cancel);
        assert!(sink.add(class("A", rank::CLASS)));
        cancel.cancel();
        assert!(!sink.add(class("B", rank::CLASS)));
        let list = sink.finish();
        assert_eq!(list.lookups(), vec!["A"]);
        assert!(list.incomplete);
    }

    #[test]
    fn truncates_to_max_results() {
        let cancel = CancellationToken::new();
        let config = CompletionConfig {
            max_results: 2,
            ..CompletionConfig::default()
        };
        let mut sink = CompletionResultSink::new("", &config, &cancel);
        sink.add_all(["C", "A", "B"].into_iter().map(|n| class(n, rank::CLASS)));
        let list = sink.finish();
        assert_eq!(list.lookups(), vec!["A", "B"]);
        assert!(list.incomplete);
    }
}
