//! textDocument/completion: runs the engine and turns its candidates into
//! LSP completion items.
//!
//! Every item carries its fully computed edit, so `completionItem/resolve`
//! is never needed. The primary edit becomes `text_edit` with the caret as a
//! `$0` snippet stop; an import becomes an additional text edit.

use std::collections::HashSet;

use groove_completion::{
    Candidate, CandidateKind, CompletionEngine, CompletionList, CompletionRequest, DocumentEdit,
    GrooveError,
};
use tokio_util::sync::CancellationToken;
use tower_lsp::lsp_types::{
    self, Command, CompletionItem, CompletionItemKind, CompletionItemLabelDetails,
    CompletionResponse, CompletionTextEdit, InsertTextFormat,
};
use tracing::debug;

use crate::position::span_to_range;

const PARAMETER_HINTS: &str = "editor.action.triggerParameterHints";

/// Whether the line before `offset`, ignoring the identifier being typed,
/// ends in the word `new` followed by whitespace.
pub fn wants_smart(source: &str, offset: u32) -> bool {
    let before = &source[..offset as usize];
    let line = before.rsplit('\n').next().unwrap_or(before);
    let rest = line.trim_end_matches(is_ident_char);
    if !rest.ends_with(char::is_whitespace) {
        return false;
    }
    rest.trim_end()
        .strip_suffix("new")
        .is_some_and(|head| !head.ends_with(is_ident_char))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Smart candidates first, then basic ones naming a different symbol.
pub fn merge(smart: CompletionList, basic: CompletionList) -> CompletionList {
    let incomplete = smart.incomplete || basic.incomplete;
    let prefix = basic.prefix.clone();
    let mut seen = HashSet::new();
    let items = smart
        .into_iter()
        .chain(basic)
        .filter(|candidate| seen.insert(candidate.symbol.clone()))
        .collect();
    CompletionList {
        prefix,
        items,
        incomplete,
    }
}

/// Complete at `offset` of `source`: a basic request, plus a smart one right
/// after `new`.
pub fn completions(
    engine: &CompletionEngine,
    source: &str,
    offset: u32,
    cancel: &CancellationToken,
) -> Result<CompletionResponse, GrooveError> {
    let basic = engine.complete(&CompletionRequest::basic(source, offset).with_cancel(cancel.clone()))?;
    let list = if wants_smart(source, offset) {
        let smart =
            engine.complete(&CompletionRequest::smart(source, offset).with_cancel(cancel.clone()))?;
        debug!(smart = smart.len(), basic = basic.len(), "merging smart completion");
        merge(smart, basic)
    } else {
        basic
    };

    let mut items = Vec::with_capacity(list.len());
    for (index, candidate) in list.iter().enumerate() {
        let edit = engine.apply(candidate, source, offset)?;
        items.push(to_item(source, candidate, &edit, index));
    }
    Ok(CompletionResponse::List(lsp_types::CompletionList {
        is_incomplete: list.incomplete,
        items,
    }))
}

/// Build the LSP item for `candidate` whose edit is `edit`.
pub fn to_item(source: &str, candidate: &Candidate, edit: &DocumentEdit, index: usize) -> CompletionItem {
    let primary = edit.primary();
    let new_text = snippet(&primary.text, edit.caret_in_primary() as usize);
    let additional: Vec<lsp_types::TextEdit> = edit.edits[1..]
        .iter()
        .map(|e| lsp_types::TextEdit::new(span_to_range(source, e.span), e.text.clone()))
        .collect();

    let detail = candidate
        .type_text
        .clone()
        .or_else(|| (candidate.display != candidate.lookup).then(|| candidate.display.clone()));

    CompletionItem {
        label: candidate.lookup.clone(),
        label_details: candidate.tail.as_ref().map(|tail| CompletionItemLabelDetails {
            detail: Some(tail.clone()),
            description: None,
        }),
        kind: Some(item_kind(candidate.kind)),
        detail,
        sort_text: Some(format!("{index:05}")),
        filter_text: Some(candidate.lookup.clone()),
        insert_text_format: Some(InsertTextFormat::SNIPPET),
        text_edit: Some(CompletionTextEdit::Edit(lsp_types::TextEdit::new(
            span_to_range(source, primary.span),
            new_text,
        ))),
        additional_text_edits: (!additional.is_empty()).then_some(additional),
        command: edit.trigger_signature_help.then(|| Command {
            title: "Parameter hints".to_string(),
            command: PARAMETER_HINTS.to_string(),
            arguments: None,
        }),
        ..Default::default()
    }
}

fn item_kind(kind: CandidateKind) -> CompletionItemKind {
    match kind {
        CandidateKind::Class | CandidateKind::ArrayType => CompletionItemKind::CLASS,
        CandidateKind::Interface => CompletionItemKind::INTERFACE,
        CandidateKind::Method => CompletionItemKind::METHOD,
        CandidateKind::Field => CompletionItemKind::FIELD,
        CandidateKind::Variable | CandidateKind::Parameter => CompletionItemKind::VARIABLE,
        CandidateKind::Keyword => CompletionItemKind::KEYWORD,
        CandidateKind::Package => CompletionItemKind::MODULE,
    }
}

/// `text` as a snippet with the final tab stop at byte `caret`.
fn snippet(text: &str, caret: usize) -> String {
    let caret = if text.is_char_boundary(caret) { caret } else { text.len() };
    let (head, tail) = text.split_at(caret);
    let mut out = escape_snippet(head);
    if !tail.is_empty() {
        out.push_str("$0");
        out.push_str(&escape_snippet(tail));
    }
    out
}

fn escape_snippet(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '$' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_lsp::lsp_types::{Position, Range};

    fn items(response: CompletionResponse) -> Vec<CompletionItem> {
        match response {
            CompletionResponse::List(list) => list.items,
            CompletionResponse::Array(items) => items,
        }
    }

    fn run(source: &str) -> Vec<CompletionItem> {
        let offset = source.len() as u32;
        let response = completions(
            &CompletionEngine::default(),
            source,
            offset,
            &CancellationToken::new(),
        )
        .unwrap();
        items(response)
    }

    fn new_text(item: &CompletionItem) -> &str {
        match item.text_edit.as_ref().unwrap() {
            CompletionTextEdit::Edit(edit) => &edit.new_text,
            CompletionTextEdit::InsertAndReplace(edit) => &edit.new_text,
        }
    }

    #[test]
    fn smart_only_right_after_new() {
        assert!(wants_smart("List xs = new ", 14));
        assert!(wants_smart("List xs = new Arr", 17));
        assert!(wants_smart("def a = 1\nMap m = new\tHa", 24));
        assert!(!wants_smart("def x = new", 11));
        assert!(!wants_smart("def renew ", 10));
        assert!(!wants_smart("x = newer", 9));
        assert!(!wants_smart("new\nfoo", 7));
        assert!(!wants_smart("", 0));
    }

    #[test]
    fn snippet_escapes_and_places_caret() {
        assert_eq!(snippet("ArrayList()", 10), "ArrayList($0)");
        assert_eq!(snippet("size", 4), "size");
        assert_eq!(snippet("a$b}", 1), "a$0\\$b\\}");
    }

    #[test]
    fn constructor_item_replaces_prefix_with_call() {
        let items = run("def x = new Arr");
        let item = items
            .iter()
            .find(|i| i.label == "ArrayList")
            .expect("ArrayList should be offered");
        assert_eq!(new_text(item), "ArrayList($0)");
        match item.text_edit.as_ref().unwrap() {
            CompletionTextEdit::Edit(edit) => assert_eq!(
                edit.range,
                Range::new(Position::new(0, 12), Position::new(0, 15))
            ),
            other => panic!("unexpected edit {other:?}"),
        }
        assert_eq!(item.kind, Some(CompletionItemKind::CLASS));
        assert_eq!(
            item.command.as_ref().map(|c| c.command.as_str()),
            Some(PARAMETER_HINTS),
            "ArrayList has constructors with parameters"
        );
    }

    #[test]
    fn import_goes_into_additional_edits() {
        let items = run("Map m = new ");
        let item = items
            .iter()
            .find(|i| i.label == "ConcurrentHashMap")
            .expect("smart completion should offer ConcurrentHashMap");
        assert_eq!(new_text(item), "ConcurrentHashMap($0)");
        let imports = item.additional_text_edits.as_ref().unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].new_text, "import java.util.concurrent.ConcurrentHashMap\n\n");
        assert_eq!(imports[0].range.start, Position::new(0, 0));
    }

    #[test]
    fn smart_candidates_come_first_without_duplicates() {
        let items = run("ArrayList xs = new ");
        assert_eq!(items[0].label, "ArrayList");
        let count = items.iter().filter(|i| i.label == "ArrayList").count();
        assert_eq!(count, 1, "basic duplicate of the smart candidate should be dropped");
        let sort: Vec<&str> = items.iter().filter_map(|i| i.sort_text.as_deref()).collect();
        assert!(sort.windows(2).all(|w| w[0] < w[1]));
    }
}
