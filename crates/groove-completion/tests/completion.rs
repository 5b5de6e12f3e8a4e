//! End-to-end completion against the bundled class index: patching,
//! classification, candidate generation and insertion together.

use groove_completion::patch::PatchKind;
use groove_completion::{
    Candidate, CandidateKind, CompletionEngine, CompletionList, CompletionRequest, InsertPayload,
};

// ── Helpers ────────────────────────────────────────────────────────────

/// Split `<caret>` out of `source`.
fn at_caret(source: &str) -> (String, u32) {
    let offset = source
        .find("<caret>")
        .expect("test source needs a <caret> marker") as u32;
    (source.replace("<caret>", ""), offset)
}

fn basic(source: &str) -> CompletionList {
    let (text, offset) = at_caret(source);
    CompletionEngine::default()
        .complete(&CompletionRequest::basic(text, offset))
        .unwrap()
}

fn smart(source: &str) -> CompletionList {
    let (text, offset) = at_caret(source);
    CompletionEngine::default()
        .complete(&CompletionRequest::smart(text, offset))
        .unwrap()
}

/// Apply `candidate` at the caret and return the new document and caret.
fn apply(source: &str, candidate: &Candidate) -> (String, u32) {
    let (text, offset) = at_caret(source);
    let edit = CompletionEngine::default()
        .apply(candidate, &text, offset)
        .unwrap();
    (edit.apply_to(&text), edit.caret)
}

fn pick<'a>(list: &'a CompletionList, lookup: &str) -> &'a Candidate {
    list.find(lookup)
        .unwrap_or_else(|| panic!("no `{lookup}` in {:?}", list.lookups()))
}

// ── Smart completion after `new` ─────────────────────────────────────

#[test]
fn concrete_type_offers_itself_with_constructor_call() {
    let source = "ArrayList xs = new <caret>";
    let list = smart(source);
    let candidate = pick(&list, "ArrayList");
    assert!(
        matches!(candidate.payload, InsertPayload::Constructor { .. }),
        "expected a constructor handler, got {:?}",
        candidate.payload
    );

    let (document, caret) = apply(source, candidate);
    assert_eq!(document, "ArrayList xs = new ArrayList()");
    assert_eq!(&document[caret as usize - 1..=caret as usize], "()");
}

#[test]
fn interface_offers_instantiable_inheritors_only() {
    let list = smart("List xs = new <caret>");
    let lookups = list.lookups();
    for expected in ["ArrayList", "LinkedList", "Vector", "Stack", "IntRange"] {
        assert!(lookups.contains(&expected), "missing {expected}: {lookups:?}");
    }
    for excluded in ["List", "AbstractList", "AbstractSequentialList", "UnmodifiableList", "Range"] {
        assert!(!lookups.contains(&excluded), "unexpected {excluded}: {lookups:?}");
    }
}

#[test]
fn inheritor_from_another_package_is_imported() {
    let source = "Map m = new <caret>";
    let list = smart(source);
    let candidate = pick(&list, "ConcurrentHashMap");
    assert_eq!(candidate.tail.as_deref(), Some(" (java.util.concurrent)"));

    let (document, caret) = apply(source, candidate);
    assert_eq!(
        document,
        "import java.util.concurrent.ConcurrentHashMap\n\nMap m = new ConcurrentHashMap()"
    );
    assert_eq!(caret as usize, document.len() - 1);
}

#[test]
fn array_expected_type() {
    let source = "int[] counts = new <caret>";
    let list = smart(source);
    assert_eq!(list.lookups(), vec!["int[]"]);
    let (document, caret) = apply(source, &list.items[0]);
    assert_eq!(document, "int[] counts = new int[]");
    assert_eq!(caret as usize, document.len() - 1);
}

#[test]
fn smart_completion_outside_initializer_is_empty() {
    assert!(smart("foo(new <caret>)").is_empty());
    assert!(smart("throw new <caret>").is_empty());
}

// ── Qualifier keywords ───────────────────────────────────────────────

#[test]
fn reachable_enclosing_instance_gives_this_and_super() {
    let list = basic("class Outer { void m() { Outer.<caret> } }");
    assert_eq!(list.lookups(), vec!["super", "this"]);
    assert!(list.iter().all(|c| c.kind == CandidateKind::Keyword));
}

#[test]
fn unreachable_enclosing_instance_gives_nothing() {
    let list = basic("class Outer {}\nclass Other { void k() { Outer.<caret> } }");
    assert!(list.is_empty(), "expected no candidates, got {:?}", list.lookups());
}

// ── Basic completion ─────────────────────────────────────────────────

#[test]
fn members_after_dot() {
    let source = "File f = new File('a')\nf.getN<caret>";
    let list = basic(source);
    assert_eq!(list.lookups(), vec!["getName"]);
    let (document, caret) = apply(source, &list.items[0]);
    assert!(document.ends_with("f.getName()"));
    assert_eq!(caret as usize, document.len());
}

#[test]
fn static_members_of_a_class() {
    let list = basic("Math.P<caret>");
    assert_eq!(list.lookups(), vec!["PI", "pow"]);
    assert_eq!(list.items[0].kind, CandidateKind::Field);
    assert_eq!(list.items[1].kind, CandidateKind::Method);
}

#[test]
fn qualified_package_in_new_expression() {
    let source = "def s = new groovy.json.JsonSl<caret>";
    let list = basic(source);
    assert_eq!(list.lookups(), vec!["JsonSlurper"]);
    let (document, _) = apply(source, &list.items[0]);
    assert_eq!(document, "def s = new groovy.json.JsonSlurper()");
}

#[test]
fn declared_type_after_modifier_only_offers_types() {
    let list = basic("class A { private Strin<caret> }");
    assert!(!list.is_empty());
    assert!(
        list.iter()
            .all(|c| matches!(c.payload, InsertPayload::Type { .. })),
        "{:?}",
        list.lookups()
    );
    assert!(list.lookups().contains(&"String"));
    assert!(list.lookups().contains(&"StringBuilder"));
}

#[test]
fn locals_rank_above_classes() {
    let list = basic("def string = 'x'\nprintln(str<caret>)");
    assert_eq!(list.lookups().first(), Some(&"string"));
    assert!(list.lookups().contains(&"String"));
}

// ── Patching ─────────────────────────────────────────────────────────

#[test]
fn patcher_adds_no_punctuation_when_not_needed() {
    let engine = CompletionEngine::default();
    for (source, offset) in [("foo.", 4), ("x = ", 4), ("println(a)", 9), ("", 0)] {
        let patch = engine
            .before_completion(&CompletionRequest::basic(source, offset))
            .unwrap();
        assert_eq!(patch.kind, PatchKind::Plain, "{source:?}");
        assert_eq!(patch.text.len(), source.len() + "IntellijIdeaRulezzz".len());
    }
}

#[test]
fn patcher_terminates_statement_before_call_and_declaration() {
    let engine = CompletionEngine::default();
    let patch = engine
        .before_completion(&CompletionRequest::basic("foo(1)", 3))
        .unwrap();
    assert_eq!(patch.kind, PatchKind::Semicolon);
    let patch = engine
        .before_completion(&CompletionRequest::basic("\nString name = 'x'", 0))
        .unwrap();
    assert_eq!(patch.kind, PatchKind::Semicolon);
}

#[test]
fn closure_parameter_gets_an_arrow() {
    let engine = CompletionEngine::default();
    let request = CompletionRequest::basic("def c = { String x, }", 20);
    let patch = engine.before_completion(&request).unwrap();
    assert_eq!(patch.kind, PatchKind::ClosureArrow);
    assert_eq!(patch.text, "def c = { String x, IntellijIdeaRulezzz->}");
}

#[test]
fn applied_edits_never_contain_the_dummy() {
    let sources = [
        "ArrayList xs = new <caret>",
        "def x = new Arr<caret>",
        "String s = 'a'\ns.<caret>",
        "class A { private Li<caret> }",
        "println(<caret>)",
    ];
    for source in sources {
        let (text, offset) = at_caret(source);
        let engine = CompletionEngine::default();
        let mut lists = vec![engine
            .complete(&CompletionRequest::basic(text.clone(), offset))
            .unwrap()];
        lists.push(
            engine
                .complete(&CompletionRequest::smart(text.clone(), offset))
                .unwrap(),
        );
        for candidate in lists.iter().flatten() {
            let edit = engine.apply(candidate, &text, offset).unwrap();
            let result = edit.apply_to(&text);
            assert!(
                !result.contains("IntellijIdeaRulezzz"),
                "{source:?} + {} produced {result:?}",
                candidate.lookup
            );
        }
    }
}
