//! Integration test: configuration → model → normalization → evaluation →
//! aggregation → publishing, through the public API only.

use polylint_core::{
    aggregate, evaluate, rules, AdapterRegistry, Analyzer, CollectingSink, ConfigError,
    ConfigFormat, ExternalNode, ExternalTree, LanguageAdapter, LanguageId, ModelStore, Node,
    NodeKind, Severity, Span, Suppression, SyntaxTree, TreeError,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

struct Python;

impl LanguageAdapter for Python {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn classify(&self, node: &ExternalNode) -> NodeKind {
        match node.kind.as_str() {
            "module" => NodeKind::File,
            "function_definition" => NodeKind::Function,
            "string" => NodeKind::StringLiteral,
            _ => NodeKind::Other,
        }
    }

    fn extract_literal(&self, kind: NodeKind, node: &ExternalNode) -> Option<String> {
        (kind == NodeKind::StringLiteral)
            .then(|| node.text_or_empty().trim_matches('"').to_string())
    }
}

fn registry() -> AdapterRegistry {
    AdapterRegistry::new().with(Python)
}

fn r1_model() -> Arc<polylint_core::RuleModel> {
    let bytes = std::fs::read(fixture("rules.yaml")).expect("fixture rules should exist");
    Arc::new(rules::load(&bytes, ConfigFormat::Yaml).expect("fixture rules should load"))
}

fn tree_with(child: Node) -> SyntaxTree {
    let root = Node::branch(NodeKind::File, Span::new(0, 40), vec![child])
        .expect("root should contain child");
    SyntaxTree::new("app.py", LanguageId::Python, root)
}

fn string_literal() -> Node {
    Node::leaf(NodeKind::StringLiteral, Span::new(10, 20)).with_value("hello")
}

// ── Scenarios ──

#[test]
fn single_string_literal_yields_one_diagnostic() {
    let diagnostics = evaluate(&tree_with(string_literal()), r1_model());
    assert_eq!(diagnostics.len(), 1);
    let d = &diagnostics[0];
    assert_eq!(&*d.rule, "R1");
    assert_eq!(d.span, Span::new(10, 20));
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!(d.doc.as_deref(), Some("I18N.md#hardcoded"));
}

#[test]
fn suppression_marker_yields_nothing() {
    let marker = Node::marker(Span::new(0, 30), Suppression::All, vec![string_literal()])
        .expect("marker should contain literal");
    assert!(evaluate(&tree_with(marker), r1_model()).is_empty());
}

#[test]
fn cobol_is_unsupported() {
    let root = ExternalNode::new("program", 0, 10);
    let err = registry()
        .normalize("cobol", Path::new("legacy.cob"), &root)
        .unwrap_err();
    assert!(matches!(err, TreeError::UnsupportedLanguage { .. }));
}

// ── Properties ──

#[test]
fn empty_tree_yields_no_diagnostics() {
    let tree = SyntaxTree::new(
        "empty.py",
        LanguageId::Python,
        Node::leaf(NodeKind::File, Span::new(0, 0)),
    );
    assert!(evaluate(&tree, r1_model()).is_empty());
}

#[test]
fn evaluation_and_aggregation_are_stable() {
    let tree_json = std::fs::read_to_string(fixture("greeting.tree.json")).unwrap();
    let external: ExternalTree = serde_json::from_str(&tree_json).unwrap();
    let tree = registry().normalize_tree(&external).unwrap();

    let model = r1_model();
    let first = evaluate(&tree, Arc::clone(&model));
    let second = evaluate(&tree, model);
    assert_eq!(first, second);

    let once = aggregate(first);
    assert_eq!(aggregate(once.clone()), once);
}

#[test]
fn duplicate_ids_leave_previous_model_active() {
    let store = ModelStore::new(rules::load(b"rules: []", ConfigFormat::Yaml).unwrap());
    let bytes = std::fs::read(fixture("rules.yaml")).unwrap();
    store.reload(&bytes, ConfigFormat::Yaml).unwrap();

    let duplicate = br#"{"rules": [
        {"id": "X", "kinds": ["Comment"], "pattern": "a", "message": "m"},
        {"id": "X", "kinds": ["Comment"], "pattern": "b", "message": "m"}
    ]}"#;
    let err = store.reload(duplicate, ConfigFormat::Json).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
    assert!(store.snapshot().get("R1").is_some());
    assert!(store.snapshot().get("X").is_none());
}

// ── End to end ──

#[test]
fn analyzer_respects_host_suppression_regions() {
    let tree_json = std::fs::read_to_string(fixture("greeting.tree.json")).unwrap();
    let external: ExternalTree = serde_json::from_str(&tree_json).unwrap();

    let store = Arc::new(ModelStore::default());
    store
        .reload(&std::fs::read(fixture("rules.yaml")).unwrap(), ConfigFormat::Yaml)
        .unwrap();
    let sink = Arc::new(CollectingSink::new());
    let analyzer = Analyzer::builder()
        .registry(registry())
        .store(store)
        .sink(sink.clone())
        .build()
        .expect("analyzer should build");

    let report = analyzer.analyze(vec![external.into()]);

    // "Bye" sits inside the suppression region; only "Hello" is reported.
    assert_eq!(report.files_checked, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].span, Span::new(24, 31));
    assert_eq!(sink.diagnostics(), report.diagnostics);

    insta::assert_snapshot!(
        report.diagnostics[0].to_string(),
        @"app/greeting.py:[24,31]: warning [R1] hardcoded string"
    );
}
