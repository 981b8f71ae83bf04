//! Kotlin front end using tree-sitter.

use std::path::Path;

use polylint_core::{ExternalNode, ExternalTree, LanguageId, MAX_TREE_DEPTH};
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

use crate::parser::{ParseError, SourceParser};

/// Kinds whose source text is kept even though they have named children.
const TEXT_KINDS: &[&str] = &[
    "string_literal",
    "multiline_string_literal",
    "annotation",
    "file_annotation",
];

/// Parses Kotlin source into external trees.
pub struct KotlinParser {
    language: Language,
}

impl KotlinParser {
    /// Creates a new Kotlin parser.
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: tree_sitter_kotlin_ng::LANGUAGE.into(),
        }
    }

    fn convert(
        node: Node<'_>,
        src: &str,
        depth: usize,
        file: &Path,
    ) -> Result<ExternalNode, ParseError> {
        if depth > MAX_TREE_DEPTH {
            return Err(ParseError::TooDeep {
                file: file.to_path_buf(),
                limit: MAX_TREE_DEPTH,
            });
        }
        let mut ext = ExternalNode::new(node.kind(), node.start_byte(), node.end_byte());
        if node.named_child_count() == 0 || TEXT_KINDS.contains(&node.kind()) {
            ext.text = src.get(node.start_byte()..node.end_byte()).map(str::to_string);
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            ext.children.push(Self::convert(child, src, depth + 1, file)?);
        }
        Ok(ext)
    }
}

impl Default for KotlinParser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KotlinParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KotlinParser").finish_non_exhaustive()
    }
}

impl SourceParser for KotlinParser {
    fn language(&self) -> LanguageId {
        LanguageId::Kotlin
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["kt", "kts"]
    }

    fn parse(&self, file: &Path, source: &str) -> Result<ExternalTree, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|source| ParseError::Grammar {
                language: LanguageId::Kotlin,
                source,
            })?;

        let tree = parser.parse(source, None).ok_or_else(|| ParseError::NoTree {
            file: file.to_path_buf(),
        })?;
        let root = tree.root_node();
        if root.has_error() {
            debug!(file = %file.display(), "kotlin source contains syntax errors");
        }

        let mut converted = Self::convert(root, source, 0, file)?;
        // Leading and trailing trivia belong to the file.
        converted.start = 0;
        converted.end = source.len();
        converted.text = None;

        Ok(ExternalTree {
            file: file.to_path_buf(),
            language: LanguageId::Kotlin.as_str().to_string(),
            source: Some(source.to_string()),
            root: converted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> ExternalTree {
        KotlinParser::new()
            .parse(Path::new("Main.kt"), src)
            .expect("kotlin should parse")
    }

    fn find<'a>(node: &'a ExternalNode, kind: &str) -> Option<&'a ExternalNode> {
        if node.kind == kind {
            return Some(node);
        }
        node.children.iter().find_map(|c| find(c, kind))
    }

    #[test]
    fn root_spans_whole_source() {
        let src = "\npackage com.example\n\nfun main() {}\n";
        let tree = parse(src);
        assert_eq!(tree.root.kind, "source_file");
        assert_eq!(tree.root.start, 0);
        assert_eq!(tree.root.end, src.len());
        assert_eq!(tree.language, "kt");
        assert_eq!(tree.source.as_deref(), Some(src));
    }

    #[test]
    fn string_literals_keep_text() {
        let tree = parse("fun main() { println(\"Hello there\") }\n");
        let s = find(&tree.root, "string_literal").expect("string literal");
        assert_eq!(s.text.as_deref(), Some("\"Hello there\""));
    }

    #[test]
    fn comments_are_kept() {
        let tree = parse("// noinspection R1\nval x = 1\n");
        let c = find(&tree.root, "line_comment").expect("comment");
        assert_eq!(c.text.as_deref(), Some("// noinspection R1"));
    }

    #[test]
    fn empty_source() {
        let tree = parse("");
        assert!(tree.root.children.is_empty());
        assert_eq!(tree.root.end, 0);
    }

    #[test]
    fn handles_kotlin_extensions() {
        let p = KotlinParser::new();
        assert!(p.handles(Path::new("src/Main.kt")));
        assert!(p.handles(Path::new("build.gradle.kts")));
        assert!(!p.handles(Path::new("Main.java")));
    }
}
