//! Rule matching over normalized trees.
//!
//! One depth-first pass per file. At each node only the rules indexed for
//! `(language, kind)` are tested, and context constraints look at a bounded
//! ancestor window, so cost stays linear in tree size times active rules.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::config::DEFAULT_CONTEXT_WINDOW;
use crate::context::EvaluationContext;
use crate::rules::{RenderInput, RuleModel};
use crate::tree::{Node, SyntaxTree};
use crate::types::Diagnostic;

/// Errors that end an evaluation run early.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// The run was cancelled; its partial results are discarded.
    #[error("evaluation of {} was cancelled", file.display())]
    Cancelled {
        /// File whose run was cancelled.
        file: PathBuf,
    },
}

enum Step<'t> {
    Enter(&'t Node),
    Leave { suppressed: bool },
}

/// Evaluates a rule model against syntax trees.
///
/// Holds an `Arc` snapshot of the model, so a run always sees the model it
/// started with even if the active one is replaced meanwhile.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    model: Arc<RuleModel>,
    context_window: usize,
}

impl RuleEngine {
    /// Creates an engine over `model`.
    #[must_use]
    pub fn new(model: Arc<RuleModel>) -> Self {
        Self {
            model,
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }

    /// Sets how many ancestors context constraints may inspect.
    #[must_use]
    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// The model snapshot this engine evaluates.
    #[must_use]
    pub fn model(&self) -> &Arc<RuleModel> {
        &self.model
    }

    /// Evaluates `tree`, returning diagnostics in traversal order.
    ///
    /// Repeated calls on the same tree yield identical sequences.
    #[must_use]
    pub fn evaluate(&self, tree: &SyntaxTree) -> Vec<Diagnostic> {
        self.evaluate_cancellable(tree, &CancellationToken::new())
            .unwrap_or_default()
    }

    /// Evaluates `tree`, checking `token` at every node boundary.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::Cancelled`] once the token is cancelled.
    pub fn evaluate_cancellable(
        &self,
        tree: &SyntaxTree,
        token: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, EvaluationError> {
        let mut ctx = EvaluationContext::new(tree.file(), tree.language(), self.context_window);
        if !self.model.has_rules_for(tree.language()) {
            debug!("No rules for {}, skipping {}", tree.language(), tree.file().display());
            return Ok(Vec::new());
        }

        let mut stack = vec![Step::Enter(tree.root())];
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(node) => {
                    if token.is_cancelled() {
                        debug!("Cancelled at depth {} in {}", ctx.depth(), tree.file().display());
                        return Err(EvaluationError::Cancelled {
                            file: tree.file().to_path_buf(),
                        });
                    }
                    let suppressed = match node.suppression() {
                        Some(suppression) => {
                            ctx.push_suppression(suppression);
                            true
                        }
                        None => false,
                    };
                    self.match_node(node, &mut ctx);
                    ctx.enter(node.kind());
                    stack.push(Step::Leave { suppressed });
                    stack.extend(node.children().iter().rev().map(Step::Enter));
                }
                Step::Leave { suppressed } => {
                    ctx.leave();
                    if suppressed {
                        ctx.pop_suppression();
                    }
                }
            }
        }

        let diagnostics = ctx.into_diagnostics();
        debug!(
            "Evaluated {}: {} diagnostics",
            tree.file().display(),
            diagnostics.len()
        );
        Ok(diagnostics)
    }

    fn match_node(&self, node: &Node, ctx: &mut EvaluationContext<'_>) {
        let file = ctx.file();
        let lang = ctx.language();
        let value = node.value().unwrap_or("");

        for rule in self.model.rules_for(lang, node.kind()) {
            if ctx.is_suppressed(rule.id()) {
                continue;
            }
            if !rule.context().is_empty() && !rule.context().admits(ctx.ancestors()) {
                continue;
            }
            let Some(captures) = rule.matcher().find(value) else {
                continue;
            };
            let message = rule.message().render(&RenderInput {
                rule: rule.id(),
                kind: node.kind(),
                lang,
                value,
                captures: &captures,
            });
            ctx.emit(
                Diagnostic::new(
                    Arc::clone(rule.id()),
                    file,
                    node.span(),
                    rule.severity(),
                    message,
                )
                .with_doc(rule.doc().cloned()),
            );
        }
    }
}

/// Evaluates `tree` against `model` with default settings.
#[must_use]
pub fn evaluate(tree: &SyntaxTree, model: Arc<RuleModel>) -> Vec<Diagnostic> {
    RuleEngine::new(model).evaluate(tree)
}
