//! DTO → Domain model conversion with validation.
//!
//! Conversion collects every problem in the document before failing, so a
//! broken configuration is reported in one pass.

use crate::language::LanguageId;
use crate::tree::NodeKind;
use crate::types::Severity;

use super::config_dto::RuleDto;
use super::matcher::MatcherKind;
use super::model::{
    ContextConstraint, KindSelector, LanguageSet, MessageTemplate, ModelError, Rule, RuleModel,
};

/// A validation problem with its location in the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{context}: {source}")]
pub struct ValidationIssue {
    /// Where the problem occurred (e.g., `rules[2].severity`).
    pub context: String,
    /// The underlying model error.
    pub source: ModelError,
}

impl ValidationIssue {
    fn new(context: impl Into<String>, source: ModelError) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }
}

/// Rules from one source, labelled for issue locations (`rules`,
/// `preset.rules`, `include[1].rules`).
#[derive(Debug, Clone)]
pub struct RuleGroup {
    /// Location prefix of the group's rules.
    pub label: String,
    /// Rules in document order.
    pub rules: Vec<RuleDto>,
}

impl RuleGroup {
    /// Creates a group.
    #[must_use]
    pub fn new(label: impl Into<String>, rules: Vec<RuleDto>) -> Self {
        Self {
            label: label.into(),
            rules,
        }
    }
}

/// Converts rule DTOs into a validated [`RuleModel`].
///
/// # Errors
///
/// Returns every issue found; no model is produced unless all rules are valid.
pub fn load(dtos: Vec<RuleDto>) -> Result<RuleModel, Vec<ValidationIssue>> {
    load_groups(vec![RuleGroup::new("rules", dtos)])
}

/// Converts several groups, in order, into one [`RuleModel`].
///
/// Ids share one namespace across groups.
///
/// # Errors
///
/// Same conditions as [`load`].
pub fn load_groups(groups: Vec<RuleGroup>) -> Result<RuleModel, Vec<ValidationIssue>> {
    let mut issues = Vec::new();
    let mut rules = Vec::new();

    for group in groups {
        for (i, dto) in group.rules.into_iter().enumerate() {
            match convert_rule(dto, &group.label, i) {
                Ok(rule) => rules.push(rule),
                Err(mut errs) => issues.append(&mut errs),
            }
        }
    }

    if !issues.is_empty() {
        return Err(issues);
    }

    RuleModel::new(rules).map_err(|errs| {
        errs.into_iter()
            .map(|e| ValidationIssue::new("rules", e))
            .collect()
    })
}

fn convert_rule(dto: RuleDto, label: &str, index: usize) -> Result<Rule, Vec<ValidationIssue>> {
    let ctx = if dto.id.is_empty() {
        format!("{label}[{index}]")
    } else {
        format!("{label}[{index}] '{}'", dto.id)
    };
    let mut issues = Vec::new();

    if dto.id.is_empty() {
        issues.push(ValidationIssue::new(format!("{ctx}.id"), ModelError::EmptyId));
    }

    let kinds = convert_kinds(&dto.kinds, &format!("{ctx}.kinds"), &mut issues);
    let languages = convert_languages(&dto.languages, &format!("{ctx}.languages"), &mut issues);
    let inside = convert_kind_list(&dto.inside, &format!("{ctx}.inside"), &mut issues);
    let not_inside = convert_kind_list(&dto.not_inside, &format!("{ctx}.not_inside"), &mut issues);

    let severity = Severity::parse(&dto.severity);
    if severity.is_none() {
        issues.push(ValidationIssue::new(
            format!("{ctx}.severity"),
            ModelError::UnknownSeverity {
                value: dto.severity.clone(),
            },
        ));
    }

    let matcher = dto
        .matcher
        .as_deref()
        .map_or(Ok(MatcherKind::default()), str::parse::<MatcherKind>)
        .and_then(|kind| kind.build(&dto.pattern))
        .map_err(|e| issues.push(ValidationIssue::new(format!("{ctx}.pattern"), e)))
        .ok();

    match (severity, matcher) {
        (Some(severity), Some(matcher)) if issues.is_empty() => Ok(Rule::new(
            &dto.id,
            kinds,
            languages,
            matcher,
            &dto.pattern,
            severity,
            MessageTemplate::parse(&dto.message),
        )
        .with_context(ContextConstraint { inside, not_inside })
        .with_doc(dto.doc)
        .enabled(dto.enabled.unwrap_or(true))),
        _ => Err(issues),
    }
}

fn convert_kinds(raw: &[String], ctx: &str, issues: &mut Vec<ValidationIssue>) -> KindSelector {
    if raw.is_empty() {
        issues.push(ValidationIssue::new(ctx, ModelError::NoKinds));
        return KindSelector::Any;
    }
    if raw.iter().any(|k| k == "*") {
        return KindSelector::Any;
    }
    KindSelector::Kinds(convert_kind_list(raw, ctx, issues))
}

fn convert_kind_list(raw: &[String], ctx: &str, issues: &mut Vec<ValidationIssue>) -> Vec<NodeKind> {
    raw.iter()
        .enumerate()
        .filter_map(|(i, k)| match k.parse::<NodeKind>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                issues.push(ValidationIssue::new(
                    format!("{ctx}[{i}]"),
                    ModelError::UnknownKind { value: k.clone() },
                ));
                None
            }
        })
        .collect()
}

fn convert_languages(raw: &[String], ctx: &str, issues: &mut Vec<ValidationIssue>) -> LanguageSet {
    if raw.is_empty() || raw.iter().any(|l| l == "*") {
        return LanguageSet::Any;
    }
    let langs = raw
        .iter()
        .enumerate()
        .filter_map(|(i, l)| match LanguageId::lookup(l) {
            Some(lang) => Some(lang),
            None => {
                issues.push(ValidationIssue::new(
                    format!("{ctx}[{i}]"),
                    ModelError::UnknownLanguage { value: l.clone() },
                ));
                None
            }
        })
        .collect();
    LanguageSet::Only(langs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::config_dto::ConfigDocumentDto;

    fn parse_and_load(yaml: &str) -> Result<RuleModel, Vec<ValidationIssue>> {
        let dto: ConfigDocumentDto = serde_yaml::from_str(yaml).unwrap();
        load(dto.rules)
    }

    // -- Happy path --

    #[test]
    fn load_empty_config() {
        let model = parse_and_load("rules: []").unwrap();
        assert!(model.is_empty());
    }

    #[test]
    fn unknown_language_is_located() {
        let result = parse_and_load(
            r#"
rules:
  - id: locale-format
    kinds: [Call]
    languages: [kotlin, cobol, scala]
    severity: error
    pattern: "String\\.format"
    message: "locale-sensitive call: {0}"
"#,
        );
        let issues = result.unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].context, "rules[0] 'locale-format'.languages[1]");
    }

    #[test]
    fn load_wildcards_and_context() {
        let model = parse_and_load(
            r#"
rules:
  - id: any-node
    kinds: ["*"]
    languages: ["*"]
    pattern: TODO
    matcher: literal
    message: found
    inside: [Function]
    not_inside: [Comment]
    doc: I18N.md
"#,
        )
        .unwrap();
        let rule = model.get("any-node").unwrap();
        assert_eq!(rule.kinds(), &KindSelector::Any);
        assert_eq!(rule.languages(), &LanguageSet::Any);
        assert_eq!(rule.context().inside, vec![NodeKind::Function]);
        assert_eq!(rule.doc().map(|d| &**d), Some("I18N.md"));
        assert_eq!(rule.severity(), Severity::Warning);
    }

    // -- Error cases --

    #[test]
    fn load_rejects_unknown_severity() {
        let issues = parse_and_load(
            r#"
rules:
  - id: R1
    kinds: [StringLiteral]
    languages: [py]
    severity: critical
    pattern: ".+"
    message: m
"#,
        )
        .unwrap_err();
        assert!(matches!(
            issues[0].source,
            ModelError::UnknownSeverity { .. }
        ));
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let issues = parse_and_load(
            r#"
rules:
  - { id: R1, kinds: [StringLiteral], pattern: a, message: m }
  - { id: R1, kinds: [Comment], pattern: b, message: m }
"#,
        )
        .unwrap_err();
        assert_eq!(
            issues,
            vec![ValidationIssue::new(
                "rules",
                ModelError::DuplicateId {
                    id: "R1".to_string()
                }
            )]
        );
    }

    #[test]
    fn load_collects_every_issue() {
        let issues = parse_and_load(
            r#"
rules:
  - { id: "", kinds: [], pattern: "(", message: m, severity: loud }
"#,
        )
        .unwrap_err();
        let sources: Vec<&ModelError> = issues.iter().map(|i| &i.source).collect();
        assert!(sources.contains(&&ModelError::EmptyId));
        assert!(sources.contains(&&ModelError::NoKinds));
        assert!(sources
            .iter()
            .any(|e| matches!(e, ModelError::UnknownSeverity { .. })));
        assert!(sources
            .iter()
            .any(|e| matches!(e, ModelError::InvalidPattern { .. })));
    }

    #[test]
    fn load_rejects_unknown_kind_and_matcher() {
        let issues = parse_and_load(
            r#"
rules:
  - { id: R1, kinds: [Strings], pattern: a, message: m, matcher: glob }
"#,
        )
        .unwrap_err();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn groups_are_located_and_share_ids() {
        let group = |label: &str, yaml: &str| {
            let dto: ConfigDocumentDto = serde_yaml::from_str(yaml).unwrap();
            RuleGroup::new(label, dto.rules)
        };
        let issues = load_groups(vec![
            group("include[0].rules", "rules: [{ id: R1, kinds: [Call], pattern: a, message: m }]"),
            group("rules", "rules: [{ id: R2, kinds: [Nope], pattern: a, message: m }]"),
        ])
        .unwrap_err();
        assert_eq!(issues[0].context, "rules[0] 'R2'.kinds[0]");

        let issues = load_groups(vec![
            group("include[0].rules", "rules: [{ id: R1, kinds: [Call], pattern: a, message: m }]"),
            group("rules", "rules: [{ id: R1, kinds: [Comment], pattern: b, message: m }]"),
        ])
        .unwrap_err();
        assert!(matches!(&issues[0].source, ModelError::DuplicateId { id } if id == "R1"));
    }
}
