//! Metadata filters applied to knowledge documents.
//!
//! | clause  | match rule                                                        |
//! |---------|-------------------------------------------------------------------|
//! | tags    | any filter tag equals any document tag (case/space insensitive)   |
//! | level   | document level equals one of the allowed levels                   |
//! | topic   | filter value is contained in any document topic (`topic`/`tema`)  |
//! | other   | filter value is contained in the document's value for that key    |
//!
//! All clauses must match. A key missing from the document is a non-match.

use serde_json::Value;

use super::document::{KnowledgeDocument, LEVEL_KEYS, TAG_KEYS, TOPIC_KEYS};
use crate::domain::foundation::text::{fold_accents, normalize_key};
use crate::domain::foundation::{Dimension, ExpertiseLevel, ValidationError};

/// One condition on a document's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterClause {
    Tags(Vec<String>),
    Levels(Vec<String>),
    Topic(String),
    /// Matches when any of the alternatives is contained in the field.
    Field { key: String, any_of: Vec<String> },
}

impl FilterClause {
    pub fn matches(&self, document: &KnowledgeDocument) -> bool {
        let metadata = &document.metadata;
        match self {
            FilterClause::Tags(wanted) => {
                let tags: Vec<String> = metadata.list(TAG_KEYS).iter().map(|t| comparable(t)).collect();
                wanted.iter().any(|w| tags.contains(&comparable(w)))
            }
            FilterClause::Levels(allowed) => metadata
                .get_any(LEVEL_KEYS)
                .map(|level| {
                    level
                        .values()
                        .iter()
                        .any(|v| allowed.iter().any(|a| comparable(a) == comparable(v)))
                })
                .unwrap_or(false),
            FilterClause::Topic(wanted) => metadata
                .get_any(TOPIC_KEYS)
                .map(|topic| contains_any(&topic.values(), std::slice::from_ref(wanted)))
                .unwrap_or(false),
            FilterClause::Field { key, any_of } => metadata
                .get(key)
                .filter(|v| !v.is_empty())
                .map(|value| contains_any(&value.values(), any_of))
                .unwrap_or(false),
        }
    }
}

/// Conjunction of clauses; the empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFilter {
    clauses: Vec<FilterClause>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to a dimension, accepting its code, display name, or survey label.
    pub fn with_dimension(self, dimension: Dimension) -> Self {
        self.with_clause(FilterClause::Field {
            key: "dimension".to_string(),
            any_of: vec![
                dimension.code().to_string(),
                dimension.display_name().to_string(),
                dimension.survey_label().to_string(),
            ],
        })
    }

    /// Restricts to one expertise level under any of its labels.
    pub fn with_level(self, level: ExpertiseLevel) -> Self {
        self.with_levels(level.accepted_labels())
    }

    pub fn with_levels<I, S>(self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_clause(FilterClause::Levels(levels.into_iter().map(Into::into).collect()))
    }

    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_clause(FilterClause::Tags(tags.into_iter().map(Into::into).collect()))
    }

    pub fn with_topic(self, topic: impl Into<String>) -> Self {
        self.with_clause(FilterClause::Topic(topic.into()))
    }

    pub fn with_field(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_clause(FilterClause::Field {
            key: key.into(),
            any_of: vec![value.into()],
        })
    }

    pub fn with_clause(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Builds a filter from a JSON object such as `{"tags": ["MFA"]}` or
    /// `{"tema": "phishing"}`.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::invalid_format("filter", "expected a JSON object"))?;

        let mut filter = Self::new();
        for (key, raw) in object {
            let values = json_strings(raw);
            let clause = match fold_accents(&normalize_key(key)).as_str() {
                "tags" | "etiquetas" | "keywords" => FilterClause::Tags(values),
                "level" | "nivel" => FilterClause::Levels(values),
                "topic" | "tema" => FilterClause::Topic(
                    values
                        .into_iter()
                        .next()
                        .ok_or_else(|| ValidationError::empty_field(key.clone()))?,
                ),
                _ => FilterClause::Field {
                    key: key.clone(),
                    any_of: values,
                },
            };
            filter = filter.with_clause(clause);
        }
        Ok(filter)
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    pub fn matches(&self, document: &KnowledgeDocument) -> bool {
        self.clauses.iter().all(|c| c.matches(document))
    }
}

fn comparable(text: &str) -> String {
    fold_accents(&normalize_key(text))
}

fn contains_any(haystacks: &[&str], needles: &[String]) -> bool {
    haystacks.iter().any(|h| {
        let h = comparable(h);
        needles.iter().any(|n| {
            let n = comparable(n);
            !n.is_empty() && h.contains(&n)
        })
    })
}

fn json_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(values) => values.iter().flat_map(json_strings).collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
