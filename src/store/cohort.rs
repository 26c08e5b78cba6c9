use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a cohort's membership is computed. A closed union so resolution,
/// key-generation, and display handle every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CohortKind {
    AllItems,
    Folder { path: String },
    Tags { tags: Vec<String> },
    Search { query: String },
}

impl CohortKind {
    /// Deterministic canonical key: structurally identical definitions yield
    /// the same key regardless of parameter discovery order.
    pub fn canonical_key(&self) -> String {
        match self {
            Self::AllItems => "all".to_string(),
            Self::Folder { path } => {
                format!("folder:{}", path.trim().trim_end_matches('/'))
            }
            Self::Tags { tags } => {
                let mut normalized: Vec<String> = tags
                    .iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect();
                normalized.sort();
                normalized.dedup();
                format!("tags:{}", normalized.join(","))
            }
            Self::Search { query } => format!("search:{}", query.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortDefinition {
    pub key: String,
    #[serde(flatten)]
    pub kind: CohortKind,
    pub label: Option<String>,
    /// Per-cohort override parameters owned by the host (e.g. which derived
    /// fields it publishes); opaque to the engine.
    pub overrides: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl CohortDefinition {
    pub fn new(kind: CohortKind) -> Self {
        Self {
            key: kind.canonical_key(),
            kind,
            label: None,
            overrides: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_overrides(mut self, overrides: serde_json::Value) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// True when the definitions differ in anything that should bump the
    /// stored timestamp.
    pub fn differs_from(&self, other: &CohortDefinition) -> bool {
        self.key != other.key
            || self.kind != other.kind
            || self.label != other.label
            || self.overrides != other.overrides
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_order_does_not_change_key() {
        let a = CohortKind::Tags {
            tags: vec!["review".into(), "draft".into()],
        };
        let b = CohortKind::Tags {
            tags: vec!["draft".into(), "review".into(), "draft".into()],
        };
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key(), "tags:draft,review");
    }

    #[test]
    fn folder_key_drops_trailing_slash() {
        let a = CohortKind::Folder {
            path: "notes/projects/".into(),
        };
        let b = CohortKind::Folder {
            path: "notes/projects".into(),
        };
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a.canonical_key(), "folder:notes/projects");
    }

    #[test]
    fn search_key_trims_whitespace() {
        let kind = CohortKind::Search {
            query: "  status:open  ".into(),
        };
        assert_eq!(kind.canonical_key(), "search:status:open");
    }

    #[test]
    fn all_items_key_is_stable() {
        assert_eq!(CohortKind::AllItems.canonical_key(), "all");
    }

    #[test]
    fn definition_round_trips_with_kind_tag() {
        let def = CohortDefinition::new(CohortKind::Folder {
            path: "inbox".into(),
        })
        .with_label("Inbox");

        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["kind"], "folder");
        assert_eq!(json["path"], "inbox");

        let decoded: CohortDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, def);
    }

    #[test]
    fn differs_from_ignores_timestamp() {
        let def = CohortDefinition::new(CohortKind::AllItems);
        let mut later = def.clone();
        later.updated_at = later.updated_at + chrono::Duration::seconds(30);
        assert!(!def.differs_from(&later));

        let relabeled = def.clone().with_label("Everything");
        assert!(def.differs_from(&relabeled));
    }
}
