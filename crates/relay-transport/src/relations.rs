//! Entity relations between services.

use serde::{Deserialize, Serialize};

/// Foreign side of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForeignKeys {
    /// One-to-one.
    One(String),
    /// One-to-many.
    Many(Vec<String>),
}

impl ForeignKeys {
    /// The foreign keys as a slice-like list.
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::One(key) => vec![key.as_str()],
            Self::Many(keys) => keys.iter().map(String::as_str).collect(),
        }
    }
}

/// A directed edge `(service, primary_key) -> (foreign_service, foreign)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Service owning the primary key.
    pub service: String,
    /// Primary key of the entity in `service`.
    pub primary_key: String,
    /// Service owning the foreign entities.
    pub foreign_service: String,
    /// Keys of the related entities.
    pub foreign: ForeignKeys,
}

/// Append-only list of relations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportRelations {
    relations: Vec<Relation>,
}

impl TransportRelations {
    /// Record a one-to-one relation.
    pub fn relate_one(
        &mut self,
        service: impl Into<String>,
        primary_key: impl Into<String>,
        foreign_service: impl Into<String>,
        foreign_key: impl Into<String>,
    ) {
        self.relations.push(Relation {
            service: service.into(),
            primary_key: primary_key.into(),
            foreign_service: foreign_service.into(),
            foreign: ForeignKeys::One(foreign_key.into()),
        });
    }

    /// Record a one-to-many relation.
    pub fn relate_many(
        &mut self,
        service: impl Into<String>,
        primary_key: impl Into<String>,
        foreign_service: impl Into<String>,
        foreign_keys: Vec<String>,
    ) {
        self.relations.push(Relation {
            service: service.into(),
            primary_key: primary_key.into(),
            foreign_service: foreign_service.into(),
            foreign: ForeignKeys::Many(foreign_keys),
        });
    }

    /// Relations, optionally only those whose primary side is `service`.
    pub fn filter(&self, service: Option<&str>) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| service.map_or(true, |s| r.service == s))
            .collect()
    }

    /// Whether no relation is recorded.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_and_many() {
        let mut relations = TransportRelations::default();
        relations.relate_one("users", "1", "posts", "10");
        relations.relate_many("users", "1", "comments", vec!["7".into(), "8".into()]);
        relations.relate_one("posts", "10", "users", "1");

        let users = relations.filter(Some("users"));
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].foreign.keys(), ["10"]);
        assert_eq!(users[1].foreign.keys(), ["7", "8"]);
        assert_eq!(relations.filter(None).len(), 3);
    }

    #[test]
    fn foreign_keys_are_untagged() {
        let r = Relation {
            service: "users".into(),
            primary_key: "1".into(),
            foreign_service: "posts".into(),
            foreign: ForeignKeys::Many(vec!["10".into()]),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["foreign"], serde_json::json!(["10"]));
    }
}
