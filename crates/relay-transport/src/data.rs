//! # Data Ledger
//!
//! Entity and collection payloads, grouped service -> version -> action.
//!
//! ## Invariant
//!
//! Every write appends. A call chain may reach the same action more than
//! once, so after `n` writes under one key there are `n` entries, in write
//! order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use relay_core::{ActionKey, Value};

type Actions = BTreeMap<String, Vec<Value>>;
type Versions = BTreeMap<String, Actions>;

/// Append-only store of business payloads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportData {
    services: BTreeMap<String, Versions>,
}

impl TransportData {
    /// Append a payload under `key`.
    pub fn push(&mut self, key: &ActionKey, payload: Value) {
        self.services
            .entry(key.service.clone())
            .or_default()
            .entry(key.version.clone())
            .or_default()
            .entry(key.action.clone())
            .or_default()
            .push(payload);
    }

    /// Payloads written under `key`, oldest first. Empty when none.
    pub fn get(&self, key: &ActionKey) -> &[Value] {
        self.services
            .get(&key.service)
            .and_then(|versions| versions.get(&key.version))
            .and_then(|actions| actions.get(&key.action))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Every `(key, payloads)` group.
    pub fn iter(&self) -> impl Iterator<Item = (ActionKey, &[Value])> {
        self.services.iter().flat_map(|(service, versions)| {
            versions.iter().flat_map(move |(version, actions)| {
                actions.iter().map(move |(action, payloads)| {
                    (
                        ActionKey::new(service.clone(), version.clone(), action.clone()),
                        payloads.as_slice(),
                    )
                })
            })
        })
    }

    /// The ledger as a nested value, narrowed by service, then version,
    /// then action. A narrowing level that matches nothing yields an empty
    /// map; the action level yields the list of payloads.
    pub fn narrow(&self, service: Option<&str>, version: Option<&str>, action: Option<&str>) -> Value {
        let Some(service) = service else {
            return self.services.to_value();
        };
        let Some(versions) = self.services.get(service) else {
            return Value::Map(BTreeMap::new());
        };
        let Some(version) = version else {
            return versions.to_value();
        };
        let Some(actions) = versions.get(version) else {
            return Value::Map(BTreeMap::new());
        };
        match action {
            None => actions.to_value(),
            Some(action) => actions
                .get(action)
                .map_or_else(|| Value::List(Vec::new()), |p| Value::List(p.clone())),
        }
    }
}

/// Conversion of the nested ledger maps into a [`Value`] tree.
trait Tree {
    fn to_value(&self) -> Value;
}

impl Tree for Vec<Value> {
    fn to_value(&self) -> Value {
        Value::List(self.clone())
    }
}

impl<T: Tree> Tree for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key() -> ActionKey {
        ActionKey::new("users", "1.0.0", "read")
    }

    #[test]
    fn writes_accumulate() {
        let mut data = TransportData::default();
        data.push(&key(), Value::from(json!({"id": 1})));
        data.push(&key(), Value::from(json!({"id": 2})));
        assert_eq!(data.get(&key()).len(), 2);
        assert_eq!(data.get(&key())[1], Value::from(json!({"id": 2})));
    }

    #[test]
    fn missing_key_is_empty() {
        let data = TransportData::default();
        assert!(data.get(&key()).is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn narrowing() {
        let mut data = TransportData::default();
        data.push(&key(), Value::from(json!({"id": 1})));
        assert_eq!(
            data.narrow(Some("users"), None, None),
            Value::from(json!({"1.0.0": {"read": [{"id": 1}]}}))
        );
        assert_eq!(
            data.narrow(Some("users"), Some("1.0.0"), Some("read")),
            Value::from(json!([{"id": 1}]))
        );
        assert_eq!(data.narrow(Some("posts"), None, None), Value::Map(BTreeMap::new()));
        assert_eq!(
            data.narrow(Some("users"), Some("1.0.0"), Some("list")),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn serializes_as_nested_map() {
        let mut data = TransportData::default();
        data.push(&key(), Value::from(json!({"id": 1})));
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({"users": {"1.0.0": {"read": [{"id": 1}]}}})
        );
    }

    #[test]
    fn iter_yields_keys() {
        let mut data = TransportData::default();
        data.push(&key(), Value::Null);
        let groups: Vec<_> = data.iter().collect();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, key());
    }
}
