//! Named long-lived handles shared by every action of a component, such as
//! database pools or clients.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use relay_core::{NotFound, RelayError, RelayResult};

type Handle = Arc<dyn Any + Send + Sync>;

/// Resource registry.
#[derive(Default, Clone)]
pub struct Resources {
    entries: BTreeMap<String, Handle>,
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl Resources {
    /// Store the value produced by `producer` under `name`, replacing any
    /// previous value.
    ///
    /// # Errors
    ///
    /// [`RelayError::ResourceInit`] when the producer yields nothing.
    pub fn set<T, F>(&mut self, name: impl Into<String>, producer: F) -> RelayResult<()>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Option<T>,
    {
        let name = name.into();
        let Some(value) = producer() else {
            tracing::warn!(resource = %name, "resource producer returned nothing");
            return Err(RelayError::ResourceInit(name));
        };
        tracing::debug!(resource = %name, "resource registered");
        self.entries.insert(name, Arc::new(value));
        Ok(())
    }

    /// The resource stored under `name`.
    ///
    /// # Errors
    ///
    /// [`NotFound::Resource`] when unset, [`RelayError::ResourceType`] when
    /// it was stored as another type.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> RelayResult<Arc<T>> {
        let handle = self
            .entries
            .get(name)
            .ok_or_else(|| NotFound::Resource(name.to_string()))?;
        Arc::clone(handle)
            .downcast::<T>()
            .map_err(|_| RelayError::ResourceType(name.to_string()))
    }

    /// Whether a resource is stored under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pool {
        size: usize,
    }

    #[test]
    fn set_then_get() {
        let mut resources = Resources::default();
        resources.set("db", || Some(Pool { size: 4 })).unwrap();
        assert!(resources.has("db"));
        assert_eq!(*resources.get::<Pool>("db").unwrap(), Pool { size: 4 });
        assert_eq!(resources.names(), ["db"]);
    }

    #[test]
    fn producer_returning_nothing_fails() {
        let mut resources = Resources::default();
        let err = resources.set("db", || None::<Pool>).unwrap_err();
        assert_eq!(err.to_string(), "set resource db failed");
        assert!(!resources.has("db"));
    }

    #[test]
    fn missing_and_mistyped_resources() {
        let mut resources = Resources::default();
        assert!(matches!(
            resources.get::<Pool>("db"),
            Err(RelayError::NotFound(NotFound::Resource(name))) if name == "db"
        ));
        resources.set("db", || Some(7_u32)).unwrap();
        assert!(matches!(
            resources.get::<Pool>("db"),
            Err(RelayError::ResourceType(_))
        ));
    }
}
