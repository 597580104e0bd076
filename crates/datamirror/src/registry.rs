use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::handler::Handler;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown handler `{0}`")]
    UnknownHandler(String),
}

/// Handlers keyed by their identifier, resolved once at startup.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own name, returning any handler it replaced.
    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Option<Arc<dyn Handler>> {
        self.handlers.insert(handler.name().to_owned(), handler)
    }

    pub fn with(mut self, handler: Arc<dyn Handler>) -> Self {
        self.register(handler);
        self
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Handler>, RegistryError> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownHandler(name.to_owned()))
    }

    /// Registered identifiers in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::InMemoryHandler;

    use super::*;

    #[test]
    fn resolves_registered_handler() {
        let registry = HandlerRegistry::new().with(Arc::new(InMemoryHandler::new("memory")));
        let handler = registry.resolve("memory").unwrap();
        assert_eq!(handler.name(), "memory");
    }

    #[test]
    fn unknown_handler_is_an_error() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        let err = registry.resolve("ftp-mirror").err().unwrap();
        assert_eq!(err, RegistryError::UnknownHandler("ftp-mirror".into()));
    }

    #[test]
    fn re_registering_replaces_previous_handler() {
        let mut registry = HandlerRegistry::new();
        assert!(registry.register(Arc::new(InMemoryHandler::new("memory"))).is_none());
        assert!(registry.register(Arc::new(InMemoryHandler::new("memory"))).is_some());
        assert_eq!(registry.names().count(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let registry = HandlerRegistry::new()
            .with(Arc::new(InMemoryHandler::new("zeta")))
            .with(Arc::new(InMemoryHandler::new("alpha")));
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(format!("{registry:?}"), r#"["alpha", "zeta"]"#);
    }
}
