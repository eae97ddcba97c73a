//! Object container.
//!
//! Maps a type to a factory that builds it. Factories receive the container
//! so they can resolve their own dependencies, such as the configuration
//! snapshot.

use super::builtin::{
    ButtonClickAction, ButtonDoubleClickAction, ButtonRightClickAction, GetListItemByCriteriaAction,
    GetListItemByIndexAction, HoverOverElementAction,
};
use super::hooks::{HighlightPreAction, TracingHook};
use crate::config::AutomationConfig;
use crate::result::{AutomationError, AutomationResult};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

type Factory = Arc<dyn Fn(&Container) -> AutomationResult<Box<dyn Any + Send>> + Send + Sync>;

/// Type-keyed factory registry
#[derive(Clone, Default)]
pub struct Container {
    factories: HashMap<TypeId, Factory>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("registered", &self.factories.len())
            .finish()
    }
}

impl Container {
    /// Create an empty container
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Container holding `config` and every built-in action and hook
    #[must_use]
    pub fn with_defaults(config: AutomationConfig) -> Self {
        let mut container = Self::new();
        container.register_instance(config);
        container.register(|c| Ok(ButtonClickAction::new(c.resolve()?)));
        container.register(|c| Ok(ButtonDoubleClickAction::new(c.resolve()?)));
        container.register(|c| Ok(ButtonRightClickAction::new(c.resolve()?)));
        container.register_default::<HoverOverElementAction>();
        container.register_default::<GetListItemByIndexAction>();
        container.register_default::<GetListItemByCriteriaAction>();
        container.register(|c| Ok(HighlightPreAction::new(c.resolve()?)));
        container.register_default::<TracingHook>();
        container
    }

    /// Register a factory for `T`, replacing any previous one
    pub fn register<T, F>(&mut self, factory: F)
    where
        T: Send + 'static,
        F: Fn(&Self) -> AutomationResult<T> + Send + Sync + 'static,
    {
        let _ = self.factories.insert(
            TypeId::of::<T>(),
            Arc::new(move |container: &Self| {
                factory(container).map(|value| Box::new(value) as Box<dyn Any + Send>)
            }),
        );
    }

    /// Register a value that is cloned on every resolution
    pub fn register_instance<T: Clone + Send + Sync + 'static>(&mut self, value: T) {
        self.register(move |_| Ok(value.clone()));
    }

    /// Register `T::default()` as the factory for `T`
    pub fn register_default<T: Default + Send + 'static>(&mut self) {
        self.register(|_| Ok(T::default()));
    }

    /// Check if `T` has a factory
    #[must_use]
    pub fn contains<T: 'static>(&self) -> bool {
        self.factories.contains_key(&TypeId::of::<T>())
    }

    /// Build a `T`.
    ///
    /// # Errors
    ///
    /// [`AutomationError::Construction`] when `T` is not registered or its
    /// factory fails.
    pub fn resolve<T: 'static>(&self) -> AutomationResult<T> {
        let factory = self
            .factories
            .get(&TypeId::of::<T>())
            .ok_or_else(|| AutomationError::construction::<T>("type is not registered"))?;

        let value = factory(self).map_err(|err| match err {
            AutomationError::Construction { .. } => err,
            other => AutomationError::construction::<T>(other.to_string()),
        })?;

        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| AutomationError::construction::<T>("factory produced another type"))
    }
}
