//! Action Repository
//!
//! Holds the hook instances the pipeline runs and builds actions through the
//! [`Container`]. Hooks come from an explicit list of [`HookRegistration`]s;
//! `initialize` instantiates them once and snapshots are filtered by
//! capability. Every snapshot keeps registration order.

use super::container::Container;
use super::hooks::{
    ActionHook, Capabilities, HighlightPreAction, HookRegistration, HookType, TracingHook,
};
use super::Action;
use crate::result::AutomationResult;
use std::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

#[derive(Debug, Clone)]
struct HookEntry {
    type_id: TypeId,
    capabilities: Capabilities,
    hook: Arc<dyn ActionHook>,
}

#[derive(Debug, Default)]
struct HookSets {
    initialized: bool,
    entries: Vec<HookEntry>,
}

impl HookSets {
    fn contains(&self, type_id: TypeId) -> bool {
        self.entries.iter().any(|entry| entry.type_id == type_id)
    }

    fn with(&self, capability: Capabilities) -> Vec<Arc<dyn ActionHook>> {
        self.entries
            .iter()
            .filter(|entry| entry.capabilities.contains(capability))
            .map(|entry| Arc::clone(&entry.hook))
            .collect()
    }
}

/// Registry of hooks and factory for actions
#[derive(Debug)]
pub struct ActionRepository {
    container: Arc<Container>,
    registrations: Vec<HookRegistration>,
    sets: RwLock<HookSets>,
}

impl ActionRepository {
    /// Create a repository knowing the built-in hooks
    #[must_use]
    pub fn new(container: Arc<Container>) -> Self {
        Self::with_registrations(
            container,
            vec![
                HookRegistration::of::<HighlightPreAction>(),
                HookRegistration::of::<TracingHook>(),
            ],
        )
    }

    /// Create a repository knowing exactly `registrations`
    #[must_use]
    pub fn with_registrations(
        container: Arc<Container>,
        registrations: Vec<HookRegistration>,
    ) -> Self {
        Self {
            container,
            registrations,
            sets: RwLock::new(HookSets::default()),
        }
    }

    /// Add a known hook registration, picked up by [`ActionRepository::initialize`]
    #[must_use]
    pub fn with_registration(mut self, registration: HookRegistration) -> Self {
        self.registrations.push(registration);
        self
    }

    /// Container used to build hooks and actions
    #[must_use]
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Instantiate and classify the known hooks.
    ///
    /// Runs once; later calls are no-ops. Hooks added through
    /// [`ActionRepository::register_type`] beforehand are kept after the
    /// known ones.
    ///
    /// # Errors
    ///
    /// [`crate::AutomationError::Construction`] when a hook cannot be built.
    /// Nothing is committed in that case.
    pub fn initialize(&self) -> AutomationResult<()> {
        if self.read().initialized {
            return Ok(());
        }

        let mut built = HookSets::default();
        for registration in &self.registrations {
            if built.contains(registration.type_id()) {
                continue;
            }
            let hook = registration.instantiate(&self.container)?;
            tracing::debug!(
                hook = registration.name(),
                capabilities = ?registration.capabilities(),
                "hook registered"
            );
            built.entries.push(HookEntry {
                type_id: registration.type_id(),
                capabilities: registration.capabilities(),
                hook,
            });
        }

        let mut sets = self.sets.write().unwrap_or_else(PoisonError::into_inner);
        if sets.initialized {
            return Ok(());
        }
        for entry in sets.entries.drain(..) {
            if !built.contains(entry.type_id) {
                built.entries.push(entry);
            }
        }
        built.initialized = true;
        *sets = built;
        Ok(())
    }

    /// Instantiate and classify one more hook type; a known type is a no-op.
    ///
    /// # Errors
    ///
    /// [`crate::AutomationError::Construction`] when `H` cannot be resolved
    /// from the container.
    pub fn register_type<H: HookType>(&self) -> AutomationResult<()> {
        let registration = HookRegistration::of::<H>();
        if self.read().contains(registration.type_id()) {
            return Ok(());
        }

        let hook = registration.instantiate(&self.container)?;
        let mut sets = self.sets.write().unwrap_or_else(PoisonError::into_inner);
        if !sets.contains(registration.type_id()) {
            tracing::debug!(hook = registration.name(), "hook type registered");
            sets.entries.push(HookEntry {
                type_id: registration.type_id(),
                capabilities: registration.capabilities(),
                hook,
            });
        }
        Ok(())
    }

    /// Check if [`ActionRepository::initialize`] has completed
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    /// Pre-action hooks in registration order
    #[must_use]
    pub fn pre_actions(&self) -> Vec<Arc<dyn ActionHook>> {
        self.read().with(Capabilities::PRE_ACTION)
    }

    /// Post-action hooks in registration order
    #[must_use]
    pub fn post_actions(&self) -> Vec<Arc<dyn ActionHook>> {
        self.read().with(Capabilities::POST_ACTION)
    }

    /// Locator hooks in registration order
    #[must_use]
    pub fn locator_actions(&self) -> Vec<Arc<dyn ActionHook>> {
        self.read().with(Capabilities::LOCATOR_ACTION)
    }

    /// Build an action through the container.
    ///
    /// # Errors
    ///
    /// [`crate::AutomationError::Construction`] when `A` is not registered or
    /// its dependencies cannot be resolved.
    pub fn create_action<A: Action + 'static>(&self) -> AutomationResult<A> {
        self.container.resolve::<A>()
    }

    fn read(&self) -> RwLockReadGuard<'_, HookSets> {
        self.sets.read().unwrap_or_else(PoisonError::into_inner)
    }
}
