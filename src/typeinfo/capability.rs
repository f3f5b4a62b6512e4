use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::debug;

use crate::spec::{ParamIn, ParamSpec};

use super::core::{ApiType, TypeDescriptor};

/// Optional behaviours a registrable type provides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub spec: Option<ParamSpec>,
    pub format: Option<String>,
    pub location: Option<ParamIn>,
}

impl Capabilities {
    pub(crate) fn probe<T: ApiType>() -> Self {
        Self {
            spec: T::param_spec(),
            format: T::format(),
            location: T::location(),
        }
    }
}

static GLOBAL: Lazy<Arc<CapabilityRegistry>> = Lazy::new(|| Arc::new(CapabilityRegistry::new()));

/// Cache of resolved [`Capabilities`] keyed by type identity.
///
/// Entries are never evicted: capabilities are static per type. Lookups take
/// the shared lock; a miss probes the type without holding any lock and then
/// inserts under the exclusive lock, keeping whichever entry landed first.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    cache: RwLock<HashMap<TypeId, Arc<Capabilities>>>,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use.
    #[must_use]
    pub fn global() -> Arc<CapabilityRegistry> {
        Arc::clone(&GLOBAL)
    }

    pub fn resolve(&self, ty: &TypeDescriptor) -> Arc<Capabilities> {
        if let Some(hit) = self.cache.read().get(&ty.id) {
            return Arc::clone(hit);
        }

        let probed = Arc::new(ty.probe());

        let mut cache = self.cache.write();
        let entry = cache.entry(ty.id).or_insert_with(|| {
            debug!(type_name = %ty.name, rust_type = %ty.rust_name, "capabilities cached");
            probed
        });
        Arc::clone(entry)
    }

    #[must_use]
    pub fn spec_of(&self, ty: &TypeDescriptor) -> Option<ParamSpec> {
        self.resolve(ty).spec.clone()
    }

    #[must_use]
    pub fn format_of(&self, ty: &TypeDescriptor) -> Option<String> {
        self.resolve(ty).format.clone()
    }

    #[must_use]
    pub fn location_of(&self, ty: &TypeDescriptor) -> Option<ParamIn> {
        self.resolve(ty).location
    }

    #[must_use]
    pub fn contains(&self, ty: &TypeDescriptor) -> bool {
        self.cache.read().contains_key(&ty.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[derive(crate::ApiType)]
    #[api(name = "id", required, description = "Account identifier", location = "path")]
    #[allow(dead_code)]
    struct AccountId(i64);

    #[derive(crate::ApiType)]
    #[api(format = "uuid")]
    #[allow(dead_code)]
    struct Token(String);

    #[test]
    fn test_resolve_reads_declared_capabilities() {
        let registry = CapabilityRegistry::new();
        let ty = TypeDescriptor::of::<AccountId>();
        let spec = registry.spec_of(&ty).unwrap();
        assert_eq!(spec.name, "id");
        assert!(spec.required);
        assert_eq!(spec.description, "Account identifier");
        assert_eq!(registry.location_of(&ty), Some(ParamIn::Path));
        assert_eq!(registry.format_of(&ty), None);

        let token = TypeDescriptor::of::<Token>();
        assert_eq!(registry.format_of(&token).as_deref(), Some("uuid"));
        assert!(registry.spec_of(&token).is_none());
    }

    #[test]
    fn test_pointer_form_shares_entry() {
        let registry = CapabilityRegistry::new();
        let plain = registry.resolve(&TypeDescriptor::of::<AccountId>());
        let boxed = registry.resolve(&TypeDescriptor::of::<Box<AccountId>>());
        assert!(Arc::ptr_eq(&plain, &boxed));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_concurrent_first_probe_keeps_one_instance() {
        let registry = Arc::new(CapabilityRegistry::new());
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    registry.resolve(&TypeDescriptor::of::<Token>())
                })
            })
            .collect();

        let resolved: Vec<Arc<Capabilities>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(registry.len(), 1);
        for caps in &resolved[1..] {
            assert!(Arc::ptr_eq(&resolved[0], caps));
        }
    }

    #[test]
    fn test_global_is_shared() {
        let a = CapabilityRegistry::global();
        let b = CapabilityRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
