use crate::{HelperArg, HelperError, HelperValue, builtin};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// A registered helper.
pub type HelperFn = Arc<
    dyn for<'a> Fn(&[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError> + Send + Sync,
>;

/// Vendor namespaces known out of the box. Helpers for these are supplied by vendor helper
/// libraries; the namespaces exist even when empty so `namespaces()` is stable.
pub const VENDOR_NAMESPACES: &[&str] = &[
    "arista", "aruba", "cisco", "cumulus", "extreme", "fortinet", "huawei", "juniper", "mikrotik",
    "nokia", "paloalto", "vyos",
];

/// Immutable name → helper table.
#[derive(Clone, Default)]
pub struct HelperRegistry {
    common: BTreeMap<String, HelperFn>,
    vendors: BTreeMap<String, BTreeMap<String, HelperFn>>,
}

impl HelperRegistry {
    pub fn builder() -> HelperRegistryBuilder {
        HelperRegistryBuilder::new()
    }

    /// Resolve `name` (flat) in the common namespace or `ns.name` in a vendor namespace.
    ///
    /// The split happens at the first `.`; unknown names resolve to `None`.
    pub fn resolve(&self, name: &str) -> Option<&HelperFn> {
        match name.split_once('.') {
            Some((namespace, helper)) => self.vendors.get(namespace)?.get(helper),
            None => self.common.get(name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Resolve and invoke; an unknown name is [`HelperError::Unknown`].
    pub fn call<'a>(
        &self,
        name: &str,
        args: &[HelperArg<'a>],
    ) -> Result<HelperValue<'a>, HelperError> {
        let helper = self
            .resolve(name)
            .ok_or_else(|| HelperError::Unknown(name.to_string()))?;
        helper(args)
    }

    /// Declared vendor namespaces, sorted.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.vendors.keys().map(String::as_str)
    }

    /// Every resolvable name, common names first, each group sorted.
    pub fn names(&self) -> Vec<String> {
        let mut out: Vec<String> = self.common.keys().cloned().collect();
        for (namespace, helpers) in &self.vendors {
            out.extend(helpers.keys().map(|h| format!("{namespace}.{h}")));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.common.len() + self.vendors.values().map(BTreeMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperRegistry")
            .field("helpers", &self.names())
            .finish()
    }
}

/// Collects helpers, then freezes them into a [`HelperRegistry`].
#[derive(Default)]
pub struct HelperRegistryBuilder {
    registry: HelperRegistry,
}

impl HelperRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the generic structural helpers in the common namespace.
    pub fn with_builtins(self) -> Self {
        builtin::register(self)
    }

    /// Declare namespaces without helpers.
    pub fn with_namespaces(mut self, namespaces: &[&str]) -> Self {
        for ns in namespaces {
            self.registry.vendors.entry(ns.to_string()).or_default();
        }
        self
    }

    /// Register `name` in the common namespace, replacing an existing helper of that name.
    pub fn common<F>(mut self, name: &str, helper: F) -> Self
    where
        F: for<'a> Fn(&[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError>
            + Send
            + Sync
            + 'static,
    {
        self.registry
            .common
            .insert(name.to_string(), Arc::new(helper));
        self
    }

    /// Register `namespace.name`; the namespace is declared if needed.
    pub fn vendor<F>(mut self, namespace: &str, name: &str, helper: F) -> Self
    where
        F: for<'a> Fn(&[HelperArg<'a>]) -> Result<HelperValue<'a>, HelperError>
            + Send
            + Sync
            + 'static,
    {
        self.registry
            .vendors
            .entry(namespace.to_string())
            .or_default()
            .insert(name.to_string(), Arc::new(helper));
        self
    }

    pub fn build(self) -> HelperRegistry {
        debug!(
            helpers = self.registry.len(),
            namespaces = self.registry.vendors.len(),
            "built helper registry"
        );
        self.registry
    }
}

/// Build-once holder for a process-wide registry.
///
/// The first [`SharedRegistry::get_or_build`] builds and caches the registry; later calls return
/// the same `Arc`. [`SharedRegistry::clear`] drops it so the next call rebuilds (tests, reloads).
#[derive(Debug, Default)]
pub struct SharedRegistry {
    cell: RwLock<Option<Arc<HelperRegistry>>>,
}

impl SharedRegistry {
    pub const fn new() -> Self {
        Self {
            cell: RwLock::new(None),
        }
    }

    pub fn get(&self) -> Option<Arc<HelperRegistry>> {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_or_build(&self, build: impl FnOnce() -> HelperRegistry) -> Arc<HelperRegistry> {
        if let Some(existing) = self.get() {
            return existing;
        }
        let mut slot = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.as_ref() {
            return Arc::clone(existing);
        }
        let registry = Arc::new(build());
        *slot = Some(Arc::clone(&registry));
        registry
    }

    pub fn clear(&self) {
        *self.cell.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
