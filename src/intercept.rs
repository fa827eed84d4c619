//! The change-interception boundary.
//!
//! Every external write to a tracked object must pass through
//! [`RuleStore::set_property`](crate::RuleStore::set_property) or the
//! cascade never runs. [`Wrapped`] is the boundary that enforces this: it
//! owns the root object and exposes by-name reads and writes, routing each
//! write to the store with the root fixed to the object originally wrapped.
//! Reading a composite property yields a nested wrapper bound to the same
//! root, store and listener list, so writes at any depth cascade from the
//! top.
//!
//! Wrappable types implement [`Interceptable`]: by-name scalar access plus
//! composite navigation. No proxy generation is involved; the trait is the
//! whole contract.

use crate::error::{EngineError, EngineResult};
use crate::path::PropertyPath;
use crate::value::Value;
use crate::RuleStore;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Capability contract for types the boundary can wrap.
///
/// `get_value`/`set_value` cover scalar properties (anything representable
/// as a [`Value`]); `composite`/`composite_mut` navigate to nested objects.
/// A composite property answers `None` from `get_value`, and a scalar
/// property answers `None` from `composite` — a name present in
/// `property_names` but absent from both is a composite that is currently
/// null.
pub trait Interceptable: Send + 'static {
    /// Stable name of the runtime type; the accessor cache key.
    fn type_name(&self) -> &'static str;

    /// Every property the type exposes, scalar and composite.
    fn property_names(&self) -> &'static [&'static str];

    fn get_value(&self, property: &str) -> Option<Value>;

    fn set_value(&mut self, property: &str, value: Value) -> EngineResult<()>;

    fn composite(&self, property: &str) -> Option<&dyn Interceptable>;

    fn composite_mut(&mut self, property: &str) -> Option<&mut dyn Interceptable>;
}

type Listener = Box<dyn Fn(&str) + Send>;

struct Shared<R> {
    root: Mutex<R>,
    store: Arc<RuleStore<R>>,
    listeners: Mutex<Vec<Listener>>,
}

/// Wraps a root object (or, for nested wrappers, one level of its graph)
/// so that writes funnel through the rule store and cascade.
pub struct Wrapped<R: Interceptable> {
    shared: Arc<Shared<R>>,
    /// Path of this wrapper's level relative to the root; empty at the top.
    path: PropertyPath,
}

impl<R: Interceptable> Wrapped<R> {
    /// Take ownership of the root object and bind it to a rule store.
    pub fn new(root: R, store: Arc<RuleStore<R>>) -> Self {
        Wrapped {
            shared: Arc::new(Shared {
                root: Mutex::new(root),
                store,
                listeners: Mutex::new(Vec::new()),
            }),
            path: PropertyPath::root(),
        }
    }

    /// Register a change listener. It is invoked once per modified property
    /// name after each successful write, in the modified set's iteration
    /// order.
    pub fn on_changed(&self, listener: impl Fn(&str) + Send + 'static) {
        self.shared.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Write a property at this wrapper's level. The write and everything
    /// it cascades into are applied to the root graph; the full modified
    /// set is returned and delivered to listeners.
    pub fn set(&self, property: &str, value: impl Into<Value>) -> EngineResult<BTreeSet<String>> {
        let modified = {
            let mut root = self.shared.root.lock().unwrap();
            self.shared
                .store
                .set_property(&mut root, &self.path, property, value.into())?
        };
        self.notify(&modified);
        Ok(modified)
    }

    /// Read a scalar property at this wrapper's level.
    pub fn get(&self, property: &str) -> EngineResult<Value> {
        let root = self.shared.root.lock().unwrap();
        let owner = crate::accessor::resolve(&*root, self.path.segments())?;
        let getter = self.shared.store.accessors().getter(owner, property)?;
        getter(owner)
    }

    /// Read a composite property, yielding a wrapper for the nested object
    /// bound to the same root and rule store. `Ok(None)` when the composite
    /// is currently null; a scalar property is a configuration error.
    pub fn composite(&self, property: &str) -> EngineResult<Option<Wrapped<R>>> {
        {
            let root = self.shared.root.lock().unwrap();
            let owner = crate::accessor::resolve(&*root, self.path.segments())?;

            if owner.composite(property).is_none() {
                if owner.get_value(property).is_some() {
                    return Err(EngineError::NotComposite {
                        type_name: owner.type_name().to_string(),
                        property: property.to_string(),
                    });
                }
                if !owner.property_names().contains(&property) {
                    return Err(EngineError::UnknownProperty {
                        type_name: owner.type_name().to_string(),
                        property: property.to_string(),
                    });
                }
                return Ok(None);
            }
        }

        Ok(Some(Wrapped {
            shared: Arc::clone(&self.shared),
            path: self.path.child(property),
        }))
    }

    /// Re-evaluate every declared rule against the root, cascading from the
    /// changes, and notify listeners. See
    /// [`RuleStore::trigger_all`](crate::RuleStore::trigger_all).
    pub fn trigger_all(&self) -> EngineResult<BTreeSet<String>> {
        let modified = {
            let mut root = self.shared.root.lock().unwrap();
            self.shared.store.trigger_all(&mut root)?
        };
        self.notify(&modified);
        Ok(modified)
    }

    /// Read-only access to the underlying root for method calls that are
    /// not property accessors; no rules fire.
    pub fn with_root<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        let root = self.shared.root.lock().unwrap();
        f(&root)
    }

    fn notify(&self, modified: &BTreeSet<String>) {
        let listeners = self.shared.listeners.lock().unwrap();
        for name in modified {
            for listener in listeners.iter() {
                listener(name);
            }
        }
    }
}

impl<R: Interceptable> fmt::Debug for Wrapped<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wrapped")
            .field("path", &self.path.to_string())
            .finish_non_exhaustive()
    }
}

impl<R: Interceptable> Clone for Wrapped<R> {
    fn clone(&self) -> Self {
        Wrapped {
            shared: Arc::clone(&self.shared),
            path: self.path.clone(),
        }
    }
}
