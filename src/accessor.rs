//! Memoized property accessors.
//!
//! Reading, writing and compare-and-writing a property all happen inside
//! the hot cascade loop, so the closures that perform them are built once
//! per `(type, property)` pair and cached for the lifetime of the process.
//! The cache is the only piece of global mutable state in the engine; it is
//! created explicitly and passed into every [`RuleStore`](crate::RuleStore)
//! and wrapper rather than living in a static.
//!
//! Population is synchronized, steady-state reads are not: lookups take the
//! read lock only, a miss takes the write lock and re-checks before
//! inserting. Two threads racing on the same key may both build an
//! accessor; the first insert wins and the results are interchangeable.
//!
//! Requesting an accessor for a property the type does not expose is a
//! configuration error raised at first use, not at rule-declaration time.

use crate::error::{EngineError, EngineResult};
use crate::intercept::Interceptable;
use crate::path::PropertyPath;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Memoized read of one property.
pub type Getter = Arc<dyn Fn(&dyn Interceptable) -> EngineResult<Value> + Send + Sync>;

/// Memoized write of one property.
pub type Setter = Arc<dyn Fn(&mut dyn Interceptable, Value) -> EngineResult<()> + Send + Sync>;

/// Memoized compare-and-write: writes only when the new value differs from
/// the current one (by value equality) and reports whether it did.
pub type SmartSetter = Arc<dyn Fn(&mut dyn Interceptable, Value) -> EngineResult<bool> + Send + Sync>;

type Key = (&'static str, String);

/// Process-wide accessor cache, safe for unsynchronized concurrent first
/// use across threads. Built once at startup, never torn down.
#[derive(Default)]
pub struct AccessorCache {
    getters: RwLock<HashMap<Key, Getter>>,
    setters: RwLock<HashMap<Key, Setter>>,
    smart_setters: RwLock<HashMap<Key, SmartSetter>>,
}

impl AccessorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (building if needed) the cached getter for the instance's
    /// runtime type and the named property.
    pub fn getter(&self, instance: &dyn Interceptable, property: &str) -> EngineResult<Getter> {
        let key = (instance.type_name(), property.to_string());

        if let Some(getter) = self.getters.read().unwrap().get(&key) {
            return Ok(Arc::clone(getter));
        }

        ensure_property(instance, property)?;

        let name = property.to_string();
        let getter: Getter = Arc::new(move |obj: &dyn Interceptable| {
            obj.get_value(&name).ok_or_else(|| EngineError::UnknownProperty {
                type_name: obj.type_name().to_string(),
                property: name.clone(),
            })
        });

        let mut writers = self.getters.write().unwrap();
        Ok(Arc::clone(writers.entry(key).or_insert(getter)))
    }

    pub fn setter(&self, instance: &dyn Interceptable, property: &str) -> EngineResult<Setter> {
        let key = (instance.type_name(), property.to_string());

        if let Some(setter) = self.setters.read().unwrap().get(&key) {
            return Ok(Arc::clone(setter));
        }

        ensure_property(instance, property)?;

        let name = property.to_string();
        let setter: Setter =
            Arc::new(move |obj: &mut dyn Interceptable, value: Value| obj.set_value(&name, value));

        let mut writers = self.setters.write().unwrap();
        Ok(Arc::clone(writers.entry(key).or_insert(setter)))
    }

    pub fn smart_setter(
        &self,
        instance: &dyn Interceptable,
        property: &str,
    ) -> EngineResult<SmartSetter> {
        let key = (instance.type_name(), property.to_string());

        if let Some(smart) = self.smart_setters.read().unwrap().get(&key) {
            return Ok(Arc::clone(smart));
        }

        // Composed from the plain accessors, like the original engine.
        let getter = self.getter(instance, property)?;
        let setter = self.setter(instance, property)?;

        let smart: SmartSetter = Arc::new(move |obj: &mut dyn Interceptable, value: Value| {
            let previous = getter(obj)?;
            if previous == value {
                return Ok(false);
            }
            setter(obj, value)?;
            Ok(true)
        });

        let mut writers = self.smart_setters.write().unwrap();
        Ok(Arc::clone(writers.entry(key).or_insert(smart)))
    }

    /// Read a property through its full dotted path against the root.
    pub fn get_path(&self, root: &dyn Interceptable, path: &PropertyPath) -> EngineResult<Value> {
        let owner = resolve(root, path.ancestors())?;
        let getter = self.getter(owner, path.leaf())?;
        getter(owner)
    }

    /// Write a property through its full dotted path against the root.
    pub fn set_path(
        &self,
        root: &mut dyn Interceptable,
        path: &PropertyPath,
        value: Value,
    ) -> EngineResult<()> {
        let owner = resolve_mut(root, path.ancestors())?;
        let setter = self.setter(owner, path.leaf())?;
        setter(owner, value)
    }

    /// Compare-and-write through a full dotted path, reporting whether the
    /// value actually changed.
    pub fn smart_set_path(
        &self,
        root: &mut dyn Interceptable,
        path: &PropertyPath,
        value: Value,
    ) -> EngineResult<bool> {
        let owner = resolve_mut(root, path.ancestors())?;
        let smart = self.smart_setter(owner, path.leaf())?;
        smart(owner, value)
    }
}

fn ensure_property(instance: &dyn Interceptable, property: &str) -> EngineResult<()> {
    if instance.property_names().contains(&property) {
        Ok(())
    } else {
        Err(EngineError::UnknownProperty {
            type_name: instance.type_name().to_string(),
            property: property.to_string(),
        })
    }
}

/// Walk composite segments down from the root.
pub fn resolve<'a>(
    root: &'a dyn Interceptable,
    segments: &[String],
) -> EngineResult<&'a dyn Interceptable> {
    let mut current = root;
    for segment in segments {
        current = current
            .composite(segment)
            .ok_or_else(|| EngineError::NotComposite {
                type_name: current.type_name().to_string(),
                property: segment.clone(),
            })?;
    }
    Ok(current)
}

/// Mutable variant of [`resolve`].
pub fn resolve_mut<'a>(
    root: &'a mut dyn Interceptable,
    segments: &[String],
) -> EngineResult<&'a mut dyn Interceptable> {
    let mut current = root;
    for segment in segments {
        let type_name = current.type_name().to_string();
        current = current
            .composite_mut(segment)
            .ok_or_else(|| EngineError::NotComposite {
                type_name,
                property: segment.clone(),
            })?;
    }
    Ok(current)
}
