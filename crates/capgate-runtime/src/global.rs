//! Per-context global namespace
//!
//! Property store the script engine adapter maps onto the sandbox's global
//! object. Each property carries JavaScript-style attributes:
//! - `enumerable`: listed by `keys()` (for…in / Object.keys)
//! - `writable`: guest assignment may replace the value
//! - `configurable`: the property may be deleted or redefined
//!
//! Properties keep insertion order. A non-configurable property can only be
//! "redefined" with an identical descriptor, which is a no-op.

use crate::value::{RuntimeError, Value};

/// Attribute flags of a global property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyAttributes {
    pub enumerable: bool,
    pub writable: bool,
    pub configurable: bool,
}

impl PropertyAttributes {
    /// Fixed, hidden binding used for installed capabilities
    pub const FIXED_HIDDEN: PropertyAttributes = PropertyAttributes {
        enumerable: false,
        writable: false,
        configurable: false,
    };

    /// Attributes of a property created by plain guest assignment
    pub const ORDINARY: PropertyAttributes = PropertyAttributes {
        enumerable: true,
        writable: true,
        configurable: true,
    };
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        Self::ORDINARY
    }
}

/// Value plus attributes of one own property
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    pub value: Value,
    pub attributes: PropertyAttributes,
}

impl PropertyDescriptor {
    pub fn new(value: Value, attributes: PropertyAttributes) -> Self {
        Self { value, attributes }
    }

    /// Descriptor for an installed capability binding
    pub fn fixed_hidden(value: Value) -> Self {
        Self::new(value, PropertyAttributes::FIXED_HIDDEN)
    }

    /// Same value (SameValue) and same attributes
    pub fn is_identical(&self, other: &PropertyDescriptor) -> bool {
        self.attributes == other.attributes && self.value.same_value(&other.value)
    }
}

/// Global namespace of one sandbox context
#[derive(Debug, Clone, Default)]
pub struct GlobalNamespace {
    properties: Vec<(String, PropertyDescriptor)>,
}

impl GlobalNamespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.properties.iter().position(|(n, _)| n == name)
    }

    /// Check whether `define_own_property(name, descriptor)` would succeed
    /// without touching the namespace.
    pub fn check_define(
        &self,
        name: &str,
        descriptor: &PropertyDescriptor,
    ) -> Result<(), RuntimeError> {
        match self.descriptor(name) {
            Some(existing)
                if !existing.attributes.configurable && !existing.is_identical(descriptor) =>
            {
                Err(RuntimeError::NotConfigurable {
                    name: name.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Define (or redefine) an own property
    ///
    /// Configurable properties are replaced in place. Redefining a
    /// non-configurable property succeeds only with an identical descriptor.
    pub fn define_own_property(
        &mut self,
        name: &str,
        descriptor: PropertyDescriptor,
    ) -> Result<(), RuntimeError> {
        self.check_define(name, &descriptor)?;

        match self.position(name) {
            Some(index) => self.properties[index].1 = descriptor,
            None => self.properties.push((name.to_string(), descriptor)),
        }
        Ok(())
    }

    /// Direct property access by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.descriptor(name).map(|d| &d.value)
    }

    /// Resolve a free identifier the way guest code would
    pub fn resolve(&self, name: &str) -> Result<Value, RuntimeError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn descriptor(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    /// Guest assignment (`name = value`)
    ///
    /// Assigning to a non-writable property fails; assigning to an unknown
    /// name creates an ordinary property.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.position(name) {
            Some(index) => {
                let descriptor = &mut self.properties[index].1;
                if !descriptor.attributes.writable {
                    return Err(RuntimeError::ReadOnlyBinding {
                        name: name.to_string(),
                    });
                }
                descriptor.value = value;
            }
            None => self.properties.push((
                name.to_string(),
                PropertyDescriptor::new(value, PropertyAttributes::ORDINARY),
            )),
        }
        Ok(())
    }

    /// Guest deletion (`delete name`)
    ///
    /// Returns `Ok(false)` when the name does not exist.
    pub fn delete(&mut self, name: &str) -> Result<bool, RuntimeError> {
        let Some(index) = self.position(name) else {
            return Ok(false);
        };
        if !self.properties[index].1.attributes.configurable {
            return Err(RuntimeError::NotConfigurable {
                name: name.to_string(),
            });
        }
        self.properties.remove(index);
        Ok(true)
    }

    /// Enumerable own property names, in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, d)| d.attributes.enumerable)
            .map(|(n, _)| n.as_str())
    }

    /// Every own property name, hidden ones included
    pub fn own_property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_creates_ordinary_property() {
        let mut global = GlobalNamespace::new();
        global.set("x", Value::Number(1.0)).unwrap();

        assert_eq!(global.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(
            global.descriptor("x").unwrap().attributes,
            PropertyAttributes::ORDINARY
        );
        assert_eq!(global.keys().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_hidden_property_not_enumerated() {
        let mut global = GlobalNamespace::new();
        global.set("visible", Value::Null).unwrap();
        global
            .define_own_property("hidden", PropertyDescriptor::fixed_hidden(Value::Bool(true)))
            .unwrap();

        assert_eq!(global.keys().collect::<Vec<_>>(), vec!["visible"]);
        assert_eq!(
            global.own_property_names().collect::<Vec<_>>(),
            vec!["visible", "hidden"]
        );
        assert_eq!(global.resolve("hidden").unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_assign_to_fixed_property_fails() {
        let mut global = GlobalNamespace::new();
        global
            .define_own_property("fixed", PropertyDescriptor::fixed_hidden(Value::Number(1.0)))
            .unwrap();

        let err = global.set("fixed", Value::Number(2.0)).unwrap_err();
        assert_eq!(
            err,
            RuntimeError::ReadOnlyBinding {
                name: "fixed".to_string()
            }
        );
        assert_eq!(global.get("fixed"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_delete_fixed_property_fails() {
        let mut global = GlobalNamespace::new();
        global
            .define_own_property("fixed", PropertyDescriptor::fixed_hidden(Value::Null))
            .unwrap();

        assert!(matches!(
            global.delete("fixed"),
            Err(RuntimeError::NotConfigurable { .. })
        ));
        assert!(global.has("fixed"));
    }

    #[test]
    fn test_delete_ordinary_and_missing() {
        let mut global = GlobalNamespace::new();
        global.set("tmp", Value::Null).unwrap();

        assert_eq!(global.delete("tmp"), Ok(true));
        assert_eq!(global.delete("tmp"), Ok(false));
        assert!(global.is_empty());
    }

    #[test]
    fn test_redefine_configurable_keeps_position() {
        let mut global = GlobalNamespace::new();
        global.set("a", Value::Null).unwrap();
        global.set("b", Value::Null).unwrap();
        global
            .define_own_property("a", PropertyDescriptor::fixed_hidden(Value::Bool(false)))
            .unwrap();

        assert_eq!(global.own_property_names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(global.keys().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_redefine_fixed_with_identical_descriptor() {
        let mut global = GlobalNamespace::new();
        let f = Value::native(|_| Ok(Value::Undefined));
        global
            .define_own_property("f", PropertyDescriptor::fixed_hidden(f.clone()))
            .unwrap();

        assert!(global
            .define_own_property("f", PropertyDescriptor::fixed_hidden(f))
            .is_ok());
        assert_eq!(global.len(), 1);
    }

    #[test]
    fn test_redefine_fixed_with_other_value_fails() {
        let mut global = GlobalNamespace::new();
        global
            .define_own_property("f", PropertyDescriptor::fixed_hidden(Value::Number(1.0)))
            .unwrap();

        let err = global
            .define_own_property("f", PropertyDescriptor::fixed_hidden(Value::Number(2.0)))
            .unwrap_err();
        assert_eq!(
            err,
            RuntimeError::NotConfigurable {
                name: "f".to_string()
            }
        );
    }

    #[test]
    fn test_redefine_fixed_with_other_attributes_fails() {
        let mut global = GlobalNamespace::new();
        global
            .define_own_property("f", PropertyDescriptor::fixed_hidden(Value::Null))
            .unwrap();

        let visible = PropertyDescriptor::new(
            Value::Null,
            PropertyAttributes {
                enumerable: true,
                ..PropertyAttributes::FIXED_HIDDEN
            },
        );
        assert!(global.define_own_property("f", visible).is_err());
    }

    #[test]
    fn test_resolve_unknown_name() {
        let global = GlobalNamespace::new();
        assert_eq!(
            global.resolve("Deno").unwrap_err(),
            RuntimeError::UndefinedVariable {
                name: "Deno".to_string()
            }
        );
    }
}
