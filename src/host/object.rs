//! Host objects: ordered own members plus a prototype link

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::{CallResult, Function, Thrown, Value};

/// Read hook for members the host computes on access
pub type ComputedFn = Rc<dyn Fn(&Object) -> CallResult>;

/// An own member of an object
#[derive(Clone)]
pub enum Property {
    /// Plain stored value
    Data(Value),
    /// Getter/setter pair; either half may be absent
    Accessor {
        get: Option<Function>,
        set: Option<Function>,
    },
    /// Host-managed slot whose read may fail (foreign namespaces)
    Computed(ComputedFn),
}

impl Property {
    /// Host-computed member read through `read`
    pub fn computed<F>(read: F) -> Self
    where
        F: Fn(&Object) -> CallResult + 'static,
    {
        Property::Computed(Rc::new(read))
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Data(v) => write!(f, "Data({v:?})"),
            Property::Accessor { get, set } => f
                .debug_struct("Accessor")
                .field("get", get)
                .field("set", set)
                .finish(),
            Property::Computed(_) => write!(f, "Computed(..)"),
        }
    }
}

#[derive(Default)]
struct ObjectData {
    members: Vec<(String, Property)>,
    proto: Option<Object>,
}

/// Shared, mutable host object
///
/// Cloning yields another handle to the same object; registration mutates
/// objects in place through any handle.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an object whose missing members resolve through `proto`
    pub fn with_proto(proto: Object) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            members: Vec::new(),
            proto: Some(proto),
        })))
    }

    pub fn proto(&self) -> Option<Object> {
        self.0.borrow().proto.clone()
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Define or replace an own member, keeping its original position
    pub fn define(&self, name: impl Into<String>, property: Property) {
        let name = name.into();
        let mut data = self.0.borrow_mut();
        match data.members.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = property,
            None => data.members.push((name, property)),
        }
    }

    /// Define an own data member
    pub fn insert(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.define(name, Property::Data(value.into()));
    }

    /// Own member descriptor, if present
    pub fn own_property(&self, name: &str) -> Option<Property> {
        self.0
            .borrow()
            .members
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, property)| property.clone())
    }

    /// Own member names in definition order
    pub fn own_keys(&self) -> Vec<String> {
        self.0
            .borrow()
            .members
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read a member, walking the prototype chain; getters see `self` as receiver
    pub fn get(&self, name: &str) -> CallResult {
        let mut holder = Some(self.clone());
        while let Some(current) = holder {
            if let Some(property) = current.own_property(name) {
                return self.read(property);
            }
            holder = current.proto();
        }
        Ok(Value::Undefined)
    }

    fn read(&self, property: Property) -> CallResult {
        match property {
            Property::Data(value) => Ok(value),
            Property::Accessor { get: Some(getter), .. } => {
                getter.call(&Value::Object(self.clone()), &[])
            }
            Property::Accessor { get: None, .. } => Ok(Value::Undefined),
            Property::Computed(read) => read(self),
        }
    }

    /// Assign a member: setters found on the chain run with `self` as receiver
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), Thrown> {
        let value = value.into();
        let mut holder = Some(self.clone());
        while let Some(current) = holder {
            if let Some(Property::Accessor { set, .. }) = current.own_property(name) {
                return match set {
                    Some(setter) => setter
                        .call(&Value::Object(self.clone()), &[value])
                        .map(|_| ()),
                    None => Err(Thrown::message(format!(
                        "cannot set property '{name}' which has only a getter"
                    ))),
                };
            }
            holder = current.proto();
        }
        self.insert(name, value);
        Ok(())
    }

    /// Call the method `name` with this object as receiver
    pub fn invoke(&self, name: &str, args: &[Value]) -> CallResult {
        match self.get(name)? {
            Value::Function(method) => method.call(&Value::Object(self.clone()), args),
            other => Err(Thrown::message(format!(
                "'{name}' is not a function (found {})",
                other.type_name()
            ))),
        }
    }

    /// True when `class.prototype` appears on this object's prototype chain
    pub fn instance_of(&self, class: &Function) -> bool {
        let Some(target) = class.prototype() else {
            return false;
        };
        let mut proto = self.proto();
        while let Some(current) = proto {
            if current.ptr_eq(target) {
                return true;
            }
            proto = current.proto();
        }
        false
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("keys", &self.own_keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_keeps_position() {
        let obj = Object::new();
        obj.insert("a", 1);
        obj.insert("b", 2);
        obj.insert("a", 3);
        assert_eq!(obj.own_keys(), vec!["a", "b"]);
        assert_eq!(obj.get("a").unwrap(), Value::from(3));
    }

    #[test]
    fn test_missing_member_is_undefined() {
        let obj = Object::new();
        assert!(obj.get("nope").unwrap().is_undefined());
    }

    #[test]
    fn test_get_walks_prototype_chain() {
        let proto = Object::new();
        proto.insert("shared", "yes");
        let obj = Object::with_proto(proto);
        assert_eq!(obj.get("shared").unwrap(), Value::from("yes"));
        assert!(obj.own_property("shared").is_none());
    }

    #[test]
    fn test_accessor_pair_round_trip() {
        let store = Rc::new(RefCell::new(Value::from(5)));
        let read = Rc::clone(&store);
        let write = Rc::clone(&store);
        let obj = Object::new();
        obj.define(
            "value",
            Property::Accessor {
                get: Some(Function::native("get value", move |_, _| {
                    Ok(read.borrow().clone())
                })),
                set: Some(Function::native("set value", move |_, args| {
                    *write.borrow_mut() = args.first().cloned().unwrap_or_default();
                    Ok(Value::Undefined)
                })),
            },
        );

        assert_eq!(obj.get("value").unwrap(), Value::from(5));
        obj.set("value", 7).unwrap();
        assert_eq!(obj.get("value").unwrap(), Value::from(7));
        assert!(matches!(
            obj.own_property("value"),
            Some(Property::Accessor { .. })
        ));
    }

    #[test]
    fn test_set_on_getter_only_accessor_fails() {
        let obj = Object::new();
        obj.define(
            "fixed",
            Property::Accessor {
                get: Some(Function::native("get fixed", |_, _| Ok(Value::from(1)))),
                set: None,
            },
        );
        assert!(obj.set("fixed", 2).is_err());
    }

    #[test]
    fn test_computed_member_can_fail() {
        let obj = Object::new();
        obj.define(
            "guarded",
            Property::computed(|_| Err(Thrown::message("access denied"))),
        );
        assert_eq!(
            obj.get("guarded").unwrap_err(),
            Thrown::message("access denied")
        );
    }

    #[test]
    fn test_invoke_passes_receiver() {
        let obj = Object::new();
        obj.insert("name", "creep");
        obj.insert(
            "hello",
            Function::native("hello", |this, _| {
                let name = this.as_object().map(|o| o.get("name")).transpose()?;
                Ok(name.unwrap_or_default())
            }),
        );
        assert_eq!(obj.invoke("hello", &[]).unwrap(), Value::from("creep"));
    }

    #[test]
    fn test_invoke_non_function_fails() {
        let obj = Object::new();
        obj.insert("x", 1);
        assert!(obj.invoke("x", &[]).is_err());
    }
}
