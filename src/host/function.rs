//! Host functions: receiver-aware callables with metadata

use std::fmt;
use std::rc::Rc;

use super::{CallResult, Object, Thrown, Value};

/// Native body of a host function: `(receiver, arguments) -> result`
pub type NativeFn = Rc<dyn Fn(&Value, &[Value]) -> CallResult>;

/// Marker carried by profiled proxies
///
/// Holds the display name the proxy records under and the function it
/// stands in for, so the original's name, property bag and textual
/// representation stay inspectable.
#[derive(Clone)]
pub struct WrapperIdentity {
    display_name: String,
    original: Function,
}

impl WrapperIdentity {
    pub(crate) fn new(display_name: impl Into<String>, original: Function) -> Self {
        Self {
            display_name: display_name.into(),
            original,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original(&self) -> &Function {
        &self.original
    }
}

impl fmt::Debug for WrapperIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperIdentity")
            .field("display_name", &self.display_name)
            .field("original", &self.original.name())
            .finish()
    }
}

struct FunctionData {
    name: Option<String>,
    source: String,
    body: NativeFn,
    prototype: Option<Object>,
    props: Object,
    identity: Option<WrapperIdentity>,
}

/// Shared handle to a host function
#[derive(Clone)]
pub struct Function(Rc<FunctionData>);

/// Builder for host functions and classes
#[derive(Default)]
pub struct FunctionBuilder {
    name: Option<String>,
    source: Option<String>,
    prototype: Option<Object>,
    props: Option<Object>,
    identity: Option<WrapperIdentity>,
}

impl FunctionBuilder {
    /// Textual representation returned by `to_string()`
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Make the function constructible with a fresh prototype object
    pub fn constructor(mut self) -> Self {
        self.prototype = Some(Object::new());
        self
    }

    /// Make the function constructible, sharing an existing prototype
    pub fn prototype(mut self, prototype: Object) -> Self {
        self.prototype = Some(prototype);
        self
    }

    pub(crate) fn props(mut self, props: Object) -> Self {
        self.props = Some(props);
        self
    }

    pub(crate) fn identity(mut self, identity: WrapperIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn build<F>(self, body: F) -> Function
    where
        F: Fn(&Value, &[Value]) -> CallResult + 'static,
    {
        let source = self.source.unwrap_or_else(|| {
            match (&self.name, self.prototype.is_some()) {
                (Some(name), true) => format!("class {name} {{ [native code] }}"),
                (Some(name), false) => format!("function {name}() {{ [native code] }}"),
                (None, _) => "() => { [native code] }".to_string(),
            }
        });
        Function(Rc::new(FunctionData {
            name: self.name,
            source,
            body: Rc::new(body),
            prototype: self.prototype,
            props: self.props.unwrap_or_default(),
            identity: self.identity,
        }))
    }
}

impl Function {
    /// Start building a function; `None` or an empty name makes it anonymous
    pub fn builder(name: Option<&str>) -> FunctionBuilder {
        FunctionBuilder {
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            ..FunctionBuilder::default()
        }
    }

    pub fn native<F>(name: &str, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> CallResult + 'static,
    {
        Self::builder(Some(name)).build(body)
    }

    pub fn anonymous<F>(body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> CallResult + 'static,
    {
        Self::builder(None).build(body)
    }

    /// A constructible function; `init` runs with the new instance as receiver
    pub fn class<F>(name: &str, init: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> CallResult + 'static,
    {
        Self::builder(Some(name)).constructor().build(init)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.0.source
    }

    /// Own property bag: user metadata and, for classes, static members
    pub fn props(&self) -> &Object {
        &self.0.props
    }

    /// Prototype shared by instances; `None` for non-constructible functions
    pub fn prototype(&self) -> Option<&Object> {
        self.0.prototype.as_ref()
    }

    pub fn is_constructor(&self) -> bool {
        self.0.prototype.is_some()
    }

    pub fn identity(&self) -> Option<&WrapperIdentity> {
        self.0.identity.as_ref()
    }

    pub fn is_profiled(&self) -> bool {
        self.0.identity.is_some()
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Call with an explicit receiver
    pub fn call(&self, this: &Value, args: &[Value]) -> CallResult {
        (self.0.body)(this, args)
    }

    /// Allocate an instance linked to the prototype and run the body on it
    ///
    /// An object returned by the body replaces the fresh instance.
    pub fn construct(&self, args: &[Value]) -> CallResult {
        let Some(prototype) = self.prototype() else {
            return Err(Thrown::message(format!(
                "{} is not a constructor",
                self.name().unwrap_or("anonymous")
            )));
        };
        let instance = Object::with_proto(prototype.clone());
        match self.call(&Value::Object(instance.clone()), args)? {
            returned @ Value::Object(_) => Ok(returned),
            _ => Ok(Value::Object(instance)),
        }
    }

    /// A new function that always runs with `this` as receiver
    pub fn bind(&self, this: Value) -> Function {
        let target = self.clone();
        let name = format!("bound {}", self.name().unwrap_or(""));
        Function::builder(Some(name.trim_end()))
            .source("function () { [native code] }")
            .build(move |_, args| target.call(&this, args))
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name())
            .field("profiled", &self.is_profiled())
            .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source())
    }
}
