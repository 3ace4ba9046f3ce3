//! Bulk instrumentation of objects and classes
//!
//! Walks the own members of a target through the [`MemberSource`]
//! capability and replaces every callable member, in place, with a proxy
//! named `<label>.<member>`. Accessor halves are wrapped independently as
//! `<label>.<member>:get` and `<label>.<member>:set`.

use tracing::trace;

use crate::error::{ProfilerError, Result};
use crate::host::{Function, Object, Property, Thrown, Value};
use crate::profiler::Profiler;
use crate::wrapper;

/// A callable member found while probing
#[derive(Debug, Clone)]
pub enum MemberKind {
    Method(Function),
    Accessor {
        get: Option<Function>,
        set: Option<Function>,
    },
}

/// Anything whose own members can be listed, read and replaced
pub trait MemberSource {
    /// Own member names in definition order
    fn member_names(&self) -> Vec<String>;

    /// `Ok(None)` for members that are not callable
    fn classify(&self, name: &str) -> std::result::Result<Option<MemberKind>, Thrown>;

    fn replace(&self, name: &str, member: MemberKind);
}

impl MemberSource for Object {
    fn member_names(&self) -> Vec<String> {
        self.own_keys()
    }

    fn classify(&self, name: &str) -> std::result::Result<Option<MemberKind>, Thrown> {
        let value = match self.own_property(name) {
            None => return Ok(None),
            Some(Property::Accessor { get, set }) => {
                if get.is_none() && set.is_none() {
                    return Ok(None);
                }
                return Ok(Some(MemberKind::Accessor { get, set }));
            }
            Some(Property::Data(value)) => value,
            Some(Property::Computed(read)) => read(self)?,
        };
        Ok(match value {
            Value::Function(f) => Some(MemberKind::Method(f)),
            _ => None,
        })
    }

    fn replace(&self, name: &str, member: MemberKind) {
        let property = match member {
            MemberKind::Method(f) => Property::Data(Value::Function(f)),
            MemberKind::Accessor { get, set } => Property::Accessor { get, set },
        };
        self.define(name, property);
    }
}

/// Wrap one accessor half unless it is absent or already profiled
fn wrap_half(profiler: &Profiler, half: Option<Function>, name: String) -> Result<(Option<Function>, bool)> {
    match half {
        Some(f) if !f.is_profiled() => Ok((Some(wrapper::wrap(profiler, &f, Some(&name))?), true)),
        other => Ok((other, false)),
    }
}

/// Wrap every callable own member of `source`; returns how many changed
pub fn instrument(profiler: &Profiler, source: &dyn MemberSource, label: &str) -> Result<usize> {
    let config = profiler.config();
    let mut wrapped = 0;

    for name in source.member_names() {
        if config.skips(&name) {
            trace!(label, member = %name, "member skipped by configuration");
            continue;
        }
        let member = match source.classify(&name) {
            Ok(Some(member)) => member,
            Ok(None) => continue,
            Err(thrown) => {
                trace!(label, member = %name, error = %thrown, "member could not be read");
                continue;
            }
        };

        match member {
            MemberKind::Method(f) if f.is_profiled() => {
                trace!(label, member = %name, "member already profiled");
            }
            MemberKind::Method(f) => {
                let proxy = wrapper::wrap(profiler, &f, Some(&format!("{label}.{name}")))?;
                source.replace(&name, MemberKind::Method(proxy));
                wrapped += 1;
            }
            MemberKind::Accessor { get, set } => {
                let (get, get_changed) = wrap_half(profiler, get, format!("{label}.{name}:get"))?;
                let (set, set_changed) = wrap_half(profiler, set, format!("{label}.{name}:set"))?;
                if get_changed || set_changed {
                    source.replace(&name, MemberKind::Accessor { get, set });
                    wrapped += 1;
                }
            }
        }
    }
    Ok(wrapped)
}

/// Instrument an object's members; constructors are treated as classes
pub fn register_object(profiler: &Profiler, target: &Value, label: Option<&str>) -> Result<Value> {
    match target {
        Value::Object(object) => {
            let label = label.unwrap_or("Object");
            let count = instrument(profiler, object, label)?;
            trace!(label, count, "object registered");
            Ok(target.clone())
        }
        Value::Function(f) if f.is_constructor() => register_class(profiler, target, label),
        Value::Function(f) => {
            let label = label.or(f.name()).unwrap_or("Object");
            instrument(profiler, f.props(), label)?;
            Ok(target.clone())
        }
        other => Err(ProfilerError::InvalidTarget {
            found: other.type_name(),
        }),
    }
}

/// Instrument a class's prototype members and static members
pub fn register_class(profiler: &Profiler, target: &Value, label: Option<&str>) -> Result<Value> {
    match target {
        Value::Function(class) => {
            let label = label.or(class.name()).unwrap_or("Object");
            let mut count = 0;
            if let Some(prototype) = class.prototype() {
                count += instrument(profiler, prototype, label)?;
            }
            count += instrument(profiler, class.props(), label)?;
            trace!(label, count, "class registered");
            Ok(target.clone())
        }
        Value::Object(_) => register_object(profiler, target, label),
        other => Err(ProfilerError::InvalidTarget {
            found: other.type_name(),
        }),
    }
}
