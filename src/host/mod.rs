//! Dynamic host object model
//!
//! Profiled code is expressed as host values: objects with ordered own
//! members (data, accessor pairs, or host-computed slots), functions that
//! receive an explicit receiver, and classes whose prototype object is
//! shared by every instance. The member enumerator and the function
//! wrapper operate on this model.

mod function;
mod object;
mod value;

pub use function::{Function, FunctionBuilder, NativeFn, WrapperIdentity};
pub use object::{ComputedFn, Object, Property};
pub use value::{CallResult, Thrown, Value};
