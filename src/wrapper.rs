//! Transparent timing proxies
//!
//! A proxy forwards its receiver and arguments untouched, shares the
//! original's prototype (so constructing through it yields instances of
//! the original class), carries a copy of the original's property bag,
//! and embeds the original's source in its own textual representation.
//!
//! When a session is active, each call opens a [`CallGuard`]. The guard's
//! `Drop` does the accounting, so the cost is recorded and the caller
//! restored on every exit path: normal return, `Err` return, or panic.

use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

use crate::error::{ProfilerError, Result};
use crate::host::{Function, Object, WrapperIdentity};
use crate::profiler::Profiler;
use crate::session::{ExecutionContext, Frame, SessionController};

/// Accounting scope for one profiled call
pub(crate) struct CallGuard {
    controller: Rc<RefCell<SessionController>>,
    context: Rc<RefCell<ExecutionContext>>,
    frame: Option<Frame>,
}

impl CallGuard {
    /// Returns `None` when nothing is being measured
    pub(crate) fn open(controller: &Rc<RefCell<SessionController>>, name: &str) -> Option<Self> {
        let mut session = controller.borrow_mut();
        let frame = session.open_frame(name)?;
        Some(Self {
            controller: Rc::clone(controller),
            context: session.context_handle(),
            frame: Some(frame),
        })
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        let Some(frame) = self.frame.take() else {
            return;
        };
        // Never panic here: this may run while unwinding.
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.close_frame(frame),
            Err(_) => {
                warn!("profiler state busy, dropping one measurement");
                if let Ok(mut context) = self.context.try_borrow_mut() {
                    frame.restore_caller(&mut context);
                }
            }
        }
    }
}

fn display_name(original: &Function, explicit: Option<&str>) -> Result<String> {
    explicit
        .filter(|name| !name.is_empty())
        .or_else(|| original.name())
        .map(str::to_string)
        .ok_or(ProfilerError::MissingName)
}

/// Wrap `original` in a timing proxy recorded under `name`
///
/// Fails with [`ProfilerError::DoubleWrap`] if `original` is itself a
/// proxy. An anonymous function without an explicit name is returned
/// unchanged.
pub fn wrap(profiler: &Profiler, original: &Function, name: Option<&str>) -> Result<Function> {
    if let Some(identity) = original.identity() {
        return Err(ProfilerError::DoubleWrap {
            name: identity.display_name().to_string(),
        });
    }

    let display = match display_name(original, name) {
        Ok(display) => display,
        Err(ProfilerError::MissingName) => {
            warn!(
                source = original.source(),
                "Couldn't find a function name, it will not be profiled"
            );
            return Ok(original.clone());
        }
        Err(e) => return Err(e),
    };

    Ok(proxy(profiler.controller(), original, display))
}

fn proxy(controller: &Rc<RefCell<SessionController>>, original: &Function, display: String) -> Function {
    let props = Object::new();
    for key in original.props().own_keys() {
        if let Some(property) = original.props().own_property(&key) {
            props.define(key, property);
        }
    }

    let mut builder = Function::builder(original.name())
        .source(format!("// profiled as {}:\n{}", display, original.source()))
        .props(props)
        .identity(WrapperIdentity::new(display.clone(), original.clone()));
    if let Some(prototype) = original.prototype() {
        builder = builder.prototype(prototype.clone());
    }

    let controller = Rc::clone(controller);
    let target = original.clone();
    builder.build(move |this, args| {
        let _guard = CallGuard::open(&controller, &display);
        target.call(this, args)
    })
}
