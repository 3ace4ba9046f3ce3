//! Per-cycle call-stack bookkeeping

/// Caller name used for calls made outside any profiled function
pub const ROOT_CALLER: &str = "root";

/// Current caller and filter depth for the single profiled call stack
///
/// Every proxy saves the current caller on entry, installs itself, and
/// restores the saved caller on exit, so nested calls are attributed to
/// their immediate caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    parent: String,
    depth: u32,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            parent: ROOT_CALLER.to_string(),
            depth: 0,
        }
    }

    /// Forget any stack left over from a previous cycle
    pub fn reset(&mut self) {
        self.parent.clear();
        self.parent.push_str(ROOT_CALLER);
        self.depth = 0;
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Nesting depth inside the filtered function
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Install `name` as current caller; returns the caller it replaced
    pub(crate) fn enter(&mut self, name: &str, matches_filter: bool) -> String {
        if matches_filter {
            self.depth += 1;
        }
        std::mem::replace(&mut self.parent, name.to_string())
    }

    pub(crate) fn leave(&mut self, previous: String, matches_filter: bool) {
        self.parent = previous;
        if matches_filter {
            self.depth = self.depth.saturating_sub(1);
        }
    }
}
