//! Tagged compiler results with lazily rendered messages.

use std::fmt;
use std::rc::Rc;

use crate::errors::{CompilationError, CompilationErrorKind};

/// A message that is only rendered when asked for.
#[derive(Clone)]
pub struct Deferred(Rc<dyn Fn() -> String>);

impl Deferred {
    pub fn new(render: impl Fn() -> String + 'static) -> Self {
        Self(Rc::new(render))
    }

    pub fn render(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Deferred(..)")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Error,
}

/// What a build or run reports to its caller.
///
/// The primary message is always meant to be shown; `details` is extended
/// output (such as an IR dump) that callers render only on request.
#[derive(Clone, Debug)]
pub struct CompilerResult {
    pub outcome: Outcome,
    message: Deferred,
    details: Option<Deferred>,
}

impl CompilerResult {
    pub fn success(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            outcome: Outcome::Success,
            message: Deferred::new(move || message.clone()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Deferred) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn message(&self) -> String {
        self.message.render()
    }

    pub fn has_details(&self) -> bool {
        self.details.is_some()
    }

    pub fn details(&self) -> Option<String> {
        self.details.as_ref().map(Deferred::render)
    }
}

impl CompilationError {
    /// Convert into an error-tagged [`CompilerResult`].
    ///
    /// Verification failures carry their deferred IR dump as details;
    /// semantic errors carry the source location.
    pub fn report(self) -> CompilerResult {
        let details = match self.kind() {
            CompilationErrorKind::Verification { details, .. } => details.clone(),
            CompilationErrorKind::Semantic(error) => {
                let span = error.span();
                Some(Deferred::new(move || format!("at {}", span.start)))
            }
            _ => None,
        };
        let error = Rc::new(self);
        CompilerResult {
            outcome: Outcome::Error,
            message: Deferred::new(move || error.to_string()),
            details,
        }
    }
}
