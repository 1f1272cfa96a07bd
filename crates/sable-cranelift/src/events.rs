//! Progress notifications for build and run phases.
//!
//! Observers are called synchronously, in subscription order, on the thread
//! that emits the event. They are advisory and cannot affect compilation.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub detail: Option<String>,
}

pub struct EventStream {
    name: &'static str,
    observers: Vec<Box<dyn Fn(&ProgressEvent)>>,
}

impl EventStream {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: impl Fn(&ProgressEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&self, message: impl Into<String>, detail: Option<String>) {
        let event = ProgressEvent {
            message: message.into(),
            detail,
        };
        tracing::info!(
            stream = self.name,
            detail = event.detail.as_deref().unwrap_or(""),
            "{}",
            event.message
        );
        for observer in &self.observers {
            observer(&event);
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("name", &self.name)
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// The two independent streams every executable exposes.
#[derive(Debug)]
pub struct ProgressEvents {
    pub build: EventStream,
    pub run: EventStream,
}

impl Default for ProgressEvents {
    fn default() -> Self {
        Self {
            build: EventStream::new("build"),
            run: EventStream::new("run"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_observers_run_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut stream = EventStream::new("build");
        for tag in ["first", "second"] {
            let seen = seen.clone();
            stream.subscribe(move |event| seen.borrow_mut().push(format!("{tag}:{}", event.message)));
        }
        stream.emit("started", None);
        assert_eq!(*seen.borrow(), vec!["first:started", "second:started"]);
    }
}
