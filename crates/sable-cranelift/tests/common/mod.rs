//! Common test utilities

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use sable_ast::{ParsedModule, parse_module};
use sable_cranelift::{Executable, ProgressEvent};

pub const ADD_PROGRAM: &str = "fn add(a: int, b: int): int { return a + b; }\nout add(2, 3);";

pub fn parse(source: &str) -> ParsedModule {
    let parsed = parse_module("test", source).expect("AST construction failed");
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    parsed
}

/// Record every build and run event as `stream: message`.
pub fn record_events(executable: &mut impl Executable) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let events = executable.events_mut();
    let build = seen.clone();
    events
        .build
        .subscribe(move |event: &ProgressEvent| build.borrow_mut().push(format!("build: {}", event.message)));
    let run = seen.clone();
    events
        .run
        .subscribe(move |event: &ProgressEvent| run.borrow_mut().push(format!("run: {}", event.message)));
    seen
}
