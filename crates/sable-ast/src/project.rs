//! Build units.

use std::rc::Rc;

use crate::decl::Module;

/// A named unit of compilation with a single entry module.
#[derive(Clone, Debug)]
pub struct Project {
    pub name: String,
    entry: Rc<Module>,
}

impl Project {
    pub fn new(name: impl Into<String>, entry: Rc<Module>) -> Self {
        Self {
            name: name.into(),
            entry,
        }
    }

    pub fn entry_module(&self) -> &Rc<Module> {
        &self.entry
    }
}
