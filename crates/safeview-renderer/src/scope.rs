//! Immutable linked scope for `ForLoop` locals (§4.11, §9): each loop
//! iteration prepends a fresh frame instead of mutating a shared map, so
//! sibling iterations and outer scopes never observe each other's
//! bindings.

use std::rc::Rc;

use serde_json::Value as Json;

#[derive(Debug, Clone, Default)]
pub struct Locals(Option<Rc<Frame>>);

#[derive(Debug)]
struct Frame {
    parent: Locals,
    name: String,
    item: Json,
    index: Json,
}

impl Locals {
    #[must_use]
    pub fn root() -> Self {
        Self(None)
    }

    /// Binds `name` to `item` and the reserved `index` local to `index`,
    /// shadowing any outer binding of the same name.
    #[must_use]
    pub fn push(&self, name: impl Into<String>, item: Json, index: usize) -> Self {
        Self(Some(Rc::new(Frame {
            parent: self.clone(),
            name: name.into(),
            item,
            index: Json::from(index),
        })))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Json> {
        let mut frame = self.0.as_deref();
        while let Some(f) = frame {
            if name == "index" {
                return Some(&f.index);
            }
            if f.name == name {
                return Some(&f.item);
            }
            frame = f.parent.0.as_deref();
        }
        None
    }
}
