use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::value::Value;

/// A runtime variable environment. Environments form a parent chain:
/// lookups walk outward, definitions always land in the innermost frame.
/// A fresh enclosed environment is created per block and per call;
/// closures keep their defining environment alive through the shared
/// handle.
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment::default()))
    }

    pub fn new_enclosed(outer: &Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(Rc::clone(outer)),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.store.get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.borrow().get(name))
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.store.insert(name.into(), value);
    }
}
