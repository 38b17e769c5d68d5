use crate::object::Object;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared handle to a scope. Closures hold one of these, so a scope lives as
/// long as any function created in it.
pub type Env = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    // Use Rc<RefCell<...>> to allow shared ownership and interior mutability.
    // Needed for closures capturing environments.
    outer: Option<Env>,
    bindings: HashMap<String, Object>,
}

impl Environment {
    /// Creates a new, top-level (global) environment.
    pub fn new() -> Env {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: Env) -> Env {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Defines a variable in the *current* environment frame.
    /// Replaces the value if the variable already exists in this frame.
    pub fn define(&mut self, name: impl Into<String>, value: Object) {
        self.bindings.insert(name.into(), value);
    }

    /// Looks up a variable's value.
    /// Checks the current environment first, then walks up the outer environment chain.
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.bindings.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .outer
                .as_ref()
                .and_then(|outer_env| outer_env.borrow().get(name)),
        }
    }

    fn add_identifiers(&self, identifiers: &mut HashSet<String>) {
        identifiers.extend(self.bindings.keys().cloned());
        if let Some(outer_env) = &self.outer {
            outer_env.borrow().add_identifiers(identifiers);
        }
    }

    /// Gets every identifier visible from this environment.
    pub fn get_identifiers(&self) -> HashSet<String> {
        let mut identifiers = HashSet::new();
        self.add_identifiers(&mut identifiers);
        identifiers
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn int(env: &Env, name: &str) -> Option<i64> {
        match env.borrow().get(name) {
            Some(Object::Integer(value)) => Some(value),
            _ => None,
        }
    }

    #[test]
    fn test_define_and_get_global() {
        let env = Environment::new();
        env.borrow_mut().define("x", Object::Integer(10));
        assert_eq!(int(&env, "x"), Some(10));
    }

    #[test]
    fn test_get_unbound_global() {
        let env = Environment::new();
        assert!(env.borrow().get("y").is_none());
    }

    #[test]
    fn test_define_and_get_enclosed() {
        let global_env = Environment::new();
        global_env.borrow_mut().define("x", Object::Integer(10));

        let local_env = Environment::new_enclosed(global_env);
        local_env.borrow_mut().define("y", Object::Integer(20));

        assert_eq!(int(&local_env, "y"), Some(20));
        assert_eq!(int(&local_env, "x"), Some(10));
    }

    #[test]
    fn test_shadowing_does_not_touch_outer() {
        let global_env = Environment::new();
        global_env.borrow_mut().define("x", Object::Integer(10));

        let local_env = Environment::new_enclosed(global_env.clone());
        local_env.borrow_mut().define("x", Object::Integer(50));

        let inner_local_env = Environment::new_enclosed(local_env.clone());
        inner_local_env.borrow_mut().define("y", Object::Integer(1));

        assert_eq!(int(&inner_local_env, "x"), Some(50));
        assert_eq!(int(&local_env, "x"), Some(50));
        assert_eq!(int(&global_env, "x"), Some(10));
        assert!(global_env.borrow().get("y").is_none());
    }

    #[test]
    fn test_outer_redefinition_is_visible_from_inner() {
        let global_env = Environment::new();
        global_env.borrow_mut().define("x", Object::Integer(1));
        let local_env = Environment::new_enclosed(global_env.clone());

        global_env.borrow_mut().define("x", Object::Integer(2));
        assert_eq!(int(&local_env, "x"), Some(2));
    }

    #[test]
    fn test_get_identifiers_walks_every_frame() {
        let global_env = Environment::new();
        global_env.borrow_mut().define("a", Object::Null);
        let middle = Environment::new_enclosed(global_env);
        middle.borrow_mut().define("b", Object::Null);
        let inner = Environment::new_enclosed(middle);
        inner.borrow_mut().define("c", Object::Null);

        let identifiers = inner.borrow().get_identifiers();
        let expected: HashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(identifiers, expected);
    }
}
