use colored::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use thiserror::Error;

use super::native_functions::native_print;
use super::values::RuntimeVal;

pub const VERSION: &str = "0.0.1";

// Scopes are shared: a block, a call and every closure created inside them
// can all hold the same environment
pub type Env = Rc<RefCell<Environment>>;

#[derive(Error, Debug, PartialEq)]
pub enum EnvError {
    #[error("{} undefined variable: {0}", "Error".red().bold())]
    UndefinedVariable(String),
}

// Built-ins environment. Programs run in a child of it so user code can
// shadow 'print' without losing it
pub fn create_global_env(output: Rc<RefCell<dyn Write>>) -> Env {
    let env = Environment::new(None);

    {
        let mut globals = env.borrow_mut();

        globals.define(
            "print",
            RuntimeVal::NativeFunction {
                name: "print",
                func: Rc::new(move |args: &[RuntimeVal]| native_print(&output, args)),
            },
        );
        globals.define("VERSION", RuntimeVal::String(VERSION.into()));
    }

    env
}

pub struct Environment {
    parent: Option<Env>,
    vars: HashMap<String, RuntimeVal>,
}

impl Environment {
    // Option allow to not have a parent (the global env)
    pub fn new(parent: Option<Env>) -> Env {
        Rc::new(RefCell::new(Self {
            parent,
            vars: HashMap::new(),
        }))
    }

    pub fn new_child(parent: &Env) -> Env {
        Environment::new(Some(parent.clone()))
    }

    // Always writes in this scope, shadowing any parent's variable
    pub fn define(&mut self, var: impl Into<String>, value: RuntimeVal) {
        self.vars.insert(var.into(), value);
    }

    // Writes in the closest scope declaring the variable
    pub fn assign(&mut self, var: &str, value: RuntimeVal) -> Result<(), EnvError> {
        if let Some(slot) = self.vars.get_mut(var) {
            *slot = value;
            return Ok(());
        }

        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(var, value),
            None => Err(EnvError::UndefinedVariable(var.into())),
        }
    }

    // Fetch the environment in which is declared the variable and return its value
    pub fn get(&self, var: &str) -> Result<RuntimeVal, EnvError> {
        if let Some(value) = self.vars.get(var) {
            return Ok(value.clone());
        }

        match &self.parent {
            Some(parent) => parent.borrow().get(var),
            None => Err(EnvError::UndefinedVariable(var.into())),
        }
    }

    // Jumps 'distance' parents up and reads there only, no search
    pub fn get_at(&self, distance: usize, var: &str) -> Result<RuntimeVal, EnvError> {
        if distance == 0 {
            return self
                .vars
                .get(var)
                .cloned()
                .ok_or_else(|| EnvError::UndefinedVariable(var.into()));
        }

        match &self.parent {
            Some(parent) => parent.borrow().get_at(distance - 1, var),
            None => Err(EnvError::UndefinedVariable(var.into())),
        }
    }

    pub fn assign_at(&mut self, distance: usize, var: &str, value: RuntimeVal) -> Result<(), EnvError> {
        if distance == 0 {
            return match self.vars.get_mut(var) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(EnvError::UndefinedVariable(var.into())),
            };
        }

        match &self.parent {
            Some(parent) => parent.borrow_mut().assign_at(distance - 1, var, value),
            None => Err(EnvError::UndefinedVariable(var.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> Rc<RefCell<Vec<u8>>> {
        Rc::new(RefCell::new(Vec::new()))
    }

    #[test]
    fn global_env_has_builtins() {
        let env = create_global_env(sink());

        assert_eq!(env.borrow().get("VERSION"), Ok(RuntimeVal::String("0.0.1".into())));
        assert!(matches!(env.borrow().get("print"), Ok(RuntimeVal::NativeFunction { name: "print", .. })));
    }

    #[test]
    fn define_shadows_parent() {
        let parent = Environment::new(None);
        parent.borrow_mut().define("x", RuntimeVal::Number(1));

        let child = Environment::new_child(&parent);
        child.borrow_mut().define("x", RuntimeVal::Number(2));

        assert_eq!(child.borrow().get("x"), Ok(RuntimeVal::Number(2)));
        assert_eq!(parent.borrow().get("x"), Ok(RuntimeVal::Number(1)));
    }

    #[test]
    fn assign_walks_to_declaring_scope() {
        let parent = Environment::new(None);
        parent.borrow_mut().define("x", RuntimeVal::Number(1));
        let child = Environment::new_child(&parent);

        child.borrow_mut().assign("x", RuntimeVal::Number(5)).unwrap();

        assert_eq!(parent.borrow().get("x"), Ok(RuntimeVal::Number(5)));
        assert!(!child.borrow().vars.contains_key("x"));
    }

    #[test]
    fn undefined_variable() {
        let env = Environment::new(None);

        assert_eq!(
            env.borrow_mut().assign("nope", RuntimeVal::Void),
            Err(EnvError::UndefinedVariable("nope".into()))
        );
        assert_eq!(env.borrow().get("nope"), Err(EnvError::UndefinedVariable("nope".into())));
    }

    #[test]
    fn distance_access_does_not_search() {
        let grand_parent = Environment::new(None);
        grand_parent.borrow_mut().define("a", RuntimeVal::Number(1));
        let parent = Environment::new_child(&grand_parent);
        parent.borrow_mut().define("a", RuntimeVal::Number(2));
        let child = Environment::new_child(&parent);

        assert_eq!(child.borrow().get_at(2, "a"), Ok(RuntimeVal::Number(1)));
        assert_eq!(child.borrow().get_at(1, "a"), Ok(RuntimeVal::Number(2)));
        // Nothing is declared at distance 0, there is no fallback
        assert!(child.borrow().get_at(0, "a").is_err());

        child.borrow_mut().assign_at(2, "a", RuntimeVal::Number(10)).unwrap();
        assert_eq!(grand_parent.borrow().get("a"), Ok(RuntimeVal::Number(10)));
        assert_eq!(parent.borrow().get("a"), Ok(RuntimeVal::Number(2)));

        assert!(child.borrow_mut().assign_at(5, "a", RuntimeVal::Void).is_err());
    }
}
