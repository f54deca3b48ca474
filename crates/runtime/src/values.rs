use colored::*;
use std::fmt::{Debug, Display};
use std::rc::Rc;
use std::{cell::RefCell, collections::HashMap};

use frontend::ast::FunctionDecl;

use super::environment::{Env, Environment};
use super::native_functions::NativeFnError;

pub type NativeFn = Rc<dyn Fn(&[RuntimeVal]) -> Result<RuntimeVal, NativeFnError>>;

#[derive(Clone)]
pub enum RuntimeVal {
    Void,
    Number(i64),
    String(String),
    Bool(bool),
    Function(Rc<Function>),
    NativeFunction {
        name: &'static str,
        func: NativeFn,
    },
    Class(Rc<Class>),
    // Fields are Rc RefCell so every copy of the instance (variables, this,
    // arguments) sees and modifies the same members
    Instance {
        class: Rc<Class>,
        fields: Rc<RefCell<HashMap<String, RuntimeVal>>>,
    },
}

// User function with the scope it was created in. The closure is never
// re-bound, binding a method builds a new Function instead
pub struct Function {
    pub decl: Rc<FunctionDecl>,
    pub closure: Env,
}

impl Function {
    pub fn new(decl: Rc<FunctionDecl>, closure: Env) -> Self {
        Self { decl, closure }
    }

    pub fn name(&self) -> &str {
        self.decl.display_name()
    }

    pub fn arity(&self) -> usize {
        self.decl.params.len()
    }

    // Same body, with a scope in between the closure and the call scope
    // where 'this' is the instance
    pub fn bind(&self, instance: RuntimeVal) -> Rc<Function> {
        let env = Environment::new_child(&self.closure);
        env.borrow_mut().define("this", instance);

        Rc::new(Function {
            decl: self.decl.clone(),
            closure: env,
        })
    }
}

pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Rc<Function>>,
}

impl Class {
    pub fn find_method(&self, name: &str) -> Option<Rc<Function>> {
        self.methods.get(name).cloned()
    }
}

impl RuntimeVal {
    pub fn new_instance(class: Rc<Class>) -> Self {
        RuntimeVal::Instance {
            class,
            fields: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    // Name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            RuntimeVal::Void => "void",
            RuntimeVal::Number(_) => "number",
            RuntimeVal::String(_) => "string",
            RuntimeVal::Bool(_) => "bool",
            RuntimeVal::Function(_) | RuntimeVal::NativeFunction { .. } => "function",
            RuntimeVal::Class(_) => "class",
            RuntimeVal::Instance { .. } => "instance",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, RuntimeVal::Void)
    }

    // Coloured form echoed by the REPL
    pub fn repl_repr(&self) -> String {
        match self {
            RuntimeVal::Number(_) | RuntimeVal::Bool(_) => self.to_string().yellow().to_string(),
            RuntimeVal::String(s) => format!("\"{}\"", s).green().to_string(),
            RuntimeVal::Void => self.to_string().dimmed().to_string(),
            _ => self.to_string().blue().to_string(),
        }
    }
}

impl Display for RuntimeVal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeVal::Void => write!(f, "void"),
            RuntimeVal::Number(nb) => write!(f, "{}", nb),
            RuntimeVal::String(s) => write!(f, "{}", s),
            RuntimeVal::Bool(b) => write!(f, "{}", b),
            RuntimeVal::Function(func) => write!(f, "<function {}>", func.name()),
            RuntimeVal::NativeFunction { name, .. } => write!(f, "<native function {}>", name),
            RuntimeVal::Class(class) => write!(f, "<class {}>", class.name),
            RuntimeVal::Instance { class, .. } => write!(f, "<instance of {}>", class.name),
        }
    }
}

// Cannot derive Debug since closures and environments are not Debug
impl Debug for RuntimeVal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RuntimeVal::String(s) => write!(f, "String({:?})", s),
            RuntimeVal::Number(nb) => write!(f, "Number({})", nb),
            RuntimeVal::Bool(b) => write!(f, "Bool({})", b),
            RuntimeVal::Instance { class, fields } => {
                write!(f, "Instance of {} {:?}", class.name, fields.borrow())
            }
            _ => write!(f, "{}", self),
        }
    }
}

// Primitives compare by value, everything holding state compares by identity
impl PartialEq for RuntimeVal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (RuntimeVal::Void, RuntimeVal::Void) => true,
            (RuntimeVal::Number(a), RuntimeVal::Number(b)) => a == b,
            (RuntimeVal::String(a), RuntimeVal::String(b)) => a == b,
            (RuntimeVal::Bool(a), RuntimeVal::Bool(b)) => a == b,
            (RuntimeVal::Function(a), RuntimeVal::Function(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::NativeFunction { func: a, .. }, RuntimeVal::NativeFunction { func: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            (RuntimeVal::Class(a), RuntimeVal::Class(b)) => Rc::ptr_eq(a, b),
            (RuntimeVal::Instance { fields: a, .. }, RuntimeVal::Instance { fields: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}
