use colored::*;
use thiserror::Error;

use crate::environment::EnvError;
use crate::native_functions::NativeFnError;
use tools::errors::ReportCodeErr;

#[derive(Error, Debug, PartialEq)]
pub enum RuntimeError {
    // Variables
    #[error("{} undefined variable: {0}", "Error".red().bold())]
    UndefinedVariable(String),

    // Instances
    #[error("{} undefined property: {0}", "Error".red().bold())]
    UndefinedProperty(String),

    #[error("{} only instances have properties, found: {0}", "Error".red().bold())]
    NotAnInstance(String),

    // Functions
    #[error("{} value of type {0} is not callable", "Error".red().bold())]
    NotCallable(String),

    #[error("{} during '{0}' call: expected {1} arguments but found {2}", "Error".red().bold())]
    ArityMismatch(String, usize, usize),

    #[error("{0}")]
    NativeFunction(#[from] NativeFnError),

    // Operations
    #[error("{} operator {0} can't be applied to {1} and {2}", "Error".red().bold())]
    InvalidOperands(String, String, String),

    #[error("{} operator {0} expects bool operands, found: {1}", "Error".red().bold())]
    NonBooleanOperand(String, String),

    #[error("{} unary operator {0} can't be applied to {1}", "Error".red().bold())]
    InvalidUnaryOperand(String, String),

    #[error("{} division by zero", "Error".red().bold())]
    DivisionByZero,

    // Control flow
    #[error("{} condition must be a bool, found: {0}", "Error".red().bold())]
    NonBooleanCondition(String),
}

impl From<EnvError> for RuntimeError {
    fn from(err: EnvError) -> Self {
        match err {
            EnvError::UndefinedVariable(name) => RuntimeError::UndefinedVariable(name),
        }
    }
}

// Implement global trait for final error
impl ReportCodeErr for RuntimeError {}
