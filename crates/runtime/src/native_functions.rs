use std::cell::RefCell;
use std::io::Write;
use thiserror::Error;

use super::values::RuntimeVal;

#[derive(Debug, PartialEq, Error)]
pub enum NativeFnError {
    #[error("Function {0}: can't write output: {1}")]
    Output(String, String),
}

// Display the values on one line, separated by a space. Can accept any
// number of parameters
pub fn native_print(out: &RefCell<dyn Write>, args: &[RuntimeVal]) -> Result<RuntimeVal, NativeFnError> {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<String>>()
        .join(" ");

    writeln!(out.borrow_mut(), "{}", line)
        .map_err(|e| NativeFnError::Output("print".into(), e.to_string()))?;

    Ok(RuntimeVal::Void)
}
