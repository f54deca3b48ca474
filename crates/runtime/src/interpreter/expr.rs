use std::rc::Rc;

use frontend::ast::{ExpressionKind, LogicalOperator, NodeId, UnaryOperator};
use tracing::{debug, trace};

use super::operators::binary_op;
use super::{Completion, Interpreter, RuntimeError};
use crate::environment::{Env, Environment};
use crate::values::{Class, Function, RuntimeVal};

impl Interpreter {
    pub(super) fn evaluate(&self, expr: &ExpressionKind, env: &Env) -> Result<RuntimeVal, RuntimeError> {
        match expr {
            ExpressionKind::NumberLiteral { value } => Ok(RuntimeVal::Number(*value)),
            ExpressionKind::StringLiteral { value } => Ok(RuntimeVal::String(value.clone())),
            ExpressionKind::BooleanLiteral { value } => Ok(RuntimeVal::Bool(*value)),
            ExpressionKind::Identifier { symbol, id } => self.look_up_variable(symbol, *id, env),
            ExpressionKind::This { id } => self.look_up_variable("this", *id, env),
            ExpressionKind::BinaryOp { left, right, operator } => {
                let lhs = self.evaluate(left, env)?;
                let rhs = self.evaluate(right, env)?;

                binary_op(*operator, lhs, rhs)
            }
            ExpressionKind::Logical { left, right, operator } => {
                let lhs = self.evaluate_bool_operand(left, *operator, env)?;

                // Short circuit, the right side is not evaluated at all
                match (operator, lhs) {
                    (LogicalOperator::And, false) => Ok(RuntimeVal::Bool(false)),
                    (LogicalOperator::Or, true) => Ok(RuntimeVal::Bool(true)),
                    _ => Ok(RuntimeVal::Bool(self.evaluate_bool_operand(right, *operator, env)?)),
                }
            }
            ExpressionKind::Unary { operator, operand } => {
                let value = self.evaluate(operand, env)?;

                match (operator, &value) {
                    (UnaryOperator::Not, RuntimeVal::Bool(b)) => Ok(RuntimeVal::Bool(!b)),
                    (UnaryOperator::Negate, RuntimeVal::Number(nb)) => Ok(RuntimeVal::Number(nb.wrapping_neg())),
                    _ => Err(RuntimeError::InvalidUnaryOperand(
                        operator.to_string(),
                        value.type_name().into(),
                    )),
                }
            }
            ExpressionKind::MemberCall { member, property } => {
                let object = self.evaluate(member, env)?;
                self.get_property(object, property)
            }
            ExpressionKind::FunctionCall { caller, args } => {
                let callee = self.evaluate(caller, env)?;

                let mut args_value = Vec::with_capacity(args.len());
                for arg in args {
                    args_value.push(self.evaluate(arg, env)?);
                }

                self.call_value(callee, args_value)
            }
            // Arrow functions capture the scope they are evaluated in
            ExpressionKind::Lambda(decl) => Ok(RuntimeVal::Function(Rc::new(Function::new(
                decl.clone(),
                env.clone(),
            )))),
        }
    }

    // Annotated references jump straight to their scope, the others are globals
    pub(super) fn look_up_variable(&self, name: &str, id: NodeId, env: &Env) -> Result<RuntimeVal, RuntimeError> {
        match self.annotations.get(id) {
            Some(distance) => Ok(env.borrow().get_at(distance, name)?),
            None => Ok(self.globals.borrow().get(name)?),
        }
    }

    pub(super) fn evaluate_condition(&self, test: &ExpressionKind, env: &Env) -> Result<bool, RuntimeError> {
        match self.evaluate(test, env)? {
            RuntimeVal::Bool(b) => Ok(b),
            other => Err(RuntimeError::NonBooleanCondition(other.type_name().into())),
        }
    }

    fn evaluate_bool_operand(
        &self,
        operand: &ExpressionKind,
        operator: LogicalOperator,
        env: &Env,
    ) -> Result<bool, RuntimeError> {
        match self.evaluate(operand, env)? {
            RuntimeVal::Bool(b) => Ok(b),
            other => Err(RuntimeError::NonBooleanOperand(
                operator.to_string(),
                other.type_name().into(),
            )),
        }
    }

    // Fields first, then methods bound to the instance
    fn get_property(&self, object: RuntimeVal, property: &str) -> Result<RuntimeVal, RuntimeError> {
        let RuntimeVal::Instance { class, fields } = &object else {
            return Err(RuntimeError::NotAnInstance(object.type_name().into()));
        };

        if let Some(value) = fields.borrow().get(property) {
            return Ok(value.clone());
        }

        match class.find_method(property) {
            Some(method) => Ok(RuntimeVal::Function(method.bind(object.clone()))),
            None => Err(RuntimeError::UndefinedProperty(property.into())),
        }
    }

    fn call_value(&self, callee: RuntimeVal, args: Vec<RuntimeVal>) -> Result<RuntimeVal, RuntimeError> {
        match callee {
            RuntimeVal::Function(function) => self.call_function(&function, args),
            RuntimeVal::NativeFunction { func, .. } => Ok(func(&args)?),
            RuntimeVal::Class(class) => self.instantiate(class, args),
            other => Err(RuntimeError::NotCallable(other.type_name().into())),
        }
    }

    fn call_function(&self, function: &Function, args: Vec<RuntimeVal>) -> Result<RuntimeVal, RuntimeError> {
        if args.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch(
                function.name().into(),
                function.arity(),
                args.len(),
            ));
        }

        trace!(function = function.name(), args = args.len(), "call");

        // Parameters live in the same scope as the body's locals
        let call_env = Environment::new_child(&function.closure);
        {
            let mut scope = call_env.borrow_mut();
            for (param, arg) in function.decl.params.iter().zip(args) {
                scope.define(param.name.as_str(), arg);
            }
        }

        match self.execute_block(&function.decl.body, &call_env)? {
            Completion::Return(value) => Ok(value),
            Completion::Normal(_) => Ok(RuntimeVal::Void),
        }
    }

    // Calling a class creates an instance and runs 'init' on it when there is one
    fn instantiate(&self, class: Rc<Class>, args: Vec<RuntimeVal>) -> Result<RuntimeVal, RuntimeError> {
        debug!(class = class.name.as_str(), "instantiate");
        let instance = RuntimeVal::new_instance(class.clone());

        match class.find_method("init") {
            Some(init) => {
                self.call_function(&init.bind(instance.clone()), args)?;
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::ArityMismatch(class.name.clone(), 0, args.len()));
            }
            None => {}
        }

        Ok(instance)
    }
}
