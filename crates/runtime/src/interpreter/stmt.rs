use std::collections::HashMap;
use std::rc::Rc;

use frontend::ast::{BinaryOperator, StatementKind, UpdateOperator, Variable};
use tracing::debug;

use super::operators::binary_op;
use super::{Completion, Interpreter, RuntimeError};
use crate::environment::{Env, Environment};
use crate::values::{Class, Function, RuntimeVal};

impl Interpreter {
    pub(super) fn execute(&self, stmt: &StatementKind, env: &Env) -> Result<Completion, RuntimeError> {
        match stmt {
            StatementKind::Expression(expr) => Ok(Completion::Normal(self.evaluate(expr, env)?)),
            StatementKind::VarDeclaration { name, value } => {
                let declaration_value = self.evaluate(value, env)?;
                env.borrow_mut().define(name.as_str(), declaration_value.clone());

                Ok(Completion::Normal(declaration_value))
            }
            StatementKind::VarAssignment { target, value } => {
                let assignment_value = self.evaluate(value, env)?;
                self.assign_variable(target, assignment_value.clone(), env)?;

                Ok(Completion::Normal(assignment_value))
            }
            StatementKind::Update { target, operator } => {
                let current = self.look_up_variable(&target.name, target.id, env)?;
                let operator = match operator {
                    UpdateOperator::Increment => BinaryOperator::Add,
                    UpdateOperator::Decrement => BinaryOperator::Sub,
                };

                let updated = binary_op(operator, current, RuntimeVal::Number(1))?;
                self.assign_variable(target, updated, env)?;

                Ok(Completion::Normal(RuntimeVal::Void))
            }
            StatementKind::SetMember { object, property, value } => {
                let object = self.evaluate(object, env)?;

                let RuntimeVal::Instance { fields, .. } = &object else {
                    return Err(RuntimeError::NotAnInstance(object.type_name().into()));
                };

                let member_value = self.evaluate(value, env)?;
                fields.borrow_mut().insert(property.clone(), member_value);

                Ok(Completion::Normal(RuntimeVal::Void))
            }
            StatementKind::Block(stmts) => {
                let block_env = Environment::new_child(env);
                self.execute_block(stmts, &block_env)
            }
            StatementKind::If { test, consequent, alternate } => {
                if self.evaluate_condition(test, env)? {
                    self.execute(consequent, env)
                } else if let Some(alt) = alternate {
                    self.execute(alt, env)
                } else {
                    Ok(Completion::Normal(RuntimeVal::Void))
                }
            }
            StatementKind::While { test, body } => {
                while self.evaluate_condition(test, env)? {
                    // A return stops the loop and goes on unwinding
                    if let Completion::Return(v) = self.execute(body, env)? {
                        return Ok(Completion::Return(v));
                    }
                }

                Ok(Completion::Normal(RuntimeVal::Void))
            }
            StatementKind::FnDeclaration(decl) => {
                let function = Function::new(decl.clone(), env.clone());
                env.borrow_mut()
                    .define(decl.display_name(), RuntimeVal::Function(Rc::new(function)));

                Ok(Completion::Normal(RuntimeVal::Void))
            }
            StatementKind::Return { value } => {
                let returned = match value {
                    Some(v) => self.evaluate(v, env)?,
                    None => RuntimeVal::Void,
                };

                Ok(Completion::Return(returned))
            }
            StatementKind::ClassDeclaration { name, methods } => {
                // Placeholder so the name exists in the scope the methods capture
                env.borrow_mut().define(name.as_str(), RuntimeVal::Void);

                let methods: HashMap<String, Rc<Function>> = methods
                    .iter()
                    .map(|m| {
                        let method = Function::new(m.clone(), env.clone());
                        (m.display_name().to_string(), Rc::new(method))
                    })
                    .collect();

                debug!(class = name.as_str(), methods = methods.len(), "class declared");

                let class = Class {
                    name: name.clone(),
                    methods,
                };
                env.borrow_mut()
                    .define(name.as_str(), RuntimeVal::Class(Rc::new(class)));

                Ok(Completion::Normal(RuntimeVal::Void))
            }
        }
    }

    // Runs statements directly in env. Blocks give it a fresh child scope,
    // function calls give it the scope holding the parameters
    pub(super) fn execute_block(&self, stmts: &[StatementKind], env: &Env) -> Result<Completion, RuntimeError> {
        for stmt in stmts {
            if let Completion::Return(v) = self.execute(stmt, env)? {
                return Ok(Completion::Return(v));
            }
        }

        Ok(Completion::Normal(RuntimeVal::Void))
    }

    fn assign_variable(&self, target: &Variable, value: RuntimeVal, env: &Env) -> Result<(), RuntimeError> {
        match self.annotations.get(target.id) {
            Some(distance) => env.borrow_mut().assign_at(distance, &target.name, value)?,
            None => self.globals.borrow_mut().assign(&target.name, value)?,
        }

        Ok(())
    }
}
