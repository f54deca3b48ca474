use colored::*;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, trace};

use frontend::ast::{ExpressionKind, FunctionDecl, NodeId, Program, StatementKind};
use tools::errors::{CodeErr, ReportCodeErr};

#[derive(Error, Debug, PartialEq)]
pub enum ResolveError {
    #[error("{} variable -{0}- is already declared in this scope", "Error".red().bold())]
    DuplicateDeclaration(String),

    #[error("{} can't read variable -{0}- in its own initializer", "Error".red().bold())]
    SelfReferentialInitializer(String),

    #[error("{} {} outside of a function or a method", "Error".red().bold(), "return".cyan())]
    ReturnOutsideFunction,
}

impl ReportCodeErr for ResolveError {}

// Lexical distance of each resolved variable reference, keyed by node identity.
// A reference with no entry is looked up in the global scope at run time
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Annotations(HashMap<NodeId, usize>);

impl Annotations {
    pub fn get(&self, id: NodeId) -> Option<usize> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn extend(&mut self, other: Annotations) {
        self.0.extend(other.0);
    }

    // Entries ordered by node id, which is source order within a program
    pub fn sorted(&self) -> Vec<(NodeId, usize)> {
        let mut entries: Vec<(NodeId, usize)> = self.0.iter().map(|(id, d)| (*id, *d)).collect();
        entries.sort();
        entries
    }

    fn record(&mut self, id: NodeId, distance: usize) {
        self.0.insert(id, distance);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
    Method,
}

// State of a name in a scope: false once declared, true once its
// initializer has been resolved
type Scope = HashMap<String, bool>;

pub struct Resolver {
    // The first scope is the top level one. It only catches duplicates and
    // self references, top level names are never annotated so they stay
    // late bound globals
    scopes: Vec<Scope>,
    current_function: FunctionKind,
    annotations: Annotations,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
            current_function: FunctionKind::None,
            annotations: Annotations::default(),
        }
    }

    pub fn resolve(mut self, program: &Program) -> Result<Annotations, ResolveError> {
        self.resolve_nodes(program).map_err(|(e, _)| e)
    }

    // Same as resolve, with the line of the faulty top level statement
    pub fn resolve_program(mut self, program: &Program) -> Result<Annotations, CodeErr> {
        self.resolve_nodes(program).map_err(|(e, line)| e.to_glob_err(line))
    }

    fn resolve_nodes(&mut self, program: &Program) -> Result<Annotations, (ResolveError, u64)> {
        for node in &program.nodes {
            self.resolve_stmt(&node.stmt).map_err(|e| (e, node.line))?;
        }

        debug!(count = self.annotations.len(), "resolution done");
        Ok(std::mem::take(&mut self.annotations))
    }

    fn resolve_stmt(&mut self, stmt: &StatementKind) -> Result<(), ResolveError> {
        match stmt {
            StatementKind::Expression(expr) => self.resolve_expr(expr),
            StatementKind::VarDeclaration { name, value } => {
                self.declare(name)?;
                self.resolve_expr(value)?;
                self.define(name);
                Ok(())
            }
            StatementKind::VarAssignment { target, value } => {
                self.resolve_expr(value)?;
                self.resolve_local(target.id, &target.name);
                Ok(())
            }
            StatementKind::Update { target, .. } => {
                self.resolve_local(target.id, &target.name);
                Ok(())
            }
            StatementKind::SetMember { object, value, .. } => {
                self.resolve_expr(object)?;
                self.resolve_expr(value)
            }
            StatementKind::Block(stmts) => {
                self.begin_scope();
                let res = self.resolve_stmts(stmts);
                self.end_scope();
                res
            }
            StatementKind::If { test, consequent, alternate } => {
                self.resolve_expr(test)?;
                self.resolve_stmt(consequent)?;

                if let Some(alt) = alternate {
                    self.resolve_stmt(alt)?;
                }

                Ok(())
            }
            StatementKind::While { test, body } => {
                self.resolve_expr(test)?;
                self.resolve_stmt(body)
            }
            StatementKind::FnDeclaration(decl) => {
                // Declared and defined before the body so the function can call itself
                let name = decl.display_name();
                self.declare(name)?;
                self.define(name);

                self.resolve_function(decl, FunctionKind::Function)
            }
            StatementKind::Return { value } => {
                if self.current_function == FunctionKind::None {
                    return Err(ResolveError::ReturnOutsideFunction);
                }

                match value {
                    Some(v) => self.resolve_expr(v),
                    None => Ok(()),
                }
            }
            StatementKind::ClassDeclaration { name, methods } => {
                self.declare(name)?;
                self.define(name);

                // Matches the environment binding 'this' between the class
                // scope and each method call
                self.begin_scope();
                self.define("this");

                let res = methods
                    .iter()
                    .try_for_each(|m| self.resolve_function(m, FunctionKind::Method));

                self.end_scope();
                res
            }
        }
    }

    fn resolve_stmts(&mut self, stmts: &[StatementKind]) -> Result<(), ResolveError> {
        stmts.iter().try_for_each(|s| self.resolve_stmt(s))
    }

    fn resolve_expr(&mut self, expr: &ExpressionKind) -> Result<(), ResolveError> {
        match expr {
            ExpressionKind::NumberLiteral { .. }
            | ExpressionKind::StringLiteral { .. }
            | ExpressionKind::BooleanLiteral { .. } => Ok(()),
            ExpressionKind::Identifier { symbol, id } => {
                // Declared but not defined in the current scope means we
                // are inside its own initializer
                if self.innermost().get(symbol) == Some(&false) {
                    return Err(ResolveError::SelfReferentialInitializer(symbol.clone()));
                }

                self.resolve_local(*id, symbol);
                Ok(())
            }
            ExpressionKind::This { id } => {
                self.resolve_local(*id, "this");
                Ok(())
            }
            ExpressionKind::BinaryOp { left, right, .. }
            | ExpressionKind::Logical { left, right, .. } => {
                self.resolve_expr(left)?;
                self.resolve_expr(right)
            }
            ExpressionKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExpressionKind::MemberCall { member, .. } => self.resolve_expr(member),
            ExpressionKind::FunctionCall { caller, args } => {
                self.resolve_expr(caller)?;
                args.iter().try_for_each(|a| self.resolve_expr(a))
            }
            ExpressionKind::Lambda(decl) => self.resolve_function(decl, FunctionKind::Function),
        }
    }

    // Parameters and body share one scope, the body is not a block of its own
    fn resolve_function(&mut self, decl: &FunctionDecl, kind: FunctionKind) -> Result<(), ResolveError> {
        trace!(function = decl.display_name(), ?kind, "resolving function");

        let enclosing = self.current_function;
        self.current_function = kind;
        self.begin_scope();

        let res = self.resolve_params_and_body(decl);

        self.end_scope();
        self.current_function = enclosing;
        res
    }

    fn resolve_params_and_body(&mut self, decl: &FunctionDecl) -> Result<(), ResolveError> {
        for param in &decl.params {
            self.declare(&param.name)?;
            self.define(&param.name);
        }

        self.resolve_stmts(&decl.body)
    }

    fn resolve_local(&mut self, id: NodeId, name: &str) {
        let depth = self.scopes.len();

        // The top level scope (index 0) is skipped on purpose
        for (idx, scope) in self.scopes.iter().enumerate().skip(1).rev() {
            if scope.contains_key(name) {
                let distance = depth - 1 - idx;
                trace!(name, %id, distance, "resolved local");
                self.annotations.record(id, distance);
                return;
            }
        }
    }

    fn declare(&mut self, name: &str) -> Result<(), ResolveError> {
        let scope = self.innermost_mut();

        if scope.contains_key(name) {
            return Err(ResolveError::DuplicateDeclaration(name.into()));
        }

        scope.insert(name.into(), false);
        Ok(())
    }

    fn define(&mut self, name: &str) {
        self.innermost_mut().insert(name.into(), true);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(Scope::new());
        trace!(depth = self.scopes.len(), "begin scope");
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
        trace!(depth = self.scopes.len(), "end scope");
    }

    fn innermost(&self) -> &Scope {
        // There is always the top level scope
        &self.scopes[self.scopes.len() - 1]
    }

    fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}
