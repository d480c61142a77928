//! The tree-walking evaluator.
//!
//! Statements execute for their side effects and report a [`Flow`];
//! expressions return a [`Value`]. The evaluator owns the current
//! environment pointer and swaps it on block entry, restoring the saved
//! one on every exit path.

use std::io::{self, Write};
use std::rc::Rc;

use idzey_syntax::ast::{BinaryOp, Block, Expr, Literal, Stmt, UnaryOp};
use idzey_syntax::error::{error, Error, Result};

use crate::env::{EnvRef, Environment};
use crate::flow::Flow;
use crate::value::{Function, NativeCallback, Value};

/// How a function call chains its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// Call environments enclose the environment captured at the
    /// function's declaration site.
    Lexical,
    /// Call environments enclose the caller's current environment, so
    /// free variables resolve against the call site.
    Dynamic,
}

pub struct Interpreter {
    globals: EnvRef,
    env: EnvRef,
    out: Box<dyn Write>,
    scope_mode: ScopeMode,
    strict_division: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter writing program output to stdout.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// An interpreter writing program output to the given sink.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        let globals = Environment::global();
        let env = Rc::clone(&globals);
        Self {
            globals,
            env,
            out,
            scope_mode: ScopeMode::Lexical,
            strict_division: false,
        }
    }

    pub fn set_scope_mode(&mut self, mode: ScopeMode) {
        self.scope_mode = mode;
    }

    /// When enabled, division or modulo by zero raises a runtime error
    /// instead of yielding 0.
    pub fn set_strict_division(&mut self, strict: bool) {
        self.strict_division = strict;
    }

    /// Register a host function under `name` in the global scope.
    pub fn define_native(&mut self, name: &str, callback: Rc<NativeCallback>) {
        self.globals.borrow_mut().define(name, Value::Native(callback));
    }

    /// Execute a whole program. An orphan `return` or `break` surviving to
    /// the top level is reported as a runtime error.
    pub fn interpret(&mut self, program: &Block) -> Result<()> {
        match self.exec_block(program, Rc::clone(&self.globals))? {
            Flow::Normal => Ok(()),
            Flow::Return(_) => error("'return' outside of function"),
            Flow::Break => error("'break' outside of loop"),
        }
    }

    /// Run a block in `env`, restoring the previous environment on every
    /// exit path, signals included.
    fn exec_block(&mut self, block: &Block, env: EnvRef) -> Result<Flow> {
        let previous = Rc::clone(&self.env);
        self.env = env;
        let mut flow = Ok(Flow::Normal);
        for stmt in &block.statements {
            match self.exec_stmt(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    flow = other;
                    break;
                }
            }
        }
        self.env = previous;
        flow
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<Flow> {
        match stmt {
            Stmt::Block(block) => {
                let child = Environment::child(&self.env);
                self.exec_block(block, child)
            }
            Stmt::VarDecl {
                name,
                initializer,
                is_array,
            } => {
                let value = match initializer {
                    Some(expr) => self.eval_expr(expr)?,
                    None if *is_array => Value::Array(Vec::new()),
                    None => Value::Null,
                };
                self.env.borrow_mut().define(name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::FuncDecl { name, params, body } => {
                let function = Function {
                    name: name.clone(),
                    params: params.clone(),
                    // clone the body out of the parser's tree so the value
                    // can outlive it
                    body: Rc::new(body.clone()),
                    closure: Rc::clone(&self.env),
                };
                self.env
                    .borrow_mut()
                    .define(name.clone(), Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }
            Stmt::Loop {
                init,
                condition,
                increment,
                body,
            } => {
                let previous = Rc::clone(&self.env);
                self.env = Environment::child(&previous);
                let result = self.run_loop(init.as_deref(), condition.as_ref(), increment.as_ref(), body);
                self.env = previous;
                result
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(condition)?.is_truthy() {
                    let child = Environment::child(&self.env);
                    self.exec_block(then_branch, child)
                } else if let Some(else_branch) = else_branch {
                    let child = Environment::child(&self.env);
                    self.exec_block(else_branch, child)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::Print { newline, args } => {
                let mut rendered = Vec::with_capacity(args.len());
                for arg in args {
                    rendered.push(self.eval_expr(arg)?.to_string());
                }
                let text = rendered.join(" ");
                let written = if *newline {
                    writeln!(self.out, "{}", text)
                } else {
                    write!(self.out, "{}", text)
                };
                written
                    .and_then(|_| self.out.flush())
                    .map_err(|e| Error::new(format!("Failed to write output: {}", e)))?;
                Ok(Flow::Normal)
            }
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::ExprStmt(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// The loop environment holds the init-declared variable, visible to
    /// the condition and the increment; the body runs as a fresh child of
    /// it on every iteration.
    fn run_loop(
        &mut self,
        init: Option<&Stmt>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &Block,
    ) -> Result<Flow> {
        if let Some(init) = init {
            match init {
                Stmt::VarDecl { .. } | Stmt::ExprStmt(_) => {
                    self.exec_stmt(init)?;
                }
                _ => return error("Invalid loop initializer"),
            }
        }

        loop {
            if let Some(condition) = condition {
                if !self.eval_expr(condition)?.is_truthy() {
                    break;
                }
            }

            let child = Environment::child(&self.env);
            match self.exec_block(body, child)? {
                Flow::Normal => {}
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
            }

            if let Some(increment) = increment {
                self.eval_expr(increment)?;
            }
        }

        Ok(Flow::Normal)
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                // integral literals materialize as Int
                Literal::Number(n) => Value::from_number(*n),
                Literal::Str(s) => Value::Str(s.clone()),
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Null => Value::Null,
            }),
            Expr::Identifier(name) => self.env.borrow().get(name),
            Expr::Unary { op, operand } => {
                let operand = self.eval_expr(operand)?;
                Ok(match op {
                    UnaryOp::Neg => Value::from_number(-operand.as_number()),
                    UnaryOp::Not => Value::Bool(!operand.is_truthy()),
                })
            }
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right),
            Expr::Call { callee, args } => {
                let callee = self.eval_expr(callee)?;
                let mut arguments = Vec::with_capacity(args.len());
                for arg in args {
                    arguments.push(self.eval_expr(arg)?);
                }
                self.call_value(callee, arguments)
            }
            Expr::Array(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.eval_expr(element)?);
                }
                Ok(Value::Array(items))
            }
            Expr::Index { array, index } => {
                let array = self.eval_expr(array)?;
                let index = self.eval_expr(index)?.as_number() as i64;
                Ok(array.get_element(index))
            }
            Expr::Property { object, name } => {
                let object = self.eval_expr(object)?;
                Ok(object.get_property(name))
            }
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Result<Value> {
        match op {
            BinaryOp::Assign => self.eval_assignment(left, right),
            BinaryOp::And => {
                let lhs = self.eval_expr(left)?;
                if !lhs.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let rhs = self.eval_expr(right)?;
                Ok(Value::Bool(rhs.is_truthy()))
            }
            BinaryOp::Or => {
                let lhs = self.eval_expr(left)?;
                if lhs.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                let rhs = self.eval_expr(right)?;
                Ok(Value::Bool(rhs.is_truthy()))
            }
            BinaryOp::Add => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(lhs.add(&rhs))
            }
            BinaryOp::Sub => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(lhs.sub(&rhs))
            }
            BinaryOp::Mul => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(lhs.mul(&rhs))
            }
            BinaryOp::Div => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                if self.strict_division && rhs.as_number() == 0.0 {
                    return error("Division by zero");
                }
                Ok(lhs.div(&rhs))
            }
            BinaryOp::Mod => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                if self.strict_division && rhs.as_number() == 0.0 {
                    return error("Division by zero");
                }
                Ok(lhs.rem(&rhs))
            }
            BinaryOp::Eq => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(Value::Bool(lhs.loose_eq(&rhs)))
            }
            BinaryOp::Ne => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(Value::Bool(!lhs.loose_eq(&rhs)))
            }
            BinaryOp::Lt => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(Value::Bool(lhs.lt(&rhs)))
            }
            BinaryOp::Le => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(Value::Bool(lhs.le(&rhs)))
            }
            BinaryOp::Gt => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(Value::Bool(lhs.gt(&rhs)))
            }
            BinaryOp::Ge => {
                let (lhs, rhs) = self.eval_pair(left, right)?;
                Ok(Value::Bool(lhs.ge(&rhs)))
            }
        }
    }

    fn eval_pair(&mut self, left: &Expr, right: &Expr) -> Result<(Value, Value)> {
        let lhs = self.eval_expr(left)?;
        let rhs = self.eval_expr(right)?;
        Ok((lhs, rhs))
    }

    /// Assignment targets are checked here, not at parse time: a plain
    /// identifier, or an index whose array expression is an identifier.
    fn eval_assignment(&mut self, target: &Expr, value: &Expr) -> Result<Value> {
        match target {
            Expr::Identifier(name) => {
                let value = self.eval_expr(value)?;
                self.env.borrow_mut().assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Index { array, index } => {
                let name = match array.as_ref() {
                    Expr::Identifier(name) => name.clone(),
                    _ => return error("Cannot assign to an element of a non-variable array"),
                };
                let value = self.eval_expr(value)?;
                let index = self.eval_expr(index)?.as_number() as i64;

                let mut bound = self.env.borrow().get(&name)?;
                bound.set_element(index, value.clone());
                self.env.borrow_mut().assign(&name, bound)?;
                Ok(value)
            }
            _ => error("Invalid assignment target"),
        }
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>) -> Result<Value> {
        match callee {
            Value::Native(callback) => (*callback)(self, &args),
            Value::Function(function) => {
                if args.len() != function.params.len() {
                    return error(format!(
                        "Expected {} arguments but got {}",
                        function.params.len(),
                        args.len()
                    ));
                }

                let parent = match self.scope_mode {
                    ScopeMode::Lexical => Rc::clone(&function.closure),
                    ScopeMode::Dynamic => Rc::clone(&self.env),
                };
                let call_env = Environment::child(&parent);
                for (param, arg) in function.params.iter().zip(args) {
                    call_env.borrow_mut().define(param.clone(), arg);
                }

                match self.exec_block(&function.body, call_env)? {
                    Flow::Normal => Ok(Value::Null),
                    Flow::Return(value) => Ok(value),
                    Flow::Break => error("'break' outside of loop"),
                }
            }
            _ => error("Can only call functions"),
        }
    }
}
