use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use std::mem;
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, Interrupt, RuntimeError};
use crate::expr::{Expr, ExprVisitor};
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::{Stmt, StmtVisitor};
use crate::token::{Token, Type};

type EvalResult = Result<Object, Interrupt>;
type ExecResult = Result<(), Interrupt>;

/// Walks the AST and evaluates each node against a chain of environments.
/// The chain's root holds the global bindings, including the native
/// functions. Program output is written to the writer given at
/// construction, so embedders and tests can capture it.
pub struct Interpreter<'a> {
    pub globals: Rc<RefCell<Environment>>,
    environment: Rc<RefCell<Environment>>,
    locals: HashMap<Token, usize>,
    output: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));

        for native in NativeFunction::get_globals() {
            let name = native.name.lexeme.clone();
            globals.borrow_mut().define(&name, Object::from(native));
        }

        Interpreter {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Executes the statements in order. A runtime error halts the program
    /// and is reported here, at the top level.
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => (),
                Err(Interrupt::Error(error)) => {
                    error.throw();
                    return;
                },
                // The resolver rejects top-level returns.
                Err(Interrupt::Return(_)) => unreachable!("return outside of a function"),
            }
        }
    }

    /// Records the resolution depth of a variable reference. Called by the
    /// resolver; the token's location keeps distinct references distinct.
    pub fn resolve(&mut self, name: &Token, depth: usize) {
        self.locals.insert(name.clone(), depth);
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes the statements with the given environment as the current
    /// one. The previous environment is restored on every exit path, also
    /// when a return or a runtime error unwinds through the block.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = mem::replace(&mut self.environment, environment);
        let result = statements.iter().try_for_each(|statement| self.execute(statement));
        self.environment = previous;
        result
    }

    /// Fetches a variable at its resolved depth, or from the globals if
    /// the resolver left it out of the locals table.
    fn look_up_variable(&self, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(name) {
            Some(distance) => self.environment.borrow()
                .get_at(*distance, &name.lexeme)
                .ok_or_else(|| RuntimeError {
                    token: name.clone(),
                    message: format!("Undefined variable '{}'", name.lexeme),
                }),
            None => self.globals.borrow().get(name),
        }
    }

    /// Checks the arity and performs the call.
    fn call_object(&mut self, callable: &dyn Callable, arguments: Vec<Object>, paren: &Token) -> Result<Object, RuntimeError> {
        if arguments.len() != callable.arity() {
            return Err(RuntimeError {
                token: paren.clone(),
                message: format!("Expected {} arguments but got {}", callable.arity(), arguments.len()),
            });
        }

        callable.call(self, arguments)
    }
}

impl<'a> ExprVisitor<EvalResult> for Interpreter<'a> {
    fn visit_literal_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Literal(literal) = expr else { unreachable!() };

        Ok(Object::from(literal.clone()))
    }

    fn visit_grouping_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Grouping(grouping) = expr else { unreachable!() };

        self.evaluate(&grouping.expr)
    }

    fn visit_unary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Unary(unary) = expr else { unreachable!() };

        let right = self.evaluate(&unary.expr)?;

        let result = match unary.operator.r#type {
            Type::Minus => -right,
            Type::Bang => !right,
            _ => unreachable!(),
        };

        result.ok_or_else(|| Interrupt::from(RuntimeError {
            token: unary.operator.clone(),
            message: "Operand must be a number".to_string(),
        }))
    }

    fn visit_binary_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Binary(binary) = expr else { unreachable!() };

        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;

        match binary.operator.r#type {
            Type::EqualEqual => return Ok(Object::from(left == right)),
            Type::BangEqual => return Ok(Object::from(left != right)),
            _ => (),
        }

        if let Type::Greater | Type::GreaterEqual | Type::Less | Type::LessEqual = binary.operator.r#type {
            let is_number = |object: &Object| matches!(object, Object::Literal(Literal::Number(_)));

            let result = match left.partial_cmp(&right) {
                Some(ordering) => match binary.operator.r#type {
                    Type::Greater => ordering == Ordering::Greater,
                    Type::GreaterEqual => ordering != Ordering::Less,
                    Type::Less => ordering == Ordering::Less,
                    Type::LessEqual => ordering != Ordering::Greater,
                    _ => unreachable!(),
                },
                // NaN compares with nothing, not even itself.
                None if is_number(&left) && is_number(&right) => false,
                None => return Err(Interrupt::from(RuntimeError {
                    token: binary.operator.clone(),
                    message: "Operands must be numbers".to_string(),
                })),
            };

            return Ok(Object::from(result));
        }

        let result = match binary.operator.r#type {
            Type::Plus => left + right,
            Type::Minus => left - right,
            Type::Star => left * right,
            Type::Slash => left / right,
            _ => unreachable!(),
        };

        result.ok_or_else(|| Interrupt::from(RuntimeError {
            token: binary.operator.clone(),
            message: match binary.operator.r#type {
                Type::Plus => "Operands must be two numbers or two strings".to_string(),
                _ => "Operands must be numbers".to_string(),
            },
        }))
    }

    fn visit_logical_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Logical(logical) = expr else { unreachable!() };

        let left = self.evaluate(&logical.left)?;

        // Short-circuits to the operand that decided the result, without
        // coercing it to a boolean.
        match logical.operator.r#type {
            Type::Or if left.as_bool() => Ok(left),
            Type::And if !left.as_bool() => Ok(left),
            _ => self.evaluate(&logical.right),
        }
    }

    fn visit_variable_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Variable(variable) = expr else { unreachable!() };

        Ok(self.look_up_variable(&variable.name)?)
    }

    fn visit_assign_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Assign(assign) = expr else { unreachable!() };

        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(distance) => {
                self.environment.borrow_mut().assign_at(*distance, &assign.name, value.clone());
            },
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            },
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Call(call) = expr else { unreachable!() };

        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let result = match &callee {
            Object::Function(function) => self.call_object(function, arguments, &call.paren),
            Object::NativeFunction(function) => self.call_object(function, arguments, &call.paren),
            Object::Class(class) => self.call_object(class, arguments, &call.paren),
            _ => Err(RuntimeError {
                token: call.paren.clone(),
                message: "Can only call functions and classes".to_string(),
            }),
        };

        Ok(result?)
    }

    fn visit_get_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Get(get) = expr else { unreachable!() };

        let object = self.evaluate(&get.object)?;

        if let Object::Instance(instance) = &object {
            return Ok(instance.borrow().get(&get.name, &object)?);
        }

        Err(Interrupt::from(RuntimeError {
            token: get.name.clone(),
            message: "Only instances have properties".to_string(),
        }))
    }

    fn visit_set_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Set(set) = expr else { unreachable!() };

        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(Interrupt::from(RuntimeError {
                token: set.name.clone(),
                message: "Only instances have fields".to_string(),
            }));
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());

        Ok(value)
    }

    fn visit_this_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::This(this) = expr else { unreachable!() };

        Ok(self.look_up_variable(&this.keyword)?)
    }

    fn visit_super_expr(&mut self, expr: &Expr) -> EvalResult {
        let Expr::Super(super_expr) = expr else { unreachable!() };

        let distance = *self.locals.get(&super_expr.keyword)
            .expect("'super' to be resolved");

        let superclass = self.environment.borrow().get_at(distance, "super")
            .expect("'super' to be defined at the resolved depth");
        let Object::Class(superclass) = superclass else { unreachable!() };

        // The instance is bound one environment closer than the
        // superclass.
        let object = self.environment.borrow().get_at(distance - 1, "this")
            .expect("'this' to be defined below 'super'");

        let method = superclass.borrow().find_method(&super_expr.method.lexeme)
            .ok_or_else(|| RuntimeError {
                token: super_expr.method.clone(),
                message: format!("Undefined property '{}'", super_expr.method.lexeme),
            })?;

        Ok(Object::from(method.bind(object)))
    }
}

impl<'a> StmtVisitor<ExecResult> for Interpreter<'a> {
    fn visit_expression_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Expression(expression) = stmt else { unreachable!() };

        self.evaluate(&expression.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Print(print) = stmt else { unreachable!() };

        let value = self.evaluate(&print.expr)?;
        writeln!(self.output, "{value}").ok();

        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Var(var) = stmt else { unreachable!() };

        let value = match &var.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::from(Literal::Nil),
        };

        self.environment.borrow_mut().define(&var.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Block(block) = stmt else { unreachable!() };

        let environment = Environment::new(Some(Rc::clone(&self.environment)));
        self.execute_block(&block.statements, Rc::new(RefCell::new(environment)))
    }

    fn visit_if_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::If(if_stmt) = stmt else { unreachable!() };

        if self.evaluate(&if_stmt.condition)?.as_bool() {
            self.execute(&if_stmt.then_branch)
        } else if let Some(else_branch) = &if_stmt.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::While(while_stmt) = stmt else { unreachable!() };

        while self.evaluate(&while_stmt.condition)?.as_bool() {
            self.execute(&while_stmt.body)?;
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Function(function) = stmt else { unreachable!() };

        let object = Function::new(function, Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&function.name.lexeme, Object::from(object));

        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Return(return_stmt) = stmt else { unreachable!() };

        let value = match &return_stmt.value {
            Some(value) => self.evaluate(value)?,
            None => Object::from(Literal::Nil),
        };

        // Unwinds to the nearest call boundary.
        Err(Interrupt::Return(value))
    }

    fn visit_class_stmt(&mut self, stmt: &Stmt) -> ExecResult {
        let Stmt::Class(class_stmt) = stmt else { unreachable!() };

        let superclass = match &class_stmt.superclass {
            Some(superclass_expr) => {
                let Expr::Variable(variable) = superclass_expr else { unreachable!() };

                match self.evaluate(superclass_expr)? {
                    Object::Class(superclass) => Some(superclass),
                    _ => return Err(Interrupt::from(RuntimeError {
                        token: variable.name.clone(),
                        message: "Superclass must be a class".to_string(),
                    })),
                }
            },
            None => None,
        };

        // Defined first as nil so methods can refer to the class by name.
        self.environment.borrow_mut().define(&class_stmt.name.lexeme, Object::from(Literal::Nil));

        // Methods of a subclass capture an extra environment holding
        // 'super', so super dispatch binds at declaration time.
        if let Some(superclass) = &superclass {
            let mut environment = Environment::new(Some(Rc::clone(&self.environment)));
            environment.define("super", Object::from(Rc::clone(superclass)));
            self.environment = Rc::new(RefCell::new(environment));
        }

        let mut methods = HashMap::new();
        for method in &class_stmt.methods {
            let Stmt::Function(function) = method else { unreachable!() };

            let is_initializer = function.name.lexeme == "init";
            methods.insert(
                function.name.lexeme.clone(),
                Function::new(function, Rc::clone(&self.environment), is_initializer),
            );
        }

        let class = Class::new(class_stmt.name.lexeme.clone(), superclass, methods);

        if class_stmt.superclass.is_some() {
            let enclosing = self.environment.borrow().enclosing.clone()
                .expect("'super' environment to have an enclosing environment");
            self.environment = enclosing;
        }

        self.environment.borrow_mut()
            .assign(&class_stmt.name, Object::from(Rc::new(RefCell::new(class))))?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::expr::{BinaryData, GroupingData, LogicalData, UnaryData};
    use crate::stmt::{PrintData, VarData};
    use crate::token::Location;

    fn token(r#type: Type, lexeme: &str) -> Token {
        Token::new(r#type, lexeme.to_string(), None, Location::new(1, 1))
    }

    fn number(n: f64) -> Expr {
        Expr::Literal(Literal::Number(n))
    }

    #[test]
    fn evaluate_literal() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = number(12.0);
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(12.0));
    }

    #[test]
    fn evaluate_unary_minus() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(number(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(-12.0));
    }

    #[test]
    fn evaluate_unary_minus_on_string() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Minus, "-"),
            expr: Box::new(Expr::Literal(Literal::from("muffin"))),
        });
        assert!(matches!(interpreter.evaluate(&expr), Err(Interrupt::Error(_))));
    }

    #[test]
    fn evaluate_unary_bang() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Unary(UnaryData {
            operator: token(Type::Bang, "!"),
            expr: Box::new(Expr::Literal(Literal::Nil)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(true));
    }

    #[test]
    fn evaluate_binary_arithmetic() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Binary(BinaryData {
            left: Box::new(number(6.0)),
            operator: token(Type::Star, "*"),
            right: Box::new(number(7.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(42.0));
    }

    #[test]
    fn evaluate_string_concatenation() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Binary(BinaryData {
            left: Box::new(Expr::Literal(Literal::from("Hello"))),
            operator: token(Type::Plus, "+"),
            right: Box::new(Expr::Literal(Literal::from("World"))),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from("HelloWorld"));
    }

    #[test]
    fn evaluate_mixed_addition_is_an_error() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Binary(BinaryData {
            left: Box::new(Expr::Literal(Literal::from("Hello"))),
            operator: token(Type::Plus, "+"),
            right: Box::new(number(12.0)),
        });

        let Err(Interrupt::Error(error)) = interpreter.evaluate(&expr) else {
            panic!("expected a runtime error");
        };
        assert_eq!(error.message, "Operands must be two numbers or two strings");
    }

    #[test]
    fn evaluate_comparison_requires_numbers() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Binary(BinaryData {
            left: Box::new(Expr::Literal(Literal::from("a"))),
            operator: token(Type::Less, "<"),
            right: Box::new(Expr::Literal(Literal::from("b"))),
        });
        assert!(matches!(interpreter.evaluate(&expr), Err(Interrupt::Error(_))));
    }

    #[test]
    fn evaluate_division_by_zero() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Binary(BinaryData {
            left: Box::new(number(1.0)),
            operator: token(Type::Slash, "/"),
            right: Box::new(number(0.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(f64::INFINITY));
    }

    #[test]
    fn evaluate_equality_with_nil() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let nil_eq_nil = Expr::Binary(BinaryData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::EqualEqual, "=="),
            right: Box::new(Expr::Literal(Literal::Nil)),
        });
        assert_eq!(interpreter.evaluate(&nil_eq_nil).unwrap(), Object::from(true));

        let nil_eq_zero = Expr::Binary(BinaryData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::EqualEqual, "=="),
            right: Box::new(number(0.0)),
        });
        assert_eq!(interpreter.evaluate(&nil_eq_zero).unwrap(), Object::from(false));
    }

    #[test]
    fn evaluate_logical_returns_deciding_operand() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let or = Expr::Logical(LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::Or, "or"),
            right: Box::new(Expr::Literal(Literal::from("yes"))),
        });
        assert_eq!(interpreter.evaluate(&or).unwrap(), Object::from("yes"));

        let and = Expr::Logical(LogicalData {
            left: Box::new(Expr::Literal(Literal::Nil)),
            operator: token(Type::And, "and"),
            right: Box::new(Expr::Literal(Literal::from("never"))),
        });
        assert_eq!(interpreter.evaluate(&and).unwrap(), Object::from(Literal::Nil));
    }

    #[test]
    fn evaluate_grouping() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);
        let expr = Expr::Grouping(GroupingData {
            expr: Box::new(number(12.0)),
        });
        assert_eq!(interpreter.evaluate(&expr).unwrap(), Object::from(12.0));
    }

    #[test]
    fn execute_var_and_look_up_global() {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new(&mut output);

        let declaration = Stmt::Var(VarData {
            name: token(Type::Identifier, "a"),
            initializer: Some(number(1.0)),
        });
        interpreter.execute(&declaration).unwrap();

        let reference = Expr::Variable(crate::expr::VariableData {
            name: token(Type::Identifier, "a"),
        });
        assert_eq!(interpreter.evaluate(&reference).unwrap(), Object::from(1.0));
    }

    #[test]
    fn print_writes_stringification() {
        let mut output = Vec::new();
        {
            let mut interpreter = Interpreter::new(&mut output);
            let statement = Stmt::Print(PrintData { expr: number(1.0) });
            interpreter.execute(&statement).unwrap();
        }
        assert_eq!(std::str::from_utf8(&output).unwrap(), "1\n");
    }

    #[test]
    fn clock_is_predefined() {
        let mut output = Vec::new();
        let interpreter = Interpreter::new(&mut output);
        let clock = interpreter.globals.borrow().get(&Token::from("clock")).unwrap();
        assert_eq!(clock.type_str(), "native function");
    }
}
