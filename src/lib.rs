//! Slate is a tree-walk interpreter for Lox, the dynamically typed
//! scripting language of Robert Nystrom's [Crafting
//! Interpreters](https://craftinginterpreters.com/). It covers the whole
//! of the book's second part: variables with lexical scope, first-class
//! functions and closures, and classes with single inheritance and
//! `super` dispatch.
//!
//! A program runs through four stages. Each stage reports its own kind of
//! error and any reported error blocks the stages after it.
//!
//! ## Scanning
//! The [`scanner`] turns the source text into a flat list of
//! [tokens](token::Token). Trivial problems like an unexpected character
//! or an unterminated string are reported as a
//! [`ScanError`](error::ScanError); the scanner keeps going after an
//! error so a single run surfaces as many problems as possible.
//!
//! ## Parsing
//! The [`parser`] is a hand-written recursive descent parser that turns
//! the token list into [expressions](expr::Expr) and
//! [statements](stmt::Stmt). On a [`ParseError`](error::ParseError) it
//! synchronizes at the next statement boundary and continues, again so
//! several errors can be reported at once.
//!
//! ## Resolving
//! The [`resolver`] is a static pass over the finished syntax tree. It
//! computes, for every local variable reference, how many scopes the
//! interpreter must walk at runtime to find the variable. This is what
//! makes closures capture variables instead of values, and what keeps a
//! later shadowing declaration from changing what an earlier closure
//! sees. The pass also rejects semantically invalid programs, a
//! [`ResolveError`](error::ResolveError), like returning from top-level
//! code or a class inheriting from itself.
//!
//! ## Interpreting
//! The [`interpreter`] walks the tree and evaluates it directly, carrying
//! a chain of [environments](environment::Environment) that maps names to
//! [objects](object::Object). Errors that only show up when the code
//! actually runs, like calling a number or adding a string to a boolean,
//! are reported as a [`RuntimeError`](error::RuntimeError) and halt the
//! program.

use std::io::Write;
use std::{fs, process};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub mod ast;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The driver. Owns a single interpreter, so definitions persist for the
/// lifetime of a session, and writes program output to the writer it was
/// constructed over.
#[allow(non_camel_case_types)]
pub struct slate<'a> {
    interpreter: interpreter::Interpreter<'a>,
}

impl<'a> slate<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        slate {
            interpreter: interpreter::Interpreter::new(output),
        }
    }

    /// Runs a script from a file. Exits with 65 if the script had a
    /// compile-time error and 70 if it had a runtime error.
    pub fn run_file(&mut self, path: String) {
        let contents = fs::read_to_string(path)
            .expect("Should have been able to read the file");

        self.run(&contents);

        if error::did_runtime_error() {
            process::exit(70);
        }
        if error::did_error() {
            process::exit(65);
        }
    }

    /// Runs an interactive prompt. Definitions persist between lines;
    /// the error flags do not, so one bad line does not poison the next.
    pub fn run_prompt(&mut self) {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(error) => {
                eprintln!("Could not start the prompt: {error}");
                process::exit(74);
            },
        };

        let history = home::home_dir().map(|dir| dir.join(".slate_history"));
        if let Some(history) = &history {
            let _ = editor.load_history(history);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(&line);
                    self.run(&line);
                    error::reset_error();
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(error) => {
                    eprintln!("Could not read the line: {error}");
                    break;
                },
            }
        }

        if let Some(history) = &history {
            let _ = editor.save_history(history);
        }
    }

    /// Runs a piece of source code through all four stages. Each stage
    /// only runs if the previous ones reported no error.
    fn run(&mut self, source: &str) {
        let mut scanner = Scanner::new(source);
        let tokens = scanner.scan_tokens();

        if error::did_error() {
            return;
        }

        let mut parser = Parser::new(tokens);
        let statements = parser.parse();

        if error::did_error() {
            return;
        }

        let mut resolver = Resolver::new(&mut self.interpreter);
        resolver.resolve(&statements);

        if error::did_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
