pub mod ast;
pub mod builtins;
pub mod coerce;
pub mod environment;
pub mod error;
pub mod grammar;
pub mod interpreter;
pub mod object;
pub mod parser;
pub mod printer;
pub mod realm;
pub mod scanner;
pub mod token;
pub mod value;

pub use error::{JsError, Result};
pub use interpreter::{run, Interpreter};
pub use parser::parse;
pub use value::Value;
