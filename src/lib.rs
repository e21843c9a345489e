pub mod span;

pub mod error;

mod ident;

#[macro_use]
pub mod token;

pub mod emit;
pub mod output;
pub mod parser;
pub mod print;
pub mod reader;
pub mod registry;
pub mod schema;

pub use error::{Error, ErrorKind, Report};
pub use output::{Options, Output, OutputError, generate};
pub use registry::{Registry, RegistryBuilder};
