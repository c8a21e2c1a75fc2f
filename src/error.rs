//! Command-line Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// What the command was doing when it failed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not open `{_0}` storage")]
    Storage(#[error(not(source))] String),
    #[display("could not add input files")]
    Intake,
    #[display("could not rename files")]
    Naming,
    #[display("could not build archive")]
    Archive,
}
