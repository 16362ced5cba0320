//! Translator from the stack-based VM language to Hack assembly.
//!
//! Lines are classified into [`Command`]s by [`parser`], turned into
//! instructions by [`Translator`], and [`driver`] ties both to files on disk.

pub mod ast;
pub mod driver;
pub mod error;
pub mod parser;
pub mod translator;

pub use ast::{ArithmeticOp, Command, CommandKind, Segment, SourceCommand};
pub use driver::{translate_sources, BootstrapMode, Job};
pub use error::{CommandError, LineError, TranslateError};
pub use translator::{LabelCounters, Translator, TranslatorOptions};
