//! MusicXML element tree (MXSR) and its parser
//!
//! Pass 1 of the pipeline: MusicXML text → [`MxsrElement`] tree, which the
//! MSR passes then browse with an [`MxsrVisitor`].

pub mod elements;
pub mod parser;

pub use elements::{MxsrElement, MxsrElementKind, MxsrVisitor};
pub use parser::parse_mxsr;
