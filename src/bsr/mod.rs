//! Braille Score Representation (BSR)
//!
//! Built from MSR in pass 3, laid out in lines and pages, and printed as
//! Unicode braille or Braille ASCII in pass 4.

pub mod cells;
pub mod elements;
pub mod layout;
pub mod visitor;

pub use cells::{BrailleCell, ValueClass};
pub use elements::{BsrItem, BsrLine, BsrMeasure, BsrPage, BsrScore, BsrSection};
pub use layout::BsrLayout;
pub use visitor::BsrVisitor;
