//! Data types for the workbook model and the rendered sheet view.

mod cell;
mod drawing;
mod style;
mod workbook;

pub use cell::*;
pub use drawing::*;
pub use style::*;
pub use workbook::*;
