//! Report rendering and the end-to-end compilation driver.

mod compile;
mod render;

pub use compile::{compile_unit, compile_units, render_reports, UnitReport};
pub use render::{append_unit_report, render_unit_report};
