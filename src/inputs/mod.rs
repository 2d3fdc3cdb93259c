// src/inputs/mod.rs
pub mod discovery;
pub mod models;
pub mod pdf;
pub mod spreadsheet;

pub use discovery::discover_inputs;
pub use models::{CellValue, InputFile, InputKind, Table};
