//! Edges of the terminal: keypad input and batch CSV files.

pub mod csv;
pub mod keypad;
