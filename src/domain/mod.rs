//! Domain layer: value types shared by the terminal and the ports its
//! collaborators implement.

pub mod account;
pub mod acquisition;
pub mod pipeline;
pub mod ports;
pub mod receipt;
pub mod transaction;
