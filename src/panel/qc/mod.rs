pub mod cell;
pub mod config;
pub mod dummy;
pub mod engine;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod table;

pub use error::{QcError, Result};
