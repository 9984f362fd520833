//! Data records evaluated by compiled rules

mod data;
mod value;

pub use data::*;
pub use value::*;
