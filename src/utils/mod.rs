//! Utils Module - Helper Functions & Shared Utilities

pub mod constants;
pub mod markup;
pub mod time;

pub use constants::*;
pub use markup::*;
pub use time::*;
