//! Type definitions

pub mod address;
pub mod route;
pub mod vehicle;

pub use address::*;
pub use route::*;
pub use vehicle::*;
