//! Tracing setup shared by the fleetwatch binaries

mod tracing;

pub use crate::tracing::{init as init_tracing, init_with_level};
