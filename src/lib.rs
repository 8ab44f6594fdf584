pub mod controllers;
pub mod domain;
pub mod error;
pub mod infrastructure;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
