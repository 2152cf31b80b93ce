//! Behavioural tests for the schema engine.
//!
//! Unit tests live next to the code they cover; these modules drive whole
//! schemas through the public parse API.

#[cfg(test)]
pub mod primitive_tests;








#[cfg(test)]
pub mod registry_tests;
