//! Finite field arithmetic, polynomials and SHA-2 wrappers
//!
pub mod field;
pub mod polynomial;
pub mod sha;
