//! The crate contains threshold signature primitives for EdDSA (ed25519) and ECDSA (secp256k1)
//! built on Shamir secret sharing over the scalar field of each curve.
//!
//! The crate comprises
//!  * arithmetic over the two scalar fields and polynomials over them
//!  * `t`-of-`n` secret sharing with Feldman commitments, share refresh and threshold changes
//!  * threshold signing rounds whose combined signatures pass the standard single-party verifiers
//!  * ElGamal-style encryption for handing shares to their holders
//!
//! Field and polynomial arithmetic is implemented by [`algorithms`](./algorithms/index.html) module.
//! Sharing is implemented by [`sharing`](./sharing/index.html) module, signing by [`eddsa`](./eddsa/index.html)
//! and [`ecdsa`](./ecdsa/index.html) modules.
//! The rounds are pure functions over explicit messages; moving the messages between parties is left to the caller.
#![allow(
    clippy::must_use_candidate,
    clippy::items_after_statements,
    clippy::module_name_repetitions,
    clippy::unseparated_literal_suffix,
    //
    clippy::missing_errors_doc, // remove at some point
    clippy::used_underscore_binding // if turned on, seems to generate a lot of false positive
)]
pub mod algorithms;
pub mod curve;
pub mod ecdsa;
pub mod eddsa;
pub mod elgamal;
pub mod error;
pub mod protocol;
pub mod sharing;

#[macro_use]
extern crate strum_macros;

pub use algorithms::field::{FieldElement, FiniteField};
pub use curve::{Curve, CurveKind, Ed25519Curve, Secp256k1Curve};
pub use ecdsa::{EcTss, Signature};
pub use eddsa::EdTss;
pub use elgamal::{ElGamal, ExtendedElGamal};
pub use error::TssError;
pub use protocol::{Group, GroupId, Parameters};
pub use sharing::{Commitment, SecretSharing, Share};
