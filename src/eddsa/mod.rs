//!  Threshold EdDSA over ed25519
//!
//!  The derived key $`a`$ (clamped SHA-512 of the seed) is split into `t`-of-`n` shares. For every
//!  signature a nonce $`r`$ is shared over the same evaluation points and $`R = rG`$ is published;
//!  several signers may deal nonces for one session and sum them, so that nobody learns $`r`$.
//!
//!  Each signer of the quorum publishes
//!
//! ```text
//!     r_i G || s_i,     s_i = r_i + H(R || A || M) a_i
//! ```
//!
//!  and the Lagrange-weighted sum of the partials is a standard ed25519 signature $`(R, s)`$
//!  accepted by any ed25519 verifier.
pub mod messages;
pub mod signature;

pub use messages::{
    KeyDealing, Message, NonceShare, PartialSignature, RandomnessDealing, SessionCommitment,
};
pub use signature::EdTss;

pub use crate::curve::ed25519::SIGNATURE_LENGTH;
