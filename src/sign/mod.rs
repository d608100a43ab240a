//! The signing module: nonce pre-generation, commitment sets, partial
//! signature creation and verification, and public aggregation.

mod artifact;
mod commitments;
mod nonces;
mod signature;

pub use artifact::{ArtifactPublicKey, SignatureArtifact};
pub use commitments::{CommitmentSet, SigningCommitment};
pub use nonces::{create_nonces, NonceCommitment, NonceCommitmentList, SigningNonces};
pub use signature::{
    verify_partial_signature, Aggregator, Finalized, Initial, PartialSignature,
    SignatureAggregator, ThresholdSignature,
};

pub(crate) use signature::compute_challenge;
