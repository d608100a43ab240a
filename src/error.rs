//! The error module for error handling during key generation and signing sessions.

use crate::ciphersuite::CipherSuite;

use crate::utils::{String, Vec};

/// Errors that may happen during a distributed key generation
/// or signing session.
///
/// Every fault that can be attributed to a specific participant carries
/// the offending participant's identifier. The core never retries on its
/// own: retrying, if sensible at all, is the caller's policy.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<C: CipherSuite> {
    /// Serialization error
    SerializationError,
    /// Deserialization error
    DeserializationError,
    /// Point compression error
    CompressionError,
    /// Secret share encryption failure
    EncryptionError,
    /// The identifier of a participant is zero
    IndexIsZero,
    /// The same identifier appears twice in a session, commitment set or message batch
    DuplicateIdentifier(u32),
    /// An identifier does not belong to the session or commitment set
    UnknownIdentifier(u32),
    /// Not all expected participants have been included
    InvalidNumberOfParticipants(usize, u32),
    /// A session requires a nonzero threshold no larger than the party size
    InvalidThresholdParams,
    /// Inconsistent commitment length with the threshold parameter
    InvalidCommitmentLength,
    /// A round-one proof of knowledge failed to verify
    ProofInvalid(u32),
    /// A decrypted secret share is inconsistent with the sender's commitments
    ShareInvalid(u32),
    /// An encrypted secret share could not be authenticated and decrypted
    DecryptFailed(u32),
    /// The private nonce pair for a published commitment is gone from the store
    NonceMissing(<C as CipherSuite>::G),
    /// The signer's own entry is absent from the commitment set
    UnknownCommitment(u32),
    /// The commitment set is degenerate: empty, or its aggregate nonce is the identity
    BadCommitments,
    /// Partial signatures disagree on the aggregate nonce commitment
    InconsistentAggregate,
    /// A specific partial signature failed verification
    PartialInvalid(u32),
    /// The aggregator is missing partial signatures from these signers
    MissingPartialSignatures(Vec<u32>),
    /// No key package is stored under the requested session identifier
    MissingKeyPackage,
    /// The threshold signature is not correct
    InvalidSignature,
    /// Custom error
    Custom(String),
}

impl<C: CipherSuite> core::fmt::Display for Error<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            Error::SerializationError => write!(f, "An error happened while serializing."),
            Error::DeserializationError => write!(f, "An error happened while deserializing."),
            Error::CompressionError => write!(f, "An error happened while compressing a point."),
            Error::EncryptionError => write!(f, "Could not encrypt secret share."),
            Error::IndexIsZero => write!(f, "The identifier of a participant cannot be 0."),
            Error::DuplicateIdentifier(index) => {
                write!(f, "The identifier {index} appears more than once.")
            }
            Error::UnknownIdentifier(index) => {
                write!(f, "The identifier {index} does not belong to this session.")
            }
            Error::InvalidNumberOfParticipants(actual, expected) => write!(
                f,
                "The number of participants {actual} does not match the session party size {expected}."
            ),
            Error::InvalidThresholdParams => write!(f, "Invalid threshold parameters."),
            Error::InvalidCommitmentLength => write!(
                f,
                "The length of this commitment does not correspond to the threshold parameter."
            ),
            Error::ProofInvalid(index) => write!(
                f,
                "The proof of knowledge of participant {index} is not correct."
            ),
            Error::ShareInvalid(index) => write!(
                f,
                "The secret share sent by participant {index} is not consistent with their commitments."
            ),
            Error::DecryptFailed(index) => write!(
                f,
                "Could not decrypt the encrypted share sent by participant {index}."
            ),
            Error::NonceMissing(commitment) => write!(
                f,
                "No private nonce pair is stored for the commitment handle {commitment:?}."
            ),
            Error::UnknownCommitment(index) => write!(
                f,
                "The commitment set contains no entry for signer {index}."
            ),
            Error::BadCommitments => write!(f, "The commitment set is degenerate."),
            Error::InconsistentAggregate => write!(
                f,
                "The collected partial signatures disagree on the aggregate nonce commitment."
            ),
            Error::PartialInvalid(index) => write!(
                f,
                "The partial signature of signer {index} is invalid."
            ),
            Error::MissingPartialSignatures(indices) => write!(
                f,
                "Partial signatures are missing from these signers: {indices:?}."
            ),
            Error::MissingKeyPackage => {
                write!(f, "No key package is stored under this session identifier.")
            }
            Error::InvalidSignature => write!(f, "The threshold signature is not correct."),
            Error::Custom(string) => write!(f, "{string:?}"),
        }
    }
}

/// Type alias for a Result returning a threshold-protocol error on failure.
pub type FrostResult<C, T> = Result<T, Error<C>>;
