//! The ciphersuite module to parameterize key generation and signing sessions.

use core::fmt::Debug;

use aead::{Aead, KeyInit};
use zeroize::Zeroize;

use ark_ec::CurveGroup;

use crate::error::FrostResult;
use crate::utils::{Scalar, String};
use digest::{core_api::BlockSizeUser, Digest, DynDigest, FixedOutputReset};

/// A trait defining the prime-order group of operation and cryptographic hash function details
/// of this threshold-signature protocol instantiation.
///
/// ***NOTE***: A [`CipherSuite`]'s `InnerHasher` is assumed to be guaranteeing 128 bits of security.
/// It is the responsibility of developers to instantiate any ciphersuite with a hasher that
/// does have *at least* 128 bits of collision resistance.
pub trait CipherSuite: Copy + Clone + PartialEq + Eq + Debug + Send + Sync + Zeroize {
    /// The prime-order group on which this [`CipherSuite`] operates.
    type G: CurveGroup;

    /// A byte array of a given length for this [`CipherSuite`]'s binary hashers.
    type HashOutput: AsRef<[u8]> + AsMut<[u8]> + Default + Debug;

    /// The underlying hasher used to construct all random oracles of this [`CipherSuite`].
    type InnerHasher: Default + Clone + Digest + DynDigest + FixedOutputReset + BlockSizeUser;

    /// The underlying AEAD used to encrypt and decrypt all pairwise secret shares
    /// exchanged during a distributed key generation session of this [`CipherSuite`].
    type Cipher: Aead + KeyInit + Clone;

    //////////////////////////////////////////////////////////////////////////////////////////////

    // Required methods

    /// A method returning this [`CipherSuite`]'s custom context string, to be used in the
    /// different random oracles invoked throughout the protocol.
    fn context_string() -> String;

    ///////////////////////////////////////////////////////////////////////////////////////////////

    // Provided methods

    /// `h0` hash for this [`CipherSuite`].
    ///
    /// The context string for `h0` is this [`CipherSuite`]'s `context_string()`,
    /// concatenated with "coef0".
    ///
    /// It is used to compute the challenge of the proof of knowledge of a dealer's
    /// zeroth polynomial coefficient, broadcast during round one of key generation.
    fn h0(m: &[u8]) -> FrostResult<Self, Scalar<Self>> {
        crate::utils::hash_to_field::<Self>((Self::context_string() + "coef0").as_bytes(), m)
    }

    /// `h1` hash for this [`CipherSuite`].
    ///
    /// The context string for `h1` is this [`CipherSuite`]'s `context_string()`,
    /// concatenated with "epk".
    ///
    /// It is used to compute the challenge of the proof of knowledge of a participant's
    /// ephemeral communication secret key.
    fn h1(m: &[u8]) -> FrostResult<Self, Scalar<Self>> {
        crate::utils::hash_to_field::<Self>((Self::context_string() + "epk").as_bytes(), m)
    }

    /// `h2` hash for this [`CipherSuite`].
    ///
    /// The context string for `h2` is this [`CipherSuite`]'s `context_string()`,
    /// concatenated with "share".
    ///
    /// It is used to compute the challenge of the proof of knowledge of a participant's
    /// long-lived key share, produced at the end of a successful key generation session.
    fn h2(m: &[u8]) -> FrostResult<Self, Scalar<Self>> {
        crate::utils::hash_to_field::<Self>((Self::context_string() + "share").as_bytes(), m)
    }

    /// `h3` hash for this [`CipherSuite`].
    ///
    /// The context string for `h3` is this [`CipherSuite`]'s `context_string()`,
    /// concatenated with "rho".
    ///
    /// It is used to compute the per-signer binding factor during a signing session.
    fn h3(m: &[u8]) -> FrostResult<Self, Scalar<Self>> {
        crate::utils::hash_to_field::<Self>((Self::context_string() + "rho").as_bytes(), m)
    }

    /// `h4` hash for this [`CipherSuite`].
    ///
    /// The context string for `h4` is this [`CipherSuite`]'s `context_string()`,
    /// concatenated with "challenge".
    ///
    /// It is used to compute the Schnorr challenge of a signing session.
    fn h4(m: &[u8]) -> FrostResult<Self, Scalar<Self>> {
        crate::utils::hash_to_field::<Self>((Self::context_string() + "challenge").as_bytes(), m)
    }

    /// `h5` hash for this [`CipherSuite`].
    ///
    /// The context string for `h5` is this [`CipherSuite`]'s `context_string()`,
    /// concatenated with "message".
    ///
    /// It is used to hash the message to sign during a signing session. Signers
    /// should hash the original message with this method before computing their
    /// individual partial signatures.
    fn h5(m: &[u8]) -> FrostResult<Self, Self::HashOutput> {
        crate::utils::hash_to_array::<Self>((Self::context_string() + "message").as_bytes(), m)
    }
}
