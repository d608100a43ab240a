//! Batch pre-generation of signing nonce pairs and their public commitments.

use crate::ciphersuite::CipherSuite;
use crate::serialization::impl_serialization_traits;
use crate::utils::{Scalar, Vec};

use ark_ec::Group;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::ops::Mul;

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// One private nonce pair `(d, e)`, consumed by exactly one signing attempt
/// and overwritten with zeroes when falling out of scope.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SigningNonces<C: CipherSuite> {
    /// The hiding nonce `d`.
    pub(crate) hiding: Scalar<C>,
    /// The binding nonce `e`.
    pub(crate) binding: Scalar<C>,
}

impl_serialization_traits!(SigningNonces<CipherSuite>);

impl<C: CipherSuite> Zeroize for SigningNonces<C> {
    fn zeroize(&mut self) {
        self.hiding.zeroize();
        self.binding.zeroize();
    }
}

impl<C: CipherSuite> Drop for SigningNonces<C> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<C: CipherSuite> SigningNonces<C> {
    /// Sample a fresh nonce pair, uniformly from `[1, q)^2`.
    pub fn generate(mut rng: impl RngCore + CryptoRng) -> Self {
        Self {
            hiding: crate::utils::random_nonzero_scalar::<C>(&mut rng),
            binding: crate::utils::random_nonzero_scalar::<C>(&mut rng),
        }
    }

    /// The public commitments `(D, E) = (d * G, e * G)` to this nonce pair.
    pub fn commitments(&self) -> NonceCommitment<C> {
        NonceCommitment {
            hiding: C::G::generator().mul(self.hiding),
            binding: C::G::generator().mul(self.binding),
        }
    }
}

/// The public commitments to one nonce pair. The hiding commitment `D`
/// doubles as the storage handle under which the private pair is retrieved
/// and consumed.
#[derive(Clone, Copy, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct NonceCommitment<C: CipherSuite> {
    /// The hiding nonce commitment `D = d * G`.
    pub hiding: C::G,
    /// The binding nonce commitment `E = e * G`.
    pub binding: C::G,
}

impl_serialization_traits!(NonceCommitment<CipherSuite>);

/// A batch of public nonce commitments, published to an aggregator ahead of
/// signing.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct NonceCommitmentList<C: CipherSuite> {
    /// The identifier of the publishing participant.
    pub participant_index: u32,
    /// The published commitment pairs.
    pub commitments: Vec<NonceCommitment<C>>,
}

impl_serialization_traits!(NonceCommitmentList<CipherSuite>);

/// Pre-generate `count` nonce pairs for `participant_index`.
///
/// Returns the public commitment list to publish, aligned with the private
/// pairs. The private pairs MUST be handed to the node's `DataManager`
/// before the commitments are published, so that every published `D` is
/// backed by a retrievable pair.
pub fn create_nonces<C: CipherSuite>(
    participant_index: u32,
    count: usize,
    mut rng: impl RngCore + CryptoRng,
) -> (NonceCommitmentList<C>, Vec<SigningNonces<C>>) {
    let mut nonces: Vec<SigningNonces<C>> = Vec::with_capacity(count);
    for _ in 0..count {
        nonces.push(SigningNonces::generate(&mut rng));
    }

    let mut commitments: Vec<NonceCommitment<C>> = Vec::with_capacity(count);
    for pair in nonces.iter() {
        commitments.push(pair.commitments());
    }

    (
        NonceCommitmentList {
            participant_index,
            commitments,
        },
        nonces,
    )
}
