//! The signature module defining a signing session, from individual partial
//! signature creation to their public aggregation.

use crate::ciphersuite::CipherSuite;

use ark_ec::{CurveGroup, Group, VariableBaseMSM};
use ark_ff::Field;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::ops::Mul;

use crate::error::{Error, FrostResult};
use crate::keys::{GroupVerifyingKey, SecretKeyShare};
use crate::serialization::{impl_serialization_traits, serialize_to};
use crate::services::DataManager;
use crate::sign::commitments::CommitmentSet;
use crate::utils::{calculate_lagrange_coefficients, BTreeMap, Box, Scalar, Vec};

/// A partially-constructed threshold signature, made by one signer during a
/// signing event.
///
/// Beyond the response scalar `z`, a partial carries the signer's public
/// verifying share and its view of the aggregate nonce commitment, so that
/// it is verifiable in isolation and aggregate-nonce disagreement is
/// attributable.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PartialSignature<C: CipherSuite> {
    /// The identifier of the signer.
    pub index: u32,
    /// The response scalar `z = d + e * rho + lambda * share * c`.
    pub z: Scalar<C>,
    /// The signer's public verifying share `Y_i`.
    pub public_share: C::G,
    /// The signer's view of the aggregate nonce commitment `R`.
    pub group_commitment: C::G,
}

impl_serialization_traits!(PartialSignature<CipherSuite>);

/// A complete, aggregated threshold signature.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ThresholdSignature<C: CipherSuite> {
    pub(crate) group_commitment: C::G,
    pub(crate) z: Scalar<C>,
}

impl_serialization_traits!(ThresholdSignature<CipherSuite>);

impl<C: CipherSuite> ThresholdSignature<C> {
    /// The aggregate nonce commitment `R` of this signature.
    pub fn group_commitment(&self) -> &C::G {
        &self.group_commitment
    }

    /// The response scalar `z` of this signature.
    pub fn z(&self) -> &Scalar<C> {
        &self.z
    }

    /// Verify this [`ThresholdSignature`] over a pre-hashed message, by
    /// checking `z * G == R + c * Y`.
    ///
    /// Stateless: no context from the key generation session is required
    /// beyond the group key.
    pub fn verify(
        &self,
        group_key: &GroupVerifyingKey<C>,
        message_hash: &[u8],
    ) -> FrostResult<C, ()> {
        let challenge = compute_challenge::<C>(&self.group_commitment, group_key, message_hash)?;

        let retrieved_commitment: C::G = <C as CipherSuite>::G::msm(
            &[C::G::generator().into(), (-group_key.key).into()],
            &[self.z, challenge],
        )
        .map_err(|_| Error::InvalidSignature)?;

        if self.group_commitment == retrieved_commitment {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

/// The Schnorr challenge `c = H("challenge", R, Y, m)` of a signing event.
pub(crate) fn compute_challenge<C: CipherSuite>(
    group_commitment: &C::G,
    group_key: &GroupVerifyingKey<C>,
    message_hash: &[u8],
) -> FrostResult<C, Scalar<C>> {
    let mut challenge_input = Vec::new();
    serialize_to::<C, _>(group_commitment, &mut challenge_input)?;
    serialize_to::<C, _>(&group_key.key, &mut challenge_input)?;
    challenge_input.extend_from_slice(message_hash);

    C::h4(&challenge_input)
}

impl<C: CipherSuite> SecretKeyShare<C> {
    /// Compute this signer's [`PartialSignature`] contribution to a
    /// threshold signature on `message`.
    ///
    /// The private nonce pair is retrieved from the `store` by the hiding
    /// commitment found in the signer's own entry of `commitments`, and is
    /// consumed by the retrieval: a nonce pair is spent by a signing
    /// attempt whether or not that attempt produces a signature.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownCommitment`] if the signer has no entry in `commitments`,
    /// * [`Error::NonceMissing`] if the store holds no pair for the entry's handle,
    /// * [`Error::BadCommitments`] if the aggregate nonce commitment degenerates.
    pub fn sign<D: DataManager<C>>(
        &self,
        message: &[u8],
        group_key: &GroupVerifyingKey<C>,
        commitments: &CommitmentSet<C>,
        store: &D,
    ) -> FrostResult<C, PartialSignature<C>> {
        let my_entry = commitments
            .get(self.index)
            .ok_or(Error::UnknownCommitment(self.index))?;

        let nonces = store.take_nonce(self.index, &my_entry.hiding)?;

        let message_hash = C::h5(message)?;
        let binding_factors = commitments.binding_factors(message_hash.as_ref())?;
        let my_factor = binding_factors
            .get(&self.index)
            .ok_or(Error::UnknownCommitment(self.index))?;

        let group_commitment = commitments.group_commitment(&binding_factors)?;
        let challenge = compute_challenge::<C>(&group_commitment, group_key, message_hash.as_ref())?;
        let lambda = calculate_lagrange_coefficients::<C>(self.index, &commitments.indices())?;

        let z = nonces.hiding + nonces.binding * my_factor + lambda * self.key * challenge;

        Ok(PartialSignature {
            index: self.index,
            z,
            public_share: C::G::generator().mul(self.key),
            group_commitment,
        })
    }
}

/// Verify a single [`PartialSignature`] in isolation, by checking
/// `z * G == (D + rho * E) + lambda * c * Y_i` against the signing context.
pub fn verify_partial_signature<C: CipherSuite>(
    partial: &PartialSignature<C>,
    commitments: &CommitmentSet<C>,
    message: &[u8],
    group_key: &GroupVerifyingKey<C>,
) -> FrostResult<C, ()> {
    let entry = commitments
        .get(partial.index)
        .ok_or(Error::UnknownCommitment(partial.index))?;

    let message_hash = C::h5(message)?;
    let binding_factors = commitments.binding_factors(message_hash.as_ref())?;
    let factor = binding_factors
        .get(&partial.index)
        .ok_or(Error::UnknownCommitment(partial.index))?;

    let group_commitment = commitments.group_commitment(&binding_factors)?;
    let challenge = compute_challenge::<C>(&group_commitment, group_key, message_hash.as_ref())?;
    let lambda = calculate_lagrange_coefficients::<C>(partial.index, &commitments.indices())?;

    let lhs = C::G::generator().mul(partial.z);
    let rhs =
        entry.hiding + entry.binding.mul(*factor) + partial.public_share.mul(challenge * lambda);

    if lhs.into_affine() == rhs.into_affine() {
        Ok(())
    } else {
        Err(Error::PartialInvalid(partial.index))
    }
}

/// A signature aggregator, in any of various states.
pub trait Aggregator {}

/// The internal state of a signature aggregator.
#[derive(Clone, Debug)]
pub(crate) struct AggregatorState<C: CipherSuite> {
    /// The commitment set of this signing event.
    pub(crate) commitments: CommitmentSet<C>,
    /// The partial signatures collected thus far, keyed by signer.
    pub(crate) partial_signatures: BTreeMap<u32, PartialSignature<C>>,
    /// The group public key of the signing participants.
    pub(crate) group_key: GroupVerifyingKey<C>,
}

/// A signature aggregator is an untrusted party who coalesces the partial
/// signatures of the selected signers into the final [`ThresholdSignature`].
/// The aggregator may itself be one of the signers.
#[derive(Debug)]
pub struct SignatureAggregator<C: CipherSuite, A: Aggregator> {
    /// The aggregator's actual state, shared across types.
    pub(crate) state: Box<AggregatorState<C>>,
    /// The aggregator's additional state.
    pub(crate) aggregator: A,
}

/// The initial state for a [`SignatureAggregator`], which is still
/// collecting partial signatures.
#[derive(Debug)]
pub struct Initial<'sa> {
    /// The message to be signed.
    pub(crate) message: &'sa [u8],
}

impl Aggregator for Initial<'_> {}

/// The finalized state for a [`SignatureAggregator`], holding a complete
/// and well-formed collection of partial signatures.
#[derive(Debug)]
pub struct Finalized<C: CipherSuite> {
    /// The hashed message for signing.
    pub(crate) message_hash: C::HashOutput,
}

impl<C: CipherSuite> Aggregator for Finalized<C> {}

impl<'sa, C: CipherSuite> SignatureAggregator<C, Initial<'sa>> {
    /// Construct a new signature aggregator for one signing event.
    ///
    /// # Inputs
    ///
    /// * The public [`GroupVerifyingKey`] of the signing group,
    /// * The canonical [`CommitmentSet`] broadcast to the selected signers,
    /// * The `message` to be signed, available to signers on request.
    pub fn new(
        group_key: GroupVerifyingKey<C>,
        commitments: CommitmentSet<C>,
        message: &'sa [u8],
    ) -> SignatureAggregator<C, Initial<'sa>> {
        let state = AggregatorState {
            commitments,
            partial_signatures: BTreeMap::new(),
            group_key,
        };

        SignatureAggregator {
            state: Box::new(state),
            aggregator: Initial { message },
        }
    }

    /// Add a [`PartialSignature`] to be included in the aggregation.
    ///
    /// Rejects contributions from signers outside the commitment set, and
    /// second contributions from the same signer.
    pub fn include_partial_signature(
        &mut self,
        partial_signature: PartialSignature<C>,
    ) -> FrostResult<C, ()> {
        if self.state.commitments.get(partial_signature.index).is_none() {
            return Err(Error::UnknownCommitment(partial_signature.index));
        }
        if self
            .state
            .partial_signatures
            .contains_key(&partial_signature.index)
        {
            return Err(Error::DuplicateIdentifier(partial_signature.index));
        }

        self.state
            .partial_signatures
            .insert(partial_signature.index, partial_signature);

        Ok(())
    }

    /// The signers who were expected to sign but have not yet contributed
    /// their partial signature, in ascending order.
    pub fn remaining_signers(&self) -> Vec<u32> {
        self.state
            .commitments
            .indices()
            .into_iter()
            .filter(|index| !self.state.partial_signatures.contains_key(index))
            .collect()
    }

    /// Ensure that this aggregator holds a partial signature from every
    /// member of the commitment set, and freeze the message.
    pub fn finalize(self) -> FrostResult<C, SignatureAggregator<C, Finalized<C>>> {
        let remaining = self.remaining_signers();
        if !remaining.is_empty() {
            return Err(Error::MissingPartialSignatures(remaining));
        }

        let message_hash = C::h5(self.aggregator.message)?;

        Ok(SignatureAggregator {
            state: self.state,
            aggregator: Finalized { message_hash },
        })
    }
}

impl<C: CipherSuite> SignatureAggregator<C, Finalized<C>> {
    /// The pre-hashed message this aggregator is signing.
    pub fn message_hash(&self) -> &[u8] {
        self.aggregator.message_hash.as_ref()
    }

    /// Aggregate the collected partial signatures into a final
    /// [`ThresholdSignature`].
    ///
    /// Every partial is checked before summation: a signer whose view of
    /// the aggregate nonce commitment disagrees fails the aggregation with
    /// [`Error::InconsistentAggregate`], and a signer whose response scalar
    /// does not verify is reported through [`Error::PartialInvalid`].
    /// Recovery (e.g. excluding the offender and re-running) is delegated
    /// to the caller.
    pub fn aggregate(&self) -> FrostResult<C, ThresholdSignature<C>> {
        let message_hash = self.aggregator.message_hash.as_ref();
        let binding_factors = self.state.commitments.binding_factors(message_hash)?;
        let group_commitment = self.state.commitments.group_commitment(&binding_factors)?;
        let challenge =
            compute_challenge::<C>(&group_commitment, &self.state.group_key, message_hash)?;

        let indices = self.state.commitments.indices();

        for partial in self.state.partial_signatures.values() {
            if partial.group_commitment != group_commitment {
                return Err(Error::InconsistentAggregate);
            }
        }

        let mut z = Scalar::<C>::ZERO;
        for entry in self.state.commitments.entries().iter() {
            // Finalization guarantees a partial signature for every entry.
            let partial = self
                .state
                .partial_signatures
                .get(&entry.index)
                .ok_or(Error::UnknownCommitment(entry.index))?;
            let factor = binding_factors
                .get(&entry.index)
                .ok_or(Error::UnknownCommitment(entry.index))?;
            let lambda = calculate_lagrange_coefficients::<C>(entry.index, &indices)?;

            let lhs = C::G::generator().mul(partial.z);
            let rhs = entry.hiding
                + entry.binding.mul(*factor)
                + partial.public_share.mul(challenge * lambda);
            if lhs.into_affine() != rhs.into_affine() {
                return Err(Error::PartialInvalid(entry.index));
            }

            z += partial.z;
        }

        let signature = ThresholdSignature {
            group_commitment,
            z,
        };

        // Individual checks passed, so this cannot fail for an honest
        // aggregator; kept as a final guard against key mismatch.
        signature.verify(&self.state.group_key, message_hash)?;

        Ok(signature)
    }
}
