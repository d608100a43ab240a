//! The keys module for defining all key types held by a participant across
//! key generation and signing sessions.

use core::marker::PhantomData;
use core::ops::{Deref, Mul};

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};
use crate::polynomial::PolynomialCommitment;
use crate::serialization::impl_serialization_traits;
use crate::sign::{compute_challenge, ThresholdSignature};
use crate::utils::{Scalar, Vec};

use ark_ec::{CurveGroup, Group, VariableBaseMSM};
use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// An ephemeral secret key, generated freshly for every key generation
/// session and used only to derive pairwise symmetric keys via ECDH.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct EphemeralSecretKey<C: CipherSuite>(pub(crate) Scalar<C>);

impl_serialization_traits!(EphemeralSecretKey<CipherSuite>);

impl<C: CipherSuite> Zeroize for EphemeralSecretKey<C> {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl<C: CipherSuite> Drop for EphemeralSecretKey<C> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<C: CipherSuite> EphemeralSecretKey<C> {
    /// Sample a fresh ephemeral keypair.
    pub fn generate(mut rng: impl RngCore + CryptoRng) -> (Self, EphemeralPublicKey<C>) {
        let secret = crate::utils::random_nonzero_scalar::<C>(&mut rng);
        let public = EphemeralPublicKey::new(C::G::generator().mul(secret));

        (Self(secret), public)
    }

    /// Derive the corresponding public key.
    pub fn to_public(&self) -> EphemeralPublicKey<C> {
        EphemeralPublicKey::new(C::G::generator().mul(self.0))
    }

    /// The raw ECDH shared point with a peer's ephemeral public key.
    pub(crate) fn diffie_hellman(&self, their_public: &EphemeralPublicKey<C>) -> C::G {
        their_public.key.mul(self.0)
    }
}

/// An ephemeral public key, broadcast during round one of key generation
/// so that peers can derive the pairwise symmetric keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct EphemeralPublicKey<C: CipherSuite> {
    pub(crate) key: C::G,
    _phantom: PhantomData<C>,
}

impl_serialization_traits!(EphemeralPublicKey<CipherSuite>);

impl<C: CipherSuite> EphemeralPublicKey<C> {
    /// Instantiates a new [`EphemeralPublicKey`].
    pub const fn new(key: C::G) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }
}

impl<C: CipherSuite> Deref for EphemeralPublicKey<C> {
    type Target = C::G;

    fn deref(&self) -> &Self::Target {
        &self.key
    }
}

/// A participant's long-lived secret share of the group signing key,
/// produced by a successful key generation session.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SecretKeyShare<C: CipherSuite> {
    /// The participant identifier to which this share belongs.
    pub(crate) index: u32,
    /// The additive share of the group signing key.
    pub(crate) key: Scalar<C>,
}

impl_serialization_traits!(SecretKeyShare<CipherSuite>);

impl<C: CipherSuite> Zeroize for SecretKeyShare<C> {
    fn zeroize(&mut self) {
        self.key.zeroize();
    }
}

impl<C: CipherSuite> Drop for SecretKeyShare<C> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<C: CipherSuite> SecretKeyShare<C> {
    /// The participant identifier to which this share belongs.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Derives the corresponding public verifying share for this key share.
    pub fn to_public(&self) -> VerifyingShare<C> {
        VerifyingShare {
            index: self.index,
            share: C::G::generator().mul(self.key),
        }
    }
}

impl<C: CipherSuite> From<&SecretKeyShare<C>> for VerifyingShare<C> {
    fn from(source: &SecretKeyShare<C>) -> VerifyingShare<C> {
        source.to_public()
    }
}

/// A public verifying share for a participant.
///
/// Any observer of the round-one broadcasts can recompute the verifying
/// share, which is the public half of a [`SecretKeyShare`], of any
/// participant in the session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct VerifyingShare<C: CipherSuite> {
    /// The participant identifier to which this share belongs.
    pub index: u32,
    /// The public verifying share `share_i * G`.
    pub share: C::G,
}

impl_serialization_traits!(VerifyingShare<CipherSuite>);

impl<C: CipherSuite> VerifyingShare<C> {
    /// Compute the verifying share of participant `index` from the
    /// coefficient commitments of every dealer:
    ///
    /// `Y_i = sum_j sum_k (i^k * C_{j,k})`.
    pub fn from_commitments(
        index: u32,
        commitments: &[PolynomialCommitment<C>],
    ) -> FrostResult<C, Self> {
        if commitments.is_empty() {
            return Err(Error::InvalidCommitmentLength);
        }

        let mut share = C::G::zero();
        for commitment in commitments.iter() {
            share += commitment.evaluate(index);
        }

        Ok(Self { index, share })
    }

    /// Check this verifying share against the dealers' coefficient commitments.
    pub fn verify(&self, commitments: &[PolynomialCommitment<C>]) -> FrostResult<C, ()> {
        let expected = Self::from_commitments(self.index, commitments)?;

        if self.share.into_affine() == expected.share.into_affine() {
            Ok(())
        } else {
            Err(Error::ShareInvalid(self.index))
        }
    }
}

/// A group public key, used to verify a signature made by a threshold of
/// the session's participants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct GroupVerifyingKey<C: CipherSuite> {
    pub(crate) key: C::G,
    _phantom: PhantomData<C>,
}

impl_serialization_traits!(GroupVerifyingKey<CipherSuite>);

impl<C: CipherSuite> GroupVerifyingKey<C> {
    /// Instantiates a new [`GroupVerifyingKey`].
    pub const fn new(key: C::G) -> Self {
        Self {
            key,
            _phantom: PhantomData,
        }
    }

    /// The underlying group element of this key.
    pub fn key(&self) -> &C::G {
        &self.key
    }

    /// The group key is the sum of every dealer's commitment to their
    /// zeroth polynomial coefficient: `Y = sum_j C_{j,0}`.
    pub fn from_commitments(commitments: &[PolynomialCommitment<C>]) -> FrostResult<C, Self> {
        if commitments.is_empty() {
            return Err(Error::InvalidCommitmentLength);
        }

        let mut key = C::G::zero();
        for commitment in commitments.iter() {
            key += commitment.coefficient0()?;
        }

        Ok(Self::new(key))
    }

    /// Verifies a [`ThresholdSignature`] over a pre-hashed message.
    pub fn verify_signature(
        &self,
        signature: &ThresholdSignature<C>,
        message_hash: &[u8],
    ) -> FrostResult<C, ()> {
        let challenge = compute_challenge::<C>(&signature.group_commitment, self, message_hash)?;

        let retrieved_commitment: C::G = <C as CipherSuite>::G::msm(
            &[C::G::generator().into(), (-self.key).into()],
            &[signature.z, challenge],
        )
        .map_err(|_| Error::InvalidSignature)?;

        if signature.group_commitment == retrieved_commitment {
            Ok(())
        } else {
            Err(Error::InvalidSignature)
        }
    }
}

/// The long-lived output of a key generation session for one participant,
/// as persisted by a `DataManager` under the session identifier.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct KeyPackage<C: CipherSuite> {
    /// The participant's secret key share.
    pub share: SecretKeyShare<C>,
    /// The group public key.
    pub group_key: GroupVerifyingKey<C>,
    /// The participant's own public verifying share.
    pub verifying_share: VerifyingShare<C>,
}

impl_serialization_traits!(KeyPackage<CipherSuite>);

#[cfg(test)]
mod test {
    use super::*;
    use crate::polynomial::Coefficients;
    use crate::testing::Secp256k1Sha256;
    use crate::utils::Vec;

    use rand::rngs::OsRng;

    #[test]
    fn verifying_share_matches_additive_share() {
        let mut rng = OsRng;

        // Three dealers, threshold two.
        let polynomials: Vec<Coefficients<Secp256k1Sha256>> = (0..3)
            .map(|_| Coefficients::generate(2, None, &mut rng))
            .collect();
        let commitments: Vec<PolynomialCommitment<Secp256k1Sha256>> =
            polynomials.iter().map(Coefficients::commit).collect();

        let index = 2u32;
        let mut share = Scalar::<Secp256k1Sha256>::zero();
        for polynomial in polynomials.iter() {
            share += polynomial.evaluate(index);
        }
        let secret = SecretKeyShare::<Secp256k1Sha256> { index, key: share };

        let recomputed = VerifyingShare::from_commitments(index, &commitments).unwrap();
        assert_eq!(secret.to_public(), recomputed);
        assert!(recomputed.verify(&commitments).is_ok());
    }

    #[test]
    fn empty_commitment_lists_are_rejected() {
        assert_eq!(
            GroupVerifyingKey::<Secp256k1Sha256>::from_commitments(&[]),
            Err(Error::InvalidCommitmentLength)
        );
        assert_eq!(
            VerifyingShare::<Secp256k1Sha256>::from_commitments(1, &[]),
            Err(Error::InvalidCommitmentLength)
        );
    }
}
