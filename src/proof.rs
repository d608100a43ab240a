//! Schnorr proofs of knowledge of a discrete logarithm, bound to a session
//! identifier and a participant identifier to prevent cross-session replay.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::ops::Mul;

use rand::{CryptoRng, RngCore};

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};
use crate::serialization::{encode_id, impl_serialization_traits, serialize_to};
use crate::utils::{Scalar, Vec};

use ark_ec::{CurveGroup, Group};

/// The use sites of a [`SchnorrProof`]. Each context routes the challenge
/// through its own domain-separated oracle, so a proof produced for one site
/// can never verify at another.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProofContext {
    /// Knowledge of the zeroth polynomial coefficient, under its public commitment.
    Coefficient0,
    /// Knowledge of the ephemeral communication secret key, under the ephemeral public key.
    EphemeralKey,
    /// Knowledge of the long-lived key share, under the participant's verifying share.
    KeyShare,
}

impl ProofContext {
    fn challenge<C: CipherSuite>(self, transcript: &[u8]) -> FrostResult<C, Scalar<C>> {
        match self {
            ProofContext::Coefficient0 => C::h0(transcript),
            ProofContext::EphemeralKey => C::h1(transcript),
            ProofContext::KeyShare => C::h2(transcript),
        }
    }
}

/// A proof of knowledge of a secret scalar, created by making a Schnorr
/// signature with the secret scalar as signing key.
///
/// The prover samples `k` uniformly from `[1, q)`, commits to the nonce point
/// `R = k * G`, derives the challenge `c` from the context transcript
/// `(id, dkg_id, pk, R)`, and responds with `s = k + c * sk`. The proof is
/// the pair `(R, s)`, serialized on the wire as `{nonce, signature}`.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SchnorrProof<C: CipherSuite> {
    /// The public nonce commitment `R` of the proof.
    pub nonce: C::G,
    /// The response scalar `s` of the proof.
    pub signature: Scalar<C>,
}

impl_serialization_traits!(SchnorrProof<CipherSuite>);

impl<C: CipherSuite> SchnorrProof<C> {
    fn transcript(
        index: u32,
        dkg_id: &str,
        public_key: &C::G,
        nonce: &C::G,
    ) -> FrostResult<C, Vec<u8>> {
        let mut message = encode_id(index).to_vec();
        message.extend_from_slice(&(dkg_id.len() as u32).to_be_bytes());
        message.extend_from_slice(dkg_id.as_bytes());
        serialize_to::<C, _>(public_key, &mut message)?;
        serialize_to::<C, _>(nonce, &mut message)?;

        Ok(message)
    }

    /// Prove knowledge of the `secret_key` behind `public_key`, in the given
    /// `context`, bound to this session and participant.
    pub fn prove(
        context: ProofContext,
        index: u32,
        dkg_id: &str,
        secret_key: &Scalar<C>,
        public_key: &C::G,
        mut rng: impl RngCore + CryptoRng,
    ) -> FrostResult<C, Self> {
        let k = crate::utils::random_nonzero_scalar::<C>(&mut rng);
        let nonce = C::G::generator().mul(k);

        let transcript = Self::transcript(index, dkg_id, public_key, &nonce)?;
        let challenge = context.challenge::<C>(&transcript)?;

        Ok(Self {
            nonce,
            signature: k + challenge * secret_key,
        })
    }

    /// Verify that the prover does indeed know the secret key, by checking
    /// `s * G == R + c * pk`.
    pub fn verify(
        &self,
        context: ProofContext,
        index: u32,
        dkg_id: &str,
        public_key: &C::G,
    ) -> FrostResult<C, ()> {
        let transcript = Self::transcript(index, dkg_id, public_key, &self.nonce)?;
        let challenge = context.challenge::<C>(&transcript)?;

        let lhs = C::G::generator().mul(self.signature);
        let rhs = self.nonce + public_key.mul(challenge);

        if lhs.into_affine() == rhs.into_affine() {
            Ok(())
        } else {
            Err(Error::ProofInvalid(index))
        }
    }
}
