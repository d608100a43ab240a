//! The wire messages exchanged during a distributed key generation session.
//!
//! Field names are part of the wire contract and stable across
//! implementations.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::marker::PhantomData;

use crate::ciphersuite::CipherSuite;
use crate::dkg::Complaint;
use crate::error::{Error, FrostResult};
use crate::keys::{EphemeralPublicKey, KeyPackage};
use crate::polynomial::PolynomialCommitment;
use crate::proof::SchnorrProof;
use crate::serialization::impl_serialization_traits;
use crate::utils::Vec;

/// The public broadcast of round one: the sender's coefficient commitments,
/// ephemeral communication key, and the two proofs of knowledge binding them
/// to this session.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Round1Broadcast<C: CipherSuite> {
    /// The identifier of the broadcasting participant.
    pub sender_id: u32,
    /// The commitments `[a_k * G]` to the sender's polynomial coefficients.
    pub public_fx: PolynomialCommitment<C>,
    /// Proof of knowledge of the zeroth coefficient, under `public_fx[0]`.
    pub coefficient0_signature: SchnorrProof<C>,
    /// The sender's ephemeral communication public key.
    pub public_key: EphemeralPublicKey<C>,
    /// Proof of knowledge of the ephemeral secret key, under `public_key`.
    pub secret_signature: SchnorrProof<C>,
}

impl_serialization_traits!(Round1Broadcast<CipherSuite>);

/// A single encrypted pairwise share, sent point-to-point in round two.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Round2Message<C: CipherSuite> {
    /// The identifier of the sender.
    pub sender_id: u32,
    /// The identifier of the intended receiver.
    pub receiver_id: u32,
    /// The AEAD nonce followed by the ciphertext of the pairwise share.
    pub data: Vec<u8>,
    _phantom: PhantomData<C>,
}

impl_serialization_traits!(Round2Message<CipherSuite>);

impl<C: CipherSuite> Round2Message<C> {
    /// Assemble a round-two message from its wire components.
    pub fn new(sender_id: u32, receiver_id: u32, data: Vec<u8>) -> Self {
        Self {
            sender_id,
            receiver_id,
            data,
            _phantom: PhantomData,
        }
    }
}

const STATUS_SUCCESSFUL: u8 = 1;
const STATUS_COMPLAINT: u8 = 2;

/// The terminal output of a key generation session.
///
/// On the wire this is a status tag (`SUCCESSFUL` or `COMPLAINT`) followed
/// by the status-specific payload.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Round3Output<C: CipherSuite> {
    /// The session succeeded. Carries the participant's long-lived key
    /// material and the proof of knowledge of the key share, the artifact
    /// reported to any external registry.
    Successful {
        /// The long-lived key material of the local participant.
        key_package: KeyPackage<C>,
        /// Proof of knowledge of the key share under the verifying share.
        proof_of_share: SchnorrProof<C>,
    },
    /// The session failed with publicly verifiable evidence against at
    /// least one misbehaving participant.
    Complaint(Vec<Complaint<C>>),
}

impl<C: CipherSuite> Round3Output<C> {
    /// The wire status of this output.
    pub fn status(&self) -> &'static str {
        match self {
            Round3Output::Successful { .. } => "SUCCESSFUL",
            Round3Output::Complaint(_) => "COMPLAINT",
        }
    }

    /// Serialize this [`Round3Output`] to a vector of bytes.
    pub fn to_bytes(&self) -> FrostResult<C, Vec<u8>> {
        let mut bytes = Vec::new();

        match self {
            Round3Output::Successful {
                key_package,
                proof_of_share,
            } => {
                bytes.push(STATUS_SUCCESSFUL);
                key_package
                    .serialize_compressed(&mut bytes)
                    .map_err(|_| Error::SerializationError)?;
                proof_of_share
                    .serialize_compressed(&mut bytes)
                    .map_err(|_| Error::SerializationError)?;
            }
            Round3Output::Complaint(complaints) => {
                bytes.push(STATUS_COMPLAINT);
                complaints
                    .serialize_compressed(&mut bytes)
                    .map_err(|_| Error::SerializationError)?;
            }
        }

        Ok(bytes)
    }

    /// Attempt to deserialize a [`Round3Output`] from a vector of bytes.
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<C, Self> {
        let (status, mut reader) = bytes.split_first().ok_or(Error::DeserializationError)?;

        match *status {
            STATUS_SUCCESSFUL => {
                let key_package = KeyPackage::deserialize_compressed(&mut reader)
                    .map_err(|_| Error::DeserializationError)?;
                let proof_of_share = SchnorrProof::deserialize_compressed(&mut reader)
                    .map_err(|_| Error::DeserializationError)?;
                Ok(Round3Output::Successful {
                    key_package,
                    proof_of_share,
                })
            }
            STATUS_COMPLAINT => {
                let complaints = Vec::<Complaint<C>>::deserialize_compressed(&mut reader)
                    .map_err(|_| Error::DeserializationError)?;
                Ok(Round3Output::Complaint(complaints))
            }
            _ => Err(Error::DeserializationError),
        }
    }
}
