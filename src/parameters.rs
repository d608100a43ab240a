//! Configurable parameters for an instance of a distributed key generation session.

use crate::utils::{String, Vec};

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::marker::PhantomData;

use crate::error::{Error, FrostResult};
use crate::CipherSuite;

/// The parameters of a single distributed key generation session.
///
/// A session is identified by an opaque `dkg_id`, carries the signing
/// threshold `t`, the full party of participant identifiers, and the
/// identifier of the local participant.
///
/// Invariants enforced at construction:
/// - `1 <= t <= n` where `n` is the party size,
/// - all identifiers are distinct and nonzero,
/// - the local identifier belongs to the party.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DkgSession<C: CipherSuite> {
    /// The opaque identifier of this session.
    pub dkg_id: String,
    /// The threshold required for a successful signature.
    pub threshold: u32,
    /// The identifiers of all session participants, in ascending order.
    pub participants: Vec<u32>,
    /// The identifier of the local participant.
    pub index: u32,
    _phantom: PhantomData<C>,
}

impl<C: CipherSuite> DkgSession<C> {
    /// Validate and construct a new session descriptor.
    ///
    /// The `participants` list is sorted internally; its original order is
    /// irrelevant to the protocol.
    pub fn new(
        dkg_id: impl Into<String>,
        threshold: u32,
        mut participants: Vec<u32>,
        index: u32,
    ) -> FrostResult<C, Self> {
        participants.sort_unstable();

        for window in participants.windows(2) {
            if window[0] == window[1] {
                return Err(Error::DuplicateIdentifier(window[0]));
            }
        }
        if participants.first() == Some(&0) {
            return Err(Error::IndexIsZero);
        }
        if threshold == 0 || threshold as usize > participants.len() {
            return Err(Error::InvalidThresholdParams);
        }
        if !participants.contains(&index) {
            return Err(Error::UnknownIdentifier(index));
        }

        Ok(Self {
            dkg_id: dkg_id.into(),
            threshold,
            participants,
            index,
            _phantom: PhantomData,
        })
    }

    /// The party size of this session.
    pub fn party_size(&self) -> u32 {
        self.participants.len() as u32
    }

    /// The identifiers of every participant other than the local one.
    pub fn peers(&self) -> impl Iterator<Item = u32> + '_ {
        let index = self.index;
        self.participants.iter().copied().filter(move |&id| id != index)
    }

    /// Serialize this [`DkgSession`] to a vector of bytes.
    pub fn to_bytes(&self) -> FrostResult<C, Vec<u8>> {
        let mut bytes = Vec::new();

        self.dkg_id
            .as_bytes()
            .to_vec()
            .serialize_compressed(&mut bytes)
            .map_err(|_| Error::SerializationError)?;
        self.threshold
            .serialize_compressed(&mut bytes)
            .map_err(|_| Error::SerializationError)?;
        self.participants
            .serialize_compressed(&mut bytes)
            .map_err(|_| Error::SerializationError)?;
        self.index
            .serialize_compressed(&mut bytes)
            .map_err(|_| Error::SerializationError)?;

        Ok(bytes)
    }

    /// Attempt to deserialize a [`DkgSession`] from a vector of bytes.
    pub fn from_bytes(bytes: &[u8]) -> FrostResult<C, Self> {
        let mut reader = bytes;

        let dkg_id_bytes = Vec::<u8>::deserialize_compressed(&mut reader)
            .map_err(|_| Error::DeserializationError)?;
        let dkg_id =
            String::from_utf8(dkg_id_bytes).map_err(|_| Error::DeserializationError)?;
        let threshold =
            u32::deserialize_compressed(&mut reader).map_err(|_| Error::DeserializationError)?;
        let participants = Vec::<u32>::deserialize_compressed(&mut reader)
            .map_err(|_| Error::DeserializationError)?;
        let index =
            u32::deserialize_compressed(&mut reader).map_err(|_| Error::DeserializationError)?;

        Self::new(dkg_id, threshold, participants, index)
    }
}
