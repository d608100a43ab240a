//! The ordered commitment set of a signing event and its canonical encoding.

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};
use crate::serialization::{encode_id, impl_serialization_traits, serialize_to};
use crate::sign::nonces::NonceCommitment;
use crate::utils::{BTreeMap, Scalar, Vec};

use ark_ff::Zero;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::ops::Mul;

/// One signer's entry in a commitment set: its identifier and the nonce
/// commitment pair selected for this signing event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SigningCommitment<C: CipherSuite> {
    /// The identifier of the signer.
    pub index: u32,
    /// The hiding nonce commitment `D`.
    pub hiding: C::G,
    /// The binding nonce commitment `E`.
    pub binding: C::G,
}

impl_serialization_traits!(SigningCommitment<CipherSuite>);

impl<C: CipherSuite> SigningCommitment<C> {
    /// Assemble a signer's entry from its published commitment pair.
    pub fn new(index: u32, commitment: &NonceCommitment<C>) -> Self {
        Self {
            index,
            hiding: commitment.hiding,
            binding: commitment.binding,
        }
    }
}

/// The commitment set `B` of a signing event: the entries of every selected
/// signer, held in the canonical order (identifiers strictly ascending).
///
/// All signers and the aggregator must reproduce this set bit-exactly; its
/// canonical encoding is absorbed by the binding-factor oracle.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct CommitmentSet<C: CipherSuite> {
    entries: Vec<SigningCommitment<C>>,
}

impl_serialization_traits!(CommitmentSet<CipherSuite>);

impl<C: CipherSuite> CommitmentSet<C> {
    /// Build the canonical commitment set from the selected signers'
    /// entries, in any order.
    ///
    /// Rejects empty sets, zero identifiers, and duplicated identifiers.
    pub fn new(mut entries: Vec<SigningCommitment<C>>) -> FrostResult<C, Self> {
        if entries.is_empty() {
            return Err(Error::BadCommitments);
        }

        entries.sort_unstable_by_key(|entry| entry.index);

        if entries[0].index == 0 {
            return Err(Error::IndexIsZero);
        }
        for window in entries.windows(2) {
            if window[0].index == window[1].index {
                return Err(Error::DuplicateIdentifier(window[0].index));
            }
        }

        Ok(Self { entries })
    }

    /// The entries of this set, identifiers strictly ascending.
    pub fn entries(&self) -> &[SigningCommitment<C>] {
        &self.entries
    }

    /// The signer identifiers of this set, ascending.
    pub fn indices(&self) -> Vec<u32> {
        self.entries.iter().map(|entry| entry.index).collect()
    }

    /// The entry of signer `index`, if present.
    pub fn get(&self, index: u32) -> Option<&SigningCommitment<C>> {
        self.entries
            .binary_search_by_key(&index, |entry| entry.index)
            .ok()
            .map(|position| &self.entries[position])
    }

    /// The canonical byte encoding of this set: for each entry in order,
    /// `id (4 bytes, big-endian) ‖ compress(D) ‖ compress(E)`.
    pub(crate) fn encode(&self) -> FrostResult<C, Vec<u8>> {
        let mut encoded = Vec::new();
        for entry in self.entries.iter() {
            encoded.extend_from_slice(&encode_id(entry.index));
            serialize_to::<C, _>(&entry.hiding, &mut encoded)?;
            serialize_to::<C, _>(&entry.binding, &mut encoded)?;
        }

        Ok(encoded)
    }

    /// The binding factor `rho_k` of every signer in this set, for the given
    /// pre-hashed message.
    ///
    /// Each factor absorbs `id_k ‖ len(m) ‖ m ‖ encode(B)` through the
    /// `"rho"` oracle; the message is length-prefixed so the concatenation
    /// is unambiguous.
    pub(crate) fn binding_factors(
        &self,
        message_hash: &[u8],
    ) -> FrostResult<C, BTreeMap<u32, Scalar<C>>> {
        let encoded_set = self.encode()?;

        let mut suffix = Vec::with_capacity(8 + message_hash.len() + encoded_set.len());
        suffix.extend_from_slice(&(message_hash.len() as u64).to_be_bytes());
        suffix.extend_from_slice(message_hash);
        suffix.extend_from_slice(&encoded_set);

        let mut factors = BTreeMap::new();
        for entry in self.entries.iter() {
            let mut input = encode_id(entry.index).to_vec();
            input.extend_from_slice(&suffix);
            factors.insert(entry.index, C::h3(&input)?);
        }

        Ok(factors)
    }

    /// The aggregate nonce commitment `R = sum_k (D_k + rho_k * E_k)`.
    ///
    /// Fails with [`Error::BadCommitments`] if `R` is the group identity.
    pub(crate) fn group_commitment(
        &self,
        binding_factors: &BTreeMap<u32, Scalar<C>>,
    ) -> FrostResult<C, C::G> {
        let mut group_commitment = C::G::zero();

        for entry in self.entries.iter() {
            let factor = binding_factors
                .get(&entry.index)
                .ok_or(Error::UnknownCommitment(entry.index))?;
            group_commitment += entry.hiding + entry.binding.mul(*factor);
        }

        if group_commitment.is_zero() {
            return Err(Error::BadCommitments);
        }

        Ok(group_commitment)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sign::nonces::create_nonces;
    use crate::testing::Secp256k1Sha256;

    use rand::rngs::OsRng;

    type Suite = Secp256k1Sha256;

    fn sample_set(indices: &[u32]) -> CommitmentSet<Suite> {
        let mut entries = Vec::new();
        for &index in indices {
            let (list, _nonces) = create_nonces::<Suite>(index, 1, &mut OsRng);
            entries.push(SigningCommitment::new(index, &list.commitments[0]));
        }
        CommitmentSet::new(entries).unwrap()
    }

    #[test]
    fn entries_are_canonically_ordered() {
        let set = sample_set(&[3, 1, 2]);
        assert_eq!(set.indices(), vec![1, 2, 3]);
        assert!(set.get(2).is_some());
        assert!(set.get(4).is_none());
    }

    #[test]
    fn duplicate_and_zero_identifiers_are_rejected() {
        let (list, _nonces) = create_nonces::<Suite>(1, 2, &mut OsRng);
        let duplicated = vec![
            SigningCommitment::new(1, &list.commitments[0]),
            SigningCommitment::new(1, &list.commitments[1]),
        ];
        assert_eq!(
            CommitmentSet::new(duplicated).unwrap_err(),
            Error::DuplicateIdentifier(1)
        );

        let zeroed = vec![SigningCommitment::new(0, &list.commitments[0])];
        assert_eq!(CommitmentSet::new(zeroed).unwrap_err(), Error::IndexIsZero);

        assert_eq!(
            CommitmentSet::<Suite>::new(Vec::new()).unwrap_err(),
            Error::BadCommitments
        );
    }

    #[test]
    fn binding_factors_depend_on_signer_message_and_set() {
        let set = sample_set(&[1, 2]);
        let factors = set.binding_factors(b"message one").unwrap();

        // Distinct per signer.
        assert_ne!(factors.get(&1), factors.get(&2));

        // Distinct per message.
        let other_message = set.binding_factors(b"message two").unwrap();
        assert_ne!(factors.get(&1), other_message.get(&1));

        // Distinct per commitment set.
        let other_set = sample_set(&[1, 2]);
        let other_factors = other_set.binding_factors(b"message one").unwrap();
        assert_ne!(factors.get(&1), other_factors.get(&1));
    }

    #[test]
    fn encoding_is_stable_under_input_order() {
        let (list1, _n1) = create_nonces::<Suite>(1, 1, &mut OsRng);
        let (list2, _n2) = create_nonces::<Suite>(2, 1, &mut OsRng);
        let a = SigningCommitment::new(1, &list1.commitments[0]);
        let b = SigningCommitment::new(2, &list2.commitments[0]);

        let forward = CommitmentSet::new(vec![a, b]).unwrap();
        let backward = CommitmentSet::new(vec![b, a]).unwrap();
        assert_eq!(forward.encode().unwrap(), backward.encode().unwrap());
    }
}
