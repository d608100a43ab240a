//! Contracts for the node services the cryptographic core depends on but
//! does not implement: private storage, peer enumeration, and role
//! authorization. Implementations are injected per node or per session;
//! the core holds no global state.

use crate::ciphersuite::CipherSuite;
use crate::error::FrostResult;
use crate::keys::KeyPackage;
use crate::sign::SigningNonces;
use crate::utils::{String, Vec};

/// Persistence of private signing material: nonce pairs keyed by their
/// hiding commitment, and long-lived key packages keyed by session
/// identifier.
///
/// `take_nonce` MUST be atomic with respect to concurrent signing attempts:
/// a stored pair is returned to at most one caller, ever. This is what
/// enforces single-use of nonces across the node.
pub trait DataManager<C: CipherSuite> {
    /// Persist a batch of freshly generated nonce pairs for a participant.
    /// Each pair is stored under its hiding commitment `D`.
    fn store_nonces(
        &self,
        participant_index: u32,
        nonces: Vec<SigningNonces<C>>,
    ) -> FrostResult<C, ()>;

    /// Retrieve *and delete* the nonce pair stored under the hiding
    /// commitment `D`. Fails with [`crate::Error::NonceMissing`] if no pair
    /// is stored, including when the pair was consumed by an earlier
    /// signing attempt.
    fn take_nonce(
        &self,
        participant_index: u32,
        hiding_commitment: &C::G,
    ) -> FrostResult<C, SigningNonces<C>>;

    /// Persist the key material produced by a successful key generation
    /// session.
    fn store_key(&self, dkg_id: &str, package: KeyPackage<C>) -> FrostResult<C, ()>;

    /// Load the key material of a past session, failing with
    /// [`crate::Error::MissingKeyPackage`] when absent.
    fn load_key(&self, dkg_id: &str) -> FrostResult<C, KeyPackage<C>>;
}

/// A peer's public record as known to the node.
#[derive(Clone, Debug)]
pub struct NodeRecord<C: CipherSuite> {
    /// The peer's long-term public key.
    pub public_key: C::G,
    /// Where the peer can be reached.
    pub network_address: String,
}

/// Enumeration of session peers and their long-term public keys.
pub trait NodeInfo<C: CipherSuite> {
    /// Look up a peer's record by identifier.
    fn lookup(&self, participant_index: u32) -> Option<NodeRecord<C>>;

    /// The identifiers of every participant of a session.
    fn peers_of(&self, dkg_id: &str) -> Vec<u32>;
}

/// Authorization of the privileged protocol roles.
pub trait Validator<C: CipherSuite> {
    /// Whether the holder of this key may aggregate signatures.
    fn is_authorized_aggregator(&self, public_key: &C::G) -> bool;

    /// Whether the holder of this key may initiate a key generation session.
    fn is_authorized_dkg_initiator(&self, public_key: &C::G) -> bool;
}

#[cfg(feature = "std")]
mod memory {
    use super::*;
    use crate::error::Error;
    use crate::utils::{BTreeMap, ToOwned};

    use std::sync::Mutex;

    /// An in-memory [`DataManager`] for tests and single-process embeddings.
    ///
    /// Atomicity of [`DataManager::take_nonce`] is provided by removing the
    /// entry under the store's lock.
    #[derive(Debug, Default)]
    pub struct MemoryDataManager<C: CipherSuite> {
        nonces: Mutex<BTreeMap<(u32, Vec<u8>), SigningNonces<C>>>,
        keys: Mutex<BTreeMap<String, KeyPackage<C>>>,
    }

    impl<C: CipherSuite> MemoryDataManager<C> {
        /// Create an empty store.
        pub fn new() -> Self {
            Self {
                nonces: Mutex::new(BTreeMap::new()),
                keys: Mutex::new(BTreeMap::new()),
            }
        }

        fn handle(hiding_commitment: &C::G) -> FrostResult<C, Vec<u8>> {
            let mut bytes = Vec::new();
            crate::serialization::serialize_to::<C, _>(hiding_commitment, &mut bytes)?;
            Ok(bytes)
        }
    }

    impl<C: CipherSuite> DataManager<C> for MemoryDataManager<C> {
        fn store_nonces(
            &self,
            participant_index: u32,
            nonces: Vec<SigningNonces<C>>,
        ) -> FrostResult<C, ()> {
            let mut store = self
                .nonces
                .lock()
                .map_err(|_| Error::Custom("nonce store lock poisoned".to_owned()))?;
            for pair in nonces {
                let handle = Self::handle(&pair.commitments().hiding)?;
                store.insert((participant_index, handle), pair);
            }

            Ok(())
        }

        fn take_nonce(
            &self,
            participant_index: u32,
            hiding_commitment: &C::G,
        ) -> FrostResult<C, SigningNonces<C>> {
            let handle = Self::handle(hiding_commitment)?;
            let mut store = self
                .nonces
                .lock()
                .map_err(|_| Error::Custom("nonce store lock poisoned".to_owned()))?;

            store
                .remove(&(participant_index, handle))
                .ok_or(Error::NonceMissing(*hiding_commitment))
        }

        fn store_key(&self, dkg_id: &str, package: KeyPackage<C>) -> FrostResult<C, ()> {
            let mut store = self
                .keys
                .lock()
                .map_err(|_| Error::Custom("key store lock poisoned".to_owned()))?;
            store.insert(dkg_id.to_owned(), package);

            Ok(())
        }

        fn load_key(&self, dkg_id: &str) -> FrostResult<C, KeyPackage<C>> {
            let store = self
                .keys
                .lock()
                .map_err(|_| Error::Custom("key store lock poisoned".to_owned()))?;

            store.get(dkg_id).cloned().ok_or(Error::MissingKeyPackage)
        }
    }
}

#[cfg(feature = "std")]
pub use memory::MemoryDataManager;
