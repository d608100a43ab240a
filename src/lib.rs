//! This library provides a Rust implementation of the **FROST** (Flexible
//! Round-Optimised Schnorr Threshold) signature scheme, together with a
//! three-round distributed key generation protocol with *identifiable abort*:
//! any failed key generation session yields publicly verifiable evidence
//! against at least one cheating participant.
//!
//! A group of `n` participants jointly produces a single Schnorr signature,
//! verifiable under one group public key, provided that at least a threshold
//! `t` of them cooperate. No participant ever learns the group secret: it
//! exists only as additive shares spread across the party.
//!
//! **NOTE**: This library assumes that participants can exchange messages on
//! a public broadcast channel and on authenticated point-to-point channels;
//! transport, peer discovery and durable storage live behind the contracts of
//! the [`services`] module.
//!
//! # Usage
//!
//! Participants first agree on a [`CipherSuite`] parameterizing the curve
//! backend, the hash function instantiating all random oracles, and the AEAD
//! protecting pairwise share delivery. The examples below use the
//! [`testing::Secp256k1Sha256`] suite: secp256k1 with SHA-256 and
//! AES-128-GCM.
//!
//! ## Distributed key generation
//!
//! Each participant describes the session with a
//! [`DkgSession`](parameters::DkgSession) (the opaque session identifier,
//! the threshold, the party, and its own identifier), then walks the state
//! machine: broadcast the round-one message, turn the collected broadcasts
//! into encrypted pairwise shares, and finish with the shares addressed to
//! itself.
//!
//! A successful session ends in a key package holding the participant's
//! secret share, the group verifying key, and the participant's public
//! verifying share. A failed session ends in complaints whose evidence any
//! third party can re-check with [`Complaint::blame`](dkg::Complaint::blame).
//!
//! ## Signing
//!
//! Signers pre-publish batches of nonce commitments with
//! [`create_nonces`](sign::create_nonces), storing the private pairs in
//! their `DataManager`. For each signing event an aggregator selects at
//! least `t` signers, fixes the canonical
//! [`CommitmentSet`](sign::CommitmentSet), and collects one
//! [`PartialSignature`](sign::PartialSignature) per signer. Each private
//! nonce pair is consumed by its signing attempt, successful or not.
//!
//! ```rust
//! use rimefrost::dkg::{KeyGenerator, Round3Output};
//! use rimefrost::parameters::DkgSession;
//! use rimefrost::services::{DataManager, MemoryDataManager};
//! use rimefrost::sign::{create_nonces, CommitmentSet, SignatureAggregator, SigningCommitment};
//! use rimefrost::testing::Secp256k1Sha256;
//! use rimefrost::{CipherSuite, FrostResult};
//!
//! use rand::rngs::OsRng;
//!
//! fn demo() -> FrostResult<Secp256k1Sha256, ()> {
//!     let mut rng = OsRng;
//!
//!     // Round 1: everyone samples secrets and broadcasts commitments.
//!     let mut states = Vec::new();
//!     let mut broadcasts = Vec::new();
//!     for index in 1..=3u32 {
//!         let session = DkgSession::new("docs-dkg", 2, vec![1, 2, 3], index)?;
//!         let (state, broadcast) = KeyGenerator::new(session, None, &mut rng)?;
//!         states.push(state);
//!         broadcasts.push(broadcast);
//!     }
//!
//!     // Round 2: verify the broadcasts, emit encrypted pairwise shares.
//!     let mut round_two = Vec::new();
//!     let mut messages = Vec::new();
//!     for state in states {
//!         let (state, outgoing) = state.to_round_two(&broadcasts)?;
//!         round_two.push(state);
//!         messages.extend(outgoing);
//!     }
//!
//!     // Round 3: decrypt, verify, and derive the key material.
//!     let mut packages = Vec::new();
//!     for state in round_two {
//!         match state.finish(&messages, &mut rng)? {
//!             Round3Output::Successful { key_package, .. } => packages.push(key_package),
//!             Round3Output::Complaint(complaints) => panic!("cheaters: {complaints:?}"),
//!         }
//!     }
//!     let group_key = packages[0].group_key;
//!     assert!(packages.iter().all(|p| p.group_key == group_key));
//!
//!     // Publish nonce commitments and fix the signing set {1, 2}.
//!     let store = MemoryDataManager::new();
//!     let mut entries = Vec::new();
//!     for package in &packages[..2] {
//!         let index = package.share.index();
//!         let (public_list, nonces) = create_nonces(index, 1, &mut rng);
//!         store.store_nonces(index, nonces)?;
//!         entries.push(SigningCommitment::new(index, &public_list.commitments[0]));
//!     }
//!     let commitments = CommitmentSet::new(entries)?;
//!
//!     // Sign and aggregate.
//!     let message = b"hello threshold world";
//!     let mut aggregator = SignatureAggregator::new(group_key, commitments.clone(), message);
//!     for package in &packages[..2] {
//!         let partial = package.share.sign(message, &group_key, &commitments, &store)?;
//!         aggregator.include_partial_signature(partial)?;
//!     }
//!     let signature = aggregator.finalize()?.aggregate()?;
//!
//!     // Anyone holding the group key can verify.
//!     let message_hash = Secp256k1Sha256::h5(message)?;
//!     signature.verify(&group_key, message_hash.as_ref())?;
//!
//!     Ok(())
//! }
//! # fn main() { assert!(demo().is_ok()); }
//! ```
//!
//! A signature can additionally be re-encoded for EVM-style verifier
//! contracts through
//! [`ThresholdSignature::to_artifact`](sign::ThresholdSignature::to_artifact).

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(future_incompatible)]
#![allow(clippy::type_complexity)]

#[cfg(feature = "std")]
#[macro_use]
extern crate std;

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

pub(crate) const HASH_SEC_PARAM: usize = 128;

mod error;
pub use error::{Error, FrostResult};

/// A module defining traits for implementing convenient encoding and decoding to/from bytes.
mod serialization;
pub use serialization::{FromBytes, ToBytes};

/// A module defining the different key types held by participants.
pub mod keys;
/// A module defining the [`DkgSession`](crate::parameters::DkgSession) descriptor of a key generation session.
pub mod parameters;
/// A module defining secret polynomials and their public coefficient commitments.
pub mod polynomial;
/// A module defining the session-bound Schnorr proofs of knowledge used throughout the protocol.
pub mod proof;
/// A module defining the contracts of the node services injected into the core.
pub mod services;

mod ciphersuite;
pub use ciphersuite::CipherSuite;

pub(crate) mod utils;

/// A module defining the logic of a distributed key generation session with
/// identifiable abort.
pub mod dkg;
/// A module defining the logic of a threshold signing session.
pub mod sign;

/// This module provides a concrete implementation of a [`CipherSuite`] over Secp256k1,
/// with SHA-256 as underlying base hash function and AES-128-GCM as the pairwise
/// share cipher. It is made available for testing and benchmarking purposes.
pub mod testing {
    use super::{utils, CipherSuite};

    use aes_gcm::Aes128Gcm;
    use ark_secp256k1::Projective as G;

    use sha2::Sha256;
    use utils::{String, ToOwned};

    use zeroize::Zeroize;

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Zeroize)]
    /// An example ciphersuite over Secp256k1 with SHA-256 as underlying hasher.
    pub struct Secp256k1Sha256;

    impl CipherSuite for Secp256k1Sha256 {
        type G = G;

        type HashOutput = [u8; 32];

        type InnerHasher = Sha256;

        type Cipher = Aes128Gcm;

        fn context_string() -> String {
            "RIMEFROST-SECP256K1-SHA256".to_owned()
        }
    }
}
