//! The three-round distributed key generation state machine.
//!
//! Round one samples the secret polynomial and the ephemeral communication
//! keypair and broadcasts commitments with proofs of knowledge. Round two
//! verifies every peer's proofs and emits one encrypted pairwise share per
//! peer. Round three decrypts and verifies the shares addressed to the
//! local participant, and either derives the long-lived key material or
//! halts with publicly verifiable complaints.

use ark_ec::Group;
use ark_ff::Zero;

use core::ops::Mul;
use rand::{CryptoRng, RngCore};

use zeroize::Zeroize;

use crate::ciphersuite::CipherSuite;
use crate::dkg::{
    rounds::{DkgState, RoundOne, RoundTwo},
    secret_share::{decrypt_share, encrypt_share, SecretShare},
    Complaint, Round1Broadcast, Round2Message, Round3Output,
};
use crate::keys::{
    EphemeralPublicKey, EphemeralSecretKey, GroupVerifyingKey, KeyPackage, SecretKeyShare,
    VerifyingShare,
};
use crate::parameters::DkgSession;
use crate::polynomial::{Coefficients, PolynomialCommitment};
use crate::proof::{ProofContext, SchnorrProof};
use crate::utils::{BTreeMap, Box, Scalar, Vec};
use crate::{Error, FrostResult};

/// State machine structure for holding intermediate values during a
/// distributed key generation protocol run, to prevent misuse.
#[derive(Clone, Debug)]
pub struct KeyGenerator<S: DkgState, C: CipherSuite> {
    state: Box<SessionState<C>>,
    data: S,
}

/// Shared state which occurs across all rounds of a key generation
/// protocol run.
#[derive(Clone, Debug)]
struct SessionState<C: CipherSuite> {
    /// The validated parameters of this session.
    session: DkgSession<C>,
    /// The local secret polynomial, kept until round three contributes
    /// `f_i(id_i)` to the additive share.
    coefficients: Coefficients<C>,
    /// The local coefficient commitments.
    commitment: PolynomialCommitment<C>,
    /// The ephemeral secret key for pairwise share encryption.
    ephemeral_secret: EphemeralSecretKey<C>,
    /// Each peer's coefficient commitments, keyed by identifier.
    their_commitments: BTreeMap<u32, PolynomialCommitment<C>>,
    /// Each peer's ephemeral public key, keyed by identifier.
    their_ephemeral_keys: BTreeMap<u32, EphemeralPublicKey<C>>,
    /// Peers whose round-one broadcast never arrived; condemned by
    /// complaint in round three.
    absent_peers: Vec<u32>,
}

impl<C: CipherSuite> KeyGenerator<RoundOne, C> {
    /// Start a key generation session: sample the secret polynomial (using
    /// `coefficient0` as the constant term when provided) and the ephemeral
    /// communication keypair, and produce the round-one broadcast.
    pub fn new(
        session: DkgSession<C>,
        coefficient0: Option<Scalar<C>>,
        mut rng: impl RngCore + CryptoRng,
    ) -> FrostResult<C, (Self, Round1Broadcast<C>)> {
        let coefficients = Coefficients::generate(session.threshold, coefficient0, &mut rng);
        let commitment = coefficients.commit();

        let (ephemeral_secret, ephemeral_public) = EphemeralSecretKey::generate(&mut rng);

        let coefficient0_signature = SchnorrProof::prove(
            ProofContext::Coefficient0,
            session.index,
            &session.dkg_id,
            &coefficients.0[0],
            commitment.coefficient0()?,
            &mut rng,
        )?;
        let secret_signature = SchnorrProof::prove(
            ProofContext::EphemeralKey,
            session.index,
            &session.dkg_id,
            &ephemeral_secret.0,
            &ephemeral_public.key,
            &mut rng,
        )?;

        let broadcast = Round1Broadcast {
            sender_id: session.index,
            public_fx: commitment.clone(),
            coefficient0_signature,
            public_key: ephemeral_public,
            secret_signature,
        };

        let state = SessionState {
            session,
            coefficients,
            commitment,
            ephemeral_secret,
            their_commitments: BTreeMap::new(),
            their_ephemeral_keys: BTreeMap::new(),
            absent_peers: Vec::new(),
        };

        Ok((
            Self {
                state: Box::new(state),
                data: RoundOne {},
            },
            broadcast,
        ))
    }

    /// Progress to round two with the collected round-one broadcasts.
    ///
    /// Every peer's two proofs of knowledge are verified; a failing proof is
    /// public and globally attributable, so it aborts the whole session with
    /// [`Error::ProofInvalid`]. A duplicate broadcast from one sender rejects
    /// the batch. The local participant's own broadcast is tolerated and
    /// ignored. Peers missing from the batch (after the caller's
    /// session-level timeout) are recorded and condemned by a decrypt
    /// complaint in round three.
    ///
    /// Returns the advanced state machine along with one encrypted pairwise
    /// share per reachable peer, to be delivered point-to-point.
    pub fn to_round_two(
        mut self,
        broadcasts: &[Round1Broadcast<C>],
    ) -> FrostResult<C, (KeyGenerator<RoundTwo, C>, Vec<Round2Message<C>>)> {
        // Sanity check
        assert_eq!(self.data, RoundOne {});

        for broadcast in broadcasts.iter() {
            let sender = broadcast.sender_id;
            if sender == self.state.session.index {
                continue;
            }
            if !self.state.session.participants.contains(&sender) {
                return Err(Error::UnknownIdentifier(sender));
            }
            if self.state.their_commitments.contains_key(&sender) {
                return Err(Error::DuplicateIdentifier(sender));
            }
            if broadcast.public_fx.points.len() != self.state.session.threshold as usize {
                return Err(Error::InvalidCommitmentLength);
            }

            broadcast
                .coefficient0_signature
                .verify(
                    ProofContext::Coefficient0,
                    sender,
                    &self.state.session.dkg_id,
                    broadcast.public_fx.coefficient0()?,
                )
                .map_err(|_| Error::ProofInvalid(sender))?;
            broadcast
                .secret_signature
                .verify(
                    ProofContext::EphemeralKey,
                    sender,
                    &self.state.session.dkg_id,
                    &broadcast.public_key.key,
                )
                .map_err(|_| Error::ProofInvalid(sender))?;

            self.state
                .their_commitments
                .insert(sender, broadcast.public_fx.clone());
            self.state
                .their_ephemeral_keys
                .insert(sender, broadcast.public_key);
        }

        let absent: Vec<u32> = self
            .state
            .session
            .peers()
            .filter(|id| !self.state.their_commitments.contains_key(id))
            .collect();
        self.state.absent_peers = absent;

        let mut messages = Vec::with_capacity(self.state.their_ephemeral_keys.len());
        let mut counter: u64 = 0;
        for (&receiver, receiver_key) in self.state.their_ephemeral_keys.iter() {
            let share = SecretShare::evaluate(
                self.state.session.index,
                receiver,
                &self.state.coefficients,
            );
            messages.push(encrypt_share(
                &share,
                &self.state.ephemeral_secret,
                receiver_key,
                &self.state.session.dkg_id,
                counter,
            )?);
            counter += 1;
        }

        Ok((
            KeyGenerator {
                state: self.state,
                data: RoundTwo {},
            },
            messages,
        ))
    }
}

impl<C: CipherSuite> KeyGenerator<RoundTwo, C> {
    /// Finish the session with the encrypted shares addressed to the local
    /// participant.
    ///
    /// Every peer must have contributed exactly one ciphertext. A ciphertext
    /// that is missing or fails authenticated decryption yields a decrypt
    /// complaint; one that decrypts to a share inconsistent with the
    /// sender's commitments yields a share complaint, publishing the local
    /// ephemeral secret so that any observer can re-verify the evidence.
    ///
    /// With no complaints, the long-lived key material is derived:
    /// `share_i = sum_j f_j(id_i)`, `Y = sum_j C_{j,0}`, `Y_i = share_i * G`,
    /// together with a proof of knowledge of `share_i` under `Y_i`.
    pub fn finish(
        self,
        messages: &[Round2Message<C>],
        mut rng: impl RngCore + CryptoRng,
    ) -> FrostResult<C, Round3Output<C>> {
        // Sanity check
        assert_eq!(self.data, RoundTwo {});

        let my_index = self.state.session.index;
        let dkg_id = self.state.session.dkg_id.clone();

        let mut inbox: BTreeMap<u32, &Round2Message<C>> = BTreeMap::new();
        for message in messages.iter() {
            if message.receiver_id != my_index {
                continue;
            }
            if message.sender_id == my_index {
                continue;
            }
            if !self.state.session.participants.contains(&message.sender_id) {
                return Err(Error::UnknownIdentifier(message.sender_id));
            }
            if inbox.insert(message.sender_id, message).is_some() {
                return Err(Error::DuplicateIdentifier(message.sender_id));
            }
        }

        let mut complaints: Vec<Complaint<C>> = Vec::new();
        let mut share = self.state.coefficients.evaluate(my_index);

        let peers: Vec<u32> = self.state.session.peers().collect();
        for &sender in peers.iter() {
            if self.state.absent_peers.contains(&sender) {
                complaints.push(Complaint::new(
                    my_index,
                    sender,
                    self.state.ephemeral_secret.clone(),
                    None,
                ));
                continue;
            }

            let Some(message) = inbox.get(&sender) else {
                complaints.push(Complaint::new(
                    my_index,
                    sender,
                    self.state.ephemeral_secret.clone(),
                    None,
                ));
                continue;
            };

            // Both maps were filled together in round two.
            let sender_key = self
                .state
                .their_ephemeral_keys
                .get(&sender)
                .ok_or(Error::UnknownIdentifier(sender))?;
            let commitment = self
                .state
                .their_commitments
                .get(&sender)
                .ok_or(Error::UnknownIdentifier(sender))?;

            match decrypt_share(message, &self.state.ephemeral_secret, sender_key, &dkg_id) {
                Err(_) => {
                    complaints.push(Complaint::new(
                        my_index,
                        sender,
                        self.state.ephemeral_secret.clone(),
                        Some((*message).clone()),
                    ));
                }
                Ok(decrypted) => {
                    if decrypted.verify(commitment).is_err() {
                        complaints.push(Complaint::new(
                            my_index,
                            sender,
                            self.state.ephemeral_secret.clone(),
                            Some((*message).clone()),
                        ));
                    } else {
                        share += decrypted.value;
                    }
                }
            }
        }

        if !complaints.is_empty() {
            share.zeroize();
            return Ok(Round3Output::Complaint(complaints));
        }

        let mut group_key = *self.state.commitment.coefficient0()?;
        for commitment in self.state.their_commitments.values() {
            group_key += commitment.coefficient0()?;
        }
        if group_key.is_zero() {
            share.zeroize();
            return Err(Error::BadCommitments);
        }

        let verifying_share = VerifyingShare {
            index: my_index,
            share: C::G::generator().mul(share),
        };
        let proof_of_share = SchnorrProof::prove(
            ProofContext::KeyShare,
            my_index,
            &dkg_id,
            &share,
            &verifying_share.share,
            &mut rng,
        )?;

        let key_package = KeyPackage {
            share: SecretKeyShare {
                index: my_index,
                key: share,
            },
            group_key: GroupVerifyingKey::new(group_key),
            verifying_share,
        };

        Ok(Round3Output::Successful {
            key_package,
            proof_of_share,
        })
    }

    /// The coefficient commitments collected in round two, including the
    /// local participant's own, ordered by identifier. This is the public
    /// record against which verifying shares and complaints are checked.
    pub fn commitments(&self) -> Vec<PolynomialCommitment<C>> {
        let mut all: BTreeMap<u32, &PolynomialCommitment<C>> = BTreeMap::new();
        all.insert(self.state.session.index, &self.state.commitment);
        for (&id, commitment) in self.state.their_commitments.iter() {
            all.insert(id, commitment);
        }

        all.into_values().cloned().collect()
    }
}
