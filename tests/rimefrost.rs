//! End-to-end tests: distributed key generation, signing, aggregation,
//! cheater identification, and nonce hygiene.

use rand::rngs::OsRng;

use ark_ff::{Field, UniformRand, Zero};
use ark_secp256k1::{Fr, Projective};

use rimefrost::dkg::{ComplaintKind, KeyGenerator, Round3Output};
use rimefrost::keys::{KeyPackage, VerifyingShare};
use rimefrost::parameters::DkgSession;
use rimefrost::proof::ProofContext;
use rimefrost::services::{DataManager, MemoryDataManager};
use rimefrost::sign::{
    create_nonces, verify_partial_signature, CommitmentSet, PartialSignature,
    SignatureAggregator, SigningCommitment,
};
use rimefrost::testing::Secp256k1Sha256;
use rimefrost::{CipherSuite, Error, FromBytes, ToBytes};

use ark_ec::Group;
use core::ops::Mul;

type Suite = Secp256k1Sha256;

/// Lagrange coefficient of `index` at zero over `indices`.
fn lagrange(index: u32, indices: &[u32]) -> Fr {
    let mut numerator = Fr::ONE;
    let mut denominator = Fr::ONE;
    let me = Fr::from(index);
    for &j in indices {
        if j == index {
            continue;
        }
        let other = Fr::from(j);
        numerator *= other;
        denominator *= other - me;
    }
    numerator * denominator.inverse().unwrap()
}

/// Run a full honest key generation session and return every participant's
/// key package along with the public round-one record.
fn run_dkg(
    dkg_id: &str,
    threshold: u32,
    party: &[u32],
    coefficient0: impl Fn(u32) -> Option<Fr>,
) -> (
    Vec<KeyPackage<Suite>>,
    Vec<rimefrost::dkg::Round1Broadcast<Suite>>,
) {
    let rng = OsRng;

    let mut states = Vec::new();
    let mut broadcasts = Vec::new();
    for &index in party {
        let session = DkgSession::new(dkg_id, threshold, party.to_vec(), index).unwrap();
        let (state, broadcast) = KeyGenerator::new(session, coefficient0(index), rng).unwrap();
        states.push(state);
        broadcasts.push(broadcast);
    }

    let mut round_two = Vec::new();
    let mut messages = Vec::new();
    for state in states {
        let (state, outgoing) = state.to_round_two(&broadcasts).unwrap();
        round_two.push(state);
        messages.extend(outgoing);
    }

    let mut packages = Vec::new();
    for state in round_two {
        match state.finish(&messages, rng).unwrap() {
            Round3Output::Successful {
                key_package,
                proof_of_share,
            } => {
                // The registry artifact re-verifies against the public
                // verifying share.
                proof_of_share
                    .verify(
                        ProofContext::KeyShare,
                        key_package.share.index(),
                        dkg_id,
                        &key_package.verifying_share.share,
                    )
                    .unwrap();
                packages.push(key_package);
            }
            Round3Output::Complaint(complaints) => {
                panic!("honest session raised complaints: {complaints:?}")
            }
        }
    }

    (packages, broadcasts)
}

/// Set up one signing event: pre-generate a nonce batch per signer, persist
/// the private pairs, and fix the canonical commitment set from the
/// `selection`-th published commitment of each signer.
fn signing_event(
    signer_ids: &[u32],
    batch: usize,
    selection: usize,
) -> (CommitmentSet<Suite>, MemoryDataManager<Suite>) {
    let store = MemoryDataManager::new();
    let mut entries = Vec::new();
    for &index in signer_ids {
        let (public_list, nonces) = create_nonces::<Suite>(index, batch, &mut OsRng);
        store.store_nonces(index, nonces).unwrap();
        entries.push(SigningCommitment::new(
            index,
            &public_list.commitments[selection],
        ));
    }

    (CommitmentSet::new(entries).unwrap(), store)
}

fn collect_partials(
    packages: &[KeyPackage<Suite>],
    signer_ids: &[u32],
    message: &[u8],
    commitments: &CommitmentSet<Suite>,
    store: &MemoryDataManager<Suite>,
) -> Vec<PartialSignature<Suite>> {
    packages
        .iter()
        .filter(|package| signer_ids.contains(&package.share.index()))
        .map(|package| {
            package
                .share
                .sign(message, &package.group_key, commitments, store)
                .unwrap()
        })
        .collect()
}

#[test]
fn deterministic_coefficient0_fixes_the_group_key() {
    // Scenario: t = 2, n = 3, zeroth coefficients fixed to sum to one, so the
    // group key is the base point and any threshold subset reconstructs one.
    let mut rng = OsRng;
    let mask = Fr::rand(&mut rng);
    let supplied = move |index: u32| match index {
        1 => Some(Fr::ONE),
        2 => Some(mask),
        _ => Some(-mask),
    };

    let (packages, broadcasts) = run_dkg("dkg-s1", 2, &[1, 2, 3], supplied);

    let group_key = packages[0].group_key;
    assert_eq!(*group_key.key(), Projective::generator());

    // Every pair of verifying shares interpolates back to the group key.
    for subset in [[1u32, 2], [1, 3], [2, 3]] {
        let mut reconstructed = Projective::zero();
        for &index in subset.iter() {
            let share = packages
                .iter()
                .find(|package| package.share.index() == index)
                .unwrap()
                .verifying_share
                .share;
            reconstructed += share.mul(lagrange(index, &subset));
        }
        assert_eq!(reconstructed, Projective::generator());
    }

    // Verifying shares are recomputable from the public broadcasts alone.
    let commitments: Vec<_> = broadcasts
        .iter()
        .map(|broadcast| broadcast.public_fx.clone())
        .collect();
    for package in packages.iter() {
        assert_eq!(
            VerifyingShare::from_commitments(package.share.index(), &commitments).unwrap(),
            package.verifying_share
        );
    }
}

#[test]
fn dkg_consistency_holds_for_random_sessions() {
    let (packages, _) = run_dkg("dkg-consistency", 3, &[1, 2, 3, 4, 5], |_| None);

    let group_key = packages[0].group_key;
    for package in packages.iter() {
        assert_eq!(package.group_key, group_key);
        assert_eq!(package.share.to_public(), package.verifying_share);
    }

    // The interpolated verifying shares of any threshold subset equal the
    // group key.
    for subset in [vec![1u32, 2, 3], vec![2, 4, 5], vec![1, 3, 5, 2]] {
        let mut reconstructed = Projective::zero();
        for &index in subset.iter() {
            let share = packages
                .iter()
                .find(|package| package.share.index() == index)
                .unwrap()
                .verifying_share
                .share;
            reconstructed += share.mul(lagrange(index, &subset));
        }
        assert_eq!(&reconstructed, group_key.key());
    }
}

#[test]
fn signing_and_verification_2_out_of_3() {
    // Scenario: sign "hello" with signers {1, 2}; the aggregated signature
    // verifies; a tampered message does not.
    let (packages, _) = run_dkg("dkg-s2", 2, &[1, 2, 3], |_| None);
    let group_key = packages[0].group_key;

    let message = b"hello";
    let signers = [1u32, 2];
    let (commitments, store) = signing_event(&signers, 1, 0);

    let mut aggregator = SignatureAggregator::new(group_key, commitments.clone(), message);
    for partial in collect_partials(&packages, &signers, message, &commitments, &store) {
        // Every honest partial verifies in isolation.
        verify_partial_signature(&partial, &commitments, message, &group_key).unwrap();
        aggregator.include_partial_signature(partial).unwrap();
    }

    let aggregator = aggregator.finalize().unwrap();
    let signature = aggregator.aggregate().unwrap();

    let message_hash = Suite::h5(message).unwrap();
    assert!(signature.verify(&group_key, message_hash.as_ref()).is_ok());
    assert!(group_key
        .verify_signature(&signature, message_hash.as_ref())
        .is_ok());

    let tampered_hash = Suite::h5(b"hellO").unwrap();
    assert_eq!(
        signature.verify(&group_key, tampered_hash.as_ref()),
        Err(Error::InvalidSignature)
    );

    // The EVM-facing artifact is derivable from the same signature.
    let artifact = signature.to_artifact(&group_key, message_hash.as_ref()).unwrap();
    assert_eq!(artifact.nonce.len(), 20);
    assert_eq!(artifact.signature.len(), 32);
}

#[test]
fn tampered_partial_signature_is_blamed() {
    // Scenario: signer 2 flips a bit of its response scalar; the aggregator
    // reports exactly that signer.
    let (packages, _) = run_dkg("dkg-s3", 2, &[1, 2, 3], |_| None);
    let group_key = packages[0].group_key;

    let message = b"hello";
    let signers = [1u32, 2];
    let (commitments, store) = signing_event(&signers, 1, 0);

    let mut partials = collect_partials(&packages, &signers, message, &commitments, &store);
    partials[1].z += Fr::ONE;

    let mut aggregator = SignatureAggregator::new(group_key, commitments, message);
    for partial in partials {
        aggregator.include_partial_signature(partial).unwrap();
    }
    assert_eq!(
        aggregator.finalize().unwrap().aggregate().unwrap_err(),
        Error::PartialInvalid(2)
    );
}

#[test]
fn corrupted_share_delivery_is_identified() {
    // Scenario: t = 3, n = 5; the ciphertext from dealer 3 to receiver 1 is
    // corrupted in flight. Receiver 1 outputs a complaint against 3 whose
    // evidence any observer re-verifies from the round-one record.
    let dkg_id = "dkg-s4";
    let party = [1u32, 2, 3, 4, 5];
    let rng = OsRng;

    let mut states = Vec::new();
    let mut broadcasts = Vec::new();
    for &index in party.iter() {
        let session = DkgSession::<Suite>::new(dkg_id, 3, party.to_vec(), index).unwrap();
        let (state, broadcast) = KeyGenerator::new(session, None, rng).unwrap();
        states.push(state);
        broadcasts.push(broadcast);
    }

    let mut round_two = Vec::new();
    let mut messages = Vec::new();
    for state in states {
        let (state, outgoing) = state.to_round_two(&broadcasts).unwrap();
        round_two.push(state);
        messages.extend(outgoing);
    }

    for message in messages.iter_mut() {
        if message.sender_id == 3 && message.receiver_id == 1 {
            let last = message.data.len() - 1;
            message.data[last] ^= 0x01;
        }
    }

    let receiver_one = round_two.remove(0);
    match receiver_one.finish(&messages, rng).unwrap() {
        Round3Output::Complaint(complaints) => {
            assert_eq!(complaints.len(), 1);
            let complaint = &complaints[0];
            assert_eq!(complaint.complainant_id, 1);
            assert_eq!(complaint.accused_id, 3);
            assert_eq!(
                complaint.kind(dkg_id, &broadcasts[2].public_key),
                ComplaintKind::Decrypt
            );

            // Third-party adjudication from public data only.
            assert_eq!(
                complaint.blame(
                    dkg_id,
                    &broadcasts[0].public_key,
                    &broadcasts[2].public_key,
                    &broadcasts[2].public_fx,
                ),
                3
            );
        }
        Round3Output::Successful { .. } => panic!("expected a complaint against dealer 3"),
    }
}

#[test]
fn nonces_are_single_use() {
    // Scenario: t = 2, n = 2; a batch of ten nonce pairs serves two signing
    // events on distinct handles, and reusing a consumed handle fails.
    let (packages, _) = run_dkg("dkg-s5", 2, &[1, 2], |_| None);
    let group_key = packages[0].group_key;
    let signers = [1u32, 2];

    let store = MemoryDataManager::new();
    let mut published = Vec::new();
    for &index in signers.iter() {
        let (public_list, nonces) = create_nonces::<Suite>(index, 10, &mut OsRng);
        store.store_nonces(index, nonces).unwrap();
        published.push(public_list);
    }

    let set_for = |selection: usize| {
        CommitmentSet::new(
            published
                .iter()
                .map(|list| {
                    SigningCommitment::new(
                        list.participant_index,
                        &list.commitments[selection],
                    )
                })
                .collect(),
        )
        .unwrap()
    };

    for selection in [0usize, 1] {
        let commitments = set_for(selection);
        let message = b"sequential signing";
        let mut aggregator =
            SignatureAggregator::new(group_key, commitments.clone(), message);
        for partial in collect_partials(&packages, &signers, message, &commitments, &store) {
            aggregator.include_partial_signature(partial).unwrap();
        }
        let signature = aggregator.finalize().unwrap().aggregate().unwrap();
        let message_hash = Suite::h5(message).unwrap();
        assert!(signature.verify(&group_key, message_hash.as_ref()).is_ok());
    }

    // A third event reusing the handles of the first finds them consumed.
    let commitments = set_for(0);
    let result = packages[0]
        .share
        .sign(b"replayed event", &group_key, &commitments, &store);
    assert!(matches!(result, Err(Error::NonceMissing(_))));
}

#[test]
fn distinct_signer_subsets_produce_distinct_valid_signatures() {
    // Scenario: t = 7, n = 10; two different subsets of seven sign the same
    // message, yielding different but equally valid signatures.
    let party: Vec<u32> = (1..=10).collect();
    let (packages, _) = run_dkg("dkg-s6", 7, &party, |_| None);
    let group_key = packages[0].group_key;

    let message = b"subset independence";
    let message_hash = Suite::h5(message).unwrap();

    let mut signatures = Vec::new();
    for subset in [
        [1u32, 2, 3, 4, 5, 6, 7],
        [4u32, 5, 6, 7, 8, 9, 10],
    ] {
        let (commitments, store) = signing_event(&subset, 1, 0);
        let mut aggregator =
            SignatureAggregator::new(group_key, commitments.clone(), message);
        for partial in collect_partials(&packages, &subset, message, &commitments, &store) {
            aggregator.include_partial_signature(partial).unwrap();
        }
        let signature = aggregator.finalize().unwrap().aggregate().unwrap();
        assert!(signature.verify(&group_key, message_hash.as_ref()).is_ok());
        signatures.push(signature);
    }

    assert_ne!(signatures[0], signatures[1]);
}

#[test]
fn round_messages_and_signatures_round_trip() {
    let (packages, broadcasts) = run_dkg("dkg-roundtrip", 2, &[1, 2, 3], |_| None);
    let group_key = packages[0].group_key;

    let bytes = broadcasts[0].to_bytes().unwrap();
    assert_eq!(
        broadcasts[0],
        rimefrost::dkg::Round1Broadcast::from_bytes(&bytes).unwrap()
    );

    let message = b"round trip";
    let signers = [1u32, 3];
    let (commitments, store) = signing_event(&signers, 1, 0);

    let partials = collect_partials(&packages, &signers, message, &commitments, &store);
    let bytes = partials[0].to_bytes().unwrap();
    assert_eq!(partials[0], PartialSignature::from_bytes(&bytes).unwrap());

    let mut aggregator = SignatureAggregator::new(group_key, commitments.clone(), message);
    for partial in partials {
        aggregator.include_partial_signature(partial).unwrap();
    }
    let signature = aggregator.finalize().unwrap().aggregate().unwrap();

    let bytes = signature.to_bytes().unwrap();
    let restored = rimefrost::sign::ThresholdSignature::from_bytes(&bytes).unwrap();
    assert_eq!(signature, restored);

    let bytes = commitments.to_bytes().unwrap();
    assert_eq!(commitments, CommitmentSet::from_bytes(&bytes).unwrap());
}

#[test]
fn key_packages_persist_through_the_data_manager() {
    let (packages, _) = run_dkg("dkg-persist", 2, &[1, 2, 3], |_| None);

    let store = MemoryDataManager::<Suite>::new();
    store.store_key("dkg-persist", packages[0].clone()).unwrap();

    let loaded = store.load_key("dkg-persist").unwrap();
    assert_eq!(loaded, packages[0]);

    assert_eq!(
        store.load_key("some-other-dkg").unwrap_err(),
        Error::MissingKeyPackage
    );
}

#[test]
fn signers_outside_the_commitment_set_cannot_sign() {
    let (packages, _) = run_dkg("dkg-outside", 2, &[1, 2, 3], |_| None);
    let group_key = packages[0].group_key;

    // Signer 3 is not part of the event.
    let (commitments, store) = signing_event(&[1, 2], 1, 0);
    let result = packages[2]
        .share
        .sign(b"not my event", &group_key, &commitments, &store);
    assert_eq!(result.unwrap_err(), Error::UnknownCommitment(3));
}
