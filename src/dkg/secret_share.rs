//! Pairwise secret shares and their authenticated encryption.
//!
//! Each pairwise share travels encrypted under an AEAD keyed by
//! HKDF-SHA256 of the ECDH shared point between the sender's and the
//! receiver's ephemeral session keys, expanded with the info label
//! `"frost-pair"`. The associated data binds the session identifier and
//! both participant identifiers; the AEAD nonce is a per-session counter.
//! This construction is part of the wire contract.

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};
use crate::keys::{EphemeralPublicKey, EphemeralSecretKey};
use crate::polynomial::{Coefficients, PolynomialCommitment};
use crate::serialization::{encode_id, serialize_to};
use crate::utils::{Scalar, Vec};

use ark_ec::{CurveGroup, Group};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use aead::{Aead, KeyInit, Payload};
use hkdf::Hkdf;
use sha2::Sha256;

use core::ops::Mul;

use zeroize::Zeroize;

use super::Round2Message;

/// The HKDF info label fixing the pairwise key derivation.
const PAIRWISE_KEY_INFO: &[u8] = b"frost-pair";

/// A pairwise secret share: the evaluation of the sender's secret polynomial
/// at the receiver's identifier. Overwritten with zeroes when falling out
/// of scope.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct SecretShare<C: CipherSuite> {
    /// The identifier of the share maker.
    pub sender_id: u32,
    /// The identifier of the participant this share was calculated for.
    pub receiver_id: u32,
    /// The polynomial evaluation `f_sender(receiver)`.
    pub(crate) value: Scalar<C>,
}

impl<C: CipherSuite> Zeroize for SecretShare<C> {
    fn zeroize(&mut self) {
        self.value.zeroize();
    }
}

impl<C: CipherSuite> Drop for SecretShare<C> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<C: CipherSuite> SecretShare<C> {
    /// Evaluate the sender's secret polynomial at the receiver's identifier.
    pub(crate) fn evaluate(
        sender_id: u32,
        receiver_id: u32,
        coefficients: &Coefficients<C>,
    ) -> Self {
        Self {
            sender_id,
            receiver_id,
            value: coefficients.evaluate(receiver_id),
        }
    }

    /// Verify that this secret share is consistent with the sender's
    /// coefficient commitments, by checking
    /// `value * G == sum_k (receiver^k * C_{sender,k})`.
    pub(crate) fn verify(&self, commitment: &PolynomialCommitment<C>) -> FrostResult<C, ()> {
        let lhs = C::G::generator().mul(self.value);
        let rhs = commitment.evaluate(self.receiver_id);

        if lhs.into_affine() == rhs.into_affine() {
            Ok(())
        } else {
            Err(Error::ShareInvalid(self.sender_id))
        }
    }
}

/// Derive the pairwise AEAD cipher shared between the holder of `secret`
/// and the holder of the secret behind `public`.
pub(crate) fn derive_pairwise_cipher<C: CipherSuite>(
    secret: &EphemeralSecretKey<C>,
    public: &EphemeralPublicKey<C>,
) -> FrostResult<C, C::Cipher> {
    let shared_point = secret.diffie_hellman(public);
    let mut shared_bytes = Vec::new();
    serialize_to::<C, _>(&shared_point, &mut shared_bytes)?;

    let hkdf = Hkdf::<Sha256>::new(None, &shared_bytes);
    let mut key = aead::Key::<C::Cipher>::default();
    hkdf.expand(PAIRWISE_KEY_INFO, key.as_mut_slice())
        .map_err(|_| Error::EncryptionError)?;

    let cipher = C::Cipher::new(&key);
    key.as_mut_slice().zeroize();

    Ok(cipher)
}

/// The associated data binding a ciphertext to its session and endpoints.
fn associated_data(dkg_id: &str, sender_id: u32, receiver_id: u32) -> Vec<u8> {
    let mut aad = Vec::with_capacity(dkg_id.len() + 12);
    aad.extend_from_slice(&(dkg_id.len() as u32).to_be_bytes());
    aad.extend_from_slice(dkg_id.as_bytes());
    aad.extend_from_slice(&encode_id(sender_id));
    aad.extend_from_slice(&encode_id(receiver_id));

    aad
}

/// The AEAD nonce for the `counter`-th ciphertext of this session: the
/// counter in big-endian form, right-aligned in the nonce width.
fn counter_nonce<C: CipherSuite>(counter: u64) -> aead::Nonce<C::Cipher> {
    let mut nonce = aead::Nonce::<C::Cipher>::default();
    let width = nonce.len().min(8);
    let offset = nonce.len() - width;
    nonce[offset..].copy_from_slice(&counter.to_be_bytes()[8 - width..]);

    nonce
}

/// Encrypt a pairwise share for its receiver.
pub(crate) fn encrypt_share<C: CipherSuite>(
    share: &SecretShare<C>,
    sender_secret: &EphemeralSecretKey<C>,
    receiver_public: &EphemeralPublicKey<C>,
    dkg_id: &str,
    counter: u64,
) -> FrostResult<C, Round2Message<C>> {
    let cipher = derive_pairwise_cipher::<C>(sender_secret, receiver_public)?;
    let nonce = counter_nonce::<C>(counter);
    let aad = associated_data(dkg_id, share.sender_id, share.receiver_id);

    let mut plaintext = Vec::new();
    serialize_to::<C, _>(&share.value, &mut plaintext)?;

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: &plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| Error::EncryptionError)?;
    plaintext.zeroize();

    let mut data = nonce.to_vec();
    data.extend_from_slice(&ciphertext);

    Ok(Round2Message::new(share.sender_id, share.receiver_id, data))
}

/// Decrypt and authenticate a pairwise share addressed to the holder of
/// `receiver_secret`.
pub(crate) fn decrypt_share<C: CipherSuite>(
    message: &Round2Message<C>,
    receiver_secret: &EphemeralSecretKey<C>,
    sender_public: &EphemeralPublicKey<C>,
    dkg_id: &str,
) -> FrostResult<C, SecretShare<C>> {
    let cipher = derive_pairwise_cipher::<C>(receiver_secret, sender_public)?;

    let nonce_len = aead::Nonce::<C::Cipher>::default().len();
    if message.data.len() < nonce_len {
        return Err(Error::DecryptFailed(message.sender_id));
    }
    let nonce = aead::Nonce::<C::Cipher>::clone_from_slice(&message.data[..nonce_len]);
    let aad = associated_data(dkg_id, message.sender_id, message.receiver_id);

    let plaintext = cipher
        .decrypt(
            &nonce,
            Payload {
                msg: &message.data[nonce_len..],
                aad: &aad,
            },
        )
        .map_err(|_| Error::DecryptFailed(message.sender_id))?;

    let value = Scalar::<C>::deserialize_compressed(&plaintext[..])
        .map_err(|_| Error::DecryptFailed(message.sender_id))?;

    Ok(SecretShare {
        sender_id: message.sender_id,
        receiver_id: message.receiver_id,
        value,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::Secp256k1Sha256;

    use rand::rngs::OsRng;

    type Suite = Secp256k1Sha256;

    fn pairwise_setup(
        rng: &mut OsRng,
    ) -> (
        EphemeralSecretKey<Suite>,
        EphemeralPublicKey<Suite>,
        EphemeralSecretKey<Suite>,
        EphemeralPublicKey<Suite>,
    ) {
        let (sender_sk, sender_pk) = EphemeralSecretKey::generate(&mut *rng);
        let (receiver_sk, receiver_pk) = EphemeralSecretKey::generate(&mut *rng);
        (sender_sk, sender_pk, receiver_sk, receiver_pk)
    }

    #[test]
    fn share_verifies_against_commitment() {
        let mut rng = OsRng;
        let coefficients = Coefficients::<Suite>::generate(3, None, &mut rng);
        let commitment = coefficients.commit();

        let share = SecretShare::evaluate(1, 2, &coefficients);
        assert!(share.verify(&commitment).is_ok());

        let bogus = SecretShare::<Suite> {
            sender_id: 1,
            receiver_id: 2,
            value: crate::utils::random_nonzero_scalar::<Suite>(&mut rng),
        };
        assert_eq!(bogus.verify(&commitment), Err(Error::ShareInvalid(1)));
    }

    #[test]
    fn encrypt_then_decrypt_is_identity() {
        let mut rng = OsRng;
        let (sender_sk, sender_pk, receiver_sk, receiver_pk) = pairwise_setup(&mut rng);

        let coefficients = Coefficients::<Suite>::generate(2, None, &mut rng);
        let share = SecretShare::evaluate(1, 2, &coefficients);

        let message = encrypt_share(&share, &sender_sk, &receiver_pk, "dkg-1", 0).unwrap();
        let recovered = decrypt_share(&message, &receiver_sk, &sender_pk, "dkg-1").unwrap();

        assert_eq!(share, recovered);
    }

    #[test]
    fn decryption_is_bound_to_session_and_endpoints() {
        let mut rng = OsRng;
        let (sender_sk, sender_pk, receiver_sk, receiver_pk) = pairwise_setup(&mut rng);

        let coefficients = Coefficients::<Suite>::generate(2, None, &mut rng);
        let share = SecretShare::evaluate(1, 2, &coefficients);

        let message = encrypt_share(&share, &sender_sk, &receiver_pk, "dkg-1", 0).unwrap();

        // Wrong session identifier.
        assert_eq!(
            decrypt_share(&message, &receiver_sk, &sender_pk, "dkg-2"),
            Err(Error::DecryptFailed(1))
        );

        // Tampered endpoint identifiers change the associated data.
        let mut rerouted = message.clone();
        rerouted.receiver_id = 3;
        assert_eq!(
            decrypt_share(&rerouted, &receiver_sk, &sender_pk, "dkg-1"),
            Err(Error::DecryptFailed(1))
        );

        // Wrong pairwise key.
        let (_, other_pk) = EphemeralSecretKey::<Suite>::generate(&mut rng);
        assert_eq!(
            decrypt_share(&message, &receiver_sk, &other_pk, "dkg-1"),
            Err(Error::DecryptFailed(1))
        );
    }

    #[test]
    fn tampered_ciphertext_fails_authentication() {
        let mut rng = OsRng;
        let (sender_sk, sender_pk, receiver_sk, receiver_pk) = pairwise_setup(&mut rng);

        let coefficients = Coefficients::<Suite>::generate(2, None, &mut rng);
        let share = SecretShare::evaluate(1, 2, &coefficients);

        let mut message = encrypt_share(&share, &sender_sk, &receiver_pk, "dkg-1", 7).unwrap();
        let last = message.data.len() - 1;
        message.data[last] ^= 0x01;

        assert_eq!(
            decrypt_share(&message, &receiver_sk, &sender_pk, "dkg-1"),
            Err(Error::DecryptFailed(1))
        );
    }
}
