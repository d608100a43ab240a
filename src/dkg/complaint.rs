//! Complaints raised during round three of a distributed key generation
//! session, and their public adjudication.
//!
//! A complainant publishes its own ephemeral *session* secret key together
//! with the offending ciphertext. Any observer can then re-derive the
//! pairwise symmetric key, replay the decryption, and re-check the share
//! against the accused dealer's public commitments. Only the ephemeral
//! secret for this one session is revealed; the complainant's long-term key
//! and its key share stay private.

use ark_ec::{CurveGroup, Group};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use core::ops::Mul;

use crate::ciphersuite::CipherSuite;
use crate::dkg::secret_share::decrypt_share;
use crate::dkg::Round2Message;
use crate::keys::{EphemeralPublicKey, EphemeralSecretKey};
use crate::polynomial::PolynomialCommitment;
use crate::serialization::impl_serialization_traits;
use crate::utils::Vec;

/// The reason a complaint was raised.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComplaintKind {
    /// The ciphertext failed authenticated decryption, or never arrived.
    Decrypt,
    /// The ciphertext decrypted to a share inconsistent with the sender's
    /// commitments.
    Share,
}

/// A complaint generated when a participant receives a missing, undecryptable
/// or inconsistent share.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Complaint<C: CipherSuite> {
    /// The identifier of the complaint maker.
    pub complainant_id: u32,
    /// The identifier of the alleged misbehaving participant.
    pub accused_id: u32,
    /// The complainant's ephemeral session secret key, revealed so that any
    /// observer can re-derive the pairwise symmetric key.
    pub ephemeral_secret: EphemeralSecretKey<C>,
    /// The offending ciphertext, absent when the accused never delivered one.
    pub ciphertext: Option<Round2Message<C>>,
}

impl_serialization_traits!(Complaint<CipherSuite>);

impl<C: CipherSuite> Complaint<C> {
    pub(crate) fn new(
        complainant_id: u32,
        accused_id: u32,
        ephemeral_secret: EphemeralSecretKey<C>,
        ciphertext: Option<Round2Message<C>>,
    ) -> Self {
        Self {
            complainant_id,
            accused_id,
            ephemeral_secret,
            ciphertext,
        }
    }

    /// The reason this complaint was raised. A complaint carrying a
    /// ciphertext that decrypts cleanly is a share complaint; everything
    /// else is a decrypt complaint.
    pub fn kind(
        &self,
        dkg_id: &str,
        accused_public_key: &EphemeralPublicKey<C>,
    ) -> ComplaintKind {
        match &self.ciphertext {
            Some(ciphertext)
                if decrypt_share(
                    ciphertext,
                    &self.ephemeral_secret,
                    accused_public_key,
                    dkg_id,
                )
                .is_ok() =>
            {
                ComplaintKind::Share
            }
            _ => ComplaintKind::Decrypt,
        }
    }

    /// Adjudicate this complaint from public data alone and return the
    /// identifier of the guilty party.
    ///
    /// The caller supplies its own view of the session transcript: the
    /// complainant's and the accused's round-one ephemeral public keys and
    /// the accused's coefficient commitments. A complaint whose evidence
    /// does not hold up condemns the complainant.
    pub fn blame(
        &self,
        dkg_id: &str,
        complainant_public_key: &EphemeralPublicKey<C>,
        accused_public_key: &EphemeralPublicKey<C>,
        accused_commitment: &PolynomialCommitment<C>,
    ) -> u32 {
        // The revealed ephemeral secret must actually belong to the complainant,
        // otherwise the derived pairwise key proves nothing.
        let claimed_public = C::G::generator().mul(self.ephemeral_secret.0);
        if claimed_public.into_affine() != complainant_public_key.key.into_affine() {
            return self.complainant_id;
        }

        let Some(ciphertext) = &self.ciphertext else {
            // The caller asserts, from its own transcript, that no ciphertext
            // was ever delivered. Absence condemns the accused.
            return self.accused_id;
        };

        if ciphertext.sender_id != self.accused_id
            || ciphertext.receiver_id != self.complainant_id
        {
            return self.complainant_id;
        }

        match decrypt_share(
            ciphertext,
            &self.ephemeral_secret,
            accused_public_key,
            dkg_id,
        ) {
            Err(_) => self.accused_id,
            Ok(share) => match share.verify(accused_commitment) {
                Ok(()) => self.complainant_id,
                Err(_) => self.accused_id,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dkg::secret_share::{encrypt_share, SecretShare};
    use crate::polynomial::Coefficients;
    use crate::testing::Secp256k1Sha256;

    use rand::rngs::OsRng;

    type Suite = Secp256k1Sha256;

    struct Setup {
        dealer_sk: EphemeralSecretKey<Suite>,
        dealer_pk: EphemeralPublicKey<Suite>,
        receiver_sk: EphemeralSecretKey<Suite>,
        receiver_pk: EphemeralPublicKey<Suite>,
        coefficients: Coefficients<Suite>,
        commitment: PolynomialCommitment<Suite>,
    }

    fn setup(rng: &mut OsRng) -> Setup {
        let (dealer_sk, dealer_pk) = EphemeralSecretKey::generate(&mut *rng);
        let (receiver_sk, receiver_pk) = EphemeralSecretKey::generate(&mut *rng);
        let coefficients = Coefficients::generate(2, None, &mut *rng);
        let commitment = coefficients.commit();
        Setup {
            dealer_sk,
            dealer_pk,
            receiver_sk,
            receiver_pk,
            coefficients,
            commitment,
        }
    }

    #[test]
    fn bad_share_complaint_condemns_the_dealer() {
        let mut rng = OsRng;
        let s = setup(&mut rng);

        // Dealer 3 encrypts garbage instead of f_3(1) for receiver 1.
        let bogus = SecretShare::<Suite> {
            sender_id: 3,
            receiver_id: 1,
            value: crate::utils::random_nonzero_scalar::<Suite>(&mut rng),
        };
        let ciphertext =
            encrypt_share(&bogus, &s.dealer_sk, &s.receiver_pk, "dkg-1", 0).unwrap();

        let complaint = Complaint::new(1, 3, s.receiver_sk.clone(), Some(ciphertext));
        assert_eq!(complaint.kind("dkg-1", &s.dealer_pk), ComplaintKind::Share);
        assert_eq!(
            complaint.blame("dkg-1", &s.receiver_pk, &s.dealer_pk, &s.commitment),
            3
        );
    }

    #[test]
    fn honest_share_complaint_condemns_the_complainant() {
        let mut rng = OsRng;
        let s = setup(&mut rng);

        let share = SecretShare::evaluate(3, 1, &s.coefficients);
        let ciphertext =
            encrypt_share(&share, &s.dealer_sk, &s.receiver_pk, "dkg-1", 0).unwrap();

        let complaint = Complaint::new(1, 3, s.receiver_sk.clone(), Some(ciphertext));
        assert_eq!(
            complaint.blame("dkg-1", &s.receiver_pk, &s.dealer_pk, &s.commitment),
            1
        );
    }

    #[test]
    fn undecryptable_ciphertext_condemns_the_dealer() {
        let mut rng = OsRng;
        let s = setup(&mut rng);

        let share = SecretShare::evaluate(3, 1, &s.coefficients);
        let mut ciphertext =
            encrypt_share(&share, &s.dealer_sk, &s.receiver_pk, "dkg-1", 0).unwrap();
        let last = ciphertext.data.len() - 1;
        ciphertext.data[last] ^= 0x01;

        let complaint = Complaint::new(1, 3, s.receiver_sk.clone(), Some(ciphertext));
        assert_eq!(
            complaint.kind("dkg-1", &s.dealer_pk),
            ComplaintKind::Decrypt
        );
        assert_eq!(
            complaint.blame("dkg-1", &s.receiver_pk, &s.dealer_pk, &s.commitment),
            3
        );
    }

    #[test]
    fn forged_ephemeral_secret_condemns_the_complainant() {
        let mut rng = OsRng;
        let s = setup(&mut rng);

        let share = SecretShare::evaluate(3, 1, &s.coefficients);
        let ciphertext =
            encrypt_share(&share, &s.dealer_sk, &s.receiver_pk, "dkg-1", 0).unwrap();

        // The complainant reveals a secret that is not behind its published
        // ephemeral public key.
        let (forged_sk, _) = EphemeralSecretKey::<Suite>::generate(&mut rng);
        let complaint = Complaint::new(1, 3, forged_sk, Some(ciphertext));
        assert_eq!(
            complaint.blame("dkg-1", &s.receiver_pk, &s.dealer_pk, &s.commitment),
            1
        );
    }
}
