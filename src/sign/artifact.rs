//! The public signature artifact in the encoding expected by EVM-style
//! verifier contracts: the aggregate nonce commitment reduced to its
//! keccak-256 address form, the group key as an x-coordinate with a parity
//! bit, the response scalar, and the message digest.

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};
use crate::keys::GroupVerifyingKey;
use crate::sign::signature::ThresholdSignature;
use crate::utils::Vec;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField};

use sha3::{Digest, Keccak256};

/// The group public key component of a [`SignatureArtifact`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArtifactPublicKey {
    /// The affine x-coordinate of the group key, big-endian, field-width.
    pub x: Vec<u8>,
    /// The parity of the affine y-coordinate: 1 if odd, 0 if even.
    pub y_parity: u8,
}

/// A final signature re-encoded for an EVM-style verifier.
///
/// The core does not depend on this encoding downstream; it only has to be
/// able to produce it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureArtifact {
    /// The address form of the aggregate nonce commitment `R`: the last 20
    /// bytes of the keccak-256 digest of its affine coordinates.
    pub nonce: [u8; 20],
    /// The group public key.
    pub public_key: ArtifactPublicKey,
    /// The response scalar `z`, big-endian, field-width.
    pub signature: Vec<u8>,
    /// The digest of the signed message.
    pub message_hash: Vec<u8>,
}

/// Big-endian encoding of a prime-field element, left-padded to the full
/// byte width of the field modulus.
fn field_to_bytes<F: PrimeField>(element: &F) -> Vec<u8> {
    let width = ((F::MODULUS_BIT_SIZE + 7) / 8) as usize;
    let raw = element.into_bigint().to_bytes_be();

    // The limb encoding can be wider than the modulus byte width; the
    // element is reduced, so the excess leading bytes are zero.
    if raw.len() >= width {
        return raw[raw.len() - width..].to_vec();
    }

    let mut bytes = Vec::with_capacity(width);
    bytes.resize(width - raw.len(), 0);
    bytes.extend_from_slice(&raw);

    bytes
}

/// The keccak-256 address form of a curve point: the last 20 bytes of the
/// digest of its affine coordinates.
fn address_form<C: CipherSuite>(point: &C::G) -> FrostResult<C, [u8; 20]>
where
    <C::G as CurveGroup>::BaseField: PrimeField,
{
    let affine = point.into_affine();
    let (x, y) = affine.xy().ok_or(Error::InvalidSignature)?;

    let mut hasher = Keccak256::new();
    hasher.update(field_to_bytes(x));
    hasher.update(field_to_bytes(y));
    let digest = hasher.finalize();

    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);

    Ok(address)
}

impl<C: CipherSuite> ThresholdSignature<C>
where
    <C::G as CurveGroup>::BaseField: PrimeField,
{
    /// Re-encode this signature as a [`SignatureArtifact`] for an EVM-style
    /// verifier.
    pub fn to_artifact(
        &self,
        group_key: &GroupVerifyingKey<C>,
        message_hash: &[u8],
    ) -> FrostResult<C, SignatureArtifact> {
        let nonce = address_form::<C>(&self.group_commitment)?;

        let affine_key = group_key.key.into_affine();
        let (x, y) = affine_key.xy().ok_or(Error::InvalidSignature)?;
        let public_key = ArtifactPublicKey {
            x: field_to_bytes(x),
            y_parity: u8::from(y.into_bigint().is_odd()),
        };

        Ok(SignatureArtifact {
            nonce,
            public_key,
            signature: field_to_bytes(&self.z),
            message_hash: message_hash.to_vec(),
        })
    }
}
