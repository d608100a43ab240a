use ark_ff::field_hashers::{DefaultFieldHasher, HashToField};

#[cfg(not(feature = "std"))]
pub use alloc::{
    borrow::ToOwned,
    boxed::Box,
    collections::btree_map::BTreeMap,
    string::{String, ToString},
    vec::{self, Vec},
};

#[cfg(feature = "std")]
pub use std::{
    borrow::ToOwned,
    boxed::Box,
    collections::btree_map::BTreeMap,
    string::{String, ToString},
    vec::{self, Vec},
};

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};

use ark_ec::Group;
use ark_ff::{Field, Zero};

use digest::Digest;
use rand::{CryptoRng, RngCore};

/// Type alias for the scalar field of a [`CipherSuite`]'s group of operation.
pub type Scalar<C> = <<C as CipherSuite>::G as Group>::ScalarField;

/// Sample a uniformly random scalar in `[1, q)`.
///
/// Rejection sampling of the (negligibly likely) zero scalar keeps secrets
/// out of the degenerate orbit of the group identity.
pub(crate) fn random_nonzero_scalar<C: CipherSuite>(
    mut rng: impl RngCore + CryptoRng,
) -> Scalar<C> {
    loop {
        let candidate = <Scalar<C> as ark_ff::UniformRand>::rand(&mut rng);
        if !candidate.is_zero() {
            return candidate;
        }
    }
}

/// Compute the Lagrange coefficient of `my_index` evaluated at zero over the
/// signer set `all_indices`.
///
/// Fails on duplicate identifiers, which would yield a zero denominator.
pub(crate) fn calculate_lagrange_coefficients<C: CipherSuite>(
    my_index: u32,
    all_indices: &[u32],
) -> FrostResult<C, Scalar<C>> {
    let mut sorted = all_indices.to_vec();
    sorted.sort_unstable();
    for window in sorted.windows(2) {
        if window[0] == window[1] {
            return Err(Error::DuplicateIdentifier(window[0]));
        }
    }

    let mut numerator = Scalar::<C>::ONE;
    let mut denominator = Scalar::<C>::ONE;

    let my_index_field: Scalar<C> = my_index.into();

    for &j in all_indices.iter() {
        if j == my_index {
            continue;
        }
        let s: Scalar<C> = j.into();

        numerator *= s;
        denominator *= s - my_index_field;
    }

    if denominator == Scalar::<C>::ZERO {
        return Err(Error::DuplicateIdentifier(my_index));
    }

    denominator
        .inverse()
        .map(|inv| numerator * inv)
        .ok_or(Error::DuplicateIdentifier(my_index))
}

/// Hash a domain-separated message to a uniform scalar of this [`CipherSuite`]'s
/// group of operation.
pub fn hash_to_field<C: CipherSuite>(
    context_string: &[u8],
    message_to_hash: &[u8],
) -> FrostResult<C, Scalar<C>> {
    let h = <DefaultFieldHasher<C::InnerHasher, { crate::HASH_SEC_PARAM }> as HashToField<
        Scalar<C>,
    >>::new(context_string);

    Ok(h.hash_to_field(message_to_hash, 1)[0])
}

/// Hash a domain-separated message to this [`CipherSuite`]'s binary output array.
pub fn hash_to_array<C: CipherSuite>(
    context_string: &[u8],
    message_to_hash: &[u8],
) -> FrostResult<C, C::HashOutput> {
    let mut hasher = C::InnerHasher::new();
    Digest::update(&mut hasher, context_string);
    Digest::update(&mut hasher, message_to_hash);
    let digest = hasher.finalize();

    let mut output = C::HashOutput::default();
    let length = output.as_ref().len();
    let bytes = digest
        .as_slice()
        .get(..length)
        .ok_or(Error::SerializationError)?;
    output.as_mut().copy_from_slice(bytes);

    Ok(output)
}
