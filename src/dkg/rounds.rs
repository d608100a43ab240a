//! The round module for defining the three rounds of a distributed key
//! generation session, using the [typestate](http://cliffle.com/blog/rust-typestate/)
//! pattern internally.

use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use crate::utils::Vec;

/// The local participant has sampled its secret polynomial and ephemeral
/// keypair and broadcast its commitments and proofs. It is now waiting for
/// the round-one broadcasts of every other participant.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct RoundOne {}

/// The local participant has verified every peer's proofs and sent out one
/// encrypted secret share per peer. It is now waiting for the encrypted
/// shares addressed to itself.
#[derive(Clone, Debug, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct RoundTwo {}

/// Module to implement trait sealing so that [`DkgState`] cannot be
/// implemented for externally declared types.
mod private {
    pub trait Sealed {}

    impl Sealed for super::RoundOne {}
    impl Sealed for super::RoundTwo {}
}

/// Marker trait to designate valid rounds in the distributed key generation
/// protocol's state machine.  It is implemented using the [sealed trait design
/// pattern][sealed] to prevent external types from implementing further
/// valid states.
///
/// Round three is terminal and consumes the state machine, so it needs no
/// marker of its own.
///
/// [sealed]: https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
pub trait DkgState: private::Sealed + CanonicalDeserialize + CanonicalSerialize {}

impl DkgState for RoundOne {}
impl DkgState for RoundTwo {}
