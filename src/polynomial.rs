//! Secret polynomials over the scalar field and public commitments to their
//! coefficients, the basic objects of verifiable secret sharing.

use crate::ciphersuite::CipherSuite;
use crate::error::{Error, FrostResult};
use crate::serialization::impl_serialization_traits;
use crate::utils::{Scalar, Vec};

use ark_ec::Group;
use ark_ff::{Field, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// The secret coefficients `a_0, ..., a_{t-1}` of a dealer's polynomial
/// `f(x) = a_0 + a_1 x + ... + a_{t-1} x^{t-1}`, overwritten with zeroes
/// when falling out of scope.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct Coefficients<C: CipherSuite>(pub(crate) Vec<Scalar<C>>);

impl_serialization_traits!(Coefficients<CipherSuite>);

impl<C: CipherSuite> Zeroize for Coefficients<C> {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl<C: CipherSuite> Drop for Coefficients<C> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl<C: CipherSuite> Coefficients<C> {
    /// Sample a fresh degree `threshold - 1` polynomial.
    ///
    /// When `coefficient0` is provided it becomes the constant term, allowing
    /// deterministic key material to be injected; otherwise the constant term
    /// is sampled uniformly from `[1, q)`.
    pub fn generate(
        threshold: u32,
        coefficient0: Option<Scalar<C>>,
        mut rng: impl RngCore + CryptoRng,
    ) -> Self {
        let mut coefficients: Vec<Scalar<C>> = Vec::with_capacity(threshold as usize);

        match coefficient0 {
            Some(secret) => coefficients.push(secret),
            None => coefficients.push(crate::utils::random_nonzero_scalar::<C>(&mut rng)),
        }
        for _ in 1..threshold {
            coefficients.push(crate::utils::random_nonzero_scalar::<C>(&mut rng));
        }

        Self(coefficients)
    }

    /// Evaluate `f` at the participant identifier `index`, using Horner's method.
    pub fn evaluate(&self, index: u32) -> Scalar<C> {
        let term: Scalar<C> = index.into();
        let mut sum = Scalar::<C>::ZERO;

        for (position, coefficient) in self.0.iter().rev().enumerate() {
            sum += coefficient;

            if position != (self.0.len() - 1) {
                sum *= term;
            }
        }

        sum
    }

    /// Commit to every coefficient: `[a_k * G]` for `k = 0, ..., t-1`.
    pub fn commit(&self) -> PolynomialCommitment<C> {
        let mut points = Vec::with_capacity(self.0.len());
        for coefficient in self.0.iter() {
            points.push(C::G::generator() * *coefficient);
        }

        PolynomialCommitment { points }
    }
}

/// A public commitment to a dealer's secret polynomial coefficients, the
/// `public_fx` component of a round-one broadcast.
#[derive(Clone, Debug, Eq, PartialEq, CanonicalSerialize, CanonicalDeserialize)]
pub struct PolynomialCommitment<C: CipherSuite> {
    /// The commitments to the dealer's secret coefficients.
    pub points: Vec<C::G>,
}

impl_serialization_traits!(PolynomialCommitment<CipherSuite>);

impl<C: CipherSuite> PolynomialCommitment<C> {
    /// The commitment `a_0 * G` to the constant term, this dealer's
    /// contribution to the group public key.
    pub fn coefficient0(&self) -> FrostResult<C, &C::G> {
        self.points.first().ok_or(Error::InvalidCommitmentLength)
    }

    /// Evaluate `f(index) * G` without knowledge of the secret coefficients.
    pub fn evaluate(&self, index: u32) -> C::G {
        let term: Scalar<C> = index.into();
        let mut sum = C::G::zero();

        for (position, point) in self.points.iter().rev().enumerate() {
            sum += point;

            if position != (self.points.len() - 1) {
                sum *= term;
            }
        }

        sum
    }
}
