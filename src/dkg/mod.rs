//! The distributed key generation module: a three-round protocol with
//! verifiable secret sharing, encrypted pairwise share delivery, and
//! identification of cheating participants.

mod complaint;
mod keygen;
mod messages;
mod rounds;
pub(crate) mod secret_share;

pub use complaint::{Complaint, ComplaintKind};
pub use keygen::KeyGenerator;
pub use messages::{Round1Broadcast, Round2Message, Round3Output};
pub use rounds::{DkgState, RoundOne, RoundTwo};
pub use secret_share::SecretShare;
