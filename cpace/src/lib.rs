#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

//! # Usage
//! Add `cpace` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cpace = "0.1"
//! ```
//!
//! Then drive a [`Session`] on each side of the channel.
//!
//! # Protocol description
//! CPace is a balanced PAKE: both parties know the same low-entropy
//! password-related string `PRS` and derive a strong shared key from it in
//! a single round. All arithmetic happens on an elliptic curve group `G`
//! with a hash `H`.
//!
//! |       Party A                   |   Data transfer   |      Party B                    |
//! |---------------------------------|-------------------|---------------------------------|
//! |                                 | Agree on CI, sid  |                                 |
//! |`g = Map2Point(H(PRS,CI,sid))`   |                   |`g = Map2Point(H(PRS,CI,sid))`   |
//! |`ya = ${0,1}^256`                |                   |`yb = ${0,1}^256`                |
//! |`Ya = g^ya`                      | <-Yb,ADb Ya,ADa-> |`Yb = g^yb`                      |
//! |abort if `Yb` invalid            |                   |abort if `Ya` invalid            |
//! |`K = Yb^ya`                      |                   |`K = Ya^yb`                      |
//! |`ISK = H(sid, K, transcript)`    |                   |`ISK = H(sid, K, transcript)`    |
//!
//! Variables and notations have the following meaning:
//!
//! - `PRS` — the password-related string both parties share
//! - `CI` — channel identifier binding the run to one channel
//! - `sid` — optional session id; when absent, the run outputs one
//! - `AD` — per-party associated data, authenticated but not secret
//! - `transcript` — both messages, ordered by role or canonically
//!
//! In initiator-responder mode the transcript is `MSGa || MSGb`; in
//! symmetric mode the two messages are ordered lexicographically so that
//! both parties hash identical bytes.
//!
//! The only instantiation provided is [`CPaceX25519Sha512`]: X25519 with
//! Elligator2 generator derivation and SHA-512.

mod audit;
mod bytes;
mod crypto;
mod elligator2;
mod encoding;
mod errors;
mod group;
mod message;
mod session;
mod validation;

#[cfg(test)]
mod proptests;

pub use audit::{AuditCode, AuditEvent, AuditLevel, AuditSink};
pub use errors::{Error, PointRejection, Result};
pub use group::{CPaceX25519Sha512, CipherSuite, Group, X25519};
pub use message::Message;
pub use session::{Mode, Role, Session, SessionInputs};
pub use validation::{Constraint, FieldViolation};
