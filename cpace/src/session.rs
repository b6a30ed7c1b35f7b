//! The CPace session state machine.
//!
//! A [`Session`] walks one party through the single-round handshake:
//! [`Session::start`] produces the local message, [`Session::receive`]
//! consumes the peer's, and [`Session::session_key`] exports the resulting
//! intermediate session key. In initiator-responder mode the responder may
//! skip `start` entirely; `receive` starts it lazily and returns the reply
//! message to send back.

use crate::audit::{emit, AuditCode, AuditLevel, AuditSink};
use crate::crypto::{compute_local_element, derive_isk_and_sid, derive_shared_secret};
use crate::encoding::{transcript_ir, transcript_oc};
use crate::errors::{Error, PointRejection, Result};
use crate::group::CipherSuite;
use crate::message::{validate_inbound, Message};
use crate::validation::{ensure_bytes, generate_session_id, Constraint};
use core::marker::PhantomData;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

/// Which message flow the two parties agreed on out of band.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// The initiator sends first; the responder answers.
    InitiatorResponder,
    /// Both parties send concurrently; the transcript is canonically
    /// ordered.
    Symmetric,
}

/// This party's role within the selected [`Mode`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Sends the first message of an initiator-responder flow.
    Initiator,
    /// Answers the first message of an initiator-responder flow.
    Responder,
    /// Peer in a symmetric flow.
    Symmetric,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Mode::InitiatorResponder => "initiator-responder",
            Mode::Symmetric => "symmetric",
        }
    }
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Initiator => "initiator",
            Role::Responder => "responder",
            Role::Symmetric => "symmetric",
        }
    }
}

/// Protocol inputs for one session.
///
/// Only the password-related string is mandatory; the channel identifier,
/// session id and associated data default to empty.
#[derive(Clone)]
pub struct SessionInputs {
    prs: Zeroizing<Vec<u8>>,
    ci: Vec<u8>,
    sid: Vec<u8>,
    ad: Vec<u8>,
}

impl SessionInputs {
    /// Inputs with the given password-related string and everything else
    /// empty.
    pub fn new(prs: impl Into<Vec<u8>>) -> Self {
        SessionInputs {
            prs: Zeroizing::new(prs.into()),
            ci: Vec::new(),
            sid: Vec::new(),
            ad: Vec::new(),
        }
    }

    /// Bind the channel identifier into the generator derivation. Both
    /// parties must supply the identical value.
    pub fn with_channel_identifier(mut self, ci: impl Into<Vec<u8>>) -> Self {
        self.ci = ci.into();
        self
    }

    /// Supply an agreed session id. When set, the handshake produces no
    /// sid output of its own.
    pub fn with_session_id(mut self, sid: impl Into<Vec<u8>>) -> Self {
        self.sid = sid.into();
        self
    }

    /// Attach associated data to the outbound message. It is authenticated
    /// by the transcript but sent in the clear.
    pub fn with_associated_data(mut self, ad: impl Into<Vec<u8>>) -> Self {
        self.ad = ad.into();
        self
    }
}

/// One party's view of a single CPace handshake.
///
/// Sessions are single use. The ephemeral scalar lives only between
/// `start` and the completion of `receive` and is zeroized on drop either
/// way.
pub struct Session<S: CipherSuite, R: RngCore + CryptoRng> {
    rng: R,
    mode: Mode,
    role: Role,
    inputs: SessionInputs,
    audit: Option<Box<dyn AuditSink>>,
    session_id: String,
    ephemeral_scalar: Option<Zeroizing<Vec<u8>>>,
    local_payload: Option<Vec<u8>>,
    isk: Option<Zeroizing<Vec<u8>>>,
    sid_output: Option<Vec<u8>>,
    suite: PhantomData<S>,
}

impl<S: CipherSuite, R: RngCore + CryptoRng> Session<S, R> {
    /// Create a session without audit reporting.
    pub fn new(mode: Mode, role: Role, inputs: SessionInputs, rng: R) -> Result<Self> {
        Self::build(mode, role, inputs, rng, None, None)
    }

    /// Create a session that reports every state transition to `sink`.
    ///
    /// `session_id` is a caller-chosen correlation id for the audit trail;
    /// when `None`, a random hex id is drawn from `rng`.
    pub fn new_with_audit(
        mode: Mode,
        role: Role,
        inputs: SessionInputs,
        rng: R,
        sink: Box<dyn AuditSink>,
        session_id: Option<String>,
    ) -> Result<Self> {
        Self::build(mode, role, inputs, rng, Some(sink), session_id)
    }

    fn build(
        mode: Mode,
        role: Role,
        inputs: SessionInputs,
        mut rng: R,
        audit: Option<Box<dyn AuditSink>>,
        session_id: Option<String>,
    ) -> Result<Self> {
        let session_id = match (session_id, &audit) {
            (Some(id), _) => id,
            (None, Some(_)) => generate_session_id(&mut rng),
            (None, None) => String::new(),
        };

        let session = Session {
            rng,
            mode,
            role,
            inputs,
            audit,
            session_id,
            ephemeral_scalar: None,
            local_payload: None,
            isk: None,
            sid_output: None,
            suite: PhantomData,
        };

        let role_fits = match mode {
            Mode::Symmetric => role == Role::Symmetric,
            Mode::InitiatorResponder => role != Role::Symmetric,
        };
        if !role_fits {
            session.emit(
                AuditLevel::Warn,
                AuditCode::InputInvalid,
                vec![
                    ("field", "role".to_owned()),
                    ("mode", mode.as_str().to_owned()),
                    ("role", role.as_str().to_owned()),
                ],
            );
            return Err(Error::InvalidModeRole);
        }

        session.emit(
            AuditLevel::Info,
            AuditCode::SessionCreated,
            vec![
                ("mode", mode.as_str().to_owned()),
                ("role", role.as_str().to_owned()),
                ("suite", S::NAME.to_owned()),
                ("ci_len", session.inputs.ci.len().to_string()),
                ("sid_len", session.inputs.sid.len().to_string()),
                ("ad_len", session.inputs.ad.len().to_string()),
            ],
        );
        Ok(session)
    }

    /// Compute this party's element and return the message to send.
    ///
    /// Returns `None` for an initiator-responder responder, which only
    /// replies from within [`Session::receive`].
    pub fn start(&mut self) -> Result<Option<Message>> {
        if self.local_payload.is_some() {
            return Err(Error::AlreadyStarted);
        }
        self.ensure_prs()?;

        self.emit(
            AuditLevel::Info,
            AuditCode::StartBegin,
            vec![
                ("mode", self.mode.as_str().to_owned()),
                ("role", self.role.as_str().to_owned()),
            ],
        );

        let local = compute_local_element::<S, R>(
            &mut self.rng,
            &self.inputs.prs,
            &self.inputs.ci,
            &self.inputs.sid,
        )?;
        self.ephemeral_scalar = Some(local.scalar);
        self.local_payload = Some(local.serialized.clone());

        if self.mode == Mode::InitiatorResponder && self.role == Role::Responder {
            return Ok(None);
        }

        let outbound = Message::new(local.serialized, self.inputs.ad.clone());
        self.emit_sent(&outbound);
        Ok(Some(outbound))
    }

    /// Consume the peer's message, completing the handshake.
    ///
    /// For an initiator-responder responder this lazily runs [`start`] if
    /// needed and returns the reply message; every other role returns
    /// `None`. On any peer-related failure the session is unusable and the
    /// caller must abort the connection.
    ///
    /// [`start`]: Session::start
    pub fn receive(&mut self, msg: &Message) -> Result<Option<Message>> {
        self.ensure_prs()?;

        let peer = {
            let sink = self.audit.as_deref();
            let session_id = &self.session_id;
            validate_inbound::<S>(msg, |expected, actual| {
                emit(
                    sink,
                    session_id,
                    AuditLevel::Warn,
                    AuditCode::InputInvalid,
                    vec![
                        ("field", "peer.payload".to_owned()),
                        ("expected", expected.to_string()),
                        ("actual", actual.to_string()),
                    ],
                );
            })?
        };

        // a responder may be driven entirely by receive
        if self.mode == Mode::InitiatorResponder
            && self.role == Role::Responder
            && self.local_payload.is_none()
        {
            self.start()?;
        }

        self.emit(
            AuditLevel::Info,
            AuditCode::RxReceived,
            vec![
                ("payload_len", peer.payload.len().to_string()),
                ("ad_len", peer.ad.len().to_string()),
            ],
        );

        self.finish(&peer)?;

        if self.mode == Mode::InitiatorResponder && self.role == Role::Responder {
            let payload = self
                .local_payload
                .clone()
                .ok_or(Error::NotStarted)?;
            let reply = Message::new(payload, self.inputs.ad.clone());
            self.emit_sent(&reply);
            return Ok(Some(reply));
        }
        Ok(None)
    }

    /// Export the intermediate session key.
    ///
    /// Available once [`Session::receive`] has completed. The returned key
    /// is the caller's to protect.
    pub fn session_key(&self) -> Result<Vec<u8>> {
        self.isk
            .as_ref()
            .map(|k| k.to_vec())
            .ok_or(Error::NotFinished)
    }

    /// The session id this handshake produced, if any.
    ///
    /// `Some` exactly when no session id was supplied as input; both
    /// parties derive the identical value and can feed it into a follow-up
    /// run or protocol.
    pub fn sid_output(&self) -> Result<Option<Vec<u8>>> {
        if self.isk.is_none() {
            return Err(Error::NotFinished);
        }
        Ok(self.sid_output.clone())
    }

    fn finish(&mut self, peer: &Message) -> Result<()> {
        if self.ephemeral_scalar.is_none() || self.local_payload.is_none() {
            return Err(Error::NotStarted);
        }
        let scalar = self.ephemeral_scalar.take().ok_or(Error::NotStarted)?;
        let local_payload = self.local_payload.clone().ok_or(Error::NotStarted)?;

        self.emit(
            AuditLevel::Info,
            AuditCode::FinishBegin,
            vec![
                ("mode", self.mode.as_str().to_owned()),
                ("role", self.role.as_str().to_owned()),
            ],
        );

        let shared = {
            let sink = self.audit.as_deref();
            let session_id = &self.session_id;
            derive_shared_secret::<S>(&scalar, &peer.payload, |reason| match reason {
                PointRejection::LowOrder => emit(
                    sink,
                    session_id,
                    AuditLevel::Security,
                    AuditCode::LowOrderPoint,
                    vec![],
                ),
                other => emit(
                    sink,
                    session_id,
                    AuditLevel::Error,
                    AuditCode::PeerInvalid,
                    vec![("reason", other.to_string())],
                ),
            })?
        };

        let transcript = match (self.mode, self.role) {
            (Mode::InitiatorResponder, Role::Initiator) => {
                transcript_ir(&local_payload, &self.inputs.ad, &peer.payload, &peer.ad)
            }
            (Mode::InitiatorResponder, Role::Responder) => {
                transcript_ir(&peer.payload, &peer.ad, &local_payload, &self.inputs.ad)
            }
            _ => transcript_oc(&local_payload, &self.inputs.ad, &peer.payload, &peer.ad),
        };

        let out = derive_isk_and_sid::<S>(&transcript, &shared, &self.inputs.sid);
        self.isk = Some(Zeroizing::new(out.isk));
        self.sid_output = out.sid_output;
        drop(scalar);

        self.emit(
            AuditLevel::Info,
            AuditCode::FinishOk,
            vec![
                (
                    "transcript_type",
                    match self.mode {
                        Mode::InitiatorResponder => "ir".to_owned(),
                        Mode::Symmetric => "oc".to_owned(),
                    },
                ),
                ("sid_provided", (!self.inputs.sid.is_empty()).to_string()),
            ],
        );
        Ok(())
    }

    fn ensure_prs(&self) -> Result<()> {
        let sink = self.audit.as_deref();
        let session_id = &self.session_id;
        ensure_bytes("prs", &self.inputs.prs, Constraint::NON_EMPTY, |violation| {
            emit(
                sink,
                session_id,
                AuditLevel::Warn,
                AuditCode::InputInvalid,
                vec![
                    ("field", violation.field.to_owned()),
                    ("min", violation.min.to_string()),
                    ("actual", violation.actual.to_string()),
                ],
            );
        })
    }

    fn emit_sent(&self, msg: &Message) {
        self.emit(
            AuditLevel::Info,
            AuditCode::StartSent,
            vec![
                ("payload_len", msg.payload.len().to_string()),
                ("ad_len", msg.ad.len().to_string()),
            ],
        );
    }

    fn emit(&self, level: AuditLevel, code: AuditCode, data: Vec<(&'static str, String)>) {
        emit(self.audit.as_deref(), &self.session_id, level, code, data);
    }
}
