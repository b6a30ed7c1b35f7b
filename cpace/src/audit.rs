//! Structured audit events for handshake observability.
//!
//! A [`Session`](crate::Session) with no sink attached pays nothing: events
//! are only constructed when a sink is present. Sinks receive every state
//! transition plus the specific reason for each rejection, including detail
//! that is deliberately absent from the public [`Error`](crate::Error)
//! values.

use std::time::SystemTime;

/// Severity of an audit event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AuditLevel {
    /// Normal protocol progress.
    Info,
    /// Unusual but recoverable condition.
    Warn,
    /// Local misuse or malformed local input.
    Error,
    /// Attack-relevant condition, e.g. a low-order peer element.
    Security,
}

/// Stable identifiers for every event the session emits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuditCode {
    /// A session object was constructed.
    SessionCreated,
    /// `start` began computing the local element.
    StartBegin,
    /// The local element was produced and is ready to send.
    StartSent,
    /// A peer message arrived and passed structural validation.
    RxReceived,
    /// Key derivation from the transcript began.
    FinishBegin,
    /// The handshake completed and key material is available.
    FinishOk,
    /// A local input violated its constraints.
    InputInvalid,
    /// The peer's element was rejected.
    PeerInvalid,
    /// The peer's element produced the neutral element.
    LowOrderPoint,
}

impl AuditCode {
    /// Wire-stable string form for log pipelines.
    pub fn as_str(self) -> &'static str {
        match self {
            AuditCode::SessionCreated => "CPACE_SESSION_CREATED",
            AuditCode::StartBegin => "CPACE_START_BEGIN",
            AuditCode::StartSent => "CPACE_START_SENT",
            AuditCode::RxReceived => "CPACE_RX_RECEIVED",
            AuditCode::FinishBegin => "CPACE_FINISH_BEGIN",
            AuditCode::FinishOk => "CPACE_FINISH_OK",
            AuditCode::InputInvalid => "CPACE_INPUT_INVALID",
            AuditCode::PeerInvalid => "CPACE_PEER_INVALID",
            AuditCode::LowOrderPoint => "CPACE_LOW_ORDER_POINT",
        }
    }
}

/// One audit record. Contains metadata only, never key material or
/// passwords.
#[derive(Clone, Debug)]
pub struct AuditEvent {
    /// Wall-clock time the event was emitted.
    pub ts: SystemTime,
    /// Correlation id of the emitting session.
    pub session_id: String,
    /// Severity.
    pub level: AuditLevel,
    /// Event identifier.
    pub code: AuditCode,
    /// Key/value detail pairs.
    pub data: Vec<(&'static str, String)>,
}

/// Receiver for audit events.
///
/// Delivery is fire-and-forget: the session never inspects a result and a
/// panicking sink is the caller's bug.
pub trait AuditSink {
    /// Handle one event.
    fn audit(&self, event: AuditEvent);
}

/// Build and deliver an event if a sink is attached.
pub(crate) fn emit(
    sink: Option<&dyn AuditSink>,
    session_id: &str,
    level: AuditLevel,
    code: AuditCode,
    data: Vec<(&'static str, String)>,
) {
    let Some(sink) = sink else { return };
    sink.audit(AuditEvent {
        ts: SystemTime::now(),
        session_id: session_id.to_owned(),
        level,
        code,
        data,
    });
}
