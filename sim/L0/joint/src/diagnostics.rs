//! Diagnostic events for joint kinematics.
//!
//! Kinematics never fails on a bad configuration of the coordinates; it
//! reports through a [`DiagnosticSink`] instead and returns its result
//! unchanged. The joint only supplies the joint name and a snapshot of the
//! coordinates; formatting and routing belong to the sink.
//!
//! Built-in sinks:
//!
//! - [`TracingSink`] - forwards to `tracing` at the event's severity (default)
//! - [`NullSink`] - drops everything
//! - [`CollectingSink`] - keeps events in memory for later inspection

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use sim_spatial::AxisOrder;

/// How serious an event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Result is usable but degenerate.
    Warning,
    /// A request was rejected.
    Error,
}

/// Event raised by an Euler joint.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsEvent {
    /// `det(JᵀJ)` fell below the joint's singularity threshold.
    IllConditioned {
        /// Joint name.
        joint: String,
        /// Axis order in effect.
        axis_order: AxisOrder,
        /// Coordinates at evaluation time.
        positions: [f64; 3],
        /// `det(JᵀJ)` of the evaluated Jacobian.
        determinant: f64,
    },
    /// An axis order name was not recognized.
    UnknownAxisOrder {
        /// Joint name.
        joint: String,
        /// The rejected name.
        requested: String,
    },
}

impl KinematicsEvent {
    /// Severity of this event.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::IllConditioned { .. } => Severity::Warning,
            Self::UnknownAxisOrder { .. } => Severity::Error,
        }
    }

    /// Name of the joint that raised the event.
    #[must_use]
    pub fn joint(&self) -> &str {
        match self {
            Self::IllConditioned { joint, .. } | Self::UnknownAxisOrder { joint, .. } => joint,
        }
    }
}

impl fmt::Display for KinematicsEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IllConditioned {
                joint,
                axis_order,
                positions: [q0, q1, q2],
                determinant,
            } => write!(
                f,
                "ill-conditioned Jacobian in {axis_order} Euler joint [{joint}] at \
                 ({q0}, {q1}, {q2}): det(JᵀJ) = {determinant:.3e}"
            ),
            Self::UnknownAxisOrder { joint, requested } => {
                write!(f, "undefined Euler axis order {requested:?} for joint [{joint}]")
            }
        }
    }
}

/// Receiver for kinematics events.
pub trait DiagnosticSink: Send + Sync {
    /// Handle one event.
    fn record(&self, event: &KinematicsEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &KinematicsEvent) {
        match event {
            KinematicsEvent::IllConditioned {
                joint,
                axis_order,
                positions,
                determinant,
            } => tracing::warn!(
                joint = %joint,
                axis_order = %axis_order,
                q0 = positions[0],
                q1 = positions[1],
                q2 = positions[2],
                determinant,
                "ill-conditioned Jacobian"
            ),
            KinematicsEvent::UnknownAxisOrder { joint, requested } => tracing::error!(
                joint = %joint,
                requested = %requested,
                "undefined Euler axis order"
            ),
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _event: &KinematicsEvent) {}
}

/// Stores events in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<KinematicsEvent>>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<KinematicsEvent> {
        self.lock().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget all recorded events.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<KinematicsEvent>> {
        // A panic while pushing cannot leave the Vec inconsistent.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for CollectingSink {
    fn record(&self, event: &KinematicsEvent) {
        self.lock().push(event.clone());
    }
}

/// Shared, thread-safe handle to a sink.
#[derive(Clone)]
pub struct SinkHandle(Arc<dyn DiagnosticSink>);

impl SinkHandle {
    /// Wrap a sink.
    #[must_use]
    pub fn new(sink: Arc<dyn DiagnosticSink>) -> Self {
        Self(sink)
    }

    /// Forward one event.
    pub fn record(&self, event: &KinematicsEvent) {
        self.0.record(event);
    }
}

impl Default for SinkHandle {
    fn default() -> Self {
        Self(Arc::new(TracingSink))
    }
}

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SinkHandle(<sink>)")
    }
}
