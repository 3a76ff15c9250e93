//! Fail-stop gate for a pass-through command stream.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use pulsewatch_types::VelocityCommand;

/// Capability of having a constructible neutral/zero value.
///
/// The gate substitutes `T::neutral()` for the live payload whenever the
/// aggregate status is unhealthy, so the neutral value must represent a
/// safe "do nothing" command for the payload type.
pub trait Neutral {
    /// The safe, zero-effect value of this type.
    fn neutral() -> Self;
}

impl Neutral for VelocityCommand {
    fn neutral() -> Self {
        VelocityCommand::zero()
    }
}

/// Relays a command stream unchanged while the watchdog is healthy and
/// substitutes the neutral command while it is not.
///
/// The gate reads the last aggregate status computed by the supervisor loop
/// rather than recomputing it per message, so there is a bounded staleness
/// window of one supervisory period between a stream going unhealthy and
/// the gate reacting. Reads and the supervisor's writes never block each
/// other.
///
/// Obtain a gate from [`Watchdog::gate`](crate::Watchdog::gate).
pub struct CommandGate<T> {
    aggregate: Arc<AtomicBool>,
    _payload: PhantomData<fn() -> T>,
}

impl<T> Clone for CommandGate<T> {
    fn clone(&self) -> Self {
        Self {
            aggregate: self.aggregate.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for CommandGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandGate")
            .field("open", &self.is_open())
            .finish()
    }
}

impl<T> CommandGate<T> {
    pub(crate) fn new(aggregate: Arc<AtomicBool>) -> Self {
        Self {
            aggregate,
            _payload: PhantomData,
        }
    }

    /// Whether commands currently pass through unchanged.
    pub fn is_open(&self) -> bool {
        self.aggregate.load(Ordering::Acquire)
    }
}

impl<T: Neutral> CommandGate<T> {
    /// Gate one command: the original payload when healthy, the neutral
    /// payload otherwise. Call once per inbound command message.
    pub fn apply(&self, command: T) -> T {
        if self.is_open() {
            command
        } else {
            T::neutral()
        }
    }
}

impl<T: Neutral + Send + 'static> CommandGate<T> {
    /// Spawn a task forwarding every command from `rx` through the gate
    /// into `tx`.
    ///
    /// The task ends when the sender side of `rx` is dropped or the
    /// receiver side of `tx` goes away.
    pub fn pump(self, mut rx: mpsc::Receiver<T>, tx: mpsc::Sender<T>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                if tx.send(self.apply(command)).await.is_err() {
                    break;
                }
            }
        })
    }
}
