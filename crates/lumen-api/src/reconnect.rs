//! Mirror channel connection state machine.
//!
//! The socket lifecycle is a pure reducer: [`ChannelMachine::handle`] takes a
//! [`ChannelEvent`] and returns the [`ChannelEffect`] the driver should carry
//! out. No I/O happens here, so every transition is testable without a
//! network. [`crate::websocket`] owns the actual socket and timers.
//!
//! ```text
//!            Opened                Dropped (attempt < max)
//! Connecting ──────▶ Open ─────────────────────────────▶ ClosedRetrying
//!     ▲  │                                                   │
//!     │  └──────────── Dropped (attempt < max) ──────────────┤
//!     └────────────────── RetryElapsed ──────────────────────┘
//!
//! Dropped with attempt == max ▶ ClosedTerminal
//! Shutdown from anywhere      ▶ TornDown
//! ```

use std::fmt;
use std::time::Duration;

// ── ReconnectPolicy ──────────────────────────────────────────────────

/// Linear backoff configuration for the mirror channel.
///
/// The n-th consecutive retry waits `n × base_delay`. A successful open
/// resets the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay unit. Default: 2s.
    pub base_delay: Duration,

    /// Consecutive failed retries before giving up. Default: 5.
    pub max_retries: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(2),
            max_retries: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

// ── ChannelState ─────────────────────────────────────────────────────

/// Observable state of the mirror channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// A connection attempt is in progress. `attempt` is 0 for the initial
    /// connection and the retry number afterwards.
    Connecting { attempt: u32 },
    /// Handshake complete; frames flow and commands may be sent.
    Open,
    /// The connection dropped; retry number `attempt` fires after `delay`.
    ClosedRetrying { attempt: u32, delay: Duration },
    /// Retries exhausted. No further automatic reconnection.
    ClosedTerminal,
    /// Closed on purpose via shutdown.
    TornDown,
}

impl ChannelState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// `true` once the channel will never reconnect on its own.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ClosedTerminal | Self::TornDown)
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting { attempt: 0 } => f.write_str("connecting"),
            Self::Connecting { attempt } => write!(f, "reconnecting ({attempt})"),
            Self::Open => f.write_str("connected"),
            Self::ClosedRetrying { attempt, delay } => {
                write!(f, "reconnecting ({attempt}) in {}ms", delay.as_millis())
            }
            Self::ClosedTerminal => f.write_str("disconnected"),
            Self::TornDown => f.write_str("closed"),
        }
    }
}

// ── Events and effects ───────────────────────────────────────────────

/// Something that happened to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Handshake succeeded.
    Opened,
    /// The connection closed or errored, or the attempt failed.
    Dropped,
    /// The backoff delay for the pending retry has passed.
    RetryElapsed,
    /// The owner asked for the channel to close.
    Shutdown,
}

/// What the driver must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEffect {
    /// Nothing to do.
    Idle,
    /// Open a new connection.
    Connect,
    /// Wait this long, then feed [`ChannelEvent::RetryElapsed`].
    ScheduleRetry(Duration),
    /// Retries exhausted; stop the driver.
    GiveUp,
    /// Close the socket if open and stop the driver.
    Stop,
}

// ── ChannelMachine ───────────────────────────────────────────────────

/// The reconnect reducer. Starts in `Connecting { attempt: 0 }`; the
/// driver opens the first connection right away.
#[derive(Debug, Clone)]
pub struct ChannelMachine {
    policy: ReconnectPolicy,
    state: ChannelState,
    attempt: u32,
}

impl ChannelMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            state: ChannelState::Connecting { attempt: 0 },
            attempt: 0,
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    /// Apply an event and return the effect to perform.
    pub fn handle(&mut self, event: ChannelEvent) -> ChannelEffect {
        match (self.state, event) {
            (ChannelState::TornDown, _) => ChannelEffect::Idle,
            (_, ChannelEvent::Shutdown) => {
                self.state = ChannelState::TornDown;
                ChannelEffect::Stop
            }
            (ChannelState::Connecting { .. }, ChannelEvent::Opened) => {
                self.attempt = 0;
                self.state = ChannelState::Open;
                ChannelEffect::Idle
            }
            (ChannelState::Connecting { .. } | ChannelState::Open, ChannelEvent::Dropped) => {
                if self.attempt >= self.policy.max_retries {
                    self.state = ChannelState::ClosedTerminal;
                    return ChannelEffect::GiveUp;
                }
                self.attempt += 1;
                let delay = self.policy.delay_for(self.attempt);
                self.state = ChannelState::ClosedRetrying {
                    attempt: self.attempt,
                    delay,
                };
                ChannelEffect::ScheduleRetry(delay)
            }
            (ChannelState::ClosedRetrying { attempt, .. }, ChannelEvent::RetryElapsed) => {
                self.state = ChannelState::Connecting { attempt };
                ChannelEffect::Connect
            }
            // Stale or out-of-order events change nothing.
            _ => ChannelEffect::Idle,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
