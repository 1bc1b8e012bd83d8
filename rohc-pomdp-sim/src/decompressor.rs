//! U-mode decompressor context automaton.
//!
//! The decompressor tracks how much header context it holds. Losses while in
//! full context consume the WLSB window; once `W` packets in a row are lost the
//! dynamic context is unusable and only the static part survives.

use rohc_pomdp::{Action, ChannelState, SystemState};

/// Context held by the decompressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextState {
    /// Nothing to decompress against.
    NoContext,
    /// Static fields only.
    StaticContext,
    /// Full context, with the number of packets lost in a row since the last delivery.
    FullContext { lost: u32 },
}

impl ContextState {
    /// Whether a delivered packet of type `action` decodes from this context.
    pub const fn can_decode(self, action: Action) -> bool {
        match self {
            ContextState::NoContext => matches!(action, Action::Ir),
            ContextState::StaticContext => matches!(action, Action::Ir | Action::Fo),
            ContextState::FullContext { .. } => true,
        }
    }

    /// Joint model state for this context after a channel use in state `channel`.
    pub const fn system_state(self, channel: ChannelState) -> SystemState {
        match self {
            ContextState::NoContext => SystemState::NoContext(channel),
            ContextState::StaticContext => SystemState::StaticContext(channel),
            ContextState::FullContext { lost } => SystemState::FullContext(lost),
        }
    }
}

/// Decompressor with a per-packet context log.
#[derive(Debug, Clone)]
pub struct Decompressor {
    window: u32,
    state: ContextState,
    /// Context before the first packet, then after each packet.
    log: Vec<ContextState>,
}

impl Decompressor {
    /// Creates a decompressor with WLSB capability `window`, starting without context.
    pub fn new(window: u32) -> Self {
        debug_assert!(window >= 1);
        Self {
            window,
            state: ContextState::NoContext,
            log: vec![ContextState::NoContext],
        }
    }

    /// Drops all context and clears the log.
    pub fn reset(&mut self) {
        self.state = ContextState::NoContext;
        self.log.clear();
        self.log.push(self.state);
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn log(&self) -> &[ContextState] {
        &self.log
    }

    /// Processes one packet of type `action` sent over a channel use in state `channel`.
    ///
    /// # Returns
    /// `true` if the packet was delivered and decoded.
    pub fn receive(&mut self, channel: ChannelState, action: Action) -> bool {
        let before = self.state;
        self.state = match (channel, before) {
            (ChannelState::Bad, ContextState::FullContext { lost }) if lost + 1 >= self.window => {
                ContextState::StaticContext
            }
            (ChannelState::Bad, ContextState::FullContext { lost }) => {
                ContextState::FullContext { lost: lost + 1 }
            }
            (ChannelState::Bad, other) => other,
            (ChannelState::Good, _) if before.can_decode(action) => {
                ContextState::FullContext { lost: 0 }
            }
            (ChannelState::Good, other) => other,
        };
        self.log.push(self.state);
        channel == ChannelState::Good && before.can_decode(action)
    }
}
