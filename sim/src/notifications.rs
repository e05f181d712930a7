//! Transient user-facing messages.

use bevy_ecs::prelude::*;

pub const MSG_VIOLENT_REACTION: &str = "Violent reaction!";
pub const MSG_CLEARED: &str = "Beaker cleared";

/// Messages waiting to be shown by the host, oldest first.
#[derive(Resource, Debug, Clone, Default)]
pub struct Notifications {
    pending: Vec<String>,
    latest: Option<String>,
}

impl Notifications {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.latest = Some(message.clone());
        self.pending.push(message);
    }

    /// Most recent message, kept after draining.
    pub fn latest(&self) -> Option<&str> {
        self.latest.as_deref()
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}
