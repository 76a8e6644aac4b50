//! Extension trait for Depot to easily access sessions

use salvo_core::Depot;

use crate::handler::SESSION_KEY;
use crate::session::Session;

/// Extension trait for Salvo's Depot to provide easy session access
pub trait SessionDepotExt {
    /// Get a reference to the session
    fn session(&self) -> Option<&Session>;

    /// Get a mutable reference to the session
    fn session_mut(&mut self) -> Option<&mut Session>;

    /// Take the session out of the depot.
    ///
    /// The middleware will not save a session that was taken.
    fn take_session(&mut self) -> Option<Session>;
}

impl SessionDepotExt for Depot {
    fn session(&self) -> Option<&Session> {
        self.get::<Session>(SESSION_KEY).ok()
    }

    fn session_mut(&mut self) -> Option<&mut Session> {
        self.get_mut::<Session>(SESSION_KEY).ok()
    }

    fn take_session(&mut self) -> Option<Session> {
        self.remove::<Session>(SESSION_KEY).ok()
    }
}
