//! Session middleware handler for Salvo

use salvo_core::{async_trait, Depot, FlowCtrl, Handler, Request, Response};

use crate::engine::SessionStore;
use crate::session::Session;
use crate::store::SessionCollection;

pub(crate) const SESSION_KEY: &str = "salvo.mongo.session";

/// Session middleware for Salvo
///
/// Before the rest of the chain runs, the session named by this handler is
/// restored from its cookie (or started fresh) and placed in the `Depot`.
/// Afterwards it is saved back, which also sets or clears the cookie.
pub struct SessionHandler<C: SessionCollection> {
    store: SessionStore<C>,
    name: String,
}

impl<C: SessionCollection> SessionHandler<C> {
    /// Create a new session handler managing the cookie `name`
    pub fn new<S: Into<String>>(store: SessionStore<C>, name: S) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    /// The underlying store
    pub fn store(&self) -> &SessionStore<C> {
        &self.store
    }

    /// The session (cookie) name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<C: SessionCollection> Clone for SessionHandler<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
        }
    }
}

#[async_trait]
impl<C: SessionCollection> Handler for SessionHandler<C> {
    async fn handle(&self, req: &mut Request, depot: &mut Depot, res: &mut Response, ctrl: &mut FlowCtrl) {
        let (session, error) = self.store.new_session(req, &self.name).await.into_parts();
        if let Some(e) = error {
            self.store
                .logger()
                .debug("starting a new session", &[("name", &self.name), ("error", &e)]);
        }

        depot.insert(SESSION_KEY, session);

        ctrl.call_next(req, depot, res).await;

        // A handler may have taken the session out of the depot on purpose
        let Ok(mut session) = depot.remove::<Session>(SESSION_KEY) else {
            return;
        };

        if let Err(e) = self.store.save(res, &mut session).await {
            self.store
                .logger()
                .error("failed to save session", &[("name", &self.name), ("error", &e)]);
        }
    }
}
