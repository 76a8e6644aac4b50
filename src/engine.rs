//! Session store engine
//!
//! [`SessionStore`] turns cookies into sessions and sessions back into
//! cookies. Each call touches a single document in the backing collection;
//! there is no caching in between.

use salvo_core::http::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use salvo_core::http::cookie::{Cookie, SameSite as CookieSameSite};
use salvo_core::http::{Request, Response};
use std::future::Future;
use std::sync::Arc;

use crate::codec::{decode_multi, encode_multi, Codec};
use crate::config::{CookieOptions, SameSite, StoreOptions};
use crate::error::SessionError;
use crate::expiry::{self, bounded, PROVISION_TIMEOUT};
use crate::id::SessionId;
use crate::logging::{LogSink, Logger};
use crate::record::SessionRecord;
use crate::session::Session;
use crate::store::SessionCollection;

/// Outcome of [`SessionStore::new_session`].
///
/// `session` is always usable. When `error` is set, `session` is a fresh,
/// empty session and the error says why the client's session was not
/// restored.
#[derive(Debug)]
#[must_use]
pub struct LoadedSession {
    pub session: Session,
    pub error: Option<SessionError>,
}

impl LoadedSession {
    fn ok(session: Session) -> Self {
        Self {
            session,
            error: None,
        }
    }

    fn failed(session: Session, error: SessionError) -> Self {
        Self {
            session,
            error: Some(error),
        }
    }

    /// Split into the session and the optional error
    pub fn into_parts(self) -> (Session, Option<SessionError>) {
        (self.session, self.error)
    }
}

/// Document-store backed session store
pub struct SessionStore<C: SessionCollection> {
    collection: Arc<C>,
    options: StoreOptions,
    default_options: CookieOptions,
    codecs: Arc<[Arc<dyn Codec>]>,
    logger: Logger,
}

impl<C: SessionCollection> SessionStore<C> {
    /// Create a store over `collection`.
    ///
    /// The collection must answer a ping and, when
    /// [`StoreOptions::ensure_ttl_index`] is set, accept the expiry index;
    /// otherwise no store is returned. Without `cookie_options` new sessions
    /// get a root-path cookie living as long as the TTL. Codecs are tried in
    /// order; the first one signs.
    pub async fn new(
        collection: C,
        options: StoreOptions,
        cookie_options: Option<CookieOptions>,
        log_sink: Option<Arc<dyn LogSink>>,
        codecs: Vec<Arc<dyn Codec>>,
    ) -> Result<Self, SessionError> {
        let logger = Logger::resolve(options.enable_logging, log_sink);

        if let Err(e) = bounded("ping", PROVISION_TIMEOUT, collection.ping()).await {
            logger.error("failed to connect to session collection", &[("error", &e)]);
            return Err(e);
        }

        if let Err(e) = options.validate() {
            logger.error("invalid store options", &[("error", &e)]);
            return Err(e);
        }

        if options.ensure_ttl_index {
            if let Err(e) = expiry::ensure_ttl_index(&collection, options.ttl).await {
                logger.error("failed to ensure TTL index", &[("error", &e)]);
                return Err(e);
            }
        }

        let default_options = match cookie_options {
            Some(cookie_options) => cookie_options,
            None => {
                logger.debug("no cookie options given, using defaults", &[]);
                CookieOptions::from_ttl(options.ttl)
            }
        };
        logger.info(
            "cookie options",
            &[
                ("path", &default_options.path),
                ("domain", &default_options.domain.as_deref().unwrap_or("")),
                ("max_age", &default_options.max_age),
                ("secure", &default_options.secure),
                ("http_only", &default_options.http_only),
            ],
        );

        if codecs.is_empty() {
            logger.warn("no codecs configured, session data is stored unsigned", &[]);
        }

        Ok(Self {
            collection: Arc::new(collection),
            options,
            default_options,
            codecs: codecs.into(),
            logger,
        })
    }

    /// Store options this store was built with
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Cookie options applied to new sessions
    pub fn default_options(&self) -> &CookieOptions {
        &self.default_options
    }

    /// Configured codecs, in priority order
    pub fn codecs(&self) -> &[Arc<dyn Codec>] {
        &self.codecs
    }

    /// The backing collection
    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub(crate) fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Create or restore the session named `name` for this request.
    ///
    /// A request without the cookie gets a new session and no error. A cookie
    /// that does not verify, or that points at a session the collection no
    /// longer holds, also yields a new session, paired with the error.
    pub fn new_session<'a>(
        &'a self,
        req: &Request,
        name: &'a str,
    ) -> impl Future<Output = LoadedSession> + Send + 'a {
        // Read the cookie up front so the request is not borrowed across awaits
        let token = req.cookie(name).map(|cookie| {
            let raw = cookie.value();
            // Cookies may arrive URL encoded
            match urlencoding::decode(raw) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => raw.to_string(),
            }
        });
        self.session_from_token(name, token)
    }

    /// Same as [`SessionStore::new_session`], starting from the raw cookie value
    pub async fn session_from_token(&self, name: &str, token: Option<String>) -> LoadedSession {
        let mut session = Session::new(name, self.default_options.clone());
        session.id = SessionId::generate().to_hex();

        let Some(token) = token else {
            return LoadedSession::ok(session);
        };

        let id: String = match decode_multi(name, &token, &self.codecs) {
            Ok(id) => id,
            Err(e) => {
                self.logger.debug("failed to decode session cookie", &[("name", &name), ("error", &e)]);
                return LoadedSession::failed(session, e.into());
            }
        };

        let mut restored = session.clone();
        restored.id = id;
        match self.load(&mut restored).await {
            Ok(()) => {
                restored.is_new = false;
                LoadedSession::ok(restored)
            }
            Err(e) => LoadedSession::failed(session, e),
        }
    }

    /// Fill `session.values` from the record stored under `session.id`
    pub async fn load(&self, session: &mut Session) -> Result<(), SessionError> {
        let id = match SessionId::parse_str(&session.id) {
            Ok(id) => id,
            Err(e) => {
                self.logger.debug("invalid session ID", &[("session_id", &session.id), ("error", &e)]);
                return Err(e);
            }
        };

        let record = match self.run("find_one", self.collection.find_one(&id)).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.logger.debug("session not found", &[("session_id", &id)]);
                return Err(SessionError::NotFound);
            }
            Err(e) => {
                self.logger.error(
                    "failed to load allegedly existing session",
                    &[("session_id", &id), ("error", &e)],
                );
                return Err(e);
            }
        };

        match decode_multi(&session.name, &record.data, &self.codecs) {
            Ok(values) => {
                session.values = values;
                Ok(())
            }
            Err(e) => {
                self.logger.error("failed to decode session data", &[("session_id", &id), ("error", &e)]);
                Err(e.into())
            }
        }
    }

    /// Persist `session` and set its cookie on `res`.
    ///
    /// A session whose max age is zero or less is deleted instead, and its
    /// cookie is cleared whether or not the delete succeeds. On any other
    /// failure no cookie is set.
    pub async fn save(&self, res: &mut Response, session: &mut Session) -> Result<(), SessionError> {
        if session.options.max_age <= 0 {
            return self.clear_session(res, session).await;
        }

        if session.id.is_empty() {
            session.id = SessionId::generate().to_hex();
        }

        self.persist(session).await?;
        session.is_new = false;

        let encoded_id = match encode_multi(&session.name, &session.id, &self.codecs) {
            Ok(token) => token,
            Err(e) => {
                self.logger.error(
                    "failed to encode session ID",
                    &[("session_id", &session.id), ("error", &e)],
                );
                return Err(e.into());
            }
        };
        res.add_cookie(session_cookie(&session.name, encoded_id, &session.options));

        Ok(())
    }

    /// Delete the record stored under `id`.
    ///
    /// Deleting a session that does not exist fails with
    /// [`SessionError::NotFound`].
    pub async fn delete(&self, id: &str) -> Result<(), SessionError> {
        let id = SessionId::parse_str(id)?;
        if self.run("delete_one", self.collection.delete_one(&id)).await? {
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }

    async fn clear_session(&self, res: &mut Response, session: &Session) -> Result<(), SessionError> {
        let result = if session.is_new {
            Ok(())
        } else {
            self.delete(&session.id).await
        };

        if let Err(e) = &result {
            self.logger.info(
                "failed to delete session",
                &[("session_id", &session.id), ("error", e)],
            );
        }

        res.add_cookie(session_cookie(&session.name, String::new(), &session.options));
        result
    }

    async fn persist(&self, session: &Session) -> Result<(), SessionError> {
        let record = match SessionRecord::from_session(session, &self.codecs) {
            Ok(record) => record,
            Err(e) => {
                self.logger.error("failed to transform session", &[("session_id", &session.id), ("error", &e)]);
                return Err(e);
            }
        };

        if let Err(e) = self.run("upsert_one", self.collection.upsert_one(&record)).await {
            self.logger.error(
                "failed to save session in database",
                &[("session_id", &record.id), ("error", &e)],
            );
            return Err(e);
        }
        Ok(())
    }

    async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, SessionError>>,
    {
        bounded(operation, self.options.operation_timeout, fut).await
    }
}

impl<C: SessionCollection> Clone for SessionStore<C> {
    fn clone(&self) -> Self {
        Self {
            collection: Arc::clone(&self.collection),
            options: self.options.clone(),
            default_options: self.default_options.clone(),
            codecs: Arc::clone(&self.codecs),
            logger: self.logger.clone(),
        }
    }
}

impl<C: SessionCollection> std::fmt::Debug for SessionStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("options", &self.options)
            .field("default_options", &self.default_options)
            .field("codecs", &self.codecs.len())
            .finish()
    }
}

/// Build the outgoing cookie.
///
/// A positive max age sets Max-Age, plus Expires when that instant is
/// representable; zero or less produces a cookie that expires immediately.
fn session_cookie(name: &str, value: String, options: &CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((name.to_string(), value))
        .path(options.path.clone())
        .http_only(options.http_only)
        .secure(options.secure);

    if let Some(domain) = &options.domain {
        builder = builder.domain(domain.clone());
    }

    if options.max_age > 0 {
        let max_age = CookieDuration::seconds(options.max_age);
        builder = builder.max_age(max_age);
        // Past year 9999 Max-Age alone carries the lifetime
        if let Some(expires) = OffsetDateTime::now_utc().checked_add(max_age) {
            builder = builder.expires(expires);
        }
    } else {
        builder = builder
            .max_age(CookieDuration::ZERO)
            .expires(OffsetDateTime::UNIX_EPOCH);
    }

    if let Some(same_site) = options.same_site {
        builder = builder.same_site(match same_site {
            SameSite::Strict => CookieSameSite::Strict,
            SameSite::Lax => CookieSameSite::Lax,
            SameSite::None => CookieSameSite::None,
        });
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SignedCodec;
    use crate::error::CodecError;
    use crate::expiry::TtlIndex;
    use crate::logging::tests::RecordingSink;
    use crate::logging::Level;
    use crate::store::MemoryCollection;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;

    const SESSION_KEY: &str = "session-name";

    fn codecs() -> Vec<Arc<dyn Codec>> {
        SignedCodec::from_secrets(["abcdefghijklmnop"])
    }

    async fn test_store() -> SessionStore<MemoryCollection> {
        SessionStore::new(
            MemoryCollection::new(),
            StoreOptions::default()
                .with_ttl_secs(5)
                .with_ensure_ttl_index(false)
                .with_logging(false),
            Some(CookieOptions::new("/", 50)),
            None,
            codecs(),
        )
        .await
        .unwrap()
    }

    fn request_with_cookie(name: &str, value: &str) -> Request {
        let mut req = Request::new();
        req.cookies_mut()
            .add(Cookie::new(name.to_string(), value.to_string()));
        req
    }

    struct UnreachableCollection;

    #[async_trait]
    impl SessionCollection for UnreachableCollection {
        async fn ping(&self) -> Result<(), SessionError> {
            Err(SessionError::Connection("connection refused".to_string()))
        }

        async fn ensure_ttl_index(&self, _index: &TtlIndex) -> Result<(), SessionError> {
            Ok(())
        }

        async fn find_one(&self, _id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
            Ok(None)
        }

        async fn upsert_one(&self, _record: &SessionRecord) -> Result<(), SessionError> {
            Ok(())
        }

        async fn delete_one(&self, _id: &SessionId) -> Result<bool, SessionError> {
            Ok(false)
        }
    }

    /// Reachable, but every read and write hangs
    struct StalledCollection;

    #[async_trait]
    impl SessionCollection for StalledCollection {
        async fn ping(&self) -> Result<(), SessionError> {
            Ok(())
        }

        async fn ensure_ttl_index(&self, _index: &TtlIndex) -> Result<(), SessionError> {
            Err(SessionError::Store("index build rejected".to_string()))
        }

        async fn find_one(&self, _id: &SessionId) -> Result<Option<SessionRecord>, SessionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(None)
        }

        async fn upsert_one(&self, _record: &SessionRecord) -> Result<(), SessionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }

        async fn delete_one(&self, _id: &SessionId) -> Result<bool, SessionError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_new_store_defaults_max_age_to_ttl() {
        for secs in [1, 5, 500, 86400] {
            let store = SessionStore::new(
                MemoryCollection::new(),
                StoreOptions::default().with_ttl_secs(secs),
                None,
                None,
                codecs(),
            )
            .await
            .unwrap();

            assert_eq!(store.default_options().max_age, secs);
            assert_eq!(store.default_options().path, "/");
            assert_eq!(
                store.collection().ttl_index(),
                Some(TtlIndex::from_ttl(chrono::Duration::seconds(secs)).unwrap())
            );
        }
    }

    #[tokio::test]
    async fn test_new_store_keeps_explicit_options() {
        let cookie_options = CookieOptions::new("testPath", 245);
        let store = SessionStore::new(
            MemoryCollection::new(),
            StoreOptions::default().with_ttl_secs(500),
            Some(cookie_options.clone()),
            None,
            codecs(),
        )
        .await
        .unwrap();

        assert_eq!(store.default_options(), &cookie_options);
        assert_eq!(store.options().ttl, chrono::Duration::seconds(500));
    }

    #[tokio::test]
    async fn test_new_store_rejects_invalid_ttl() {
        for secs in [0, -1, -3600] {
            let result = SessionStore::new(
                MemoryCollection::new(),
                StoreOptions::default().with_ttl_secs(secs),
                Some(CookieOptions::new("testPath", 209)),
                None,
                codecs(),
            )
            .await;

            match result {
                Err(SessionError::InvalidTtl(ttl)) => assert_eq!(ttl.num_seconds(), secs),
                other => panic!("expected InvalidTtl, got {:?}", other.map(|_| ())),
            }
        }
    }

    #[tokio::test]
    async fn test_new_store_requires_connection() {
        let result = SessionStore::new(
            UnreachableCollection,
            StoreOptions::default(),
            None,
            None,
            codecs(),
        )
        .await;
        assert!(matches!(result, Err(SessionError::Connection(_))));
    }

    #[tokio::test]
    async fn test_new_store_fails_when_index_fails() {
        let result = SessionStore::new(StalledCollection, StoreOptions::default(), None, None, codecs()).await;
        assert!(matches!(result, Err(SessionError::Store(_))));

        let store = SessionStore::new(
            StalledCollection,
            StoreOptions::default().with_ensure_ttl_index(false),
            None,
            None,
            codecs(),
        )
        .await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_new_store_logs_cookie_options() {
        let sink = Arc::new(RecordingSink::default());
        SessionStore::new(
            MemoryCollection::new(),
            StoreOptions::default(),
            None,
            Some(sink.clone() as Arc<dyn LogSink>),
            codecs(),
        )
        .await
        .unwrap();

        let lines = sink.lines.lock();
        assert!(lines
            .iter()
            .any(|(level, message)| *level == Level::Info && message == "cookie options"));
    }

    #[tokio::test]
    async fn test_failing_log_sink_does_not_fail_store() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let store = SessionStore::new(
            MemoryCollection::new(),
            StoreOptions::default(),
            None,
            Some(sink.clone() as Arc<dyn LogSink>),
            Vec::new(),
        )
        .await;

        assert!(store.is_ok());
        assert!(!sink.lines.lock().is_empty());
    }

    #[tokio::test]
    async fn test_new_session_without_cookie() {
        let store = test_store().await;
        let (session, error) = store.new_session(&Request::new(), SESSION_KEY).await.into_parts();

        assert!(error.is_none());
        assert!(session.is_new());
        assert!(session.is_empty());
        assert_eq!(session.name(), SESSION_KEY);
        assert_eq!(session.options(), store.default_options());
        assert!(SessionId::parse_str(session.id()).is_ok());
    }

    #[tokio::test]
    async fn test_new_session_with_undecodable_cookie() {
        let store = test_store().await;
        let req = request_with_cookie(SESSION_KEY, "bogus");
        let loaded = store.new_session(&req, SESSION_KEY).await;

        assert!(matches!(
            loaded.error,
            Some(SessionError::Codec(CodecError::Unverified))
        ));
        assert!(loaded.session.is_new());
        assert!(SessionId::parse_str(loaded.session.id()).is_ok());
    }

    #[tokio::test]
    async fn test_new_session_with_foreign_secret() {
        let store = test_store().await;
        let foreign = SignedCodec::from_secrets(["someone-elses-key"]);
        let token = encode_multi(SESSION_KEY, &SessionId::generate().to_hex(), &foreign).unwrap();

        let loaded = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await;
        assert!(loaded.error.is_some());
        assert!(loaded.session.is_new());
    }

    #[tokio::test]
    async fn test_new_session_for_missing_record() {
        let store = test_store().await;
        let missing = SessionId::generate().to_hex();
        let token = encode_multi(SESSION_KEY, &missing, store.codecs()).unwrap();

        let loaded = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await;
        assert!(matches!(loaded.error, Some(SessionError::NotFound)));
        assert!(loaded.session.is_new());
        assert_ne!(loaded.session.id(), missing);
    }

    #[tokio::test]
    async fn test_new_session_with_malformed_id() {
        let store = test_store().await;
        let token = encode_multi(SESSION_KEY, "abcdee", store.codecs()).unwrap();

        let loaded = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await;
        assert!(matches!(loaded.error, Some(SessionError::InvalidSessionId(_))));
        assert!(loaded.session.is_new());
    }

    #[tokio::test]
    async fn test_save() {
        let store = test_store().await;
        let mut res = Response::new();
        let (mut session, error) = store.new_session(&Request::new(), SESSION_KEY).await.into_parts();
        assert!(error.is_none());

        session.set("key", "value");
        session.set("i", 5);
        session.set("s", "92");
        session.set("f", 10.5);

        store.save(&mut res, &mut session).await.unwrap();
        assert!(!session.is_new());

        // Cookie carries the encoded ID, with the session's options
        let cookie = res.cookie(SESSION_KEY).unwrap();
        let id: String = decode_multi(SESSION_KEY, cookie.value(), store.codecs()).unwrap();
        assert_eq!(id, session.id());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(50)));
        assert_eq!(cookie.http_only(), Some(true));

        // The collection holds the same values
        let mut stored = Session::new(SESSION_KEY, store.default_options().clone());
        stored.set_id(session.id());
        store.load(&mut stored).await.unwrap();
        assert_eq!(stored.values(), session.values());
        assert_eq!(stored.get::<String>("key"), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_save_then_restore_from_cookie() {
        let store = test_store().await;
        let mut res = Response::new();
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        session.set("key", "value");
        store.save(&mut res, &mut session).await.unwrap();

        let token = res.cookie(SESSION_KEY).unwrap().value().to_string();
        let (restored, error) = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await
            .into_parts();

        assert!(error.is_none());
        assert!(!restored.is_new());
        assert_eq!(restored.id(), session.id());
        assert_eq!(restored.values().get("key"), Some(&json!("value")));
    }

    #[tokio::test]
    async fn test_save_twice_is_one_record() {
        let store = test_store().await;
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        session.set("key", "value");

        store.save(&mut Response::new(), &mut session).await.unwrap();
        store.save(&mut Response::new(), &mut session).await.unwrap();

        assert_eq!(store.collection().len(), 1);
    }

    #[tokio::test]
    async fn test_save_assigns_missing_id() {
        let store = test_store().await;
        let mut session = Session::new(SESSION_KEY, store.default_options().clone());
        assert!(session.id().is_empty());

        store.save(&mut Response::new(), &mut session).await.unwrap();
        assert!(SessionId::parse_str(session.id()).is_ok());
    }

    #[tokio::test]
    async fn test_save_bad_id() {
        let store = test_store().await;
        let mut res = Response::new();
        let mut session = Session::new("key", store.default_options().clone());
        session.set_id("abcdee");
        session.set("will not", "save");

        let err = store.save(&mut res, &mut session).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSessionId(_)));
        assert!(res.cookie("key").is_none());
        assert!(store.collection().is_empty());
    }

    #[tokio::test]
    async fn test_save_with_far_future_max_age() {
        let store = test_store().await;
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        session.options_mut().max_age = 400_000_000_000;
        session.set("key", "value");

        let mut res = Response::new();
        store.save(&mut res, &mut session).await.unwrap();

        let cookie = res.cookie(SESSION_KEY).unwrap();
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(400_000_000_000)));
        assert!(cookie.expires_datetime().is_none());
        assert_eq!(store.collection().len(), 1);
    }

    #[tokio::test]
    async fn test_new_session_with_undecodable_record() {
        let store = test_store().await;
        let id = SessionId::generate();
        store
            .collection()
            .upsert_one(&SessionRecord {
                id,
                data: "garbage".to_string(),
                last_modified: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let token = encode_multi(SESSION_KEY, &id.to_hex(), store.codecs()).unwrap();
        let loaded = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await;

        assert!(matches!(
            loaded.error,
            Some(SessionError::Codec(CodecError::Unverified))
        ));
        assert!(loaded.session.is_new());
        assert!(loaded.session.is_empty());
        assert_ne!(loaded.session.id(), id.to_hex());
    }

    #[tokio::test]
    async fn test_save_max_age_zero_deletes() {
        let store = test_store().await;
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        assert!(session.options().max_age > 0);
        session.set("will be", "saved");

        let mut res = Response::new();
        store.save(&mut res, &mut session).await.unwrap();
        assert!(res.cookie(SESSION_KEY).is_some());

        session.options_mut().max_age = 0;
        let mut res = Response::new();
        store.save(&mut res, &mut session).await.unwrap();

        let cookie = res.cookie(SESSION_KEY).unwrap();
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));

        let err = store.load(&mut session).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_expire_new_session_skips_delete() {
        let store = test_store().await;
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        session.expire();

        let mut res = Response::new();
        store.save(&mut res, &mut session).await.unwrap();
        assert_eq!(res.cookie(SESSION_KEY).unwrap().value(), "");
    }

    #[tokio::test]
    async fn test_expire_missing_session_still_clears_cookie() {
        let store = test_store().await;
        let mut session = Session::new(SESSION_KEY, store.default_options().clone());
        session.set_id(SessionId::generate().to_hex());
        session.is_new = false;
        session.expire();

        let mut res = Response::new();
        let err = store.save(&mut res, &mut session).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(res.cookie(SESSION_KEY).unwrap().value(), "");
    }

    #[tokio::test]
    async fn test_unsigned_store_round_trip() {
        let store = SessionStore::new(
            MemoryCollection::new(),
            StoreOptions::default().with_logging(false),
            None,
            None,
            Vec::new(),
        )
        .await
        .unwrap();

        let mut res = Response::new();
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        session.set("key", "value");
        store.save(&mut res, &mut session).await.unwrap();

        let token = res.cookie(SESSION_KEY).unwrap().value().to_string();
        let restored = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await;
        assert!(restored.error.is_none());
        assert_eq!(restored.session.get::<String>("key"), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_operations_time_out() {
        let store = SessionStore::new(
            StalledCollection,
            StoreOptions::default()
                .with_ensure_ttl_index(false)
                .with_operation_timeout(Duration::from_millis(20)),
            None,
            None,
            codecs(),
        )
        .await
        .unwrap();

        let mut res = Response::new();
        let mut session = store.new_session(&Request::new(), SESSION_KEY).await.session;
        let err = store.save(&mut res, &mut session).await.unwrap_err();
        assert!(matches!(err, SessionError::Timeout { operation: "upsert_one", .. }));
        assert!(res.cookie(SESSION_KEY).is_none());

        let token = encode_multi(SESSION_KEY, session.id(), store.codecs()).unwrap();
        let loaded = store
            .new_session(&request_with_cookie(SESSION_KEY, &token), SESSION_KEY)
            .await;
        assert!(matches!(
            loaded.error,
            Some(SessionError::Timeout { operation: "find_one", .. })
        ));
    }

    #[test]
    fn test_session_cookie_attributes() {
        let options = CookieOptions::new("/app", 60)
            .with_domain("example.com")
            .with_secure(true)
            .with_same_site(SameSite::Strict);
        let cookie = session_cookie("sid", "token".to_string(), &options);

        assert_eq!(cookie.name(), "sid");
        assert_eq!(cookie.value(), "token");
        assert_eq!(cookie.path(), Some("/app"));
        assert_eq!(cookie.domain(), Some("example.com"));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(CookieSameSite::Strict));
        assert!(cookie.expires_datetime().is_some());
    }
}
