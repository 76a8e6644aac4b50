//! # salvo-mongo-session
//!
//! Server-side sessions for the Salvo web framework, persisted in a document
//! collection (MongoDB, or anything implementing [`SessionCollection`]).
//!
//! The client only ever holds a signed token carrying the session ID. Session
//! values live in the collection as one document per session, encoded with the
//! same codecs, and are removed by the database's TTL index once a session
//! goes unrefreshed for longer than the configured TTL.
//!
//! ## Features
//!
//! - **Signed tokens with secret rotation**: any number of [`Codec`]s, the first one signs
//! - **Automatic expiry**: TTL index on `last_modified`, provisioned at startup
//! - **Pluggable storage backends**: MongoDB (`mongodb-store` feature), memory, or custom collections
//! - **Explicit logout**: a session saved with a max age of zero is deleted and its cookie cleared
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use salvo::prelude::*;
//! use salvo_mongo_session::{
//!     MongoCollection, SessionDepotExt, SessionHandler, SessionStore, SignedCodec, StoreOptions,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let collection = MongoCollection::from_url("mongodb://127.0.0.1:27017", "app", "sessions")
//!         .await
//!         .unwrap();
//!     let store = SessionStore::new(
//!         collection,
//!         StoreOptions::default().with_ttl_secs(86400),
//!         None,
//!         None,
//!         SignedCodec::from_secrets(["your-secret-key"]),
//!     )
//!     .await
//!     .unwrap();
//!
//!     let router = Router::new()
//!         .hoop(SessionHandler::new(store, "sid"))
//!         .get(index);
//!
//!     let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
//!     Server::new(acceptor).serve(router).await;
//! }
//!
//! #[handler]
//! async fn index(depot: &mut Depot) -> String {
//!     let session = depot.session_mut().unwrap();
//!     let views: i32 = session.get("views").unwrap_or(0) + 1;
//!     session.set("views", views);
//!     format!("views: {}", views)
//! }
//! ```

pub mod codec;
pub mod config;
pub mod engine;
pub mod error;
pub mod expiry;
pub mod handler;
pub mod id;
pub mod logging;
pub mod record;
pub mod session;
pub mod store;

pub use codec::{Codec, SignedCodec};
pub use config::{CookieOptions, SameSite, StoreOptions};
pub use engine::{LoadedSession, SessionStore};
pub use error::{CodecError, SessionError};
pub use handler::SessionHandler;
pub use id::SessionId;
pub use logging::{Level, LogSink, NopSink, TracingSink};
pub use record::SessionRecord;
pub use session::{Session, SessionValues};
pub use store::{MemoryCollection, SessionCollection};

#[cfg(feature = "mongodb-store")]
pub use store::MongoCollection;

/// Extension trait for Depot to easily access session
pub mod depot_ext;
pub use depot_ext::SessionDepotExt;
