//! # Armature FCM
//!
//! Client for the Firebase Cloud Messaging legacy HTTP send API.
//!
//! ## Features
//!
//! - **Multicast messages**: one data payload to many registration tokens
//! - **Structured responses**: delivery counts and per-recipient results
//! - **Typed failures**: transport failures keep the status, error body and cause
//! - **Async and blocking**: `FcmClient` on reqwest, `BlockingFcmClient` behind
//!   the `blocking` feature
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use armature_fcm::{FcmClient, FcmConfig, MulticastMessage};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FcmClient::new(FcmConfig::new("your-server-api-key"))?;
//!
//!     let mut message = MulticastMessage::new();
//!     message
//!         .put_string("myKey1", "myValue1")
//!         .add_token("registration-token-1")
//!         .add_token("registration-token-2");
//!
//!     let response = client.send(&message).await?;
//!     for (token, code) in response.failed_tokens(message.tokens()) {
//!         println!("{token}: {code}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Handling transport failures
//!
//! ```rust,ignore
//! match client.send(&message).await {
//!     Ok(response) => println!("{response}"),
//!     Err(FcmError::Transport(e)) => {
//!         eprintln!("status={:?} body={:?}", e.status(), e.body());
//!     }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

mod client;
mod config;
mod error;
mod message;
mod response;
mod transport;

#[cfg(feature = "blocking")]
mod blocking;

pub use client::FcmClient;
pub use config::{
    DEFAULT_SEND_ENDPOINT, ENV_CONNECT_TIMEOUT_SECS, ENV_SEND_ENDPOINT, ENV_SERVER_API_KEY,
    ENV_TIMEOUT_SECS, FcmConfig, FcmConfigBuilder,
};
pub use error::{FcmError, Result, TransportError};
pub use message::{MAX_REGISTRATION_IDS, MulticastMessage};
pub use response::{ErrorCode, FcmResponse, RecipientResult};

#[cfg(feature = "blocking")]
pub use blocking::BlockingFcmClient;

/// Prelude for common imports.
///
/// ```
/// use armature_fcm::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::FcmClient;
    pub use crate::config::{FcmConfig, FcmConfigBuilder};
    pub use crate::error::{FcmError, Result, TransportError};
    pub use crate::message::MulticastMessage;
    pub use crate::response::{ErrorCode, FcmResponse, RecipientResult};

    #[cfg(feature = "blocking")]
    pub use crate::blocking::BlockingFcmClient;
}
