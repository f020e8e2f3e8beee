//! DriftFS protocol client.
//!
//! Owns the OAuth2 token lifecycle (authorization-code exchange, refresh,
//! on-disk persistence) and wraps every remote call in a bounded
//! unauthorized-retry policy. The HTTP layer is a blocking [`Transport`]
//! trait so the client can be driven against scripted responses in tests.

pub mod config;
pub mod error;
pub mod protocol;
pub mod token;
pub mod transport;

pub use config::{ClientConfig, CONFIG_FILE};
pub use error::{ClientError, Result};
pub use protocol::{ProtocolClient, API_BASE, OAUTH_SCOPE};
pub use token::{TokenState, TokenStore};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody, Transport};
