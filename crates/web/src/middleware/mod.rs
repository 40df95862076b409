//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `CatchPanicLayer` (panics become the 500 page)
//! 3. `TraceLayer` (request span with `request_id` field)
//! 4. Request ID (fill in the span field, echo the header)
//! 5. Session layer (signed cookie, `PostgreSQL` or in-memory store)
//! 6. Security headers (CSP, frame and referrer policy)
//!
//! Authentication is not a layer: protected handlers take the
//! [`RequireAuth`] extractor.

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth};
pub use flash::{push_flash, take_flashes};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
