//! Host-provided primitives, modeled as injected interfaces.
//!
//! The pipeline never talks to the network or the filesystem directly; it
//! consumes these traits:
//! - [`HttpTransport`]: cross-origin HTTP requester
//! - [`KeyValueStore`]: scoped persistent key/value storage
//! - [`SaveTarget`]: a "save file" primitive
//!
//! The CLI host wires in [`ReqwestTransport`], [`MemoryStore`] and
//! [`FsSaveTarget`]; tests substitute mocks.

pub mod cancel;
pub mod save;
pub mod store;
pub mod transport;

pub use cancel::CancelToken;
pub use save::{FsSaveTarget, SaveTarget};
pub use store::{KeyValueStore, MemoryStore};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
