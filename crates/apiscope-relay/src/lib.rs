//! apiscope-relay: talks to the backend relay
//!
//! The relay executes requests against the target API, renders code
//! snippets and parses documentation pages. Every call is a single JSON POST
//! through the [`Relay`] trait; [`HttpRelay`] is the reqwest implementation.

pub mod docs;
pub mod executor;
pub mod explorer;
pub mod snippet;
pub mod transport;

#[cfg(test)]
mod mock;

pub use docs::DocsClient;
pub use executor::RequestExecutor;
pub use explorer::{Explorer, SendOutcome, SendTask, SnippetOutcome, SnippetTask};
pub use snippet::SnippetClient;
pub use transport::{EXECUTE_ROUTE, HttpRelay, PARSE_ROUTE, Relay, RelayReply, SNIPPET_ROUTE};
