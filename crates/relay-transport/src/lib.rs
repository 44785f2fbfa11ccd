//! # relay-transport — The Request Envelope
//!
//! A [`Transport`] is created once per inbound request and carries
//! everything handlers produce for the platform: business data, files,
//! relations, links, declared calls, transaction instructions and errors.
//!
//! ## Ledgers
//!
//! | Module         | Ledger                  | Grouped by                   |
//! |----------------|-------------------------|------------------------------|
//! | `data`         | [`TransportData`]       | service -> version -> action |
//! | `files`        | [`TransportFiles`]      | service -> version -> action |
//! | `relations`    | [`TransportRelations`]  | declaration order            |
//! | `links`        | [`TransportLinks`]      | declaration order            |
//! | `calls`        | [`TransportCalls`]      | declaration order            |
//! | `transactions` | [`TransportTransactions`] | declaration order          |
//! | `errors`       | [`TransportErrors`]     | declaration order            |
//!
//! Every ledger is append-only for the lifetime of a request.
//!
//! ## Crate Policy
//!
//! - Depends only on `relay-core` internally.
//! - Declares calls and transactions; never executes them.
//! - The serialized form omits empty ledgers.

pub mod calls;
pub mod data;
pub mod envelope;
pub mod errors;
pub mod files;
pub mod links;
pub mod meta;
pub mod relations;
pub mod transactions;

pub use calls::{Call, CallKind, CallTarget, TransportCalls, DEFAULT_CALL_TIMEOUT};
pub use data::TransportData;
pub use envelope::Transport;
pub use errors::{ErrorRecord, TransportErrors, DEFAULT_ERROR_STATUS};
pub use files::{File, TransportFiles};
pub use links::{Link, TransportLinks};
pub use meta::{Origin, TransportMeta};
pub use relations::{ForeignKeys, Relation, TransportRelations};
pub use transactions::{Transaction, TransactionKind, TransportTransactions};
