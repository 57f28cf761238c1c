//! Publication to the external knowledge store
//!
//! [`PublicationCoordinator`] stores a compiled op log, anchors its content
//! id in a space and sends the anchoring transaction. The outside services
//! sit behind the traits in [`traits`]; [`HttpAnchorService`],
//! [`FsContentStore`] and [`FsTransactionOutbox`] are the concrete
//! implementations shipped here, and [`mock`] holds in-memory stand-ins.

pub mod content_store;
pub mod coordinator;
pub mod debouncer;
pub mod http;
pub mod mock;
pub mod models;
pub mod outbox;
pub mod traits;

pub use content_store::FsContentStore;
pub use coordinator::PublicationCoordinator;
pub use debouncer::PublishDebouncer;
pub use http::HttpAnchorService;
pub use models::*;
pub use outbox::FsTransactionOutbox;
pub use traits::{AnchorService, ContentStore, NotePublisher, WalletSigner};
