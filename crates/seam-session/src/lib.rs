//! Session persistence for threads: conversation history, out-of-band state,
//! and pending interrupt markers, behind a pluggable async store contract.
#![allow(missing_docs)]

mod file;
mod locks;
mod memory;
mod session;
mod store;

pub use file::FileStore;
pub use locks::ThreadLocks;
pub use memory::MemoryStore;
pub use session::{PendingInterrupt, Session, SessionMetadata};
pub use store::{
    Committed, SessionHead, SessionReader, SessionStore, SessionStoreError, SessionWriter, Version,
};
