//! Local stand-ins for the account and spreadsheet services: JSON files on
//! disk, plus in-memory variants for tests.

pub mod json;
pub mod memory;
pub mod notify;
pub mod snapshot;

pub use json::JsonWorkbook;
pub use memory::InMemoryWorkbook;
pub use notify::LogNotifier;
pub use snapshot::AccountSnapshot;
