// Entity Models
//
// Entry is the only persisted entity. Source is the closed set of places a
// saved amount can live.

pub mod entry;
pub mod source;

pub use entry::{Amount, Entry, EntryId, MAX_SUM};
pub use source::{Source, UnknownSource};
