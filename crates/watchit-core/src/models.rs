mod media;
mod suggestion;

pub use media::{MediaKind, WatchlistEntry};
pub use suggestion::{Destination, SuggestionItem};
