pub mod controller;
pub mod reducer;
pub mod transport;

pub use controller::{ClearOutcome, SubmitOutcome, ThreadController, BANNER_TIMEOUT};
pub use reducer::{reduce, Action, Banner, EntryStatus, Route, ThreadEntry, ThreadView};
pub use transport::{HttpTransport, ThreadTransport, TransportError, GENERIC_FAILURE_MESSAGE};
