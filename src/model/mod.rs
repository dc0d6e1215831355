pub mod event;
pub mod region;

pub use event::{EventRecord, EventTable};
pub use region::{LocationError, Region};
