//! Domain types shared by the client, validator, interpreter and poll loop.

pub mod cursor;
pub mod snapshot;
pub mod status;

pub use cursor::Cursor;
pub use snapshot::{StatusSnapshot, TrackedItemRecord};
pub use status::HomeworkStatus;
