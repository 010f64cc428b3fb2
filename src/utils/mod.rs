//! Small shared helpers.

pub mod mime;
pub mod path;
pub mod plural;
