//! Cache directory collaborators
//!
//! The orchestrator only ever reads a base directory from a [`CacheLocation`]
//! and tests or creates the completion marker inside it.
//!
//! # Marker States
//!
//! | Marker | Rebuild hint | Description |
//! |--------|--------------|-------------|
//! | absent | true | Never built here, or the last build failed |
//! | present | false | A previous build completed successfully |

pub mod location;
pub mod marker;

pub use location::{CacheLocation, DirCache};
pub use marker::{CompletionMarker, MARKER_FILE_NAME};
