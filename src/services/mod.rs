//! Services behind the client: content type detection, filesystem access
//! and input normalization.

pub mod format;
pub mod io;
pub mod normalizer;

pub use io::{FileSystem, LocalFileSystem};
pub use normalizer::InputNormalizer;
