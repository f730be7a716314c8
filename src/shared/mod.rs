//! Cross-cutting helpers: errors, lenient decoding, text utilities

pub mod decode;
pub mod errors;
pub mod text;

pub use decode::*;
pub use errors::*;
pub use text::*;
