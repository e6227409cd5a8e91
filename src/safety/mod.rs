//! Safety helpers applied to accepted values.

pub mod sanitizer;

pub use sanitizer::{sanitize, strip_xss, SanitizedOutput};
