//! Pipeline stages for one resume evaluation.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ encode ──▶ llm ──▶ verdict
//! (path/URL) (page 1)   (JPEG)   (VLM)   (match only)
//! ```
//!
//! 1. [`input`]  : load the resume bytes from a path or URL
//! 2. [`render`] : rasterise page 1 in `spawn_blocking`
//! 3. [`encode`] : JPEG-encode the page into a `PreviewImage`
//! 4. [`llm`]    : one request to the model; the only stage with network I/O
//! 5. [`verdict`]: parse the first `N%` of a match reply

pub mod encode;
pub mod input;
pub mod llm;
pub mod render;
pub mod verdict;
