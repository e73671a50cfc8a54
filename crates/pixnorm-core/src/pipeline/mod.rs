//! Image normalization pipeline components.
//!
//! Stages, in the order an upload passes through them:
//! - **validate**: size, extension and content-type checks (no decoding)
//! - **decode**: bytes to canonical RGB, alpha blended onto white
//! - **resize**: fit into the target square with centered padding
//! - **grayscale**: luma on all three channels
//! - **encode**: JPEG at fixed quality
//! - **naming**: collision-free output names
//! - **report**: the result record
//!
//! **processor** orchestrates them; **discovery** finds inputs for batch runs.

pub mod decode;
pub mod discovery;
pub mod encode;
pub mod grayscale;
pub mod naming;
pub mod processor;
pub mod report;
pub mod resize;
pub mod validate;

// Re-exports for convenient access
pub use decode::{DecodedImage, ImageDecoder};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use processor::ImageProcessor;
pub use resize::{fit_to_square, Placement};
pub use validate::Validator;
