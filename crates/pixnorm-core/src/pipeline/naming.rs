//! Output file naming.
//!
//! Names look like `processed_20240131_142501_3f9a0c1b22de.jpg`: a local
//! timestamp with second granularity followed by 48 random bits, so names
//! minted in the same second still differ.

use chrono::{DateTime, Local, TimeZone};
use rand::Rng;

use crate::types::OUTPUT_EXTENSION;

const PREFIX: &str = "processed_";

/// Generate an output name for an upload using the current time.
pub fn generate_name(original_filename: &str) -> String {
    generate_name_with(original_filename, Local::now(), &mut rand::thread_rng())
}

/// Generate an output name from an explicit clock value and randomness source.
///
/// The original filename does not influence the name: the extension is always
/// the encoder's.
pub fn generate_name_with<Tz, R>(original_filename: &str, now: DateTime<Tz>, rng: &mut R) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    R: Rng,
{
    let token: u64 = rng.gen::<u64>() & 0xFFFF_FFFF_FFFF;
    let name = format!(
        "{}{}_{:012x}.{}",
        PREFIX,
        now.format("%Y%m%d_%H%M%S"),
        token,
        OUTPUT_EXTENSION
    );
    tracing::trace!("Named output for {:?}: {}", original_filename, name);
    name
}

/// Whether a file name was produced by this module.
pub fn is_output_name(name: &str) -> bool {
    name.starts_with(PREFIX) && name.ends_with(&format!(".{}", OUTPUT_EXTENSION))
}
