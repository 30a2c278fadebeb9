//! Satellite quadrant collages: four images in, one composite out, with the
//! acquisition time from each file name burned into its quadrant.

pub mod catalog;
pub mod collage;
pub mod config;
pub mod font;
pub mod gui_app;
pub mod test_image_gen;
pub mod timestamp;
pub mod web;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `RUST_LOG` selects the level,
/// `info` otherwise. Does nothing if a subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
