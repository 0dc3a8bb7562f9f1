//! # Agrozone Colormap
//!
//! Color mapping and raster-to-RGBA rendering for index map overlays.
//!
//! Each vegetation index has a fixed multi-stop color scheme; the main
//! entry points are [`raster_to_rgba`], which converts a `Raster<f32>`
//! into an RGBA pixel buffer with masked pixels transparent, and
//! [`write_png`], which encodes that buffer for use as a web-map
//! overlay.

mod render;
mod scheme;

pub use render::{raster_to_rgba, write_png, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
