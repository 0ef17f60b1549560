//! Image processing: planning, parameters and engines.
//!
//! | Operation | Built-in engine | Magick engines |
//! |---|---|---|
//! | **Identify** | `ImageReader` + GIF frame walk | `identify -format %m:%T:%s` |
//! | **Natural size** | `image::image_dimensions` | `identify -format "%w %h"` |
//! | **Resize / sample** | `resize_exact` (Lanczos3 / Nearest) | `-resize` / `-sample` |
//! | **Crop** | `crop_imm` at gravity offset | `-gravity … -crop` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Planner**: Decides the operation list for a (source, spec) pair
//! - **Backend**: [`ImageEngine`] trait, [`EngineKind`] and shared types
//! - **Engines**: [`RustEngine`] and [`MagickEngine`]

pub mod backend;
pub mod calculations;
pub mod magick_backend;
mod params;
pub mod planner;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EngineKind, ImageEngine, ImageInfo};
pub use magick_backend::MagickEngine;
pub use params::{Gravity, Operation, Quality, Sharpen, SizingMethod, TransformJob};
pub use planner::{Plan, plan};
pub use rust_backend::RustEngine;
