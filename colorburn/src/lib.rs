// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Color burn blending of planar RGB images.
//!
//! Every output value is `clamp(255 - 256 * (255 - b) / (a + 1), 0, 255)`, where `a` and `b` are
//! the co-located values of the first and second source. The kernel runs on the widest
//! instruction set available and falls back to scalar code for the tail of each channel.

#![deny(unsafe_code)]
pub mod burn;
pub mod error;
pub mod image;
pub mod kernel;
pub mod options;
pub mod planes;
pub mod util;

pub use colorburn_simd as simd;

pub use burn::{BurnReport, burn_images, burn_planes};
pub use error::{Error, Result};
pub use image::PlanarImage;
pub use options::{BurnOptions, SimdLevel};
pub use planes::{RgbPlanes, RgbPlanesMut};
