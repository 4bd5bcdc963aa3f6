// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::fmt;

use crate::error::{Error, Result};
use crate::simd::Isa;

/// Default lower bound on the number of pixels handed to one worker by the parallel driver.
pub const DEFAULT_MIN_PIXELS_PER_TASK: usize = 16 * 1024;

/// Instruction set used by the kernel. This fixes the lane width of the bulk path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SimdLevel {
    /// Widest instruction set that is both compiled in and detected at runtime.
    #[default]
    Auto,
    /// Portable element-at-a-time implementation (lane width 1).
    Scalar,
    Sse42,
    Avx,
    Avx512,
    Neon,
}

impl SimdLevel {
    /// The instruction set a forced level names, `None` for `Auto`.
    pub fn isa(self) -> Option<Isa> {
        match self {
            SimdLevel::Auto => None,
            SimdLevel::Scalar => Some(Isa::Scalar),
            SimdLevel::Sse42 => Some(Isa::Sse42),
            SimdLevel::Avx => Some(Isa::Avx),
            SimdLevel::Avx512 => Some(Isa::Avx512),
            SimdLevel::Neon => Some(Isa::Neon),
        }
    }

    /// Returns the widest level usable on the running CPU, never `Auto`.
    pub fn detect() -> SimdLevel {
        Isa::widest_available().into()
    }

    pub fn is_available(self) -> bool {
        self.isa().is_none_or(Isa::is_available)
    }

    /// Replaces `Auto` with the detected level and checks that a forced level is usable.
    pub fn resolve(self) -> Result<SimdLevel> {
        match self {
            SimdLevel::Auto => Ok(SimdLevel::detect()),
            level if level.is_available() => Ok(level),
            level => Err(Error::SimdLevelUnavailable(level)),
        }
    }

    /// Number of `f32` values processed per vector operation.
    pub fn lane_width(self) -> usize {
        self.isa().unwrap_or_else(Isa::widest_available).lanes()
    }
}

impl From<Isa> for SimdLevel {
    fn from(isa: Isa) -> SimdLevel {
        match isa {
            Isa::Scalar => SimdLevel::Scalar,
            Isa::Sse42 => SimdLevel::Sse42,
            Isa::Avx => SimdLevel::Avx,
            Isa::Avx512 => SimdLevel::Avx512,
            Isa::Neon => SimdLevel::Neon,
        }
    }
}

impl fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.isa() {
            Some(isa) => fmt::Display::fmt(&isa, f),
            None => f.write_str("auto"),
        }
    }
}

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BurnOptions {
    pub simd_level: SimdLevel,
    /// Split the pixel range across the rayon thread pool. Ignored without the `parallel`
    /// feature.
    pub parallel: bool,
    /// Sub-ranges given to workers are at least this long, rounded up to a multiple of the lane
    /// width. Images no longer than this run on the calling thread.
    pub min_pixels_per_task: usize,
}

impl Default for BurnOptions {
    fn default() -> Self {
        Self {
            simd_level: SimdLevel::Auto,
            parallel: true,
            min_pixels_per_task: DEFAULT_MIN_PIXELS_PER_TASK,
        }
    }
}

impl BurnOptions {
    pub fn with_simd_level(mut self, simd_level: SimdLevel) -> Self {
        self.simd_level = simd_level;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_min_pixels_per_task(mut self, min_pixels_per_task: usize) -> Self {
        self.min_pixels_per_task = min_pixels_per_task;
        self
    }
}
