// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::options::SimdLevel;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("Image sizes aren't the same: {0}x{1} vs {2}x{3}")]
    ImageSizeMismatch(usize, usize, usize, usize),
    #[error("Images have different number of channels: {0} vs {1}")]
    ChannelCountMismatch(usize, usize),
    #[error("Only RGB images (3 channels) are supported, found {0} channels")]
    UnsupportedChannelCount(usize),
    #[error("Channel length mismatch: expected {expected} values, found {found}")]
    ChannelLengthMismatch { expected: usize, found: usize },
    #[error("Image size too large: {0}x{1}")]
    ImageSizeTooLarge(usize, usize),
    #[error("Out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),
    #[error("SIMD level {0} is not available on this CPU or build")]
    SimdLevelUnavailable(SimdLevel),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
