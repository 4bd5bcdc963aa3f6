// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Checked entry points: shape validation, instruction set selection and the parallel driver.

use std::time::{Duration, Instant};

use crate::{
    error::{Error, Result},
    image::PlanarImage,
    kernel::{bulk_len, burn_rgb},
    options::{BurnOptions, SimdLevel},
    planes::{RGB_CHANNELS, RgbPlanes, RgbPlanesMut},
    simd::{F32SimdVec, IsaVisitor, SimdDescriptor, with_isa},
    util::tracing_wrappers::*,
};

/// Summary of one blend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnReport {
    pub simd_level: SimdLevel,
    pub lane_width: usize,
    pub pixel_count: usize,
    /// Pixels per channel handled by full vectors.
    pub bulk_pixels: usize,
    /// Pixels per channel handled by the scalar fallback, always less than `lane_width`.
    pub remainder_pixels: usize,
    /// Number of sub-ranges the pixel range was split into.
    pub tasks: usize,
    pub elapsed: Duration,
}

/// Rounds `min_pixels` up to a non-zero multiple of `lanes`, so that only the last task of a
/// parallel run has a scalar remainder. `None` if the rounded length does not fit in `usize`, in
/// which case no image is large enough to be split.
#[cfg(feature = "parallel")]
fn task_len(min_pixels: usize, lanes: usize) -> Option<usize> {
    min_pixels.max(1).checked_next_multiple_of(lanes)
}

#[cfg(feature = "parallel")]
fn burn_parallel<D: SimdDescriptor>(
    d: D,
    src1: RgbPlanes<'_>,
    src2: RgbPlanes<'_>,
    dst: RgbPlanesMut<'_>,
    task_len: usize,
) -> Result<usize> {
    use rayon::prelude::*;

    let [r, g, b] = dst.into_channels();
    let tasks = r.len().div_ceil(task_len);
    r.par_chunks_mut(task_len)
        .zip(g.par_chunks_mut(task_len))
        .zip(b.par_chunks_mut(task_len))
        .enumerate()
        .try_for_each(|(i, ((r, g), b))| -> Result<()> {
            let start = i * task_len;
            let range = start..start + r.len();
            trace!(task = i, pixels = r.len(), "burn task");
            let mut dst = RgbPlanesMut::new(r, g, b)?;
            let (src1, src2) = (src1.slice(range.clone()), src2.slice(range));
            // Worker threads start outside the target feature context.
            d.call(
                #[inline(always)]
                |d| burn_rgb(d, src1, src2, &mut dst),
            );
            Ok(())
        })?;
    Ok(tasks)
}

/// Runs the kernel on one instruction set and reports how the pixel range was split.
struct Driver<'s, 'd, 'o> {
    simd_level: SimdLevel,
    src1: RgbPlanes<'s>,
    src2: RgbPlanes<'s>,
    dst: RgbPlanesMut<'d>,
    options: &'o BurnOptions,
}

impl IsaVisitor for Driver<'_, '_, '_> {
    type Output = Result<BurnReport>;

    #[inline(always)]
    fn visit<D: SimdDescriptor>(self, d: D) -> Result<BurnReport> {
        let Driver {
            simd_level,
            src1,
            src2,
            mut dst,
            options,
        } = self;
        let start = Instant::now();
        let pixel_count = dst.pixel_count();
        let bulk_pixels = bulk_len(d, pixel_count);
        let mut report = BurnReport {
            simd_level,
            lane_width: D::F32Vec::LEN,
            pixel_count,
            bulk_pixels,
            remainder_pixels: pixel_count - bulk_pixels,
            tasks: 1,
            elapsed: Duration::ZERO,
        };

        #[cfg(feature = "parallel")]
        {
            let task_len = task_len(options.min_pixels_per_task, D::F32Vec::LEN)
                .filter(|&len| options.parallel && pixel_count > len);
            if let Some(task_len) = task_len {
                report.tasks = burn_parallel(d, src1, src2, dst, task_len)?;
                report.elapsed = start.elapsed();
                return Ok(report);
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = options;

        burn_rgb(d, src1, src2, &mut dst);
        report.elapsed = start.elapsed();
        Ok(report)
    }
}

fn check_len(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::ChannelLengthMismatch { expected, found });
    }
    Ok(())
}

/// Blends `src1` and `src2` into `dst`, channel by channel.
///
/// All nine channels must hold the same number of values. The destination may not alias either
/// source, which the borrow checker guarantees.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, err, fields(pixels = dst.pixel_count()))
)]
pub fn burn_planes(
    src1: RgbPlanes<'_>,
    src2: RgbPlanes<'_>,
    dst: RgbPlanesMut<'_>,
    options: &BurnOptions,
) -> Result<BurnReport> {
    let pixel_count = dst.pixel_count();
    check_len(pixel_count, src1.pixel_count())?;
    check_len(pixel_count, src2.pixel_count())?;

    let simd_level = options.simd_level.resolve()?;
    let unavailable = || Error::SimdLevelUnavailable(simd_level);
    let isa = simd_level.isa().ok_or_else(unavailable)?;
    let driver = Driver {
        simd_level,
        src1,
        src2,
        dst,
        options,
    };
    let report = with_isa(isa, driver).ok_or_else(unavailable)??;
    debug!(
        simd_level = %report.simd_level,
        lane_width = report.lane_width,
        bulk_pixels = report.bulk_pixels,
        remainder_pixels = report.remainder_pixels,
        tasks = report.tasks,
        elapsed_ms = report.elapsed.as_secs_f64() * 1000.0,
        "color burn done"
    );
    Ok(report)
}

/// Blends two images of the same size into a newly allocated image.
///
/// Checks run in order: dimensions, channel counts, then that both images are RGB.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, err, fields(size = ?src1.size()))
)]
pub fn burn_images(
    src1: &PlanarImage,
    src2: &PlanarImage,
    options: &BurnOptions,
) -> Result<PlanarImage> {
    if src1.size() != src2.size() {
        return Err(Error::ImageSizeMismatch(
            src1.width(),
            src1.height(),
            src2.width(),
            src2.height(),
        ));
    }
    if src1.channels() != src2.channels() {
        return Err(Error::ChannelCountMismatch(
            src1.channels(),
            src2.channels(),
        ));
    }
    if src1.channels() != RGB_CHANNELS {
        return Err(Error::UnsupportedChannelCount(src1.channels()));
    }

    let mut dst = PlanarImage::new(src1.width(), src1.height(), RGB_CHANNELS)?;
    burn_planes(src1.planes()?, src2.planes()?, dst.planes_mut()?, options)?;
    Ok(dst)
}
