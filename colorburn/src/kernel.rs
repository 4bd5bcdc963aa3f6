// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The color burn kernel.
//!
//! For each channel value pair `(a, b)` of the two sources the kernel computes
//! `clamp(255 - 256 * (255 - b) / (a + 1), 0, 255)`. Each channel is processed as a bulk of full
//! vectors followed by a scalar remainder of `len % LEN` values. Both parts run [`burn_lane`], so
//! every instruction set produces the same bits as the scalar path.
//!
//! Slices passed here must have matching lengths; mismatches panic. Use
//! [`crate::burn::burn_planes`] for a checked entry point.

use crate::planes::{RgbPlanes, RgbPlanesMut};
use crate::simd::{F32SimdVec, Isa, IsaVisitor, ScalarDescriptor, SimdDescriptor, with_isa};

/// Added to the first source so that the divisor is at least 1.
pub const SRC1_OFFSET: f32 = 1.0;
pub const CHANNEL_MAX: f32 = 255.0;
pub const CHANNEL_MIN: f32 = 0.0;
pub const SCALE: f32 = 256.0;

/// Applies the color burn formula to one vector of values.
///
/// Operations are evaluated one at a time, without fused multiply-add, in the order
/// `step1 = a + 1`, `step2 = 255 - b`, `step3 = 256 * step2`, `step4 = step3 / step1`,
/// `step5 = 255 - step4`, then `max(0, min(step5, 255))`. A NaN `step5` clamps to 255.
#[inline(always)]
pub fn burn_lane<D: SimdDescriptor>(d: D, src1: D::F32Vec, src2: D::F32Vec) -> D::F32Vec {
    let channel_max = D::F32Vec::splat(d, CHANNEL_MAX);
    let step1 = src1 + D::F32Vec::splat(d, SRC1_OFFSET);
    let step2 = channel_max - src2;
    let step3 = D::F32Vec::splat(d, SCALE) * step2;
    let step4 = step3 / step1;
    let step5 = channel_max - step4;
    D::F32Vec::splat(d, CHANNEL_MIN).max(step5.min(channel_max))
}

/// Number of values per channel covered by full vectors of `D`.
#[inline(always)]
pub fn bulk_len<D: SimdDescriptor>(_d: D, pixel_count: usize) -> usize {
    pixel_count - pixel_count % D::F32Vec::LEN
}

/// Blends one channel: `dst[i] = burn(src1[i], src2[i])` for every `i`.
#[inline(always)]
pub fn burn_channel<D: SimdDescriptor>(d: D, src1: &[f32], src2: &[f32], dst: &mut [f32]) {
    let pixel_count = dst.len();
    assert_eq!(src1.len(), pixel_count);
    assert_eq!(src2.len(), pixel_count);

    let len = D::F32Vec::LEN;
    let bulk = bulk_len(d, pixel_count);
    let (src1_bulk, src1_rest) = src1.split_at(bulk);
    let (src2_bulk, src2_rest) = src2.split_at(bulk);
    let (dst_bulk, dst_rest) = dst.split_at_mut(bulk);

    for ((chunk1, chunk2), chunk_out) in src1_bulk
        .chunks_exact(len)
        .zip(src2_bulk.chunks_exact(len))
        .zip(dst_bulk.chunks_exact_mut(len))
    {
        let v1 = D::F32Vec::load(d, chunk1);
        let v2 = D::F32Vec::load(d, chunk2);
        burn_lane(d, v1, v2).store(chunk_out);
    }

    // Scalar fallback for remainder
    for ((v1, v2), out) in src1_rest.iter().zip(src2_rest).zip(dst_rest) {
        *out = burn_lane(ScalarDescriptor, *v1, *v2);
    }
}

/// Blends all three channels of `src1` and `src2` into `dst`.
#[inline(always)]
pub fn burn_rgb<D: SimdDescriptor>(
    d: D,
    src1: RgbPlanes<'_>,
    src2: RgbPlanes<'_>,
    dst: &mut RgbPlanesMut<'_>,
) {
    let channels = src1.channels().into_iter().zip(src2.channels());
    for ((channel1, channel2), channel_out) in channels.zip(dst.channels_mut()) {
        burn_channel(d, channel1, channel2, channel_out);
    }
}

struct BurnChannel<'a> {
    src1: &'a [f32],
    src2: &'a [f32],
    dst: &'a mut [f32],
}

impl IsaVisitor for BurnChannel<'_> {
    type Output = ();

    #[inline(always)]
    fn visit<D: SimdDescriptor>(self, d: D) {
        burn_channel(d, self.src1, self.src2, self.dst)
    }
}

struct BurnRgb<'s, 'd, 'p> {
    src1: RgbPlanes<'s>,
    src2: RgbPlanes<'s>,
    dst: &'d mut RgbPlanesMut<'p>,
}

impl IsaVisitor for BurnRgb<'_, '_, '_> {
    type Output = ();

    #[inline(always)]
    fn visit<D: SimdDescriptor>(self, d: D) {
        burn_rgb(d, self.src1, self.src2, self.dst)
    }
}

/// [`burn_channel`] on the widest instruction set of the running CPU.
pub fn burn_channel_dispatch(src1: &[f32], src2: &[f32], dst: &mut [f32]) {
    // The widest available set always has a descriptor.
    let _ = with_isa(Isa::widest_available(), BurnChannel { src1, src2, dst });
}

/// [`burn_rgb`] on the widest instruction set of the running CPU.
pub fn burn_rgb_dispatch(src1: RgbPlanes<'_>, src2: RgbPlanes<'_>, dst: &mut RgbPlanesMut<'_>) {
    let _ = with_isa(Isa::widest_available(), BurnRgb { src1, src2, dst });
}
