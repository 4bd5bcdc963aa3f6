// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![allow(unsafe_code)]

use std::arch::aarch64::*;
use std::arch::is_aarch64_feature_detected;

simd_vector!(
    isa: Neon,
    descriptor: NeonDescriptor,
    vector: F32VecNeon(float32x4_t; 4),
    feature: "neon",
    detected: cfg!(feature = "neon") && is_aarch64_feature_detected!("neon"),
    load: vld1q_f32,
    store: vst1q_f32,
    splat: vdupq_n_f32,
    // vminq_f32/vmaxq_f32 propagate NaN from either side, so compare and select instead.
    min: |a, b| vbslq_f32(vcltq_f32(a, b), a, b),
    max: |a, b| vbslq_f32(vcgtq_f32(a, b), a, b),
    ops: {
        Add::add => vaddq_f32,
        Sub::sub => vsubq_f32,
        Mul::mul => vmulq_f32,
        Div::div => vdivq_f32,
    },
);
