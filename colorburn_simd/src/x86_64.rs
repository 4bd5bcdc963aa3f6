// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#![allow(unsafe_code)]

use std::arch::is_x86_feature_detected;
use std::arch::x86_64::*;

// minps/maxps return the second operand when either lane is NaN, which is the rule every
// descriptor follows.

simd_vector!(
    isa: Sse42,
    descriptor: Sse42Descriptor,
    vector: F32VecSse42(__m128; 4),
    feature: "sse4.2",
    detected: cfg!(feature = "sse42") && is_x86_feature_detected!("sse4.2"),
    load: _mm_loadu_ps,
    store: _mm_storeu_ps,
    splat: _mm_set1_ps,
    min: |a, b| _mm_min_ps(a, b),
    max: |a, b| _mm_max_ps(a, b),
    ops: {
        Add::add => _mm_add_ps,
        Sub::sub => _mm_sub_ps,
        Mul::mul => _mm_mul_ps,
        Div::div => _mm_div_ps,
    },
);

simd_vector!(
    isa: Avx,
    descriptor: AvxDescriptor,
    vector: F32VecAvx(__m256; 8),
    feature: "avx",
    detected: cfg!(feature = "avx") && is_x86_feature_detected!("avx"),
    load: _mm256_loadu_ps,
    store: _mm256_storeu_ps,
    splat: _mm256_set1_ps,
    min: |a, b| _mm256_min_ps(a, b),
    max: |a, b| _mm256_max_ps(a, b),
    ops: {
        Add::add => _mm256_add_ps,
        Sub::sub => _mm256_sub_ps,
        Mul::mul => _mm256_mul_ps,
        Div::div => _mm256_div_ps,
    },
);

simd_vector!(
    isa: Avx512,
    descriptor: Avx512Descriptor,
    vector: F32VecAvx512(__m512; 16),
    feature: "avx512f",
    detected: cfg!(feature = "avx512") && is_x86_feature_detected!("avx512f"),
    load: _mm512_loadu_ps,
    store: _mm512_storeu_ps,
    splat: _mm512_set1_ps,
    min: |a, b| _mm512_min_ps(a, b),
    max: |a, b| _mm512_max_ps(a, b),
    ops: {
        Add::add => _mm512_add_ps,
        Sub::sub => _mm512_sub_ps,
        Mul::mul => _mm512_mul_ps,
        Div::div => _mm512_div_ps,
    },
);
