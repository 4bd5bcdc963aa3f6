// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use super::{F32SimdVec, Isa, SimdDescriptor};

/// One lane per vector: plain `f32` arithmetic, available everywhere.
#[derive(Clone, Copy, Debug)]
pub struct ScalarDescriptor;

impl SimdDescriptor for ScalarDescriptor {
    type F32Vec = f32;

    const ISA: Isa = Isa::Scalar;

    fn new() -> Option<Self> {
        Some(Self)
    }

    fn call<R>(self, f: impl FnOnce(Self) -> R) -> R {
        f(self)
    }
}

impl F32SimdVec for f32 {
    type Descriptor = ScalarDescriptor;

    const LEN: usize = 1;

    #[inline(always)]
    fn splat(_d: ScalarDescriptor, v: f32) -> f32 {
        v
    }

    #[inline(always)]
    fn load(_d: ScalarDescriptor, mem: &[f32]) -> f32 {
        mem[0]
    }

    #[inline(always)]
    fn store(self, mem: &mut [f32]) {
        mem[0] = self;
    }

    // Not `f32::min`/`f32::max`: those return the non-NaN operand.
    #[inline(always)]
    fn min(self, other: f32) -> f32 {
        if self < other { self } else { other }
    }

    #[inline(always)]
    fn max(self, other: f32) -> f32 {
        if self > other { self } else { other }
    }
}
