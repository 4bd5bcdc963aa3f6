// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Lane-parallel `f32` arithmetic for the color burn kernel.
//!
//! A [`SimdDescriptor`] is a zero-sized value that can only be obtained after detecting its
//! instruction set at runtime. Kernels are written once, generic over the descriptor, and run
//! through [`with_isa`], which enters the matching `#[target_feature]` context.

use std::{
    fmt::{self, Debug},
    ops::{Add, Div, Mul, Sub},
};

#[macro_use]
mod macros;

#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(target_arch = "aarch64")]
mod aarch64;

mod scalar;

#[cfg(target_arch = "x86_64")]
pub use x86_64::{Avx512Descriptor, AvxDescriptor, Sse42Descriptor};

#[cfg(target_arch = "aarch64")]
pub use aarch64::NeonDescriptor;

pub use scalar::ScalarDescriptor;

/// Instruction sets a kernel can run on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Isa {
    Scalar,
    Sse42,
    Avx,
    Avx512,
    Neon,
}

impl Isa {
    /// All instruction sets, widest first.
    pub const ALL: [Isa; 5] = [Isa::Avx512, Isa::Avx, Isa::Sse42, Isa::Neon, Isa::Scalar];

    /// Number of `f32` lanes per vector.
    pub fn lanes(self) -> usize {
        match self {
            Isa::Scalar => 1,
            Isa::Sse42 | Isa::Neon => 4,
            Isa::Avx => 8,
            Isa::Avx512 => 16,
        }
    }

    /// Whether the instruction set is enabled in this build and detected on the running CPU.
    pub fn is_available(self) -> bool {
        match self {
            Isa::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            Isa::Sse42 => Sse42Descriptor::new().is_some(),
            #[cfg(target_arch = "x86_64")]
            Isa::Avx => AvxDescriptor::new().is_some(),
            #[cfg(target_arch = "x86_64")]
            Isa::Avx512 => Avx512Descriptor::new().is_some(),
            #[cfg(target_arch = "aarch64")]
            Isa::Neon => NeonDescriptor::new().is_some(),
            _ => false,
        }
    }

    pub fn widest_available() -> Isa {
        Isa::ALL
            .into_iter()
            .find(|isa| isa.is_available())
            .unwrap_or(Isa::Scalar)
    }
}

impl fmt::Display for Isa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Isa::Scalar => "scalar",
            Isa::Sse42 => "sse42",
            Isa::Avx => "avx",
            Isa::Avx512 => "avx512",
            Isa::Neon => "neon",
        })
    }
}

pub trait SimdDescriptor: Sized + Copy + Debug + Send + Sync {
    type F32Vec: F32SimdVec<Descriptor = Self>;

    const ISA: Isa;

    /// Returns a descriptor if the instruction set is enabled and detected.
    fn new() -> Option<Self>;

    /// Calls `f` inside a function compiled for this instruction set. Generic code that is
    /// `#[inline(always)]` all the way down from `f` is compiled with the feature enabled.
    fn call<R>(self, f: impl FnOnce(Self) -> R) -> R;
}

/// A vector of `F32SimdVec::LEN` lanes. Operators act lane by lane and are never fused.
pub trait F32SimdVec:
    Sized
    + Copy
    + Debug
    + Send
    + Sync
    + Add<Self, Output = Self>
    + Sub<Self, Output = Self>
    + Mul<Self, Output = Self>
    + Div<Self, Output = Self>
{
    type Descriptor: SimdDescriptor;

    const LEN: usize;

    /// Sets every lane to `v`.
    fn splat(d: Self::Descriptor, v: f32) -> Self;

    /// Reads the first `LEN` values of `mem`, which may have any alignment. Panics if
    /// `mem.len() < LEN`.
    fn load(d: Self::Descriptor, mem: &[f32]) -> Self;

    /// Writes the lanes to the first `LEN` values of `mem`. Panics if `mem.len() < LEN`.
    fn store(self, mem: &mut [f32]);

    /// Lane-wise `if self < other { self } else { other }`, so a NaN in either operand yields
    /// `other` on every instruction set.
    fn min(self, other: Self) -> Self;

    /// Lane-wise `if self > other { self } else { other }`, with the same NaN rule as `min`.
    fn max(self, other: Self) -> Self;
}

/// Code generic over the descriptor, run by [`with_isa`].
pub trait IsaVisitor {
    type Output;

    fn visit<D: SimdDescriptor>(self, d: D) -> Self::Output;
}

/// Runs `visitor` with the descriptor of `isa`, inside its target feature context.
///
/// Returns `None` if `isa` is not available.
pub fn with_isa<V: IsaVisitor>(isa: Isa, visitor: V) -> Option<V::Output> {
    #[inline(always)]
    fn enter<D: SimdDescriptor, V: IsaVisitor>(visitor: V) -> Option<V::Output> {
        let d = D::new()?;
        Some(d.call(
            #[inline(always)]
            |d| visitor.visit(d),
        ))
    }

    match isa {
        Isa::Scalar => enter::<ScalarDescriptor, V>(visitor),
        #[cfg(target_arch = "x86_64")]
        Isa::Sse42 => enter::<Sse42Descriptor, V>(visitor),
        #[cfg(target_arch = "x86_64")]
        Isa::Avx => enter::<AvxDescriptor, V>(visitor),
        #[cfg(target_arch = "x86_64")]
        Isa::Avx512 => enter::<Avx512Descriptor, V>(visitor),
        #[cfg(target_arch = "aarch64")]
        Isa::Neon => enter::<NeonDescriptor, V>(visitor),
        _ => None,
    }
}

/// Instantiates the generic test `$name<D: SimdDescriptor>(d: D)` once per [`Isa`], as
/// `$name_scalar`, `$name_sse42` and so on. Instruction sets the running CPU lacks pass
/// without running.
#[macro_export]
macro_rules! test_all_instruction_sets {
    ($name:ident) => {
        $crate::test_all_instruction_sets!(@each $name: Scalar, Sse42, Avx, Avx512, Neon);
    };
    (@each $name:ident: $($isa:ident),*) => {
        paste::paste! {
            $(
                #[test]
                fn [<$name _ $isa:lower>]() {
                    struct Run;
                    impl $crate::IsaVisitor for Run {
                        type Output = ();
                        fn visit<D: $crate::SimdDescriptor>(self, d: D) {
                            $name(d)
                        }
                    }
                    let _ = $crate::with_isa($crate::Isa::$isa, Run);
                }
            )*
        }
    };
}

#[cfg(test)]
mod test {
    use arbtest::arbitrary::{self, Unstructured};

    use crate::{F32SimdVec, Isa, IsaVisitor, ScalarDescriptor, SimdDescriptor, with_isa};

    #[derive(Clone, Copy)]
    enum Values {
        Any,
        NonZero,
        Channel,
    }

    fn arb_lanes(u: &mut Unstructured, len: usize, values: Values) -> arbitrary::Result<Vec<f32>> {
        (0..len)
            .map(|_| {
                Ok(match values {
                    Values::Any => u.arbitrary::<i32>()? as f32 / (1.0 + u.arbitrary::<u16>()? as f32),
                    Values::NonZero => {
                        let magnitude = (1.0 + u.arbitrary::<u16>()? as f32) / 64.0;
                        if u.arbitrary()? { magnitude } else { -magnitude }
                    }
                    Values::Channel => u.int_in_range(0..=255u8)? as f32,
                })
            })
            .collect()
    }

    /// Applies `op` to whole vectors of `D` and checks every lane against the scalar result.
    fn matches_scalar<D: SimdDescriptor>(
        d: D,
        (a_values, b_values): (Values, Values),
        op: fn(D::F32Vec, D::F32Vec) -> D::F32Vec,
        scalar_op: fn(f32, f32) -> f32,
    ) {
        let lanes = D::F32Vec::LEN;
        arbtest::arbtest(|u| {
            let a = arb_lanes(u, 3 * lanes, a_values)?;
            let b = arb_lanes(u, 3 * lanes, b_values)?;
            let mut out = vec![0.0; 3 * lanes];
            for ((a, b), out) in a
                .chunks_exact(lanes)
                .zip(b.chunks_exact(lanes))
                .zip(out.chunks_exact_mut(lanes))
            {
                op(D::F32Vec::load(d, a), D::F32Vec::load(d, b)).store(out);
            }
            for ((a, b), got) in a.iter().zip(&b).zip(&out) {
                let expected = scalar_op(*a, *b);
                assert_eq!(
                    got.to_bits(),
                    expected.to_bits(),
                    "{:?}: op({a}, {b}) = {got}, scalar {expected}",
                    D::ISA
                );
            }
            Ok(())
        })
        .size_min(256);
    }

    fn arithmetic_matches_scalar<D: SimdDescriptor>(d: D) {
        matches_scalar(d, (Values::Any, Values::Any), |a, b| a + b, |a, b| a + b);
        matches_scalar(d, (Values::Any, Values::Any), |a, b| a - b, |a, b| a - b);
        matches_scalar(d, (Values::Any, Values::Any), |a, b| a * b, |a, b| a * b);
        matches_scalar(d, (Values::Any, Values::NonZero), |a, b| a / b, |a, b| a / b);
        matches_scalar(d, (Values::Channel, Values::NonZero), |a, b| a / b, |a, b| a / b);
    }
    test_all_instruction_sets!(arithmetic_matches_scalar);

    fn min_max_match_scalar<D: SimdDescriptor>(d: D) {
        let scalar_min = |a: f32, b: f32| F32SimdVec::min(a, b);
        let scalar_max = |a: f32, b: f32| F32SimdVec::max(a, b);
        matches_scalar(d, (Values::Any, Values::Any), |a, b| a.min(b), scalar_min);
        matches_scalar(d, (Values::Any, Values::Any), |a, b| a.max(b), scalar_max);
        matches_scalar(d, (Values::Channel, Values::Channel), |a, b| a.min(b), scalar_min);
    }
    test_all_instruction_sets!(min_max_match_scalar);

    fn min_max_nan_returns_other<D: SimdDescriptor>(d: D) {
        let nan = D::F32Vec::splat(d, f32::NAN);
        let one = D::F32Vec::splat(d, 1.0);
        let mut out = vec![0.0f32; D::F32Vec::LEN];

        nan.min(one).store(&mut out);
        assert!(out.iter().all(|&v| v == 1.0), "min(NaN, 1) = {out:?}");
        nan.max(one).store(&mut out);
        assert!(out.iter().all(|&v| v == 1.0), "max(NaN, 1) = {out:?}");
        one.min(nan).store(&mut out);
        assert!(out.iter().all(|v| v.is_nan()), "min(1, NaN) = {out:?}");
        one.max(nan).store(&mut out);
        assert!(out.iter().all(|v| v.is_nan()), "max(1, NaN) = {out:?}");
    }
    test_all_instruction_sets!(min_max_nan_returns_other);

    fn splat_fills_every_lane<D: SimdDescriptor>(d: D) {
        let mut out = vec![-1.0f32; D::F32Vec::LEN + 1];
        D::F32Vec::splat(d, 255.0).store(&mut out);
        assert!(out[..D::F32Vec::LEN].iter().all(|&v| v == 255.0));
        assert_eq!(out[D::F32Vec::LEN], -1.0, "store wrote past one vector");
    }
    test_all_instruction_sets!(splat_fills_every_lane);

    fn load_store_at_any_offset<D: SimdDescriptor>(d: D) {
        let len = D::F32Vec::LEN;
        let input: Vec<f32> = (0..2 * len + 1).map(|i| i as f32).collect();
        for offset in 0..=len {
            let mut output = vec![0.0f32; 2 * len + 1];
            D::F32Vec::load(d, &input[offset..]).store(&mut output[offset..]);
            assert_eq!(&output[offset..offset + len], &input[offset..offset + len]);
        }
    }
    test_all_instruction_sets!(load_store_at_any_offset);

    fn short_load_panics<D: SimdDescriptor>(d: D) {
        let input = vec![0.0f32; D::F32Vec::LEN - 1];
        let result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| D::F32Vec::load(d, &input)));
        assert!(result.is_err());
    }
    test_all_instruction_sets!(short_load_panics);

    fn call_passes_captures<D: SimdDescriptor>(d: D) {
        let input = vec![2.0f32; D::F32Vec::LEN * 3];
        let mut output = vec![0.0f32; input.len()];
        let scale = 3.0;
        d.call(|d| {
            for (src, dst) in input
                .chunks_exact(D::F32Vec::LEN)
                .zip(output.chunks_exact_mut(D::F32Vec::LEN))
            {
                (D::F32Vec::load(d, src) * D::F32Vec::splat(d, scale)).store(dst);
            }
        });
        assert!(output.iter().all(|&v| v == 6.0));
    }
    test_all_instruction_sets!(call_passes_captures);

    #[test]
    fn lanes_match_descriptors() {
        struct Lanes;
        impl IsaVisitor for Lanes {
            type Output = (Isa, usize);
            fn visit<D: SimdDescriptor>(self, _d: D) -> (Isa, usize) {
                (D::ISA, D::F32Vec::LEN)
            }
        }
        for isa in Isa::ALL {
            if let Some((visited, lanes)) = with_isa(isa, Lanes) {
                assert_eq!(visited, isa);
                assert_eq!(lanes, isa.lanes());
            } else {
                assert!(!isa.is_available());
            }
        }
    }

    #[test]
    fn scalar_is_always_available() {
        assert!(Isa::Scalar.is_available());
        assert!(ScalarDescriptor::new().is_some());
        assert!(Isa::widest_available().is_available());
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn neon_is_unavailable_on_x86() {
        assert!(!Isa::Neon.is_available());
        struct Nothing;
        impl IsaVisitor for Nothing {
            type Output = ();
            fn visit<D: SimdDescriptor>(self, _d: D) {}
        }
        assert!(with_isa(Isa::Neon, Nothing).is_none());
    }
}
