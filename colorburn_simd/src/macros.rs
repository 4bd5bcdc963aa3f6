// Copyright (c) the colorburn authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

/// Defines a function whose body is compiled with `$feature` enabled.
///
/// The body may only be reached through values of a descriptor or vector type of the same
/// instruction set, and those only exist once the feature has been detected.
#[allow(unused_macros)]
macro_rules! feature_fn {
    (
        $feature:literal,
        fn $name:ident(self: $self_ty:ty as $this:ident $(, $arg:ident: $ty:ty)* $(,)?)
            $(-> $ret:ty)? $body:block
    ) => {
        #[inline(always)]
        fn $name(self $(, $arg: $ty)*) $(-> $ret)? {
            #[target_feature(enable = $feature)]
            #[inline]
            fn inner($this: $self_ty $(, $arg: $ty)*) $(-> $ret)? $body
            // SAFETY: the vector exists, so the feature was detected.
            unsafe { inner(self $(, $arg)*) }
        }
    };
    (
        $feature:literal,
        fn $name:ident($proof:ident: $proof_ty:ty $(, $arg:ident: $ty:ty)* $(,)?)
            $(-> $ret:ty)? $body:block
    ) => {
        #[inline(always)]
        fn $name($proof: $proof_ty $(, $arg: $ty)*) $(-> $ret)? {
            #[target_feature(enable = $feature)]
            #[inline]
            fn inner($proof: $proof_ty $(, $arg: $ty)*) $(-> $ret)? $body
            // SAFETY: the descriptor argument exists, so the feature was detected.
            unsafe { inner($proof $(, $arg)*) }
        }
    };
}

/// Defines a descriptor and its vector type for one instruction set.
///
/// `min`/`max` are given as expressions over the raw registers and must implement
/// `if a < b { a } else { b }` (resp. `>`), returning `b` when either lane is NaN.
#[allow(unused_macros)]
macro_rules! simd_vector {
    (
        isa: $isa:ident,
        descriptor: $descr:ident,
        vector: $vec:ident($raw:ty; $lanes:literal),
        feature: $feature:literal,
        detected: $detected:expr,
        load: $load:ident,
        store: $store:ident,
        splat: $splat:ident,
        min: |$min_a:ident, $min_b:ident| $min:expr,
        max: |$max_a:ident, $max_b:ident| $max:expr,
        ops: { $($op:ident::$method:ident => $intrinsic:ident),* $(,)? } $(,)?
    ) => {
        #[doc = concat!("Proof that `", $feature, "` is available on the running CPU.")]
        #[derive(Clone, Copy, Debug)]
        pub struct $descr(());

        impl $crate::SimdDescriptor for $descr {
            type F32Vec = $vec;

            const ISA: $crate::Isa = $crate::Isa::$isa;

            fn new() -> Option<Self> {
                ($detected).then_some(Self(()))
            }

            fn call<R>(self, f: impl FnOnce(Self) -> R) -> R {
                #[target_feature(enable = $feature)]
                #[inline(never)]
                fn entered<R>(d: $descr, f: impl FnOnce($descr) -> R) -> R {
                    f(d)
                }
                // SAFETY: the descriptor exists, so the feature was detected.
                unsafe { entered(self, f) }
            }
        }

        #[derive(Clone, Copy, Debug)]
        pub struct $vec($raw, $descr);

        impl $crate::F32SimdVec for $vec {
            type Descriptor = $descr;

            const LEN: usize = $lanes;

            feature_fn!($feature, fn splat(d: $descr, v: f32) -> $vec {
                $vec($splat(v), d)
            });

            feature_fn!($feature, fn load(d: $descr, mem: &[f32]) -> $vec {
                assert!(mem.len() >= $lanes);
                // SAFETY: `mem` holds a full vector and the load has no alignment requirement.
                $vec(unsafe { $load(mem.as_ptr()) }, d)
            });

            feature_fn!($feature, fn store(self: $vec as this, mem: &mut [f32]) {
                assert!(mem.len() >= $lanes);
                // SAFETY: `mem` holds a full vector and the store has no alignment requirement.
                unsafe { $store(mem.as_mut_ptr(), this.0) }
            });

            feature_fn!($feature, fn min(self: $vec as this, other: $vec) -> $vec {
                let ($min_a, $min_b) = (this.0, other.0);
                $vec($min, this.1)
            });

            feature_fn!($feature, fn max(self: $vec as this, other: $vec) -> $vec {
                let ($max_a, $max_b) = (this.0, other.0);
                $vec($max, this.1)
            });
        }

        $(
            impl ::std::ops::$op for $vec {
                type Output = $vec;

                feature_fn!($feature, fn $method(self: $vec as this, rhs: $vec) -> $vec {
                    $vec($intrinsic(this.0, rhs.0), this.1)
                });
            }
        )*
    };
}
