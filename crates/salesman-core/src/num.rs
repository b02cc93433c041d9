// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Saturating Counter Arithmetic
//!
//! Search statistics are accumulated over billions of events and combined with
//! factorial weights that overflow `u64` for modest graph sizes. The traits in
//! this module give those computations a by-value, clamping API so a counter
//! never wraps around silently.
//!
//! ## Usage
//!
//! ```rust
//! use salesman_core::num::{factorial, SaturatingAddVal, SaturatingMulVal};
//!
//! assert_eq!(u64::MAX.saturating_add_val(1), u64::MAX);
//! assert_eq!(6u64.saturating_mul_val(7), 42);
//! assert_eq!(factorial(5), 120);
//! assert_eq!(factorial(40), u128::MAX);
//! ```

use core::ops::{Add, Mul};

macro_rules! saturating_impl_binary_val {
    ($trait_name:ident, $method:ident, $src_method:ident, $($t:ty),+) => {
        $(
            impl $trait_name for $t {
                #[inline(always)]
                fn $method(self, v: Self) -> Self {
                    <$t>::$src_method(self, v)
                }
            }
        )+
    };
}

/// Saturating addition by value, clamping at the upper bound of the type.
pub trait SaturatingAddVal: Sized + Add<Self, Output = Self> {
    fn saturating_add_val(self, v: Self) -> Self;
}

/// Saturating multiplication by value, clamping at the upper bound of the type.
pub trait SaturatingMulVal: Sized + Mul<Self, Output = Self> {
    fn saturating_mul_val(self, v: Self) -> Self;
}

saturating_impl_binary_val!(SaturatingAddVal, saturating_add_val, saturating_add, u32, u64, u128, usize);
saturating_impl_binary_val!(SaturatingMulVal, saturating_mul_val, saturating_mul, u32, u64, u128, usize);

/// Returns `k!`, saturating at `u128::MAX` (reached from `35!` on).
#[inline]
pub fn factorial(k: usize) -> u128 {
    (2..=k as u128).fold(1u128, |acc, i| acc.saturating_mul_val(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add<T: SaturatingAddVal>(a: T, b: T) -> T {
        a.saturating_add_val(b)
    }

    fn mul<T: SaturatingMulVal>(a: T, b: T) -> T {
        a.saturating_mul_val(b)
    }

    #[test]
    fn test_saturating_add_val_clamps() {
        assert_eq!(add(u64::MAX, 1u64), u64::MAX);
        assert_eq!(add(u32::MAX - 1, 1u32), u32::MAX);
        assert_eq!(add(3usize, 4usize), 7usize);
    }

    #[test]
    fn test_saturating_mul_val_clamps() {
        assert_eq!(mul(u64::MAX, 2u64), u64::MAX);
        assert_eq!(mul(u128::MAX / 2 + 1, 2u128), u128::MAX);
        assert_eq!(mul(6u32, 7u32), 42u32);
    }

    #[test]
    fn test_factorial_small_values() {
        assert_eq!(factorial(0), 1);
        assert_eq!(factorial(1), 1);
        assert_eq!(factorial(3), 6);
        assert_eq!(factorial(10), 3_628_800);
        assert_eq!(factorial(20), 2_432_902_008_176_640_000);
    }

    #[test]
    fn test_factorial_saturates() {
        assert_eq!(factorial(34), 295_232_799_039_604_140_847_618_609_643_520_000_000);
        assert_eq!(factorial(35), u128::MAX);
        assert_eq!(factorial(99), u128::MAX);
    }
}
