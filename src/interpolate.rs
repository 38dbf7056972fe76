//! Interpolation utilities

use num_traits::Float;

use nalgebra::SVector;
use smallvec::{Array, SmallVec};

/// Describes a type that can be interpolated with barycentric coordinates
/// or linearly between two endpoints.
///
/// Clipping uses `linear_interpolate` to create new vertices where a triangle edge
/// crosses a clipping plane.
pub trait Interpolate {
    /// Interpolate the three values with their corresponding barycentric coordinate weight
    fn barycentric_interpolate<R: Float>(u: R, x1: &Self, v: R, x2: &Self, w: R, x3: &Self) -> Self;

    /// Simple linear interpolation
    fn linear_interpolate<R: Float>(t: R, x1: &Self, x2: &Self) -> Self;
}

macro_rules! impl_float_interpolate {
    ($($t:ty),+) => {
        $(
            impl Interpolate for $t {
                #[inline(always)]
                fn barycentric_interpolate<R: Float>(u: R, ux: &$t, v: R, vx: &$t, w: R, wx: &$t) -> $t {
                    let (u, v, w) = (cast::<R, $t>(u), cast::<R, $t>(v), cast::<R, $t>(w));

                    *ux * u + *vx * v + *wx * w
                }

                #[inline(always)]
                fn linear_interpolate<R: Float>(t: R, x1: &$t, x2: &$t) -> $t {
                    let t = cast::<R, $t>(t);

                    (1.0 - t) * *x1 + t * *x2
                }
            }
        )+
    }
}

impl_float_interpolate!(f32, f64);

// Conversions between float types cannot fail, so a `NaN` fallback is never observed.
#[inline(always)]
fn cast<R: Float, T: Float>(r: R) -> T {
    T::from(r).unwrap_or_else(T::nan)
}

impl<N, const D: usize> Interpolate for SVector<N, D> where N: nalgebra::Scalar + Interpolate {
    #[inline]
    fn barycentric_interpolate<R: Float>(u: R, ux: &Self, v: R, vx: &Self, w: R, wx: &Self) -> Self {
        SVector::from_fn(|i, _| Interpolate::barycentric_interpolate(u, &ux[i], v, &vx[i], w, &wx[i]))
    }

    #[inline]
    fn linear_interpolate<R: Float>(t: R, x1: &Self, x2: &Self) -> Self {
        SVector::from_fn(|i, _| Interpolate::linear_interpolate(t, &x1[i], &x2[i]))
    }
}

/// Packed varying records are interpolated component-wise.
///
/// All three records are expected to have the same length, extra components are ignored.
impl<A> Interpolate for SmallVec<A> where A: Array, A::Item: Interpolate {
    fn barycentric_interpolate<R: Float>(u: R, ux: &Self, v: R, vx: &Self, w: R, wx: &Self) -> Self {
        ux.iter().zip(vx.iter()).zip(wx.iter())
          .map(|((a, b), c)| Interpolate::barycentric_interpolate(u, a, v, b, w, c))
          .collect()
    }

    fn linear_interpolate<R: Float>(t: R, x1: &Self, x2: &Self) -> Self {
        x1.iter().zip(x2.iter())
          .map(|(a, b)| Interpolate::linear_interpolate(t, a, b))
          .collect()
    }
}
