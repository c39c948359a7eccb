//! Scalar types accepted by camera views.
//!
//! Projection and unprojection only need [`RealField`], which both `f64` and
//! the `num-dual` number types implement. Writing a parameter back into a
//! Meta additionally needs [`Scalar::narrow`]: Meta storage is always `f64`,
//! so any derivative part of the written value is dropped.

use nalgebra::RealField;

/// A [`RealField`] that can be narrowed back to its `f64` value.
pub trait Scalar: RealField {
    /// The plain value with derivative information discarded.
    fn narrow(&self) -> f64;
}

#[cfg(feature = "autodiff")]
impl<T> Scalar for T
where
    T: RealField + num_dual::DualNum<f64>,
{
    fn narrow(&self) -> f64 {
        self.re()
    }
}

#[cfg(not(feature = "autodiff"))]
impl Scalar for f64 {
    fn narrow(&self) -> f64 {
        *self
    }
}

/// Build a scalar constant from an `f64` literal.
#[inline]
pub fn lift<T: RealField>(value: f64) -> T {
    nalgebra::convert(value)
}
