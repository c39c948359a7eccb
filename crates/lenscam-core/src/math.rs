use nalgebra::{RealField, Vector2, Vector3};

pub type Vec2 = Vector2<f64>;
pub type Vec3 = Vector3<f64>;

/// Append a unit homogeneous coordinate.
pub fn homogenize<T: RealField>(p: &Vector2<T>) -> Vector3<T> {
    Vector3::new(p.x.clone(), p.y.clone(), T::one())
}

/// Divide by the last coordinate.
pub fn dehomogenize<T: RealField>(p: &Vector3<T>) -> Vector2<T> {
    Vector2::new(p.x.clone() / p.z.clone(), p.y.clone() / p.z.clone())
}

/// Angle between two rays in radians.
///
/// Used to compare unprojected directions, which are not normalized.
pub fn ray_angle(a: &Vec3, b: &Vec3) -> f64 {
    a.cross(b).norm().atan2(a.dot(b))
}
