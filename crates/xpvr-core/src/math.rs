//! Pose math - positions, orientations and rigid transforms
//!
//! World-space units are metres. Interpolation here is deliberately
//! unclamped: callers decide what factor they pass.

/// 3D position (world space, metres)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3D {
    pub const ZERO: Position3D = Position3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Linear interpolation, `t` is not clamped
    pub fn lerp(&self, other: &Position3D, t: f32) -> Position3D {
        Position3D {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
    }

    /// Euclidean distance to another position
    pub fn distance(&self, other: &Position3D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

/// Orientation as a unit quaternion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation3D {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Rotation3D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Rotation3D {
    pub const IDENTITY: Rotation3D = Rotation3D {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    pub fn from_euler(yaw: f32, pitch: f32, roll: f32) -> Self {
        let cy = (yaw * 0.5).cos();
        let sy = (yaw * 0.5).sin();
        let cp = (pitch * 0.5).cos();
        let sp = (pitch * 0.5).sin();
        let cr = (roll * 0.5).cos();
        let sr = (roll * 0.5).sin();

        Self {
            w: cr * cp * cy + sr * sp * sy,
            x: sr * cp * cy - cr * sp * sy,
            y: cr * sp * cy + sr * cp * sy,
            z: cr * cp * sy - sr * sp * cy,
        }
    }

    pub fn dot(&self, other: &Rotation3D) -> f32 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalized linear interpolation along the shortest arc.
    ///
    /// `t` is not clamped. The result is renormalized, so overshooting
    /// factors still yield a unit quaternion.
    pub fn nlerp(&self, other: &Rotation3D, t: f32) -> Rotation3D {
        let other = if self.dot(other) < 0.0 {
            Rotation3D::new(-other.w, -other.x, -other.y, -other.z)
        } else {
            *other
        };

        Rotation3D {
            w: self.w + (other.w - self.w) * t,
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            z: self.z + (other.z - self.z) * t,
        }
        .normalize()
    }

    /// Angle in radians between two orientations
    pub fn angle_to(&self, other: &Rotation3D) -> f32 {
        let dot = self.dot(other).abs().min(1.0);
        2.0 * dot.acos()
    }

    pub fn normalize(&self) -> Rotation3D {
        let len = self.length();
        if len < 0.0001 {
            return Rotation3D::identity();
        }
        Rotation3D {
            w: self.w / len,
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Wire order is x, y, z, w
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn from_array(a: [f32; 4]) -> Self {
        Self::new(a[3], a[0], a[1], a[2])
    }
}

/// Rigid transform of a tracked point
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    pub position: Position3D,
    pub rotation: Rotation3D,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Position3D::ZERO,
        rotation: Rotation3D::IDENTITY,
    };

    pub fn new(position: Position3D, rotation: Rotation3D) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Position3D) -> Self {
        Self::new(position, Rotation3D::IDENTITY)
    }

    /// Interpolate position and orientation with the same unclamped factor
    pub fn lerp(&self, other: &Transform, t: f32) -> Transform {
        Transform {
            position: self.position.lerp(&other.position, t),
            rotation: self.rotation.nlerp(&other.rotation, t),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_position_lerp() {
        let a = Position3D::new(0.0, 0.0, 0.0);
        let b = Position3D::new(10.0, 10.0, 10.0);

        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 5.0).abs() < 0.01);
        assert!((mid.y - 5.0).abs() < 0.01);
        assert!((mid.z - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_position_lerp_unclamped() {
        let a = Position3D::ZERO;
        let b = Position3D::new(1.0, 0.0, 0.0);

        let past = a.lerp(&b, 1.5);
        assert!((past.x - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_position_distance() {
        let a = Position3D::new(1.0, 2.0, 3.0);
        let b = Position3D::new(4.0, 6.0, 3.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_nlerp_endpoints() {
        let a = Rotation3D::identity();
        let b = Rotation3D::from_euler(1.0, 0.0, 0.0);

        assert!(a.nlerp(&b, 0.0).angle_to(&a) < 1e-3);
        assert!(a.nlerp(&b, 1.0).angle_to(&b) < 1e-3);
    }

    #[test]
    fn test_nlerp_takes_shortest_arc() {
        let a = Rotation3D::identity();
        let b = Rotation3D::new(-1.0, 0.0, 0.0, 0.0);

        // Same orientation on the opposite hemisphere
        let mid = a.nlerp(&b, 0.5);
        assert!(mid.angle_to(&a) < 1e-3);
    }

    #[test]
    fn test_rotation_array_order() {
        let q = Rotation3D::new(0.5, 0.1, 0.2, 0.3);
        assert_eq!(q.to_array(), [0.1, 0.2, 0.3, 0.5]);
        assert_eq!(Rotation3D::from_array(q.to_array()), q);
    }

    proptest! {
        #[test]
        fn prop_nlerp_stays_unit(
            yaw in -3.0f32..3.0,
            pitch in -1.5f32..1.5,
            t in 0.0f32..3.0,
        ) {
            let a = Rotation3D::identity();
            let b = Rotation3D::from_euler(yaw, pitch, 0.0);
            let q = a.nlerp(&b, t);
            prop_assert!((q.length() - 1.0).abs() < 1e-4);
        }
    }
}
