//! Colour matrix helpers.
//!
//! Matrices are stored **row-major** and applied to column vectors:
//! `out = M * rgb`. Internally glam is column-major, so conversions
//! transpose at the boundary.

use glam::{DMat3, DMat4, DVec3};

/// Row-major 3x3 identity.
pub const IDENTITY_3X3: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Row-major 4x4 identity.
pub const IDENTITY_4X4: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Row-major 3x3 to glam.
pub fn to_dmat3(m: &[[f64; 3]; 3]) -> DMat3 {
    DMat3::from_cols_array_2d(m).transpose()
}

/// Embeds a 3x3 matrix into a row-major 4x4 homogeneous matrix.
///
/// ```rust
/// use vpcal_math::matrix::embed_3x3;
///
/// let m = embed_3x3(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
/// assert_eq!(&m[..4], &[1.0, 2.0, 3.0, 0.0]);
/// assert_eq!(&m[12..], &[0.0, 0.0, 0.0, 1.0]);
/// ```
pub fn embed_3x3(m: &[[f64; 3]; 3]) -> [f64; 16] {
    DMat4::from_mat3(to_dmat3(m)).transpose().to_cols_array()
}

/// Row-major 4x4 to glam.
pub fn to_dmat4(m: &[f64; 16]) -> DMat4 {
    DMat4::from_cols_array(m).transpose()
}

/// Applies the upper 3x3 of a row-major 4x4 matrix plus an offset.
#[inline]
pub fn apply_4x4(m: &[f64; 16], offset: &[f64; 4], rgb: [f64; 3]) -> [f64; 3] {
    let v = to_dmat4(m).transform_point3(DVec3::from_array(rgb));
    [v.x + offset[0], v.y + offset[1], v.z + offset[2]]
}

/// Inverse of a row-major 4x4 matrix, or `None` if singular.
pub fn invert_4x4(m: &[f64; 16]) -> Option<[f64; 16]> {
    let mat = to_dmat4(m);
    let det = mat.determinant();
    if det.abs() < 1e-12 || !det.is_finite() {
        return None;
    }
    Some(mat.inverse().transpose().to_cols_array())
}

/// Multiplies a row-major 3x3 matrix with an RGB triplet.
#[inline]
pub fn apply_3x3(m: &[[f64; 3]; 3], rgb: [f64; 3]) -> [f64; 3] {
    (to_dmat3(m) * DVec3::from_array(rgb)).to_array()
}

/// True if every element is finite.
pub fn is_finite_3x3(m: &[[f64; 3]; 3]) -> bool {
    m.iter().flatten().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const M: [[f64; 3]; 3] = [[0.9, 0.05, 0.05], [0.1, 0.8, 0.1], [0.0, 0.2, 0.8]];

    #[test]
    fn embed_layout() {
        let m = embed_3x3(&M);
        assert_eq!(&m[0..4], &[0.9, 0.05, 0.05, 0.0]);
        assert_eq!(&m[4..8], &[0.1, 0.8, 0.1, 0.0]);
        assert_eq!(&m[8..12], &[0.0, 0.2, 0.8, 0.0]);
        assert_eq!(&m[12..16], &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(embed_3x3(&IDENTITY_3X3), IDENTITY_4X4);
    }

    #[test]
    fn embedded_matches_3x3() {
        let rgb = [0.2, 0.5, 0.9];
        let a = apply_3x3(&M, rgb);
        let b = apply_4x4(&embed_3x3(&M), &[0.0; 4], rgb);
        for i in 0..3 {
            assert_relative_eq!(a[i], b[i], epsilon = 1e-12);
        }
        assert_relative_eq!(a[0], 0.9 * 0.2 + 0.05 * 0.5 + 0.05 * 0.9, epsilon = 1e-12);
    }

    #[test]
    fn inverse() {
        let m = embed_3x3(&M);
        let inv = invert_4x4(&m).unwrap();
        let rgb = [0.3, 0.6, 0.1];
        let back = apply_4x4(&inv, &[0.0; 4], apply_4x4(&m, &[0.0; 4], rgb));
        for i in 0..3 {
            assert_relative_eq!(back[i], rgb[i], epsilon = 1e-12);
        }
        assert!(invert_4x4(&[0.0; 16]).is_none());
    }
}
