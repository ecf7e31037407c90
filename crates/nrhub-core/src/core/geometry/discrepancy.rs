use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Minimum number of aligned units for a meaningful superposition.
pub const MIN_ALIGNED_UNITS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error(
        "Mismatched input lengths: {centers1} centers and {rotations1} rotations vs {centers2} centers and {rotations2} rotations"
    )]
    LengthMismatch {
        centers1: usize,
        rotations1: usize,
        centers2: usize,
        rotations2: usize,
    },
    #[error("Need at least {required} aligned units, found {found}")]
    TooFewPoints { found: usize, required: usize },
    #[error("Singular value decomposition did not converge")]
    Decomposition,
}

/// Computes the geometric discrepancy between two aligned sets of unit
/// centers and rotation frames. Implementations may fail on degenerate input;
/// callers decide how to record that.
pub trait GeometryEngine: Send + Sync {
    fn discrepancy(
        &self,
        centers1: &[Vector3<f64>],
        rotations1: &[Matrix3<f64>],
        centers2: &[Vector3<f64>],
        rotations2: &[Matrix3<f64>],
    ) -> Result<f64, GeometryError>;
}

/// Superposition based discrepancy.
///
/// The first center set is optimally superposed onto the second (Kabsch). The
/// result is `sqrt(sse + orientation_error) / n`, where `sse` is the summed
/// squared center deviation after superposition and `orientation_error` the
/// summed squared rotation angle (radians) between each superposed frame of
/// the first set and the matching frame of the second.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixDiscrepancy;

impl MatrixDiscrepancy {
    pub fn new() -> Self {
        Self
    }
}

fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
    points.iter().sum::<Vector3<f64>>() / points.len() as f64
}

/// Rotation taking the centered `from` points onto the centered `to` points.
fn optimal_rotation(
    from: &[Vector3<f64>],
    to: &[Vector3<f64>],
) -> Result<Matrix3<f64>, GeometryError> {
    let covariance = from
        .iter()
        .zip(to)
        .fold(Matrix3::zeros(), |acc, (a, b)| acc + a * b.transpose());

    let svd = covariance.svd(true, true);
    let u = svd.u.ok_or(GeometryError::Decomposition)?;
    let v = svd.v_t.ok_or(GeometryError::Decomposition)?.transpose();

    let d = (v * u.transpose()).determinant().signum();
    let correction = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, d));
    Ok(v * correction * u.transpose())
}

/// Angle of the rotation described by `m`, in radians.
pub fn rotation_angle(m: &Matrix3<f64>) -> f64 {
    ((m.trace() - 1.0) / 2.0).clamp(-1.0, 1.0).acos()
}

impl GeometryEngine for MatrixDiscrepancy {
    fn discrepancy(
        &self,
        centers1: &[Vector3<f64>],
        rotations1: &[Matrix3<f64>],
        centers2: &[Vector3<f64>],
        rotations2: &[Matrix3<f64>],
    ) -> Result<f64, GeometryError> {
        let n = centers1.len();
        if rotations1.len() != n || centers2.len() != n || rotations2.len() != n {
            return Err(GeometryError::LengthMismatch {
                centers1: n,
                rotations1: rotations1.len(),
                centers2: centers2.len(),
                rotations2: rotations2.len(),
            });
        }
        if n < MIN_ALIGNED_UNITS {
            return Err(GeometryError::TooFewPoints {
                found: n,
                required: MIN_ALIGNED_UNITS,
            });
        }

        let mean1 = centroid(centers1);
        let mean2 = centroid(centers2);
        let shifted1: Vec<_> = centers1.iter().map(|c| c - mean1).collect();
        let shifted2: Vec<_> = centers2.iter().map(|c| c - mean2).collect();

        let rotation = optimal_rotation(&shifted1, &shifted2)?;

        let sse: f64 = shifted1
            .iter()
            .zip(&shifted2)
            .map(|(a, b)| (rotation * a - b).norm_squared())
            .sum();

        let orientation_error: f64 = rotations1
            .iter()
            .zip(rotations2)
            .map(|(r1, r2)| rotation_angle(&(r2.transpose() * rotation * r1)).powi(2))
            .sum();

        Ok((sse + orientation_error).sqrt() / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Rotation3, Unit};

    fn sample_centers() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(3.4, 0.5, 0.1),
            Vector3::new(5.1, 4.2, 1.3),
            Vector3::new(2.2, 6.8, 3.9),
            Vector3::new(-1.0, 4.4, 6.0),
        ]
    }

    fn sample_frames(n: usize) -> Vec<Matrix3<f64>> {
        (0..n)
            .map(|i| {
                Rotation3::from_axis_angle(&Vector3::z_axis(), 0.3 * i as f64).into_inner()
            })
            .collect()
    }

    #[test]
    fn identical_sets_have_zero_discrepancy() {
        let centers = sample_centers();
        let frames = sample_frames(centers.len());
        let value = MatrixDiscrepancy
            .discrepancy(&centers, &frames, &centers, &frames)
            .unwrap();
        assert_relative_eq!(value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn rigidly_moved_copy_has_zero_discrepancy() {
        let centers = sample_centers();
        let frames = sample_frames(centers.len());
        let axis = Unit::new_normalize(Vector3::new(1.0, 2.0, -0.5));
        let q = Rotation3::from_axis_angle(&axis, 1.1).into_inner();
        let shift = Vector3::new(10.0, -4.0, 2.5);

        let moved: Vec<_> = centers.iter().map(|c| q * c + shift).collect();
        let moved_frames: Vec<_> = frames.iter().map(|r| q * r).collect();

        let value = MatrixDiscrepancy
            .discrepancy(&centers, &frames, &moved, &moved_frames)
            .unwrap();
        assert_relative_eq!(value, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn discrepancy_is_symmetric_in_its_arguments() {
        let centers = sample_centers();
        let frames = sample_frames(centers.len());
        let mut other = centers.clone();
        other[2] += Vector3::new(0.7, -0.2, 0.4);
        let other_frames = sample_frames(centers.len())
            .into_iter()
            .map(|r| Rotation3::from_axis_angle(&Vector3::x_axis(), 0.2).into_inner() * r)
            .collect::<Vec<_>>();

        let forward = MatrixDiscrepancy
            .discrepancy(&centers, &frames, &other, &other_frames)
            .unwrap();
        let backward = MatrixDiscrepancy
            .discrepancy(&other, &other_frames, &centers, &frames)
            .unwrap();
        assert!(forward > 0.0);
        assert_relative_eq!(forward, backward, epsilon = 1e-9);
    }

    #[test]
    fn orientation_differences_are_penalised() {
        let centers = sample_centers();
        let frames = sample_frames(centers.len());
        let mut turned = frames.clone();
        turned[0] = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.5).into_inner() * turned[0];

        let value = MatrixDiscrepancy
            .discrepancy(&centers, &frames, &centers, &turned)
            .unwrap();
        assert_relative_eq!(value, 0.5 / centers.len() as f64, epsilon = 1e-6);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let centers = &sample_centers()[..2];
        let frames = sample_frames(2);
        let result = MatrixDiscrepancy.discrepancy(centers, &frames, centers, &frames);
        assert_eq!(
            result,
            Err(GeometryError::TooFewPoints {
                found: 2,
                required: 3
            })
        );
    }

    #[test]
    fn mismatched_lengths_are_an_error() {
        let centers = sample_centers();
        let frames = sample_frames(centers.len());
        let result =
            MatrixDiscrepancy.discrepancy(&centers, &frames, &centers[..4], &frames[..4]);
        assert!(matches!(result, Err(GeometryError::LengthMismatch { .. })));
    }

    #[test]
    fn rotation_angle_of_identity_is_zero() {
        assert_relative_eq!(rotation_angle(&Matrix3::identity()), 0.0);
        let quarter = Rotation3::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(
            rotation_angle(quarter.matrix()),
            std::f64::consts::FRAC_PI_2,
            epsilon = 1e-12
        );
    }
}
