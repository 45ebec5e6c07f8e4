use nalgebra::{Matrix3, Point3, Rotation3, Vector3};

pub fn centroid(points: &[Point3<f64>]) -> Option<Point3<f64>> {
    if points.is_empty() {
        return None;
    }
    let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
    Some(Point3::from(sum / points.len() as f64))
}

/// Plain coordinate RMSD without any superposition.
pub fn calculate_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    if coords1.len() != coords2.len() || coords1.is_empty() {
        return None;
    }
    let n = coords1.len() as f64;
    let squared_dist_sum: f64 = coords1
        .iter()
        .zip(coords2.iter())
        .map(|(p1, p2)| (p1 - p2).norm_squared())
        .sum();
    Some((squared_dist_sum / n).sqrt())
}

/// Computes the rigid transformation that best superimposes `from_points` onto `to_points`
/// in the least-squares sense (Kabsch).
///
/// Returns `None` when the point sets are empty or of different length.
pub fn superposition(
    from_points: &[Point3<f64>],
    to_points: &[Point3<f64>],
) -> Option<(Rotation3<f64>, Vector3<f64>)> {
    if from_points.len() != to_points.len() {
        return None;
    }
    let from_centroid = centroid(from_points)?;
    let to_centroid = centroid(to_points)?;

    let h = from_points
        .iter()
        .zip(to_points.iter())
        .fold(Matrix3::zeros(), |acc, (f, t)| {
            acc + (t - to_centroid) * (f - from_centroid).transpose()
        });

    let svd = h.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;

    // Reflection guard: keep a proper rotation.
    let d = (u * v_t).determinant();
    let mut correction = Matrix3::identity();
    if d < 0.0 {
        correction[(2, 2)] = -1.0;
    }

    let rotation = Rotation3::from_matrix_unchecked(u * correction * v_t);
    let translation = to_centroid.coords - rotation * from_centroid.coords;
    Some((rotation, translation))
}

/// RMSD between two coordinate sets after optimal superposition of the first onto the second.
///
/// This is the geometric dissimilarity used for conformer redundancy pruning.
pub fn aligned_rmsd(coords1: &[Point3<f64>], coords2: &[Point3<f64>]) -> Option<f64> {
    let (rotation, translation) = superposition(coords1, coords2)?;
    let moved: Vec<Point3<f64>> = coords1
        .iter()
        .map(|p| rotation * p + translation)
        .collect();
    calculate_rmsd(&moved, coords2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Unit;

    const EPS: f64 = 1e-9;

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.5, 0.0, 0.0),
            Point3::new(1.5, 1.2, 0.3),
            Point3::new(-0.4, 0.9, -1.1),
            Point3::new(2.2, -0.7, 0.8),
        ]
    }

    #[test]
    fn centroid_of_empty_slice_is_none() {
        assert!(centroid(&[]).is_none());
    }

    #[test]
    fn calculate_rmsd_rejects_mismatched_lengths() {
        let a = sample_points();
        assert!(calculate_rmsd(&a, &a[..2]).is_none());
        assert!(calculate_rmsd(&[], &[]).is_none());
    }

    #[test]
    fn calculate_rmsd_of_uniform_shift_equals_shift_length() {
        let a = sample_points();
        let b: Vec<_> = a.iter().map(|p| p + Vector3::new(0.0, 3.0, 4.0)).collect();
        assert!((calculate_rmsd(&a, &b).unwrap() - 5.0).abs() < EPS);
    }

    #[test]
    fn aligned_rmsd_is_zero_for_rigidly_moved_copy() {
        let a = sample_points();
        let rotation = Rotation3::from_axis_angle(
            &Unit::new_normalize(Vector3::new(0.3, -1.0, 0.5)),
            1.1,
        );
        let shift = Vector3::new(-4.0, 2.5, 7.0);
        let b: Vec<_> = a.iter().map(|p| rotation * p + shift).collect();

        assert!(calculate_rmsd(&a, &b).unwrap() > 1.0);
        assert!(aligned_rmsd(&a, &b).unwrap() < 1e-6);
    }

    #[test]
    fn aligned_rmsd_is_symmetric_and_positive_for_distorted_copy() {
        let a = sample_points();
        let mut b = a.clone();
        b[3] = Point3::new(-0.4, -0.9, 1.1);

        let ab = aligned_rmsd(&a, &b).unwrap();
        let ba = aligned_rmsd(&b, &a).unwrap();
        assert!(ab > 0.1);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn aligned_rmsd_never_uses_a_reflection() {
        let a = sample_points();
        let mirrored: Vec<_> = a.iter().map(|p| Point3::new(-p.x, p.y, p.z)).collect();
        assert!(aligned_rmsd(&a, &mirrored).unwrap() > 1e-3);
    }
}
