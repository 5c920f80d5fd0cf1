//! Cascaded shadow map math
//!
//! The camera's depth range is cut into cascades; each cascade gets an
//! orthographic light-space matrix that tightly encloses its slice of the
//! view frustum.

use crate::foundation::math::{stable_up, Mat4, Point3, Vec3, Vec4};
use crate::render::camera::SceneRenderCamera;

/// Upper bound on cascades, and layers of the shadow texture array
pub const MAX_CASCADES: usize = 4;

/// Far distance of each cascade using the practical split scheme
///
/// `lambda` blends logarithmic (1.0) and uniform (0.0) splits. The last
/// entry is always `far`.
pub fn cascade_splits(near: f32, far: f32, count: usize, lambda: f32) -> Vec<f32> {
    let count = count.clamp(1, MAX_CASCADES);
    let lambda = lambda.clamp(0.0, 1.0);
    let ratio = far / near;
    let range = far - near;

    (1..=count)
        .map(|i| {
            if i == count {
                return far;
            }
            let p = i as f32 / count as f32;
            let log = near * ratio.powf(p);
            let uniform = near + range * p;
            lambda * log + (1.0 - lambda) * uniform
        })
        .collect()
}

/// World-space corners of the camera frustum restricted to `[near, far]`
pub fn frustum_corners(camera: &SceneRenderCamera, near: f32, far: f32) -> Option<[Vec3; 8]> {
    let inverse = (camera.sub_frustum_projection(near, far) * camera.view_matrix).try_inverse()?;

    let mut corners = [Vec3::zeros(); 8];
    let mut index = 0;
    for x in [-1.0f32, 1.0] {
        for y in [-1.0f32, 1.0] {
            for z in [-1.0f32, 1.0] {
                let world = inverse * Vec4::new(x, y, z, 1.0);
                corners[index] = world.xyz() / world.w;
                index += 1;
            }
        }
    }
    Some(corners)
}

/// Orthographic light view-projection enclosing one cascade
///
/// `z_padding` pushes the near plane back towards the light so casters
/// outside the camera frustum still land in the map.
pub fn light_space_matrix(
    camera: &SceneRenderCamera,
    near: f32,
    far: f32,
    light_direction: &Vec3,
    z_padding: f32,
) -> Option<Mat4> {
    let corners = frustum_corners(camera, near, far)?;
    let center = corners.iter().fold(Vec3::zeros(), |acc, c| acc + c) / corners.len() as f32;

    let direction = light_direction
        .try_normalize(f32::EPSILON)
        .filter(|d| d.iter().all(|c| c.is_finite()))?;
    let eye = center - direction;
    let light_view = Mat4::look_at_rh(
        &Point3::from(eye),
        &Point3::from(center),
        &stable_up(&direction),
    );

    let mut min = Vec3::repeat(f32::MAX);
    let mut max = Vec3::repeat(f32::MIN);
    for corner in &corners {
        let p = light_view.transform_point(&Point3::from(*corner));
        min = min.inf(&p.coords);
        max = max.sup(&p.coords);
    }

    // View space looks down -z, so the nearest point has the largest z
    let projection = Mat4::new_orthographic(
        min.x,
        max.x,
        min.y,
        max.y,
        -max.z - z_padding,
        -min.z,
    );
    Some(projection * light_view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> SceneRenderCamera {
        SceneRenderCamera::look_at(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::zeros(),
            45f32.to_radians(),
            16.0 / 9.0,
            0.1,
            50.0,
        )
    }

    #[test]
    fn test_splits_are_increasing_and_end_at_far() {
        let splits = cascade_splits(0.1, 100.0, 4, 0.75);
        assert_eq!(splits.len(), 4);
        assert!(splits.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*splits.last().unwrap(), 100.0);
        assert!(splits[0] > 0.1);
    }

    #[test]
    fn test_uniform_splits_when_lambda_is_zero() {
        let splits = cascade_splits(1.0, 5.0, 4, 0.0);
        assert_relative_eq!(splits[0], 2.0);
        assert_relative_eq!(splits[1], 3.0);
        assert_relative_eq!(splits[2], 4.0);
    }

    #[test]
    fn test_cascade_count_is_clamped() {
        assert_eq!(cascade_splits(0.1, 10.0, 0, 0.5).len(), 1);
        assert_eq!(cascade_splits(0.1, 10.0, 9, 0.5).len(), MAX_CASCADES);
    }

    #[test]
    fn test_cascade_corners_project_inside_light_volume() {
        let cam = camera();
        let direction = Vec3::new(-0.3, -1.0, -0.2);
        let matrix = light_space_matrix(&cam, 0.1, 10.0, &direction, 5.0).unwrap();

        for corner in frustum_corners(&cam, 0.1, 10.0).unwrap() {
            let ndc = matrix.transform_point(&Point3::from(corner));
            assert!(ndc.x.abs() <= 1.0 + 1e-3, "x out of range: {}", ndc.x);
            assert!(ndc.y.abs() <= 1.0 + 1e-3, "y out of range: {}", ndc.y);
            assert!(ndc.z.abs() <= 1.0 + 1e-3, "z out of range: {}", ndc.z);
        }
    }

    #[test]
    fn test_degenerate_light_direction_is_rejected() {
        assert!(light_space_matrix(&camera(), 0.1, 10.0, &Vec3::zeros(), 0.0).is_none());
        let nan = Vec3::new(f32::NAN, -1.0, 0.0);
        assert!(light_space_matrix(&camera(), 0.1, 10.0, &nan, 0.0).is_none());
    }
}
