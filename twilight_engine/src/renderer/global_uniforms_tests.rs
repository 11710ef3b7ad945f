//! Unit tests for uniform and push constant layouts

use glam::{Mat4, Vec3, Vec4};
use crate::config::CameraConfig;
use crate::device::Extent2D;
use crate::renderer::{projection, GlobalUniforms, Light, PushConstants, MAX_LIGHTS};

#[test]
fn test_push_constants_are_128_bytes() {
    assert_eq!(PushConstants::SIZE, 128);
}

#[test]
fn test_global_uniforms_layout_is_std140_sized() {
    assert_eq!(std::mem::size_of::<GlobalUniforms>(), 64 + 64 + 32 * MAX_LIGHTS + 16);
}

#[test]
fn test_normal_matrix_undoes_non_uniform_scale() {
    let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));

    let push = PushConstants::new(model);

    let normal = Mat4::from_cols_array_2d(&push.normal);
    assert!((normal.x_axis.x - 0.5).abs() < 1e-6);
    assert_eq!(normal.y_axis.y, 1.0);
}

#[test]
fn test_singular_model_falls_back_to_identity_normal() {
    let push = PushConstants::new(Mat4::from_scale(Vec3::new(0.0, 1.0, 1.0)));

    assert_eq!(Mat4::from_cols_array_2d(&push.normal), Mat4::IDENTITY);
}

#[test]
fn test_projection_flips_y() {
    let camera = CameraConfig::default();

    let proj = projection(&camera, Extent2D::new(800, 600));

    // A point above the camera axis lands in the upper half (negative Y in Vulkan clip space)
    let clip = proj * Vec4::new(0.0, 1.0, -5.0, 1.0);
    assert!(clip.y < 0.0);
}

#[test]
fn test_projection_survives_zero_extent() {
    let proj = projection(&CameraConfig::default(), Extent2D::new(0, 0));

    assert!(proj.is_finite());
}

#[test]
fn test_lights_fill_up_to_max() {
    let mut uniforms = GlobalUniforms::from_camera(&CameraConfig::default(), Extent2D::new(800, 600));
    let light = Light { position: Vec3::new(1.0, 2.0, 3.0), color: Vec3::ONE };

    for _ in 0..MAX_LIGHTS {
        assert!(uniforms.push_light(light));
    }

    assert!(!uniforms.push_light(light));
    assert_eq!(uniforms.light_count as usize, MAX_LIGHTS);
    assert_eq!(uniforms.lights[0].position, [1.0, 2.0, 3.0, 1.0]);
}
