// Host-side tests for the orbit camera.

use approx::assert_relative_eq;
use glam::{Vec3, Vec4Swizzles};
use letter_core::constants::{INITIAL_CAMERA_DISTANCE, MIN_CAMERA_DISTANCE, Z_NEAR};
use letter_core::{Aabb, OrbitCamera};

fn settle(camera: &mut OrbitCamera) {
    for _ in 0..500 {
        camera.update();
    }
}

#[test]
fn starts_in_front_of_the_origin() {
    let camera = OrbitCamera::new(16.0 / 9.0);
    let eye = camera.eye();
    assert_relative_eq!(eye.x, 0.0, epsilon = 1e-5);
    assert_relative_eq!(eye.y, 0.0, epsilon = 1e-5);
    assert_relative_eq!(eye.z, INITIAL_CAMERA_DISTANCE, epsilon = 1e-5);
    assert_eq!(camera.target, Vec3::ZERO);
}

#[test]
fn target_projects_to_screen_center() {
    let mut camera = OrbitCamera::new(1.5);
    camera.frame(&Aabb::new(Vec3::new(1.0, 1.0, 0.0), Vec3::new(3.0, 2.0, 0.5)));
    let clip = camera.camera().view_projection() * camera.target.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-4);
    assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-4);
    assert!(ndc.z > 0.0 && ndc.z < 1.0);
}

#[test]
fn framing_centers_and_backs_off() {
    let mut camera = OrbitCamera::default();
    let bounds = Aabb::new(Vec3::new(-4.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 1.0));
    camera.frame(&bounds);
    assert_eq!(camera.target, bounds.center());
    let expected = 8.0 / (camera.fovy_radians * 0.5).sin() * 1.2;
    assert_relative_eq!(camera.distance(), expected, epsilon = 1e-4);
}

#[test]
fn tiny_scenes_keep_a_minimum_distance() {
    let camera = OrbitCamera::default();
    assert_relative_eq!(camera.framing_distance(0.0), MIN_CAMERA_DISTANCE);
}

#[test]
fn framing_an_empty_box_restores_the_initial_view() {
    let mut camera = OrbitCamera::default();
    camera.target = Vec3::new(3.0, 3.0, 3.0);
    camera.zoom_by(0.1);
    camera.frame(&Aabb::EMPTY);
    assert_eq!(camera.target, Vec3::ZERO);
    assert_relative_eq!(camera.distance(), INITIAL_CAMERA_DISTANCE);
}

#[test]
fn zoom_is_clamped_to_near_plane() {
    let mut camera = OrbitCamera::default();
    camera.zoom_by(1e-6);
    assert_relative_eq!(camera.distance(), Z_NEAR);
}

#[test]
fn rotation_is_damped() {
    let mut camera = OrbitCamera::default();
    camera.rotate(100.0, 0.0, 500.0);
    assert!(camera.update());
    let first = camera.eye();
    settle(&mut camera);
    let last = camera.eye();
    // Part of the orbit is applied on the first frame, the rest eases in.
    assert!(first.x.abs() > 0.0);
    assert!(last.x.abs() > first.x.abs());
    assert_relative_eq!(last.length(), INITIAL_CAMERA_DISTANCE, epsilon = 1e-3);
    assert!(!camera.update());
}

#[test]
fn vertical_orbit_stops_short_of_the_poles() {
    let mut camera = OrbitCamera::default();
    camera.rotate(0.0, -10_000.0, 500.0);
    settle(&mut camera);
    let eye = camera.eye();
    assert!(eye.y < INITIAL_CAMERA_DISTANCE);
    assert!(eye.x.abs() + eye.z.abs() > 0.0);
}

#[test]
fn pan_moves_target_sideways() {
    let mut camera = OrbitCamera::default();
    camera.pan(50.0, 0.0, 500.0);
    settle(&mut camera);
    assert!(camera.target.x < 0.0);
    assert_relative_eq!(camera.target.y, 0.0, epsilon = 1e-4);
    assert_relative_eq!(camera.distance(), INITIAL_CAMERA_DISTANCE);
}

#[test]
fn wheel_dolly_moves_in_and_out() {
    let mut camera = OrbitCamera::default();
    camera.dolly(-120.0);
    camera.update();
    assert!(camera.distance() < INITIAL_CAMERA_DISTANCE);
    camera.dolly(120.0);
    camera.update();
    assert_relative_eq!(camera.distance(), INITIAL_CAMERA_DISTANCE, epsilon = 1e-4);
    camera.dolly(0.0);
    assert!(!camera.update());
}

#[test]
fn viewport_sets_aspect() {
    let mut camera = OrbitCamera::default();
    camera.set_viewport(1200, 600);
    assert_relative_eq!(camera.aspect, 2.0);
    assert_relative_eq!(camera.camera().aspect, 2.0);
}
