use video::{CameraConstraints, Facing};

#[test]
fn test_constraints_defaults() {
    let constraints = CameraConstraints::default();

    assert_eq!(constraints.device(), "/dev/video0");
    assert_eq!(constraints.width(), 1280);
    assert_eq!(constraints.height(), 720);
    assert_eq!(constraints.facing(), Facing::User);
    assert_eq!(constraints.buffer_count(), 4);
}

#[test]
fn test_constraints_builder() {
    let constraints = CameraConstraints::default()
        .with_device("/dev/video2".to_string())
        .with_width(640)
        .with_height(480)
        .with_facing(Facing::Environment)
        .with_buffer_count(2);

    assert_eq!(constraints.device(), "/dev/video2");
    assert_eq!(constraints.width(), 640);
    assert_eq!(constraints.height(), 480);
    assert_eq!(constraints.facing(), Facing::Environment);
    assert_eq!(constraints.buffer_count(), 2);
}

#[test]
fn test_constraints_partial_builder() {
    let constraints = CameraConstraints::default().with_width(1920);

    assert_eq!(constraints.width(), 1920);
    assert_eq!(constraints.height(), 720); // default
    assert_eq!(constraints.facing(), Facing::User); // default
}
