#[cfg(feature = "onnx")]
mod onnx_tests {
    use pose::{InferError, OnnxBackend, PoseBackend};

    #[tokio::test]
    async fn test_missing_model_fails_init() {
        let mut backend = OnnxBackend::new("/nonexistent/yolo-pose.onnx");
        match backend.initialize().await {
            Err(InferError::Init(_)) => {}
            other => panic!("Expected InferError::Init, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_backend_defaults() {
        let backend = OnnxBackend::new("model.onnx").with_conf_threshold(0.5);
        assert_eq!(backend.conf_threshold(), 0.5);
        assert_eq!(backend.iou_threshold(), 0.45);
    }
}
