use fit::{
    Calibration, Measurement, ProductSizing, SizeChart, SizeKey, recommend,
};
use pose::{Landmark, PoseKeypoints};

fn keypoints(left_x: f32, right_x: f32, visibility: f32) -> PoseKeypoints {
    PoseKeypoints {
        left_shoulder: Landmark::new(left_x, 0.3, visibility),
        right_shoulder: Landmark::new(right_x, 0.3, visibility),
        left_hip: Landmark::new(left_x + 0.05, 0.7, visibility),
        right_hip: Landmark::new(right_x - 0.05, 0.7, visibility),
    }
}

#[test]
fn test_default_chart_values() {
    let chart = SizeChart::default();
    assert_eq!(chart.get(SizeKey::S), Measurement::new(42.0, 96.0));
    assert_eq!(chart.get(SizeKey::M), Measurement::new(44.0, 102.0));
    assert_eq!(chart.get(SizeKey::L), Measurement::new(46.0, 108.0));
    assert_eq!(chart.get(SizeKey::XL), Measurement::new(48.0, 114.0));
}

#[test]
fn test_centered_person_is_small() {
    let recommendation = recommend(
        &keypoints(0.35, 0.65, 0.9),
        &SizeChart::default(),
        &Calibration::default(),
    );
    assert_eq!(recommendation.shoulder_width, 30.0);
    assert_eq!(recommendation.chest_width, 66.0);
    assert_eq!(recommendation.recommended_size, SizeKey::S);
}

#[test]
fn test_44cm_shoulder_picks_closest_combined_fit() {
    // chest 96.8: S is off by 2 + 0.8, M by 0 + 5.2
    let recommendation = recommend(
        &keypoints(0.28, 0.72, 0.9),
        &SizeChart::default(),
        &Calibration::default(),
    );
    assert_eq!(recommendation.shoulder_width, 44.0);
    assert_eq!(recommendation.chest_width, 97.0);
    assert_eq!(recommendation.recommended_size, SizeKey::S);
}

#[test]
fn test_wide_shoulders_pick_xl() {
    let recommendation = recommend(
        &keypoints(0.2, 0.8, 0.9),
        &SizeChart::default(),
        &Calibration::default(),
    );
    assert_eq!(recommendation.shoulder_width, 60.0);
    assert_eq!(recommendation.recommended_size, SizeKey::XL);
}

#[test]
fn test_ties_keep_earlier_size() {
    let same = Measurement::new(40.0, 90.0);
    let chart = SizeChart {
        s: Measurement::new(10.0, 10.0),
        m: same,
        l: same,
        xl: same,
    };
    let recommendation = recommend(&keypoints(0.3, 0.7, 0.9), &chart, &Calibration::default());
    assert_eq!(recommendation.recommended_size, SizeKey::M);
}

#[test]
fn test_shoulder_order_does_not_matter() {
    let recommendation = recommend(
        &keypoints(0.65, 0.35, 0.9),
        &SizeChart::default(),
        &Calibration::default(),
    );
    assert_eq!(recommendation.shoulder_width, 30.0);
}

#[test]
fn test_confidence_is_lowest_visibility() {
    let mut points = keypoints(0.35, 0.65, 0.9);
    points.left_hip.visibility = 0.42;
    let recommendation = recommend(&points, &SizeChart::default(), &Calibration::default());
    assert_eq!(recommendation.confidence, 0.42);
    assert_eq!(recommendation.match_percent(), 42);
}

#[test]
fn test_custom_calibration() {
    let calibration = Calibration::default()
        .with_cm_per_unit(150.0)
        .with_chest_ratio(2.0);
    assert_eq!(calibration.cm_per_unit(), 150.0);
    assert_eq!(calibration.chest_ratio(), 2.0);

    let recommendation = recommend(&keypoints(0.35, 0.65, 0.9), &SizeChart::default(), &calibration);
    assert_eq!(recommendation.shoulder_width, 45.0);
    assert_eq!(recommendation.chest_width, 90.0);
    assert_eq!(recommendation.recommended_size, SizeKey::S);
}

#[test]
fn test_chart_from_json() {
    let chart = SizeChart::from_json(
        r#"{
            "S": {"shoulder": 40, "chest": 90},
            "M": {"shoulder": 43, "chest": 98},
            "L": {"shoulder": 46, "chest": 106},
            "XL": {"shoulder": 49, "chest": 114}
        }"#,
    )
    .unwrap();
    assert_eq!(chart.get(SizeKey::M), Measurement::new(43.0, 98.0));
}

#[test]
fn test_chart_missing_size_is_error() {
    let result = SizeChart::from_json(r#"{"S": {"shoulder": 40, "chest": 90}}"#);
    assert!(result.is_err());
}

#[test]
fn test_product_without_chart_uses_default() {
    let product = ProductSizing::from_json(
        r#"{"id": "p1", "name": "Classic Tee", "price": 29.99, "inStock": true}"#,
    )
    .unwrap();
    assert_eq!(product.id, "p1");
    assert!(product.size_chart.is_none());
    assert_eq!(product.size_chart_or_default(), SizeChart::default());
}

#[test]
fn test_product_with_chart() {
    let product = ProductSizing::from_json(
        r#"{
            "id": "p2",
            "name": "Hoodie",
            "sizeChart": {
                "S": {"shoulder": 44, "chest": 100},
                "M": {"shoulder": 46, "chest": 106},
                "L": {"shoulder": 48, "chest": 112},
                "XL": {"shoulder": 50, "chest": 118}
            }
        }"#,
    )
    .unwrap();
    assert_eq!(
        product.size_chart_or_default().get(SizeKey::XL),
        Measurement::new(50.0, 118.0)
    );
}

#[test]
fn test_size_key_display() {
    assert_eq!(SizeKey::XL.to_string(), "XL");
    assert_eq!(SizeKey::ALL[0], SizeKey::S);
}
