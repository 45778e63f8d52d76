use super::*;

#[test]
fn visualizer_defaults_match_product_fallbacks() {
    let cfg: VisualizerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg.base_visualizer_path, "/single-wood-doors");
    assert_eq!(cfg.handing_visualizer, "left");
    assert!(cfg.show_watermark);
}

#[test]
fn camel_case_fields_parse() {
    let cfg: VisualizerConfig = serde_json::from_str(
        r#"{"baseVisualizerPath":"/x","handingVisualizer":"right","showWatermark":false}"#,
    )
    .unwrap();
    assert_eq!(cfg.base_visualizer_path, "/x");
    assert_eq!(cfg.handing_visualizer, "right");
    assert!(!cfg.show_watermark);
}

#[test]
fn watermark_positions_use_kebab_case() {
    let wm: WatermarkConfig =
        serde_json::from_str(r#"{"src":"/wm.png","opacity":0.5,"position":"bottom-right"}"#)
            .unwrap();
    assert_eq!(wm.position, WatermarkPosition::BottomRight);
    assert_eq!(wm.effective_opacity(), 0.5);

    let wm: WatermarkConfig = serde_json::from_str(r#"{"position":"top-left"}"#).unwrap();
    assert_eq!(wm.src, DEFAULT_WATERMARK_SRC);
    assert_eq!(wm.effective_opacity(), DEFAULT_WATERMARK_OPACITY);
}

#[test]
fn explicit_zero_opacity_is_honored() {
    let wm = WatermarkConfig {
        opacity: Some(0.0),
        ..WatermarkConfig::default()
    };
    assert_eq!(wm.effective_opacity(), 0.0);
}

#[test]
fn validate_rejects_empty_surface_and_bad_opacity() {
    let mut cfg = SessionConfig {
        surface: Canvas::zero(),
        ..SessionConfig::default()
    };
    assert!(matches!(
        cfg.validate(),
        Err(PorticoError::Configuration(_))
    ));

    cfg.surface = Canvas::default();
    cfg.watermark = Some(WatermarkConfig {
        opacity: Some(1.5),
        ..WatermarkConfig::default()
    });
    assert!(cfg.validate().is_err());

    cfg.watermark = Some(WatermarkConfig::default());
    cfg.validate().unwrap();
}

#[test]
fn missing_config_file_is_configuration_error() {
    let err = SessionConfig::from_json_file("/definitely/not/here/portico.json").unwrap_err();
    assert!(matches!(err, PorticoError::Configuration(_)));
}
