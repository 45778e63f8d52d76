use super::*;

fn cfg(base: &str, handing: &str) -> VisualizerConfig {
    VisualizerConfig {
        base_visualizer_path: base.to_string(),
        handing_visualizer: handing.to_string(),
        show_watermark: true,
    }
}

#[test]
fn no_placeholders_is_identity() {
    let c = cfg("/x", "left");
    assert_eq!(expand_template("/static/door.png", &c), "/static/door.png");
    assert_eq!(expand_template("", &c), "");
}

#[test]
fn expands_both_placeholders() {
    let c = cfg("/x", "left");
    assert_eq!(
        expand_template("{baseVisualizerPath}/a/{handingVisualizer}.png", &c),
        "/x/a/left.png"
    );
}

#[test]
fn replaces_every_occurrence() {
    let c = cfg("/b", "right");
    assert_eq!(
        expand_template(
            "{baseVisualizerPath}{baseVisualizerPath}/{handingVisualizer}-{handingVisualizer}",
            &c
        ),
        "/b/b/right-right"
    );
}

#[test]
fn unknown_tokens_pass_through() {
    let c = cfg("/b", "right");
    assert_eq!(
        expand_template("{baseVisualizerPath}/{finish}/{HandingVisualizer}.png", &c),
        "/b/{finish}/{HandingVisualizer}.png"
    );
}

#[test]
fn base_path_is_substituted_before_handing() {
    let c = cfg("{handingVisualizer}", "left");
    assert_eq!(
        expand_template("{baseVisualizerPath}/x.png", &c),
        "left/x.png"
    );
}
