use super::*;

fn red() -> DecodedImage {
    DecodedImage::solid(2, 2, [255, 0, 0, 255]).unwrap()
}

#[test]
fn draw_scales_into_dest_rect() {
    let mut s = PixelSurface::new(Canvas { width: 8, height: 8 }).unwrap();
    s.draw_image(&red(), Rect::new(2.0, 2.0, 6.0, 6.0)).unwrap();

    assert_eq!(s.pixel(2, 2), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(6, 6), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(8, 0), None);
}

#[test]
fn draw_clips_to_surface() {
    let mut s = PixelSurface::new(Canvas { width: 4, height: 4 }).unwrap();
    s.draw_image(&red(), Rect::new(-2.0, 2.0, 2.0, 6.0)).unwrap();
    assert_eq!(s.pixel(0, 3), Some([255, 0, 0, 255]));
    assert_eq!(s.pixel(2, 3), Some([0, 0, 0, 0]));

    s.draw_image(&red(), Rect::new(10.0, 10.0, 12.0, 12.0)).unwrap();
}

#[test]
fn global_alpha_scales_source() {
    let mut s = PixelSurface::new(Canvas { width: 2, height: 2 }).unwrap();
    s.set_global_alpha(0.5);
    s.draw_image(&red(), Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();
    assert_eq!(s.pixel(0, 0), Some([128, 0, 0, 128]));

    s.set_global_alpha(f32::NAN);
    assert_eq!(s.global_alpha(), 1.0);
}

#[test]
fn clear_and_resize_reset_pixels() {
    let mut s = PixelSurface::new(Canvas { width: 2, height: 2 }).unwrap();
    s.draw_image(&red(), Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();
    s.clear();
    assert!(s.rgba8_premul().iter().all(|&b| b == 0));

    s.resize(Canvas { width: 3, height: 1 }).unwrap();
    assert_eq!(s.rgba8_premul().len(), 12);
}

#[test]
fn unsized_surface_reports_layout_and_ignores_draws() {
    let mut s = PixelSurface::unsized_with_layout(Canvas { width: 30, height: 20 });
    assert!(s.canvas().is_empty());
    assert_eq!(s.layout_canvas(), Canvas { width: 30, height: 20 });
    s.draw_image(&red(), Rect::new(0.0, 0.0, 2.0, 2.0)).unwrap();
}

#[test]
fn degenerate_dest_is_skipped() {
    let mut s = PixelSurface::new(Canvas { width: 2, height: 2 }).unwrap();
    s.draw_image(&red(), Rect::new(0.0, 0.0, 0.2, 2.0)).unwrap();
    assert!(s.rgba8_premul().iter().all(|&b| b == 0));
}
