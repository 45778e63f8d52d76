use std::io::Cursor;

use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "portico_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn normalize_url_path_strips_leading_slashes() {
    assert_eq!(
        normalize_url_path("/single-wood-doors/slab.png").unwrap(),
        "single-wood-doors/slab.png"
    );
    assert_eq!(normalize_url_path("a\\.\\b.png").unwrap(), "a/b.png");
    assert!(normalize_url_path("/a/../../etc/passwd").is_err());
    assert!(normalize_url_path("/").is_err());
}

#[test]
fn fs_loader_decodes_from_root() {
    let tmp = temp_dir("fs_loader_decodes");
    std::fs::create_dir_all(tmp.join("doors")).unwrap();

    let img = image::RgbaImage::from_raw(2, 1, vec![255, 0, 0, 255, 0, 255, 0, 255]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(tmp.join("doors/slab.png"), &buf).unwrap();

    let loader = FsImageLoader::new(&tmp);
    let decoded = pollster::block_on(loader.load("/doors/slab.png")).unwrap();
    assert_eq!((decoded.width, decoded.height), (2, 1));

    let by_ref = &loader;
    assert!(pollster::block_on(by_ref.load("/doors/missing.png")).is_err());

    std::fs::remove_dir_all(&tmp).ok();
}
