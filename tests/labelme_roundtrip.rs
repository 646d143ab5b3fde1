//! Integration tests for the Labelme JSON format.

use std::fs;

use annobox::{
    Annotation, BBox, BoxFormat, Dataset, ExportOptions, FormatRegistry, ImageSize, Space,
};

mod common;
use common::write_image;

fn sample_doc() -> String {
    serde_json::json!({
        "version": "5.6.0",
        "flags": {},
        "shapes": [
            {
                "label": "person",
                "points": [[12.0, 34.0], [56.0, 78.0]],
                "group_id": null,
                "shape_type": "rectangle",
                "flags": {}
            },
            {
                "label": "car",
                "points": [[100.0, 120.0], [60.0, 80.0]],
                "group_id": null,
                "shape_type": "rectangle",
                "flags": {}
            }
        ],
        "imagePath": "scene.jpg",
        "imageData": null,
        "imageHeight": 480,
        "imageWidth": 640
    })
    .to_string()
}

#[test]
fn file_roundtrip_preserves_shapes() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let in_path = temp.path().join("scene.json");
    let out_path = temp.path().join("scene_out.json");
    fs::write(&in_path, sample_doc()).expect("write sample");

    let registry = FormatRegistry::builtins();
    let mut dataset = Dataset::new();
    dataset
        .load_path(&registry, "labelme", &in_path)
        .expect("load labelme file");

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.image_size(), Some(ImageSize::new(640, 480)));

    dataset
        .save(&registry, &out_path, "labelme", &ExportOptions::default())
        .expect("save labelme file");

    let mut restored = Dataset::new();
    restored
        .load_path(&registry, "labelme", &out_path)
        .expect("reload written file");

    assert_eq!(restored.len(), 2);
    assert_eq!(restored.records()[0].bbox.label(), "person");
    // The second shape's corner points arrive max-first; min/max
    // canonicalizes them on the first import, so the reload is stable.
    assert_eq!(
        restored.records()[1].bbox.ltrb(Space::Pixel, None).unwrap(),
        [60.0, 80.0, 100.0, 120.0]
    );
}

#[test]
fn export_resolves_size_by_probing_the_image() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let image_path = temp.path().join("scene.bmp");
    write_image(&image_path, 320, 240);

    let registry = FormatRegistry::builtins();
    let mut dataset = Dataset::for_image(image_path.to_string_lossy());
    dataset.push(Annotation::new(
        BBox::new([10.0, 20.0, 30.0, 40.0], BoxFormat::Ltrb, Space::Pixel)
            .expect("valid box")
            .with_label("person"),
    ));

    let bytes = dataset
        .dump(&registry, "labelme", &ExportOptions::default())
        .expect("export probes the image header");
    let doc: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");

    assert_eq!(doc["imageWidth"], 320);
    assert_eq!(doc["imageHeight"], 240);
    assert_eq!(doc["imagePath"], "scene.bmp");
}

#[test]
fn export_converts_normalized_boxes_to_pixel_points() {
    let registry = FormatRegistry::builtins();
    let mut dataset = Dataset::for_image("scene.jpg");
    dataset.set_image_size(ImageSize::new(100, 200));
    dataset.push(Annotation::new(
        BBox::new([0.25, 0.25, 0.5, 0.5], BoxFormat::Ltrb, Space::Normalized)
            .expect("valid box")
            .with_label("person"),
    ));

    let bytes = dataset
        .dump(&registry, "labelme", &ExportOptions::default())
        .expect("export converts to pixel space");
    let doc: serde_json::Value = serde_json::from_slice(&bytes).expect("valid json");
    assert_eq!(
        doc["shapes"][0]["points"],
        serde_json::json!([[25.0, 50.0], [50.0, 100.0]])
    );
}
