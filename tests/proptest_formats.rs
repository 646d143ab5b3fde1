use annobox::{Annotation, BBox, BoxFormat, Dataset, ExportOptions, FormatRegistry, Space};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn yolo_roundtrip_stays_within_formatting_precision(
        size in proptest_helpers::arb_image_size(),
        seeds in proptest::collection::vec((any::<u32>(), 0u8..=9), 1..8),
    ) {
        let registry = FormatRegistry::builtins();

        let mut dataset = Dataset::new();
        dataset.set_image_size(size);
        for (seed, class) in &seeds {
            let ltrb = proptest_helpers::arb_pixel_ltrb_seed(size, *seed);
            dataset.push(Annotation::new(
                BBox::new(ltrb, BoxFormat::Ltrb, Space::Pixel)
                    .expect("seeded box is valid")
                    .with_image_size(size)
                    .with_label(class.to_string()),
            ));
        }

        let bytes = dataset
            .dump(&registry, "yolo", &ExportOptions::default())
            .expect("export yolo");
        let mut restored = Dataset::new();
        restored
            .load_bytes(&registry, "yolo", &bytes)
            .expect("reimport yolo");

        prop_assert_eq!(restored.len(), dataset.len());
        let eps = proptest_helpers::eps_yolo(size);
        for (original, reread) in dataset.records().iter().zip(restored.records()) {
            prop_assert_eq!(original.bbox.label(), reread.bbox.label());
            let a = original.bbox.ltrb(Space::Pixel, None).expect("pixel coords");
            let b = reread
                .bbox
                .ltrb(Space::Pixel, Some(size))
                .expect("scaled coords");
            let res = proptest_helpers::assert_close(b, a, eps);
            prop_assert!(res.is_ok(), "{}", res.unwrap_err());
        }
    }

    #[test]
    fn voc_roundtrip_preserves_integer_boxes_exactly(
        size in proptest_helpers::arb_image_size(),
        seeds in proptest::collection::vec(any::<u32>(), 1..8),
    ) {
        let registry = FormatRegistry::builtins();

        let mut dataset = Dataset::for_image("probe.jpg");
        dataset.set_image_size(size);
        for (idx, seed) in seeds.iter().enumerate() {
            let ltrb = proptest_helpers::arb_pixel_ltrb_seed(size, *seed);
            dataset.push(Annotation::new(
                BBox::new(ltrb, BoxFormat::Ltrb, Space::Pixel)
                    .expect("seeded box is valid")
                    .with_label(format!("class_{idx}")),
            ));
        }

        let bytes = dataset
            .dump(&registry, "voc", &ExportOptions::default())
            .expect("export voc");
        let mut restored = Dataset::new();
        restored
            .load_bytes(&registry, "voc", &bytes)
            .expect("reimport voc");

        prop_assert_eq!(restored.len(), dataset.len());
        prop_assert_eq!(restored.image_size(), Some(size));
        // Seeded boxes are integer-valued, so the VOC integer rounding
        // loses nothing.
        for (original, reread) in dataset.records().iter().zip(restored.records()) {
            prop_assert_eq!(original.bbox.label(), reread.bbox.label());
            prop_assert_eq!(
                original.bbox.ltrb(Space::Pixel, None).expect("pixel coords"),
                reread.bbox.ltrb(Space::Pixel, None).expect("pixel coords")
            );
        }
    }

    #[test]
    fn labelme_roundtrip_preserves_boxes_exactly(
        size in proptest_helpers::arb_image_size(),
        seeds in proptest::collection::vec(any::<u32>(), 1..8),
    ) {
        let registry = FormatRegistry::builtins();

        let mut dataset = Dataset::for_image("probe.jpg");
        dataset.set_image_size(size);
        for (idx, seed) in seeds.iter().enumerate() {
            let ltrb = proptest_helpers::arb_pixel_ltrb_seed(size, *seed);
            dataset.push(Annotation::new(
                BBox::new(ltrb, BoxFormat::Ltrb, Space::Pixel)
                    .expect("seeded box is valid")
                    .with_label(format!("class_{idx}")),
            ));
        }

        let bytes = dataset
            .dump(&registry, "labelme", &ExportOptions::default())
            .expect("export labelme");
        let mut restored = Dataset::new();
        restored
            .load_bytes(&registry, "labelme", &bytes)
            .expect("reimport labelme");

        prop_assert_eq!(restored.len(), dataset.len());
        prop_assert_eq!(restored.image_size(), Some(size));
        for (original, reread) in dataset.records().iter().zip(restored.records()) {
            prop_assert_eq!(original.bbox.label(), reread.bbox.label());
            prop_assert_eq!(
                original.bbox.ltrb(Space::Pixel, None).expect("pixel coords"),
                reread.bbox.ltrb(Space::Pixel, None).expect("pixel coords")
            );
        }
    }
}
