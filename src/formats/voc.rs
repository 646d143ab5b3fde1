//! Pascal VOC XML reader and writer.
//!
//! One `<annotation>` document per image: `<size>` carries the pixel
//! dimensions and each `<object>` carries a label plus an integer-pixel
//! `<bndbox>`. The optional `pose`/`truncated`/`difficult` children ride
//! along in the record attributes.

use std::fmt::Write as _;

use roxmltree::Node;

use crate::dataset::{Annotation, Dataset};
use crate::error::AnnoboxError;
use crate::geom::{BBox, BoxFormat, ImageSize, Space};

use super::{
    apply_label_map, image_basename, resolve_export_size, ExportOptions, FormatPlugin,
    ImportOptions, Payload,
};

const OPTIONAL_OBJECT_KEYS: [&str; 3] = ["pose", "truncated", "difficult"];

/// The Pascal VOC XML object-detection schema.
pub struct Voc;

impl FormatPlugin for Voc {
    fn name(&self) -> &'static str {
        "voc"
    }

    fn can_import(&self) -> bool {
        true
    }

    fn can_export(&self) -> bool {
        true
    }

    fn import_set(
        &self,
        dataset: &mut Dataset,
        bytes: &[u8],
        _options: &ImportOptions,
    ) -> Result<(), AnnoboxError> {
        let xml = std::str::from_utf8(bytes).map_err(|source| AnnoboxError::Parse {
            format: "voc xml",
            message: format!("input is not valid UTF-8: {source}"),
        })?;
        let document = roxmltree::Document::parse(xml).map_err(|source| AnnoboxError::Parse {
            format: "voc xml",
            message: source.to_string(),
        })?;

        let annotation = document.root_element();
        if annotation.tag_name().name() != "annotation" {
            return Err(AnnoboxError::Parse {
                format: "voc xml",
                message: "missing <annotation> root element".to_string(),
            });
        }

        let size_node = required_child(annotation, "size", "<annotation>")?;
        let width = parse_required_u32(size_node, "width", "<size>")?;
        let height = parse_required_u32(size_node, "height", "<size>")?;
        let filename = optional_child_text(annotation, "filename");

        let had_image_path = dataset.image_path().map(str::to_string);
        dataset.clear();

        let size = ImageSize::new(width, height);
        dataset.set_image_size(size);
        if let Some(path) = had_image_path.or(filename) {
            dataset.set_image_path(path);
        }

        for object in annotation
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "object")
        {
            let name = required_child_text(object, "name", "<object>")?;
            let bndbox = required_child(object, "bndbox", "<object>")?;

            let xmin = parse_required_f64(bndbox, "xmin", "<bndbox>")?;
            let ymin = parse_required_f64(bndbox, "ymin", "<bndbox>")?;
            let xmax = parse_required_f64(bndbox, "xmax", "<bndbox>")?;
            let ymax = parse_required_f64(bndbox, "ymax", "<bndbox>")?;

            let bbox = BBox::new([xmin, ymin, xmax, ymax], BoxFormat::Ltrb, Space::Pixel)?
                .with_image_size(size)
                .with_label(name);

            let mut record = Annotation::new(bbox);
            for key in OPTIONAL_OBJECT_KEYS {
                if let Some(value) = optional_child_text(object, key) {
                    record.attributes.insert(key.to_string(), value);
                }
            }

            dataset.push(record);
        }

        Ok(())
    }

    fn export_set(
        &self,
        dataset: &Dataset,
        options: &ExportOptions,
    ) -> Result<Payload, AnnoboxError> {
        let size = resolve_export_size(dataset)?;
        let filename = dataset
            .image_path()
            .map(image_basename)
            .ok_or(AnnoboxError::MissingImagePath)?;

        let mut xml = String::new();
        writeln!(xml, "<annotation>").expect("write to string");
        writeln!(xml, "  <folder>VOC2007</folder>").expect("write to string");
        writeln!(xml, "  <filename>{}</filename>", xml_escape(&filename)).expect("write to string");
        writeln!(xml, "  <size>").expect("write to string");
        writeln!(xml, "    <width>{}</width>", size.width).expect("write to string");
        writeln!(xml, "    <height>{}</height>", size.height).expect("write to string");
        writeln!(xml, "    <depth>3</depth>").expect("write to string");
        writeln!(xml, "  </size>").expect("write to string");

        for record in dataset.records() {
            let [l, t, r, b] = record.bbox.ltrb(Space::Pixel, Some(size))?;
            let label = apply_label_map(record.bbox.raw_label(), options.label_map.as_ref())?;

            let pose = record.attributes.get("pose").map(String::as_str);
            let truncated = record.attributes.get("truncated").map(String::as_str);
            let difficult = record.attributes.get("difficult").map(String::as_str);

            writeln!(xml, "  <object>").expect("write to string");
            writeln!(xml, "    <name>{}</name>", xml_escape(&label)).expect("write to string");
            writeln!(
                xml,
                "    <pose>{}</pose>",
                xml_escape(pose.unwrap_or("Unspecified"))
            )
            .expect("write to string");
            writeln!(
                xml,
                "    <truncated>{}</truncated>",
                xml_escape(truncated.unwrap_or("0"))
            )
            .expect("write to string");
            writeln!(
                xml,
                "    <difficult>{}</difficult>",
                xml_escape(difficult.unwrap_or("0"))
            )
            .expect("write to string");
            writeln!(xml, "    <bndbox>").expect("write to string");
            writeln!(xml, "      <xmin>{}</xmin>", l.round() as i64).expect("write to string");
            writeln!(xml, "      <ymin>{}</ymin>", t.round() as i64).expect("write to string");
            writeln!(xml, "      <xmax>{}</xmax>", r.round() as i64).expect("write to string");
            writeln!(xml, "      <ymax>{}</ymax>", b.round() as i64).expect("write to string");
            writeln!(xml, "    </bndbox>").expect("write to string");
            writeln!(xml, "  </object>").expect("write to string");
        }

        writeln!(xml, "</annotation>").expect("write to string");
        Ok(Payload::Text(xml))
    }
}

fn required_child<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
    context: &str,
) -> Result<Node<'a, 'input>, AnnoboxError> {
    child_element(node, tag).ok_or_else(|| AnnoboxError::Parse {
        format: "voc xml",
        message: format!("missing <{tag}> in {context}"),
    })
}

fn required_child_text(
    node: Node<'_, '_>,
    tag: &str,
    context: &str,
) -> Result<String, AnnoboxError> {
    optional_child_text(node, tag).ok_or_else(|| AnnoboxError::Parse {
        format: "voc xml",
        message: format!("missing <{tag}> in {context}"),
    })
}

fn parse_required_u32(node: Node<'_, '_>, tag: &str, context: &str) -> Result<u32, AnnoboxError> {
    let raw = required_child_text(node, tag, context)?;
    raw.parse::<u32>().map_err(|_| AnnoboxError::Parse {
        format: "voc xml",
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected u32"),
    })
}

fn parse_required_f64(node: Node<'_, '_>, tag: &str, context: &str) -> Result<f64, AnnoboxError> {
    let raw = required_child_text(node, tag, context)?;
    raw.parse::<f64>().map_err(|_| AnnoboxError::Parse {
        format: "voc xml",
        message: format!("invalid <{tag}> value '{raw}' in {context}; expected number"),
    })
}

fn child_element<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == tag)
}

fn optional_child_text(node: Node<'_, '_>, tag: &str) -> Option<String> {
    child_element(node, tag)
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

fn xml_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
