//! Serialises a laid-out [`Page`] into a single-page PDF with `lopdf`.

use super::{
    Slip,
    layout::{BORDER_WIDTH, CUT_LINE_END, CUT_LINE_START, CUT_LINE_WIDTH, Mark, Page, Rect},
    metrics::{Font, PT_PER_MM, win_ansi},
};
use crate::errors::Result;
use lopdf::{
    Dictionary, Document, Object, ObjectId, Stream,
    content::{Content, Operation},
    dictionary,
};

const FONTS: [Font; 3] = [Font::Regular, Font::Bold, Font::Italic];

/// Converts top-left millimetre coordinates into PDF user space.
struct Space {
    page_height: f32,
}

impl Space {
    fn x(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }

    fn y(&self, mm: f32) -> f32 {
        (self.page_height - mm) * PT_PER_MM
    }

    fn len(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

fn image_name(slip: usize) -> String {
    format!("Im{}", slip + 1)
}

fn stroke_rect(ops: &mut Vec<Operation>, space: &Space, rect: Rect) {
    ops.push(op(
        "re",
        vec![
            space.x(rect.x).into(),
            space.y(rect.bottom()).into(),
            space.len(rect.width).into(),
            space.len(rect.height).into(),
        ],
    ));
    ops.push(op("S", vec![]));
}

fn content_for(page: &Page) -> Vec<Operation> {
    let space = Space {
        page_height: page.size.dimensions().1,
    };
    let mut ops = vec![op("w", vec![space.len(BORDER_WIDTH).into()])];

    for mark in &page.marks {
        match mark {
            Mark::Text {
                x,
                baseline,
                font,
                size,
                text,
            } => {
                ops.push(op("BT", vec![]));
                ops.push(op("Tf", vec![font.resource().into(), (*size).into()]));
                ops.push(op("Td", vec![space.x(*x).into(), space.y(*baseline).into()]));
                ops.push(op("Tj", vec![Object::string_literal(win_ansi(text))]));
                ops.push(op("ET", vec![]));
            }
            Mark::Frame(rect) => stroke_rect(&mut ops, &space, *rect),
            Mark::CutLine { y } => {
                ops.push(op("q", vec![]));
                ops.push(op("w", vec![space.len(CUT_LINE_WIDTH).into()]));
                ops.push(op("m", vec![space.x(CUT_LINE_START).into(), space.y(*y).into()]));
                ops.push(op("l", vec![space.x(CUT_LINE_END).into(), space.y(*y).into()]));
                ops.push(op("S", vec![]));
                ops.push(op("Q", vec![]));
            }
            Mark::Image { slip, rect } => {
                ops.push(op("q", vec![]));
                ops.push(op(
                    "cm",
                    vec![
                        space.len(rect.width).into(),
                        0_i64.into(),
                        0_i64.into(),
                        space.len(rect.height).into(),
                        space.x(rect.x).into(),
                        space.y(rect.bottom()).into(),
                    ],
                ));
                ops.push(op("Do", vec![Object::Name(image_name(*slip).into_bytes())]));
                ops.push(op("Q", vec![]));
            }
        }
    }
    ops
}

fn image_objects(doc: &mut Document, page: &Page, slips: &[Slip<'_>]) -> Dictionary {
    let mut xobjects = Dictionary::new();
    for mark in &page.marks {
        let Mark::Image { slip, .. } = mark else {
            continue;
        };
        let Some(image) = slips.get(*slip).and_then(|s| s.image) else {
            continue;
        };
        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(image.width),
                "Height" => i64::from(image.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8_i64,
            },
            image.rgb.clone(),
        );
        let id: ObjectId = doc.add_object(stream);
        xobjects.set(image_name(*slip), id);
    }
    xobjects
}

/// Writes `page` as a PDF document and returns its bytes.
pub fn write(page: &Page, slips: &[Slip<'_>]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for font in FONTS {
        let id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(font.resource(), id);
    }
    let xobjects = image_objects(&mut doc, page, slips);
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
        "XObject" => xobjects,
    });

    let content = Content {
        operations: content_for(page),
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let (width, height) = page.size.dimensions();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0_i64.into(), 0_i64.into(), (width * PT_PER_MM).into(), (height * PT_PER_MM).into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1_i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{assets::ResolvedImage, print::layout::compose, test_utils::sample_order};

    #[test]
    fn test_writes_single_page_document() {
        let order = sample_order(3, "Ana");
        let image = ResolvedImage {
            name: "flores".to_string(),
            width: 2,
            height: 2,
            rgb: vec![255; 12],
        };
        let slips = [Slip {
            order: &order,
            image: Some(&image),
        }];
        let (page, _) = compose(&slips).unwrap();
        let bytes = write(&page, &slips).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);

        let text = doc.extract_text(&[1]).unwrap();
        assert!(text.contains("Cliente: Ana"));

        let images = doc
            .objects
            .values()
            .filter(|object| match object {
                Object::Stream(stream) => {
                    stream.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice())
                }
                _ => false,
            })
            .count();
        assert_eq!(images, 1);
    }

    #[test]
    fn test_a5_media_box_is_landscape() {
        let order = sample_order(3, "Ana");
        let slips = [Slip {
            order: &order,
            image: None,
        }];
        let (page, _) = compose(&slips).unwrap();
        let doc = Document::load_mem(&write(&page, &slips).unwrap()).unwrap();

        let page_id = doc.get_pages()[&1];
        let media_box = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"MediaBox")
            .unwrap()
            .as_array()
            .unwrap()
            .clone();
        let width = media_box[2].as_float().unwrap();
        let height = media_box[3].as_float().unwrap();
        assert!(width > height);
        assert!((width - 595.28).abs() < 0.1);
    }
}
