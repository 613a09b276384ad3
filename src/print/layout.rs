//! Fixed slip geometry.
//!
//! All coordinates are millimetres from the top-left corner of the page. A page
//! holds one slip (A5 landscape) or two to three stacked slips (A4 portrait)
//! separated by cut lines. Positions never move with content; a note that would
//! cross the next cut line loses its trailing lines instead.

use super::{
    LayoutWarning, Slip,
    metrics::{Font, PT_PER_MM, text_width, wrap},
};
use crate::{
    core::dates::format_date,
    errors::{Error, Result},
};

const LEFT: f32 = 10.0;
const CELL_WIDTH: f32 = 130.0;
const CELL_PADDING: f32 = 1.0;
const HEADER_CELL_HEIGHT: f32 = 8.0;
const BOTTOM_MARGIN: f32 = 10.0;
/// Left end of every cut line
pub const CUT_LINE_START: f32 = 10.0;
/// Right end of every cut line
pub const CUT_LINE_END: f32 = 200.0;
/// Stroke width of cut lines
pub const CUT_LINE_WIDTH: f32 = 0.5;
const CUT_CAPTION: &str = "--- LINHA DE CORTE ---";
const CUT_CAPTION_X: f32 = 85.0;
const CUT_CAPTION_WIDTH: f32 = 40.0;
const CUT_CAPTION_HEIGHT: f32 = 5.0;
const CUT_CAPTION_OFFSET: f32 = 3.0;
const IMAGE_INSET: f32 = 2.0;
/// Stroke width of cell borders and frames
pub const BORDER_WIDTH: f32 = 0.2;

const TITLE: &str = "ORDEM DE SERVIÇO";
const BODY_SIZE: f32 = 12.0;
const CLIENT_SIZE: f32 = 14.0;
const CAPTION_SIZE: f32 = 8.0;

/// A rectangle in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Paper size of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    /// 210 x 148 mm
    A5Landscape,
    /// 210 x 297 mm
    A4Portrait,
}

impl PageSize {
    /// (width, height) in millimetres.
    #[must_use]
    pub const fn dimensions(self) -> (f32, f32) {
        match self {
            Self::A5Landscape => (210.0, 148.0),
            Self::A4Portrait => (210.0, 297.0),
        }
    }
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    /// A single line of text; `baseline` is the y of the text baseline
    Text {
        /// Left edge of the first glyph
        x: f32,
        /// Baseline position
        baseline: f32,
        /// Face
        font: Font,
        /// Size in points
        size: f32,
        /// Content
        text: String,
    },
    /// A stroked rectangle
    Frame(Rect),
    /// A stroked horizontal cut line
    CutLine {
        /// Vertical position
        y: f32,
    },
    /// The image of slip `slip`, drawn into `rect`
    Image {
        /// Index of the slip whose image this is
        slip: usize,
        /// Destination
        rect: Rect,
    },
}

/// A laid-out page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Paper size
    pub size: PageSize,
    /// Drawing instructions in paint order
    pub marks: Vec<Mark>,
}

#[derive(Debug, Clone, Copy)]
struct SlipGeometry {
    top: f32,
    frame: Rect,
    cell_height: f32,
    /// Lowest y the note may reach
    limit: f32,
    delivery_label: &'static str,
    /// Size row printed before the quantity row
    size_first: bool,
}

struct Arrangement {
    size: PageSize,
    slips: Vec<SlipGeometry>,
    cut_lines: Vec<f32>,
}

fn arrangement(count: usize) -> Result<Arrangement> {
    let stacked = |top: f32, frame_y: f32, limit: f32| SlipGeometry {
        top,
        frame: Rect::new(140.0, frame_y, 50.0, 75.0),
        cell_height: 7.0,
        limit,
        delivery_label: "Data Entrega",
        size_first: true,
    };
    let a4_bottom = PageSize::A4Portrait.dimensions().1 - BOTTOM_MARGIN;
    let above = |cut: f32| cut - CUT_CAPTION_OFFSET;

    match count {
        1 => Ok(Arrangement {
            size: PageSize::A5Landscape,
            slips: vec![SlipGeometry {
                top: 10.0,
                frame: Rect::new(130.0, 18.0, 70.0, 100.0),
                cell_height: 8.0,
                limit: PageSize::A5Landscape.dimensions().1 - BOTTOM_MARGIN,
                delivery_label: "Data Entrega Prevista",
                size_first: false,
            }],
            cut_lines: Vec::new(),
        }),
        2 => Ok(Arrangement {
            size: PageSize::A4Portrait,
            slips: vec![stacked(10.0, 18.0, above(148.0)), stacked(155.0, 173.0, a4_bottom)],
            cut_lines: vec![148.0],
        }),
        3 => Ok(Arrangement {
            size: PageSize::A4Portrait,
            slips: vec![
                stacked(10.0, 18.0, above(98.0)),
                stacked(105.0, 103.0, above(188.0)),
                stacked(195.0, 203.0, a4_bottom),
            ],
            cut_lines: vec![98.0, 188.0],
        }),
        other => Err(Error::Validation {
            message: format!("a page holds 1 to 3 work orders, got {other}"),
        }),
    }
}

/// Baseline of text vertically centred in a cell.
fn baseline(cell_y: f32, cell_height: f32, size: f32) -> f32 {
    cell_y + cell_height / 2.0 + 0.3 * size / PT_PER_MM
}

fn cell(marks: &mut Vec<Mark>, y: f32, height: f32, font: Font, size: f32, text: String) {
    marks.push(Mark::Frame(Rect::new(LEFT, y, CELL_WIDTH, height)));
    marks.push(Mark::Text {
        x: LEFT + CELL_PADDING,
        baseline: baseline(y, height, size),
        font,
        size,
        text,
    });
}

/// Fits an image of `width` x `height` pixels into `frame`: inset, scaled to the
/// frame width, then shrunk further if it would overflow the frame height.
#[must_use]
pub fn fit_image(frame: Rect, width: u32, height: u32) -> Option<Rect> {
    if width == 0 || height == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let aspect = height as f32 / width as f32;

    let max_width = frame.width - 2.0 * IMAGE_INSET;
    let max_height = frame.height - 2.0 * IMAGE_INSET;
    let mut draw_width = max_width;
    let mut draw_height = max_width * aspect;
    if draw_height > max_height {
        draw_height = max_height;
        draw_width = max_height / aspect;
    }
    Some(Rect::new(
        frame.x + IMAGE_INSET,
        frame.y + IMAGE_INSET,
        draw_width,
        draw_height,
    ))
}

fn compose_slip(
    marks: &mut Vec<Mark>,
    warnings: &mut Vec<LayoutWarning>,
    index: usize,
    slip: &Slip<'_>,
    geometry: SlipGeometry,
) {
    let order = slip.order;
    let h = geometry.cell_height;

    let title_width = text_width(Font::Regular, BODY_SIZE, TITLE);
    marks.push(Mark::Text {
        x: LEFT + (CELL_WIDTH - title_width) / 2.0,
        baseline: baseline(geometry.top, HEADER_CELL_HEIGHT, BODY_SIZE),
        font: Font::Regular,
        size: BODY_SIZE,
        text: TITLE.to_string(),
    });

    let mut y = geometry.top + HEADER_CELL_HEIGHT;
    cell(
        marks,
        y,
        HEADER_CELL_HEIGHT,
        Font::Bold,
        CLIENT_SIZE,
        format!("Cliente: {}", order.client),
    );
    y += HEADER_CELL_HEIGHT;

    let size_row = format!("Tamanho: {}", order.size);
    let quantity_row = "Quantidade: ".to_string();
    let (third, fourth) = if geometry.size_first {
        (size_row, quantity_row)
    } else {
        (quantity_row, size_row)
    };
    let rows = [
        format!("Equipe: {}", order.team),
        format!("Estampa: {}", order.design),
        third,
        fourth,
        format!(
            "{}: {}",
            geometry.delivery_label,
            format_date(order.delivery_date)
        ),
    ];
    for text in rows {
        cell(marks, y, h, Font::Regular, BODY_SIZE, text);
        y += h;
    }

    let note = format!("Observação: {}", order.note);
    let mut lines = wrap(
        Font::Regular,
        BODY_SIZE,
        &note,
        CELL_WIDTH - 2.0 * CELL_PADDING,
    );
    let room = ((geometry.limit - y) / h).floor().max(1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let fits = room as usize;
    if lines.len() > fits {
        warnings.push(LayoutWarning::NoteTruncated {
            code: order.code,
            dropped_lines: lines.len() - fits,
        });
        lines.truncate(fits);
    }

    #[allow(clippy::cast_precision_loss)]
    let note_height = lines.len() as f32 * h;
    marks.push(Mark::Frame(Rect::new(LEFT, y, CELL_WIDTH, note_height)));
    for line in lines {
        marks.push(Mark::Text {
            x: LEFT + CELL_PADDING,
            baseline: baseline(y, h, BODY_SIZE),
            font: Font::Regular,
            size: BODY_SIZE,
            text: line,
        });
        y += h;
    }

    marks.push(Mark::Frame(geometry.frame));
    match slip.image {
        Some(image) => {
            if let Some(rect) = fit_image(geometry.frame, image.width, image.height) {
                marks.push(Mark::Image { slip: index, rect });
            }
        }
        None => warnings.push(LayoutWarning::MissingImage {
            code: order.code,
            design: order.design.clone(),
        }),
    }
}

/// Lays out 1 to 3 slips on one page.
pub fn compose(slips: &[Slip<'_>]) -> Result<(Page, Vec<LayoutWarning>)> {
    let arrangement = arrangement(slips.len())?;
    let mut marks = Vec::new();
    let mut warnings = Vec::new();

    for (index, (slip, geometry)) in slips.iter().zip(arrangement.slips).enumerate() {
        compose_slip(&mut marks, &mut warnings, index, slip, geometry);
    }

    let caption_width = text_width(Font::Italic, CAPTION_SIZE, CUT_CAPTION);
    for y in arrangement.cut_lines {
        marks.push(Mark::CutLine { y });
        let caption_top = y - CUT_CAPTION_OFFSET;
        marks.push(Mark::Text {
            x: CUT_CAPTION_X + (CUT_CAPTION_WIDTH - caption_width) / 2.0,
            baseline: baseline(caption_top, CUT_CAPTION_HEIGHT, CAPTION_SIZE),
            font: Font::Italic,
            size: CAPTION_SIZE,
            text: CUT_CAPTION.to_string(),
        });
    }

    Ok((
        Page {
            size: arrangement.size,
            marks,
        },
        warnings,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]
    use super::*;
    use crate::{assets::ResolvedImage, test_utils::sample_order};

    fn frames(page: &Page) -> Vec<Rect> {
        page.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Frame(r) if r.x > LEFT => Some(*r),
                _ => None,
            })
            .collect()
    }

    fn cut_lines(page: &Page) -> Vec<f32> {
        page.marks
            .iter()
            .filter_map(|m| match m {
                Mark::CutLine { y } => Some(*y),
                _ => None,
            })
            .collect()
    }

    fn texts(page: &Page) -> Vec<&str> {
        page.marks
            .iter()
            .filter_map(|m| match m {
                Mark::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_slip_is_a5_landscape() {
        let order = sample_order(7, "Ana");
        let (page, warnings) = compose(&[Slip { order: &order, image: None }]).unwrap();

        assert_eq!(page.size, PageSize::A5Landscape);
        assert_eq!(frames(&page), vec![Rect::new(130.0, 18.0, 70.0, 100.0)]);
        assert!(cut_lines(&page).is_empty());
        assert_eq!(
            texts(&page)[..7],
            [
                "ORDEM DE SERVIÇO",
                "Cliente: Ana",
                "Equipe: Estamparia",
                "Estampa: flores",
                "Quantidade: ",
                "Tamanho: M",
                "Data Entrega Prevista: 20/01/2025",
            ]
        );
        assert_eq!(
            warnings,
            vec![LayoutWarning::MissingImage {
                code: 7,
                design: "flores".to_string()
            }]
        );
    }

    #[test]
    fn test_two_slips_share_an_a4_page() {
        let a = sample_order(1, "Ana");
        let b = sample_order(2, "Bia");
        let slips = [Slip { order: &a, image: None }, Slip { order: &b, image: None }];
        let (page, _) = compose(&slips).unwrap();

        assert_eq!(page.size, PageSize::A4Portrait);
        let frame_tops: Vec<f32> = frames(&page).iter().map(|r| r.y).collect();
        assert_eq!(frame_tops, vec![18.0, 173.0]);
        assert_eq!(cut_lines(&page), vec![148.0]);
        assert_eq!(
            texts(&page).iter().filter(|t| **t == CUT_CAPTION).count(),
            1
        );
        assert!(texts(&page).contains(&"Data Entrega: 20/01/2025"));
    }

    #[test]
    fn test_three_slips_positions() {
        let orders = [sample_order(1, "A"), sample_order(2, "B"), sample_order(3, "C")];
        let slips: Vec<Slip<'_>> = orders.iter().map(|o| Slip { order: o, image: None }).collect();
        let (page, warnings) = compose(&slips).unwrap();

        let found = frames(&page);
        assert_eq!(
            found.iter().map(|r| r.y).collect::<Vec<_>>(),
            vec![18.0, 103.0, 203.0]
        );
        assert!(found.iter().all(|r| r.x == 140.0 && r.width == 50.0 && r.height == 75.0));
        assert_eq!(cut_lines(&page), vec![98.0, 188.0]);
        assert_eq!(warnings.len(), 3);
    }

    #[test]
    fn test_rejects_empty_and_oversized_pages() {
        assert!(compose(&[]).is_err());
        let orders: Vec<_> = (1..=4).map(|i| sample_order(i, "X")).collect();
        let slips: Vec<Slip<'_>> = orders.iter().map(|o| Slip { order: o, image: None }).collect();
        assert!(matches!(compose(&slips), Err(Error::Validation { .. })));
    }

    #[test]
    fn test_long_note_is_truncated_before_cut_line() {
        let mut first = sample_order(1, "Ana");
        first.note = "palavra ".repeat(60).trim().to_string();
        let second = sample_order(2, "Bia");
        let third = sample_order(3, "Caio");
        let slips = [
            Slip { order: &first, image: None },
            Slip { order: &second, image: None },
            Slip { order: &third, image: None },
        ];
        let (page, warnings) = compose(&slips).unwrap();

        assert!(warnings.iter().any(|w| matches!(
            w,
            LayoutWarning::NoteTruncated { code: 1, .. }
        )));
        // Nothing of the first slip crosses the first cut line's caption
        let first_slip_texts = page.marks.iter().take_while(|m| {
            !matches!(m, Mark::Frame(r) if (r.x - 140.0).abs() < f32::EPSILON)
        });
        for mark in first_slip_texts {
            if let Mark::Text { baseline, .. } = mark {
                assert!(*baseline < 95.0);
            }
        }
    }

    #[test]
    fn test_image_is_inset_and_clamped() {
        let frame = Rect::new(140.0, 18.0, 50.0, 75.0);

        let wide = fit_image(frame, 200, 100).unwrap();
        assert_eq!((wide.x, wide.y), (142.0, 20.0));
        assert_eq!(wide.width, 46.0);
        assert_eq!(wide.height, 23.0);

        let tall = fit_image(frame, 100, 1000).unwrap();
        assert_eq!(tall.height, 71.0);
        assert!((tall.width - 7.1).abs() < 0.001);
        assert!(tall.bottom() <= frame.bottom());

        assert!(fit_image(frame, 0, 10).is_none());
    }

    #[test]
    fn test_resolved_image_is_placed_in_frame() {
        let order = sample_order(9, "Ana");
        let image = ResolvedImage {
            name: "flores".to_string(),
            width: 2,
            height: 1,
            rgb: vec![0; 6],
        };
        let (page, warnings) = compose(&[Slip { order: &order, image: Some(&image) }]).unwrap();

        assert!(warnings.is_empty());
        assert!(page.marks.contains(&Mark::Image {
            slip: 0,
            rect: Rect::new(132.0, 20.0, 66.0, 33.0)
        }));
    }
}
