//! Growth-plan PDF — lays out a title and one flowing body paragraph on A4 pages,
//! then serializes the pages with lopdf.
//!
//! Rendering is deterministic: the same title and body always produce the same
//! bytes. Nothing time- or randomness-dependent is written into the file.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use crate::export::font_metrics::{encode_win_ansi, measure_pt, wrap_text, FontFace};
use crate::export::ExportError;

/// Page geometry and type sizes, in PDF points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSetup {
    pub width_pt: f32,
    pub height_pt: f32,
    pub margin_pt: f32,
    pub title_size_pt: f32,
    pub title_leading_pt: f32,
    /// Vertical gap between the title block and the body.
    pub title_gap_pt: f32,
    pub body_size_pt: f32,
    pub body_leading_pt: f32,
}

/// A4 with 1" margins: 18pt bold title, 10pt body on 12pt leading.
pub fn default_page_setup() -> PageSetup {
    PageSetup {
        width_pt: 595.0,
        height_pt: 842.0,
        margin_pt: 72.0,
        title_size_pt: 18.0,
        title_leading_pt: 22.0,
        title_gap_pt: 12.0,
        body_size_pt: 10.0,
        body_leading_pt: 12.0,
    }
}

impl PageSetup {
    fn text_width(&self) -> f32 {
        self.width_pt - 2.0 * self.margin_pt
    }
}

/// A single line of text at its final position (baseline origin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedLine {
    pub text: String,
    pub face: FontFace,
    pub size_pt: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Places the centered title and the wrapped body onto as many pages as needed.
/// Always returns at least one page.
pub fn layout_document(title: &str, body: &str, setup: &PageSetup) -> Vec<PageLayout> {
    let mut pages = vec![PageLayout::default()];
    let top = setup.height_pt - setup.margin_pt;
    let bottom = setup.margin_pt;
    let text_width = setup.text_width();

    let mut y = top - setup.title_size_pt;
    for line in wrap_text(title, FontFace::Bold, setup.title_size_pt, text_width) {
        let width = measure_pt(&line, FontFace::Bold, setup.title_size_pt);
        push_line(
            &mut pages,
            PlacedLine {
                x: round2(setup.margin_pt + (text_width - width) / 2.0),
                y: round2(y),
                text: line,
                face: FontFace::Bold,
                size_pt: setup.title_size_pt,
            },
        );
        y -= setup.title_leading_pt;
    }
    y -= setup.title_gap_pt;

    for line in wrap_text(body, FontFace::Regular, setup.body_size_pt, text_width) {
        if y < bottom {
            pages.push(PageLayout::default());
            y = top - setup.body_size_pt;
        }
        push_line(
            &mut pages,
            PlacedLine {
                x: round2(setup.margin_pt),
                y: round2(y),
                text: line,
                face: FontFace::Regular,
                size_pt: setup.body_size_pt,
            },
        );
        y -= setup.body_leading_pt;
    }

    pages
}

fn push_line(pages: &mut [PageLayout], line: PlacedLine) {
    if let Some(page) = pages.last_mut() {
        page.lines.push(line);
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

/// Serializes laid-out pages into PDF bytes.
pub fn render_pdf(pages: &[PageLayout], setup: &PageSetup) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_ids: Vec<(FontFace, ObjectId)> = [FontFace::Regular, FontFace::Bold]
        .into_iter()
        .map(|face| {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            (face, id)
        })
        .collect();

    let mut fonts = lopdf::Dictionary::new();
    for (face, id) in &font_ids {
        fonts.set(face.resource_name(), *id);
    }
    let resources_id = doc.add_object(dictionary! {
        "Font" => fonts,
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            setup.width_pt.into(),
            setup.height_pt.into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

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

fn page_content(page: &PageLayout) -> Content {
    let mut operations = Vec::with_capacity(page.lines.len() * 5);
    for line in &page.lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![line.face.resource_name().into(), line.size_pt.into()],
        ));
        operations.push(Operation::new("Td", vec![line.x.into(), line.y.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::string_literal(encode_win_ansi(&line.text))],
        ));
        operations.push(Operation::new("ET", vec![]));
    }
    Content { operations }
}
