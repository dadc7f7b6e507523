// src/pdf_render.rs

use crate::assembler::DocumentContext;
use crate::error::ReportError;
use crate::report::{Bale, BaleSlot, HeaderField, Measurement, display_value};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::Value;
use tracing::info;

/// A4 portrait, in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;

const TITLE: &str = "Plastic Bale Report";

/// Column x-offsets: label, then value and percentage for each bale.
const COLUMNS: [i64; 5] = [MARGIN, 220, 305, 395, 480];

/// Lay the document out as a single-page PDF.
pub fn render_pdf(doc: &DocumentContext) -> Result<Vec<u8>, ReportError> {
    let mut ops = Vec::new();
    let mut y = PAGE_HEIGHT - MARGIN - 10;

    text(&mut ops, "F2", 18, MARGIN, y, TITLE);
    y -= 34;

    for field in HeaderField::ALL {
        let line = format!("{}: {}", field.label(), display_value(doc.header(field)));
        text(&mut ops, "F1", 12, MARGIN, y, &line);
        y -= 18;
    }
    y -= 22;

    let headings = [
        "Item".to_string(),
        BaleSlot::Bale1.label().to_string(),
        format!("{} %", BaleSlot::Bale1.label()),
        BaleSlot::Bale2.label().to_string(),
        format!("{} %", BaleSlot::Bale2.label()),
    ];
    for (x, heading) in COLUMNS.into_iter().zip(&headings) {
        text(&mut ops, "F2", 11, x, y, heading);
    }
    rule(&mut ops, y - 6);
    y -= 24;

    for m in Measurement::ALL {
        let mut cells = vec![m.label().to_string()];
        for slot in BaleSlot::ALL {
            let bale = doc.bale(slot);
            cells.push(cell(bale.get(m.key())));
            cells.push(if m.is_contaminant() {
                percent_cell(bale, m)
            } else {
                String::new()
            });
        }
        for (x, value) in COLUMNS.into_iter().zip(&cells) {
            text(&mut ops, "F1", 11, x, y, value);
        }
        y -= 20;
    }
    rule(&mut ops, y + 8);

    let bytes = build_document(ops)?;
    info!(bytes = bytes.len(), "PDF rendered");
    Ok(bytes)
}

fn build_document(ops: Vec<Operation>) -> Result<Vec<u8>, ReportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let content = Content { operations: ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn text(ops: &mut Vec<Operation>, font: &str, size: i64, x: i64, y: i64, s: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(win_ansi(s))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Horizontal line across the table.
fn rule(ops: &mut Vec<Operation>, y: i64) {
    ops.push(Operation::new("m", vec![MARGIN.into(), y.into()]));
    ops.push(Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), y.into()]));
    ops.push(Operation::new("S", vec![]));
}

/// WinAnsiEncoding agrees with Latin-1 on printable ASCII and U+00A0..=U+00FF.
fn win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => c as u8,
            _ => b'?',
        })
        .collect()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(|f| format!("{f:.2}"))
            .unwrap_or_else(|| n.to_string()),
        Some(other) => display_value(other),
    }
}

fn percent_cell(bale: &Bale, m: Measurement) -> String {
    match bale.get(&m.percent_key()) {
        None => "-".to_string(),
        found => format!("{}%", cell(found)),
    }
}
