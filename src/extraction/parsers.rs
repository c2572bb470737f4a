//! Format-specific text extraction. Parse failures are reported as plain strings and wrapped
//! into [`super::ExtractionError::Parse`] by the caller.

use std::panic::{self, AssertUnwindSafe};

pub(super) fn decode_text(content: &[u8]) -> String {
    String::from_utf8_lossy(content).into_owned()
}

pub(super) fn pdf_text(content: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed font tables instead of returning an error.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(content)
    }));
    let raw = match outcome {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => return Err(err.to_string()),
        Err(_) => return Err("PDF parser panicked".to_string()),
    };
    Ok(normalize_lines(&raw))
}

pub(super) fn docx_text(content: &[u8]) -> Result<String, String> {
    let document = docx_rs::read_docx(content).map_err(|err| err.to_string())?;

    let mut text = String::new();
    for child in document.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(fragment) = child {
                            text.push_str(&fragment.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Drop NUL bytes, trim each line, and remove blank lines.
fn normalize_lines(raw: &str) -> String {
    raw.replace('\0', "")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-page PDF with each entry of `lines` drawn on its own baseline in Helvetica.
#[cfg(test)]
pub(super) fn one_page_pdf(lines: &[&str]) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let font_id = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
    ];
    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            operations.push(Operation::new("Td", vec![0.into(), (-24).into()]));
        }
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
    }
    operations.push(Operation::new("ET", vec![]));
    let content = Content { operations }.encode().expect("encode content");
    let content_id = document.add_object(Stream::new(dictionary! {}, content));

    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).expect("save pdf");
    bytes
}
