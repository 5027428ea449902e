use std::fs;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::error::PdfWriteError;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const MARGIN: i64 = 50;
const TITLE_SIZE: i64 = 14;
const BODY_SIZE: i64 = 10;
const LINE_HEIGHT: i64 = 15;
const TITLE_GAP: i64 = 40;

/// Characters per body line at 10pt Helvetica inside the margins.
pub const WRAP_WIDTH: usize = 95;

/// A plain text document: one bold title line followed by wrapped body lines,
/// laid out on US-Letter pages with Helvetica.
#[derive(Debug, Clone, Default)]
pub struct TextDocument {
    title: String,
    lines: Vec<String>,
}

impl TextDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
        }
    }

    /// Appends one source line, wrapping it on whitespace when too long.
    pub fn push_line(&mut self, line: &str) {
        self.lines.extend(wrap(line, WRAP_WIDTH));
    }

    pub fn push_blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Appends every line of `text`, trimming template indentation.
    pub fn push_text(&mut self, text: &str) {
        for line in text.lines() {
            self.push_line(line.trim());
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> Result<Vec<u8>, PdfWriteError> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font("Helvetica"));
        let bold_id = doc.add_object(font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut page_ids: Vec<ObjectId> = Vec::new();
        for operations in self.layout() {
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Count" => page_ids.len() as i64,
            "Kids" => page_ids.into_iter().map(Object::from).collect::<Vec<_>>(),
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

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

    /// Renders and writes the document, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), PdfWriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render()?)?;
        Ok(())
    }

    /// Content-stream operations per page.
    fn layout(&self) -> Vec<Vec<Operation>> {
        let mut pages = Vec::new();
        let mut ops = Vec::new();
        let mut y = PAGE_HEIGHT - MARGIN;

        ops.push(text_op("F2", TITLE_SIZE, y, &self.title));
        y -= TITLE_GAP;

        for line in &self.lines {
            if y < MARGIN {
                pages.push(std::mem::take(&mut ops));
                y = PAGE_HEIGHT - MARGIN;
            }
            if !line.is_empty() {
                ops.push(text_op("F1", BODY_SIZE, y, line));
            }
            y -= LINE_HEIGHT;
        }
        pages.push(ops);

        pages.into_iter().map(|page| page.into_iter().flatten().collect()).collect()
    }
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn text_op(font: &str, size: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![MARGIN.into(), y.into()]),
        Operation::new("Tj", vec![Object::string_literal(to_latin(text))]),
        Operation::new("ET", vec![]),
    ]
}

/// Text is kept to printable ASCII for the standard Type1 fonts; typographic
/// quotes and dashes are folded, anything else becomes `?`.
fn to_latin(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            c if (c as u32) < 0x7f && !c.is_control() => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy whitespace wrap. Words longer than `width` are hard-split.
pub fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
            }
            wrapped.push(word.drain(..width).collect());
        }
        let word: String = word.into_iter().collect();

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            wrapped.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || wrapped.is_empty() {
        wrapped.push(current);
    }
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let line = "alpha beta gamma delta epsilon zeta eta theta";
        let wrapped = wrap(line, 12);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 12));
        assert_eq!(wrapped.join(" "), line);
    }

    #[test]
    fn wrap_hard_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn blank_line_stays_blank() {
        assert_eq!(wrap("   ", 10), vec![String::new()]);
    }

    #[test]
    fn long_documents_paginate() {
        let mut doc = TextDocument::new("CONFIDENTIAL: Long");
        for i in 0..120 {
            doc.push_line(&format!("line {i}"));
        }
        // (742 - 40 - 50) / 15 + 1 = 44 body lines fit the first page
        assert_eq!(doc.layout().len(), 3);
    }

    #[test]
    fn rendered_bytes_are_a_loadable_pdf() {
        let mut doc = TextDocument::new("CONFIDENTIAL: Test");
        doc.push_text("  Refund policy is 30 days.\n  Support is 24/7 (business critical).");
        let bytes = doc.render().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn non_latin_characters_are_replaced() {
        assert_eq!(to_latin("a\u{2019}b\u{4e2d}"), b"a'b?".to_vec());
    }
}
