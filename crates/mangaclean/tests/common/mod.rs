//! Programmatic PDF and EPUB fixtures shared by the integration tests.

#![allow(dead_code)]

use lopdf::{Dictionary, Object, Stream, StringFormat, dictionary};

/// Watermark line as OceanofPDF stamps it.
pub const WATERMARK: &str = "BT /F1 12 Tf 72 700 Td (OceanofPDF.com) Tj ET";

/// One page of a fixture document.
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub content: String,
    /// Image XObjects as (resource name, width, height).
    pub images: Vec<(String, u32, u32)>,
    pub link_uris: Vec<String>,
    pub media_box: [i64; 4],
}

impl PageSpec {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            images: Vec::new(),
            link_uris: Vec::new(),
            media_box: [0, 0, 612, 792],
        }
    }

    pub fn with_image(mut self, name: &str, width: u32, height: u32) -> Self {
        self.images.push((name.to_string(), width, height));
        self
    }

    pub fn with_link(mut self, uri: &str) -> Self {
        self.link_uris.push(uri.to_string());
        self
    }

    pub fn with_media_box(mut self, media_box: [i64; 4]) -> Self {
        self.media_box = media_box;
        self
    }
}

/// Content showing `count` non-space characters on one line at y = 400.
pub fn filler_text(count: usize) -> String {
    format!("BT /F1 12 Tf 72 400 Td ({}) Tj ET", "x".repeat(count))
}

/// A scanned manga page: the artwork drawn full page, stamped with the watermark.
pub fn manga_page(name: &str, width: u32, height: u32) -> PageSpec {
    PageSpec::text(format!("q {width} 0 0 {height} 0 0 cm /{name} Do Q {WATERMARK}"))
        .with_image(name, width, height)
}

/// Build a document from page fixtures. All pages share one Helvetica font.
pub fn build(pages: &[PageSpec]) -> lopdf::Document {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for fixture in pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), fixture.content.clone().into_bytes()));

        let mut xobjects = Dictionary::new();
        for (name, width, height) in &fixture.images {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(*width),
                    "Height" => i64::from(*height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0u8; 64],
            ));
            xobjects.set(name.as_str(), image_id);
        }

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => fixture.media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
        };
        if !fixture.link_uris.is_empty() {
            let annots: Vec<Object> = fixture
                .link_uris
                .iter()
                .map(|uri| {
                    Object::Reference(doc.add_object(dictionary! {
                        "Type" => "Annot",
                        "Subtype" => "Link",
                        "Rect" => vec![72.into(), 690.into(), 170.into(), 712.into()],
                        "A" => dictionary! {
                            "S" => "URI",
                            "URI" => Object::String(uri.as_bytes().to_vec(), StringFormat::Literal),
                        },
                    }))
                })
                .collect();
            page.set("Annots", annots);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Serialized fixture bytes.
pub fn build_bytes(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = build(pages);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Operators of a decoded content stream, with numeric operands as f64.
pub fn operations(content: &[u8]) -> Vec<(String, Vec<f64>)> {
    lopdf::content::Content::decode(content)
        .unwrap()
        .operations
        .into_iter()
        .map(|op| {
            let nums = op
                .operands
                .iter()
                .filter_map(|o| match o {
                    Object::Integer(i) => Some(*i as f64),
                    Object::Real(r) => Some(f64::from(*r)),
                    _ => None,
                })
                .collect();
            (op.operator, nums)
        })
        .collect()
}

/// A small EPUB: stored mimetype, container, OPF without cover meta, two
/// chapters (the first watermarked), a cover image and a directory entry.
pub fn build_epub() -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file("mimetype", stored).unwrap();
    zip.write_all(b"application/epub+zip").unwrap();
    zip.start_file("META-INF/container.xml", deflated).unwrap();
    zip.write_all(EPUB_CONTAINER.as_bytes()).unwrap();
    zip.start_file("OEBPS/content.opf", deflated).unwrap();
    zip.write_all(EPUB_OPF.as_bytes()).unwrap();
    zip.start_file("OEBPS/ch01.xhtml", deflated).unwrap();
    zip.write_all(b"<html><body><p>Chapter 1</p><p> OceanofPDF.com </p></body></html>").unwrap();
    zip.start_file("OEBPS/ch02.xhtml", deflated).unwrap();
    zip.write_all(b"<html><body><p>Chapter 2</p></body></html>").unwrap();
    zip.add_directory("OEBPS/images/", stored).unwrap();
    zip.start_file("OEBPS/images/cover.jpg", stored).unwrap();
    zip.write_all(&EPUB_COVER_BYTES).unwrap();
    zip.finish().unwrap().into_inner()
}

pub const EPUB_COVER_BYTES: [u8; 6] = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

const EPUB_CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const EPUB_OPF: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0">
<metadata><dc:title>Vol 1</dc:title>
</metadata>
<manifest>
<item id="ch01" href="ch01.xhtml" media-type="application/xhtml+xml"/>
<item id="ch02" href="ch02.xhtml" media-type="application/xhtml+xml"/>
<item id="cover-img" href="images/cover.jpg" media-type="image/jpeg"/>
</manifest>
</package>"#;
