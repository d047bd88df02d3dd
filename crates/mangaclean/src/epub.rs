//! EPUB watermark removal.
//!
//! Works on the zip container directly: entries are copied in order,
//! HTML resources carrying the watermark are rewritten, and the OPF
//! package gets its `<meta name="cover">` reinstated when a cover image
//! exists but the meta entry is missing.

use std::io::{Read, Seek, Write};

use mangaclean_core::{CleanError, EPUB_WATERMARK_TOKEN};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::Regex;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const CONTAINER_PATH: &str = "META-INF/container.xml";
const MIMETYPE: &str = "mimetype";

/// Outcome of cleaning one EPUB.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpubReport {
    /// HTML resources that were rewritten.
    pub resources_cleaned: usize,
    /// Whether a cover meta entry was added to the package document.
    pub cover_restored: bool,
}

/// Cleans EPUB containers.
#[derive(Debug, Clone)]
pub struct EpubCleaner {
    watermark: Regex,
}

impl EpubCleaner {
    pub fn new() -> Result<Self, CleanError> {
        // ASCII whitespace only; a non-breaking space next to the token stays.
        let pattern = r"(?i)(?-u:\s)*oceanofpdf\.com(?-u:\s)*";
        let watermark =
            Regex::new(pattern).map_err(|e| CleanError::Other(format!("invalid pattern {pattern}: {e}")))?;
        Ok(Self { watermark })
    }

    /// Remove the watermark and its surrounding whitespace from an HTML
    /// body. Returns `None` when the token does not occur.
    pub fn strip_watermark(&self, html: &str) -> Option<String> {
        if !html.to_lowercase().contains(EPUB_WATERMARK_TOKEN) {
            return None;
        }
        Some(self.watermark.replace_all(html, "").into_owned())
    }

    /// Copy an EPUB from `input` to `output` with the watermark removed.
    pub fn clean<R, W>(&self, input: R, output: W) -> Result<EpubReport, CleanError>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let mut archive = ZipArchive::new(input).map_err(epub_error)?;
        let opf_path = package_path(&mut archive)?;

        let mut writer = ZipWriter::new(output);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut report = EpubReport::default();

        // The mimetype entry must come first and be stored uncompressed.
        if let Ok(mut file) = archive.by_name(MIMETYPE) {
            let mut body = Vec::new();
            file.read_to_end(&mut body)?;
            writer.start_file(MIMETYPE, stored).map_err(epub_error)?;
            writer.write_all(&body)?;
        }

        for i in 0..archive.len() {
            let mut file = archive.by_index(i).map_err(epub_error)?;
            let name = file.name().to_string();
            if name == MIMETYPE {
                continue;
            }
            if file.is_dir() {
                writer.add_directory(name, stored).map_err(epub_error)?;
                continue;
            }

            let rewritten = if is_html(&name) {
                let mut body = Vec::new();
                file.read_to_end(&mut body)?;
                let cleaned = self.strip_watermark(&String::from_utf8_lossy(&body));
                if cleaned.is_some() {
                    report.resources_cleaned += 1;
                    debug!(entry = %name, "removed watermark");
                }
                Some(cleaned.map_or(body, String::into_bytes))
            } else if opf_path.as_deref() == Some(name.as_str()) {
                let mut body = Vec::new();
                file.read_to_end(&mut body)?;
                let opf = String::from_utf8_lossy(&body);
                match self.restore_cover_meta(&opf) {
                    Some(updated) => {
                        report.cover_restored = true;
                        debug!(entry = %name, "restored cover meta");
                        Some(updated.into_bytes())
                    }
                    None => Some(body),
                }
            } else {
                None
            };

            match rewritten {
                Some(body) => {
                    writer.start_file(name, deflated).map_err(epub_error)?;
                    writer.write_all(&body)?;
                }
                None => writer.raw_copy_file(file).map_err(epub_error)?,
            }
        }
        writer.finish().map_err(epub_error)?;
        Ok(report)
    }

    /// Insert `<meta name="cover">` into an OPF that has a cover image but
    /// no cover meta. Returns `None` when nothing needs to change or the
    /// package document is not well-formed XML.
    pub fn restore_cover_meta(&self, opf: &str) -> Option<String> {
        let package = match scan_package(opf) {
            Ok(package) => package,
            Err(e) => {
                warn!(error = %e, "package document unreadable; cover meta not checked");
                return None;
            }
        };
        if package.has_cover_meta {
            return None;
        }
        let cover_id = package.cover_image_id()?;
        let end = package.metadata_end?;
        let mut updated = String::with_capacity(opf.len() + 48);
        updated.push_str(&opf[..end]);
        updated.push_str(&format!("<meta name=\"cover\" content=\"{cover_id}\"/>\n"));
        updated.push_str(&opf[end..]);
        Some(updated)
    }
}

/// One `<item>` of the OPF manifest.
#[derive(Debug, Clone, Default, PartialEq)]
struct ManifestItem {
    id: String,
    href: String,
    media_type: String,
    properties: String,
}

/// What the cleaner needs to know about an OPF package document.
#[derive(Debug, Default)]
struct PackageScan {
    has_cover_meta: bool,
    /// Byte offset of the `</metadata>` end tag.
    metadata_end: Option<usize>,
    items: Vec<ManifestItem>,
}

impl PackageScan {
    /// Manifest id of the cover image: the item declaring the
    /// `cover-image` property, else the first image whose id or href
    /// mentions "cover".
    fn cover_image_id(&self) -> Option<String> {
        let declared = self
            .items
            .iter()
            .find(|item| item.properties.split_whitespace().any(|p| p == "cover-image"));
        let guessed = || {
            self.items.iter().find(|item| {
                item.media_type.starts_with("image/")
                    && (item.id.to_lowercase().contains("cover") || item.href.to_lowercase().contains("cover"))
            })
        };
        declared
            .or_else(guessed)
            .map(|item| item.id.clone())
            .filter(|id| !id.is_empty())
    }
}

fn scan_package(opf: &str) -> Result<PackageScan, quick_xml::Error> {
    let mut reader = Reader::from_str(opf);
    let mut scan = PackageScan::default();

    loop {
        let position = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"item" => {
                    let mut item = ManifestItem::default();
                    for (key, value) in attributes(&e)? {
                        match key.as_slice() {
                            b"id" => item.id = value,
                            b"href" => item.href = value,
                            b"media-type" => item.media_type = value,
                            b"properties" => item.properties = value,
                            _ => {}
                        }
                    }
                    scan.items.push(item);
                }
                b"meta" => {
                    if attributes(&e)?
                        .iter()
                        .any(|(key, value)| key == b"name" && value.eq_ignore_ascii_case("cover"))
                    {
                        scan.has_cover_meta = true;
                    }
                }
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"metadata" => {
                scan.metadata_end.get_or_insert(position);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(scan)
}

/// Path of the OPF package document named by `container.xml`.
fn package_path<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Option<String>, CleanError> {
    let Ok(mut file) = archive.by_name(CONTAINER_PATH) else {
        return Ok(None);
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    match rootfile_path(&xml) {
        Ok(path) => Ok(path),
        Err(e) => {
            warn!(error = %e, "container.xml unreadable; package document not located");
            Ok(None)
        }
    }
}

fn rootfile_path(container: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"rootfile" => {
                let path = attributes(&e)?
                    .into_iter()
                    .find(|(key, _)| key == b"full-path")
                    .map(|(_, value)| value);
                if path.is_some() {
                    return Ok(path);
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Attributes of an element as (local name, unescaped value) pairs.
fn attributes(element: &BytesStart<'_>) -> Result<Vec<(Vec<u8>, String)>, quick_xml::Error> {
    let mut pairs = Vec::new();
    for attr in element.attributes() {
        let attr = attr?;
        pairs.push((attr.key.local_name().as_ref().to_vec(), attr.unescape_value()?.into_owned()));
    }
    Ok(pairs)
}

fn is_html(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".html") || lower.ends_with(".xhtml") || lower.ends_with(".htm")
}

fn epub_error(e: zip::result::ZipError) -> CleanError {
    CleanError::Epub(e.to_string())
}
