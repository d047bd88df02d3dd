//! lopdf-based PDF backend.
//!
//! Wraps a [`lopdf::Document`] with the page-level queries and mutations
//! the cleaner needs: media box and resource lookup with inheritance, image
//! XObject enumeration, content interpretation, link scrubbing, the two
//! content mutation primitives (append and replace), page removal, and
//! serialization.

use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId, Stream};
use mangaclean_core::{CleanError, ImageInfo, MediaBox, ScanWarning, Scanned, WarningCode};
use tracing::debug;

use crate::error::BackendError;
use crate::font_metrics::object_to_f64_opt;
use crate::handler::ContentHandler;
use crate::interpreter::{InterpretOptions, interpret_content, stream_content};

/// US Letter, used when neither the page nor its ancestors carry a /MediaBox.
const DEFAULT_MEDIA_BOX: MediaBox = MediaBox {
    x0: 0.0,
    y0: 0.0,
    x1: 612.0,
    y1: 792.0,
};

static EMPTY_DICT: LazyLock<Dictionary> = LazyLock::new(Dictionary::new);

/// An image XObject referenced from a page's resources.
#[derive(Debug, Clone, PartialEq)]
pub struct XObjectImage {
    /// Resource name and pixel dimensions.
    pub info: ImageInfo,
    /// Object id of the image stream.
    pub object_id: ObjectId,
}

/// A parsed PDF document backed by lopdf.
pub struct LopdfDocument {
    inner: lopdf::Document,
    /// Ordered page ObjectIds (indexed by 0-based page number).
    page_ids: Vec<ObjectId>,
}

impl std::fmt::Debug for LopdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfDocument")
            .field("page_count", &self.page_ids.len())
            .finish_non_exhaustive()
    }
}

impl LopdfDocument {
    /// Parse PDF bytes.
    pub fn open(bytes: &[u8]) -> Result<Self, BackendError> {
        let inner = lopdf::Document::load_mem(bytes)
            .map_err(|e| BackendError::Parse(format!("failed to parse PDF: {e}")))?;
        Self::from_document(inner)
    }

    /// Read and parse a PDF file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BackendError> {
        let bytes = std::fs::read(path)?;
        Self::open(&bytes)
    }

    /// Wrap an already-built lopdf document.
    pub fn from_document(inner: lopdf::Document) -> Result<Self, BackendError> {
        if inner.is_encrypted() {
            return Err(BackendError::Core(CleanError::InvalidInput(
                "encrypted PDFs are not supported".to_string(),
            )));
        }
        let page_ids = inner.get_pages().values().copied().collect();
        Ok(Self { inner, page_ids })
    }

    /// Access the underlying lopdf document.
    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Object id of the page at `index`.
    pub fn page_id(&self, index: usize) -> Result<ObjectId, BackendError> {
        self.page_ids.get(index).copied().ok_or_else(|| {
            BackendError::Parse(format!(
                "page index {index} out of range (0..{})",
                self.page_ids.len()
            ))
        })
    }

    fn page_dict(&self, index: usize) -> Result<&Dictionary, BackendError> {
        let id = self.page_id(index)?;
        self.inner
            .get_object(id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
    }

    fn page_dict_mut(&mut self, index: usize) -> Result<&mut Dictionary, BackendError> {
        let id = self.page_id(index)?;
        self.inner
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))
    }

    /// The page's media box, inherited from the page tree if needed.
    pub fn media_box(&self, index: usize) -> Result<MediaBox, BackendError> {
        let Some(obj) = resolve_inherited(&self.inner, self.page_id(index)?, b"MediaBox")? else {
            return Ok(DEFAULT_MEDIA_BOX);
        };
        let array = resolve_ref(&self.inner, obj)
            .as_array()
            .map_err(|e| BackendError::Parse(format!("MediaBox is not an array: {e}")))?;
        if array.len() != 4 {
            return Err(BackendError::Parse(format!(
                "expected 4-element MediaBox, got {}",
                array.len()
            )));
        }
        let mut v = [0.0; 4];
        for (slot, obj) in v.iter_mut().zip(array) {
            *slot = object_to_f64_opt(resolve_ref(&self.inner, obj))
                .ok_or_else(|| BackendError::Parse(format!("expected number, got {obj:?}")))?;
        }
        Ok(MediaBox::new(v[0], v[1], v[2], v[3]))
    }

    /// The page's resource dictionary, inherited from the page tree if needed.
    pub fn page_resources(&self, index: usize) -> Result<&Dictionary, BackendError> {
        match resolve_inherited(&self.inner, self.page_id(index)?, b"Resources")? {
            Some(obj) => resolve_ref(&self.inner, obj)
                .as_dict()
                .map_err(|_| BackendError::Parse("/Resources is not a dictionary".to_string())),
            None => Ok(&EMPTY_DICT),
        }
    }

    /// Decoded page content, with multiple content streams joined.
    pub fn page_content(&self, index: usize) -> Result<Vec<u8>, BackendError> {
        let page = self.page_dict(index)?;
        let Ok(contents) = page.get(b"Contents") else {
            return Ok(Vec::new());
        };
        let mut content = Vec::new();
        for id in content_refs(contents)? {
            let stream = self
                .inner
                .get_object(id)
                .and_then(Object::as_stream)
                .map_err(|e| BackendError::Parse(format!("failed to resolve /Contents: {e}")))?;
            if !content.is_empty() {
                content.push(b'\n');
            }
            content.extend_from_slice(&stream_content(stream)?);
        }
        Ok(content)
    }

    /// Run the content stream interpreter over a page.
    pub fn interpret_page(
        &self,
        index: usize,
        handler: &mut dyn ContentHandler,
        options: &InterpretOptions,
    ) -> Result<(), BackendError> {
        let content = self.page_content(index)?;
        let resources = self.page_resources(index)?;
        interpret_content(&self.inner, &content, resources, handler, options)
    }

    /// Image XObjects named in the page's resources, in dictionary order.
    ///
    /// Entries that cannot be resolved are reported as warnings and left out.
    pub fn page_images(&self, index: usize) -> Result<Scanned<Vec<XObjectImage>>, BackendError> {
        let resources = self.page_resources(index)?;
        let mut images = Vec::new();
        let mut warnings = Vec::new();

        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .map(|o| resolve_ref(&self.inner, o))
            .and_then(|o| o.as_dict().ok())
        else {
            return Ok(Scanned::ok(images));
        };

        for (name, entry) in xobjects.iter() {
            let name = String::from_utf8_lossy(name).into_owned();
            let resolved = entry
                .as_reference()
                .ok()
                .and_then(|id| self.inner.get_object(id).ok().map(|o| (id, o)))
                .and_then(|(id, o)| o.as_stream().ok().map(|s| (id, s)));
            let Some((object_id, stream)) = resolved else {
                warnings.push(
                    ScanWarning::new(WarningCode::UnresolvedImage, "XObject could not be resolved")
                        .on_page(index)
                        .with_element(name),
                );
                continue;
            };
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|s| s == b"Image");
            if !is_image {
                continue;
            }
            let dim = |key: &[u8]| {
                stream
                    .dict
                    .get(key)
                    .ok()
                    .map(|o| resolve_ref(&self.inner, o))
                    .and_then(|o| o.as_i64().ok())
                    .and_then(|v| u32::try_from(v).ok())
            };
            match (dim(b"Width"), dim(b"Height")) {
                (Some(width), Some(height)) => images.push(XObjectImage {
                    info: ImageInfo::new(name, width, height),
                    object_id,
                }),
                _ => warnings.push(
                    ScanWarning::new(WarningCode::UnresolvedImage, "image has no valid dimensions")
                        .on_page(index)
                        .with_element(name),
                ),
            }
        }
        Ok(Scanned::with_warnings(images, warnings))
    }

    /// The stream object of an image XObject.
    pub fn image_stream(&self, object_id: ObjectId) -> Result<&Stream, BackendError> {
        self.inner
            .get_object(object_id)
            .and_then(Object::as_stream)
            .map_err(|e| BackendError::Parse(format!("failed to resolve image {object_id:?}: {e}")))
    }

    /// Remove Link annotations whose URI action target contains `token`.
    ///
    /// Matching is case-insensitive; the order of the remaining annotations
    /// is preserved. Returns the number of annotations removed.
    pub fn remove_uri_links(&mut self, index: usize, token: &str) -> Result<Scanned<usize>, BackendError> {
        let page = self.page_dict(index)?;
        let (annots_ref, annots) = match page.get(b"Annots") {
            Ok(Object::Reference(id)) => {
                let arr = self
                    .inner
                    .get_object(*id)
                    .and_then(Object::as_array)
                    .map_err(|e| BackendError::Parse(format!("/Annots is not an array: {e}")))?;
                (Some(*id), arr.clone())
            }
            Ok(Object::Array(arr)) => (None, arr.clone()),
            Ok(_) => return Err(BackendError::Parse("/Annots is not an array".to_string())),
            Err(_) => return Ok(Scanned::ok(0)),
        };

        let total = annots.len();
        let mut warnings = Vec::new();
        let mut kept = Vec::with_capacity(total);
        for entry in annots {
            match self.annotation_uri(&entry) {
                Some(Some(uri)) if uri.to_lowercase().contains(token) => {
                    debug!(page = index, uri = %uri, "removing watermark link");
                }
                Some(_) => kept.push(entry),
                None => {
                    warnings.push(
                        ScanWarning::new(
                            WarningCode::UnresolvedAnnotation,
                            "annotation could not be resolved; left in place",
                        )
                        .on_page(index),
                    );
                    kept.push(entry);
                }
            }
        }

        let removed = total - kept.len();
        if removed > 0 {
            match annots_ref {
                Some(id) => {
                    let arr = self
                        .inner
                        .get_object_mut(id)
                        .and_then(Object::as_array_mut)
                        .map_err(|e| BackendError::Parse(format!("/Annots is not an array: {e}")))?;
                    *arr = kept;
                }
                None => self.page_dict_mut(index)?.set("Annots", Object::Array(kept)),
            }
        }
        Ok(Scanned::with_warnings(removed, warnings))
    }

    /// `None` if the entry is unresolvable, `Some(None)` for annotations
    /// that are not URI links, `Some(Some(uri))` otherwise.
    fn annotation_uri(&self, entry: &Object) -> Option<Option<String>> {
        let dict = resolve_ref(&self.inner, entry).as_dict().ok()?;
        let is_link = dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .is_ok_and(|s| s == b"Link");
        if !is_link {
            return Some(None);
        }
        let Some(action) = dict
            .get(b"A")
            .ok()
            .map(|o| resolve_ref(&self.inner, o))
            .and_then(|o| o.as_dict().ok())
        else {
            return Some(None);
        };
        let is_uri = action
            .get(b"S")
            .and_then(Object::as_name)
            .is_ok_and(|s| s == b"URI");
        if !is_uri {
            return Some(None);
        }
        let uri = match action.get(b"URI").map(|o| resolve_ref(&self.inner, o)) {
            Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => return Some(None),
        };
        Some(Some(uri))
    }

    /// Append operations after the page's existing content.
    ///
    /// The existing content streams are left byte-for-byte intact and
    /// wrapped in `q`/`Q` so that graphics state they leave behind cannot
    /// leak into the appended operations.
    pub fn append_content(&mut self, index: usize, operations: Vec<Operation>) -> Result<(), BackendError> {
        let encoded = encode(operations)?;
        let existing = match self.page_dict(index)?.get(b"Contents") {
            Ok(obj) => content_refs(obj)?,
            Err(_) => Vec::new(),
        };

        let mut contents: Vec<Object> = Vec::with_capacity(existing.len() + 2);
        let mut tail = Vec::new();
        if !existing.is_empty() {
            let open_id = self.inner.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
            contents.push(Object::Reference(open_id));
            contents.extend(existing.into_iter().map(Object::Reference));
            tail.extend_from_slice(b"\nQ\n");
        }
        tail.extend_from_slice(&encoded);
        let tail_id = self.inner.add_object(Stream::new(Dictionary::new(), tail));
        contents.push(Object::Reference(tail_id));

        self.page_dict_mut(index)?.set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Replace the page's content wholesale with the given operations.
    pub fn replace_content(&mut self, index: usize, operations: Vec<Operation>) -> Result<(), BackendError> {
        let encoded = encode(operations)?;
        let id = self.inner.add_object(Stream::new(Dictionary::new(), encoded));
        self.page_dict_mut(index)?.set("Contents", Object::Reference(id));
        Ok(())
    }

    /// Delete the page at `index` from the page tree.
    ///
    /// Later pages shift down by one. Callers removing several pages must
    /// go from the highest index to the lowest.
    pub fn remove_page(&mut self, index: usize) -> Result<(), BackendError> {
        let page_id = self.page_id(index)?;
        let parent_id = self
            .page_dict(index)?
            .get(b"Parent")
            .and_then(Object::as_reference)
            .map_err(|e| BackendError::Parse(format!("page has no /Parent: {e}")))?;

        let kids = self
            .inner
            .get_object_mut(parent_id)
            .and_then(Object::as_dict_mut)
            .and_then(|d| d.get_mut(b"Kids"))
            .and_then(Object::as_array_mut)
            .map_err(|e| BackendError::Parse(format!("page parent has no /Kids: {e}")))?;
        kids.retain(|o| !matches!(o, Object::Reference(id) if *id == page_id));

        let mut current = Some(parent_id);
        while let Some(node_id) = current {
            let node = self
                .inner
                .get_object_mut(node_id)
                .and_then(Object::as_dict_mut)
                .map_err(|e| BackendError::Parse(format!("broken page tree node: {e}")))?;
            if let Ok(Object::Integer(count)) = node.get_mut(b"Count") {
                *count -= 1;
            }
            current = node.get(b"Parent").and_then(Object::as_reference).ok();
        }

        self.page_ids.remove(index);
        debug!(page = index, remaining = self.page_ids.len(), "removed page");
        Ok(())
    }

    /// Serialize the document, dropping objects no page references anymore.
    pub fn save_to<W: Write>(&mut self, writer: &mut W) -> Result<(), BackendError> {
        self.inner.prune_objects();
        self.inner.compress();
        self.inner.save_to(writer)?;
        Ok(())
    }
}

fn encode(operations: Vec<Operation>) -> Result<Vec<u8>, BackendError> {
    Content { operations }
        .encode()
        .map_err(|e| BackendError::Interpreter(format!("failed to encode content: {e}")))
}

/// Object ids of a /Contents value (single reference or array of references).
fn content_refs(contents: &Object) -> Result<Vec<ObjectId>, BackendError> {
    match contents {
        Object::Reference(id) => Ok(vec![*id]),
        Object::Array(arr) => arr
            .iter()
            .map(|o| {
                o.as_reference().map_err(|e| {
                    BackendError::Parse(format!("/Contents array item is not a reference: {e}"))
                })
            })
            .collect(),
        _ => Err(BackendError::Parse(
            "/Contents is not a reference or array".to_string(),
        )),
    }
}

/// Look up a key in the page dictionary, walking up the page tree
/// (via /Parent) if the key is not found on the page itself.
fn resolve_inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, BackendError> {
    let mut current_id = page_id;
    loop {
        let dict = doc
            .get_object(current_id)
            .and_then(Object::as_dict)
            .map_err(|e| BackendError::Parse(format!("failed to get page dictionary: {e}")))?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent") {
            Ok(parent_obj) => {
                current_id = parent_obj
                    .as_reference()
                    .map_err(|e| BackendError::Parse(format!("invalid /Parent reference: {e}")))?;
            }
            Err(_) => return Ok(None),
        }
    }
}

fn resolve_ref<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}
