//! Content stream interpreter.
//!
//! Walks decoded content stream operations, maintaining the CTM stack and
//! text state, and emits glyph and image events to a [`ContentHandler`].
//! Form XObjects are interpreted recursively up to a depth limit.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use mangaclean_core::{Ctm, Point, ScanWarning, WarningCode};
use tracing::trace;

use crate::cmap::ToUnicode;
use crate::error::BackendError;
use crate::font_metrics::{
    FontMetrics, base_font, extract_font_metrics, is_type0, object_to_f64_opt, resolve_object,
};
use crate::handler::{CharEvent, ContentHandler, FillEvent, ImageEvent};
use crate::standard_fonts::strip_subset_prefix;
use crate::text_state::{TextState, TextStateSnapshot};

/// Options controlling content stream interpretation.
#[derive(Debug, Clone)]
pub struct InterpretOptions {
    /// Maximum nesting depth for Form XObjects (default: 10).
    pub max_recursion_depth: usize,
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            max_recursion_depth: 10,
        }
    }
}

/// Font information resolved once per content stream.
struct CachedFont {
    metrics: FontMetrics,
    to_unicode: Option<ToUnicode>,
    two_byte: bool,
    base_name: String,
}

/// Interpret a content stream against its resource dictionary.
///
/// Returns an error only when the top-level stream cannot be decoded.
/// Faults inside individual operators, fonts, or XObjects are reported
/// through [`ContentHandler::on_warning`] and skipped.
pub fn interpret_content(
    doc: &Document,
    content: &[u8],
    resources: &Dictionary,
    handler: &mut dyn ContentHandler,
    options: &InterpretOptions,
) -> Result<(), BackendError> {
    let mut interpreter = Interpreter {
        doc,
        handler,
        options,
        ctm: Ctm::identity(),
        fill_white: false,
        stack: Vec::new(),
        tstate: TextState::new(),
        pending_rects: Vec::new(),
    };
    interpreter.run(content, resources, 0)
}

struct Interpreter<'a, 'h> {
    doc: &'a Document,
    handler: &'h mut dyn ContentHandler,
    options: &'a InterpretOptions,
    ctm: Ctm,
    fill_white: bool,
    stack: Vec<(Ctm, bool, TextStateSnapshot)>,
    tstate: TextState,
    /// Rectangles of the path under construction, in user space.
    pending_rects: Vec<[f64; 4]>,
}

impl<'a> Interpreter<'a, '_> {
    fn run(&mut self, content: &[u8], resources: &'a Dictionary, depth: usize) -> Result<(), BackendError> {
        let operations = Content::decode(content)
            .map_err(|e| BackendError::Interpreter(format!("failed to decode content stream: {e}")))?
            .operations;
        let mut fonts: HashMap<Vec<u8>, CachedFont> = HashMap::new();

        for op in &operations {
            match op.operator.as_str() {
                "q" => self.save_state(),
                "Q" => self.restore_state(),
                "cm" => {
                    if let Some(m) = matrix_operand(&op.operands) {
                        self.ctm = m.concat(&self.ctm);
                    }
                }
                "g" => {
                    if let Some(gray) = number(&op.operands, 0) {
                        self.fill_white = gray >= 1.0;
                    }
                }
                "rg" | "k" | "sc" | "scn" => self.fill_white = is_white(&op.operands),
                "re" => match rect_operand(&op.operands) {
                    Some(rect) => self.pending_rects.push(rect),
                    None => self.malformed(op),
                },
                "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" => {
                    for [x, y, w, h] in std::mem::take(&mut self.pending_rects) {
                        let corners = [
                            self.ctm.transform_point(Point::new(x, y)),
                            self.ctm.transform_point(Point::new(x + w, y)),
                            self.ctm.transform_point(Point::new(x, y + h)),
                            self.ctm.transform_point(Point::new(x + w, y + h)),
                        ];
                        self.handler.on_fill(FillEvent {
                            min_x: corners.iter().map(|p| p.x).fold(f64::INFINITY, f64::min),
                            min_y: corners.iter().map(|p| p.y).fold(f64::INFINITY, f64::min),
                            max_x: corners.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max),
                            max_y: corners.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max),
                            white: self.fill_white,
                        });
                    }
                }
                "n" | "S" | "s" => self.pending_rects.clear(),
                "BT" => self.tstate.begin_text(),
                "ET" => self.tstate.end_text(),
                "Tf" => {
                    let name = op.operands.first().and_then(|o| o.as_name().ok());
                    let size = number(&op.operands, 1);
                    match (name, size) {
                        (Some(name), Some(size)) => {
                            if !fonts.contains_key(name) {
                                let font = self.load_font(resources, name);
                                fonts.insert(name.to_vec(), font);
                            }
                            self.tstate
                                .set_font(String::from_utf8_lossy(name).into_owned(), size);
                        }
                        _ => self.malformed(op),
                    }
                }
                "Tc" => set_number(&op.operands, &mut self.tstate.char_spacing),
                "Tw" => set_number(&op.operands, &mut self.tstate.word_spacing),
                "Tz" => set_number(&op.operands, &mut self.tstate.h_scaling),
                "TL" => set_number(&op.operands, &mut self.tstate.leading),
                "Ts" => set_number(&op.operands, &mut self.tstate.rise),
                "Td" | "TD" => match (number(&op.operands, 0), number(&op.operands, 1)) {
                    (Some(tx), Some(ty)) if op.operator == "Td" => {
                        self.tstate.move_text_position(tx, ty)
                    }
                    (Some(tx), Some(ty)) => self.tstate.move_text_position_and_set_leading(tx, ty),
                    _ => self.malformed(op),
                },
                "Tm" => match matrix_operand(&op.operands) {
                    Some(m) => self.tstate.set_text_matrix(m),
                    None => self.malformed(op),
                },
                "T*" => self.tstate.move_to_next_line(),
                "Tj" => match op.operands.first() {
                    Some(Object::String(bytes, _)) => self.show(bytes, &fonts),
                    _ => self.malformed(op),
                },
                "'" => {
                    self.tstate.move_to_next_line();
                    match op.operands.first() {
                        Some(Object::String(bytes, _)) => self.show(bytes, &fonts),
                        _ => self.malformed(op),
                    }
                }
                "\"" => match (
                    number(&op.operands, 0),
                    number(&op.operands, 1),
                    op.operands.get(2),
                ) {
                    (Some(aw), Some(ac), Some(Object::String(bytes, _))) => {
                        self.tstate.word_spacing = aw;
                        self.tstate.char_spacing = ac;
                        self.tstate.move_to_next_line();
                        self.show(bytes, &fonts);
                    }
                    _ => self.malformed(op),
                },
                "TJ" => match op.operands.first() {
                    Some(Object::Array(items)) => {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => self.show(bytes, &fonts),
                                other => {
                                    if let Some(adj) = object_to_f64_opt(other) {
                                        self.tstate.apply_tj_adjustment(adj);
                                    }
                                }
                            }
                        }
                    }
                    _ => self.malformed(op),
                },
                "Do" => match op.operands.first().and_then(|o| o.as_name().ok()) {
                    Some(name) => self.handle_do(resources, name, depth),
                    None => self.malformed(op),
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn save_state(&mut self) {
        self.stack
            .push((self.ctm, self.fill_white, self.tstate.save_snapshot()));
    }

    fn restore_state(&mut self) {
        if let Some((ctm, fill_white, snapshot)) = self.stack.pop() {
            self.ctm = ctm;
            self.fill_white = fill_white;
            self.tstate.restore_snapshot(snapshot);
        }
    }

    fn malformed(&mut self, op: &Operation) {
        self.handler.on_warning(ScanWarning::new(
            WarningCode::MalformedText,
            format!("skipped malformed '{}' operator", op.operator),
        ));
    }

    fn load_font(&mut self, resources: &Dictionary, name: &[u8]) -> CachedFont {
        let font_dict = resources
            .get(b"Font")
            .ok()
            .map(|o| resolve_object(self.doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|fonts| fonts.get(name).ok())
            .map(|o| resolve_object(self.doc, o))
            .and_then(|o| o.as_dict().ok());

        let Some(font_dict) = font_dict else {
            self.handler.on_warning(
                ScanWarning::new(WarningCode::MissingFont, "font not found in page resources")
                    .with_element(String::from_utf8_lossy(name)),
            );
            return CachedFont {
                metrics: FontMetrics::default_metrics(),
                to_unicode: None,
                two_byte: false,
                base_name: String::from_utf8_lossy(name).into_owned(),
            };
        };

        let to_unicode = font_dict
            .get(b"ToUnicode")
            .ok()
            .map(|o| resolve_object(self.doc, o))
            .and_then(|o| o.as_stream().ok())
            .and_then(|s| stream_content(s).ok())
            .map(|data| ToUnicode::parse(&data))
            .filter(|cmap| !cmap.is_empty());

        CachedFont {
            metrics: extract_font_metrics(self.doc, font_dict),
            to_unicode,
            two_byte: is_type0(font_dict),
            base_name: base_font(font_dict)
                .map(|n| strip_subset_prefix(n).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(name).into_owned()),
        }
    }

    fn show(&mut self, bytes: &[u8], fonts: &HashMap<Vec<u8>, CachedFont>) {
        let Some(font) = fonts.get(self.tstate.font_name.as_bytes()) else {
            // Text shown before any Tf: nothing sensible to measure.
            self.handler.on_warning(ScanWarning::new(
                WarningCode::MalformedText,
                "text shown without a selected font",
            ));
            return;
        };

        let codes: Vec<u32> = if font.two_byte {
            bytes
                .chunks(2)
                .map(|c| c.iter().fold(0u32, |acc, b| (acc << 8) | u32::from(*b)))
                .collect()
        } else {
            bytes.iter().map(|b| u32::from(*b)).collect()
        };

        let (ascent, descent) = font.metrics.vertical_extent();
        for code in codes {
            let displacement = font.metrics.get_width(code);
            let unicode = font
                .to_unicode
                .as_ref()
                .and_then(|cmap| cmap.lookup(code))
                .map(str::to_string)
                .or_else(|| decode_simple(code, font.two_byte));

            self.handler.on_char(CharEvent {
                char_code: code,
                unicode,
                font_name: font.base_name.clone(),
                font_size: self.tstate.font_size,
                text_matrix: self.tstate.text_matrix().to_array(),
                ctm: self.ctm.to_array(),
                displacement,
                h_scaling: self.tstate.h_scaling_normalized(),
                rise: self.tstate.rise,
                ascent,
                descent,
            });
            self.tstate
                .advance_glyph(displacement, code == 32 && !font.two_byte);
        }
    }

    fn handle_do(&mut self, resources: &'a Dictionary, name: &[u8], depth: usize) {
        let doc = self.doc;
        let xobject_name = String::from_utf8_lossy(name).into_owned();
        let entry = resources
            .get(b"XObject")
            .ok()
            .map(|o| resolve_object(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|xobjects| xobjects.get(name).ok())
            .and_then(|o| o.as_reference().ok())
            .and_then(|id| doc.get_object(id).ok().map(|obj| (id, obj)));

        let Some((object_id, Ok(stream))) = entry.map(|(id, obj)| (id, obj.as_stream())) else {
            self.handler.on_warning(
                ScanWarning::new(WarningCode::UnresolvedImage, "XObject could not be resolved")
                    .with_element(xobject_name),
            );
            return;
        };

        let subtype = stream
            .dict
            .get(b"Subtype")
            .and_then(|o| o.as_name())
            .unwrap_or(b"");

        match subtype {
            b"Image" => {
                let dim = |key: &[u8]| {
                    stream
                        .dict
                        .get(key)
                        .ok()
                        .and_then(|o| o.as_i64().ok())
                        .map_or(0, |v| v.max(0) as u32)
                };
                self.handler.on_image(ImageEvent {
                    name: xobject_name,
                    object_id,
                    ctm: self.ctm.to_array(),
                    width: dim(b"Width"),
                    height: dim(b"Height"),
                });
            }
            b"Form" => {
                if depth + 1 > self.options.max_recursion_depth {
                    self.handler.on_warning(
                        ScanWarning::new(
                            WarningCode::LimitReached,
                            format!(
                                "Form XObject nesting exceeds {}",
                                self.options.max_recursion_depth
                            ),
                        )
                        .with_element(xobject_name),
                    );
                    return;
                }
                let content = match stream_content(stream) {
                    Ok(content) => content,
                    Err(e) => {
                        self.handler.on_warning(
                            ScanWarning::new(WarningCode::MalformedText, e.to_string())
                                .with_element(xobject_name),
                        );
                        return;
                    }
                };
                let form_resources = stream
                    .dict
                    .get(b"Resources")
                    .ok()
                    .map(|o| resolve_object(doc, o))
                    .and_then(|o| o.as_dict().ok())
                    .unwrap_or(resources);

                self.save_state();
                if let Some(m) = stream
                    .dict
                    .get(b"Matrix")
                    .ok()
                    .and_then(|o| o.as_array().ok())
                    .and_then(|arr| matrix_operand(arr))
                {
                    self.ctm = m.concat(&self.ctm);
                }
                trace!(form = %xobject_name, depth = depth + 1, "entering Form XObject");
                if let Err(e) = self.run(&content, form_resources, depth + 1) {
                    self.handler.on_warning(
                        ScanWarning::new(WarningCode::MalformedText, e.to_string())
                            .with_element(xobject_name),
                    );
                }
                self.restore_state();
            }
            _ => {}
        }
    }
}

/// Decoded bytes of a stream, decompressing if it carries a filter.
pub(crate) fn stream_content(stream: &lopdf::Stream) -> Result<Vec<u8>, BackendError> {
    if stream.dict.get(b"Filter").is_ok() {
        stream
            .decompressed_content()
            .map_err(|e| BackendError::Parse(format!("failed to decompress stream: {e}")))
    } else {
        Ok(stream.content.clone())
    }
}

fn decode_simple(code: u32, two_byte: bool) -> Option<String> {
    if two_byte {
        return None;
    }
    // Latin-1 covers WinAnsi for the printable ASCII range the token uses.
    char::from_u32(code).map(|c| c.to_string())
}

fn number(operands: &[Object], index: usize) -> Option<f64> {
    operands.get(index).and_then(object_to_f64_opt)
}

fn set_number(operands: &[Object], target: &mut f64) {
    if let Some(v) = number(operands, 0) {
        *target = v;
    }
}

/// White in DeviceGray (1 operand), DeviceRGB (3), or DeviceCMYK (4).
fn is_white(operands: &[Object]) -> bool {
    let values: Option<Vec<f64>> = operands.iter().map(object_to_f64_opt).collect();
    match values.as_deref() {
        Some([g]) => *g >= 1.0,
        Some([r, g, b]) => *r >= 1.0 && *g >= 1.0 && *b >= 1.0,
        Some([c, m, y, k]) => *c <= 0.0 && *m <= 0.0 && *y <= 0.0 && *k <= 0.0,
        _ => false,
    }
}

fn rect_operand(operands: &[Object]) -> Option<[f64; 4]> {
    Some([
        number(operands, 0)?,
        number(operands, 1)?,
        number(operands, 2)?,
        number(operands, 3)?,
    ])
}

fn matrix_operand(operands: &[Object]) -> Option<Ctm> {
    if operands.len() < 6 {
        return None;
    }
    let mut values = [0.0; 6];
    for (slot, obj) in values.iter_mut().zip(operands) {
        *slot = object_to_f64_opt(obj)?;
    }
    Some(Ctm::from_array(values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    #[derive(Default)]
    struct CollectingHandler {
        chars: Vec<CharEvent>,
        images: Vec<ImageEvent>,
        fills: Vec<FillEvent>,
        warnings: Vec<ScanWarning>,
    }

    impl ContentHandler for CollectingHandler {
        fn on_char(&mut self, event: CharEvent) {
            self.chars.push(event);
        }

        fn on_image(&mut self, event: ImageEvent) {
            self.images.push(event);
        }

        fn on_fill(&mut self, event: FillEvent) {
            self.fills.push(event);
        }

        fn on_warning(&mut self, warning: ScanWarning) {
            self.warnings.push(warning);
        }
    }

    fn helvetica_resources(doc: &mut Document) -> Dictionary {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        dictionary! { "Font" => dictionary! { "F1" => font_id } }
    }

    fn text(chars: &[CharEvent]) -> String {
        chars
            .iter()
            .filter_map(|c| c.unicode.clone())
            .collect::<Vec<_>>()
            .concat()
    }

    #[test]
    fn interpret_simple_text() {
        let mut doc = Document::with_version("1.5");
        let resources = helvetica_resources(&mut doc);
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"BT /F1 12 Tf 72 700 Td (Hi) Tj ET",
            &resources,
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(text(&handler.chars), "Hi");
        assert_eq!(handler.chars[0].text_matrix, [1.0, 0.0, 0.0, 1.0, 72.0, 700.0]);
        // H = 722 in Helvetica: second glyph starts 8.664 further right.
        assert!((handler.chars[1].text_matrix[4] - 80.664).abs() < 1e-6);
        assert_eq!(handler.chars[0].font_name, "Helvetica");
        assert!(handler.warnings.is_empty());
    }

    #[test]
    fn interpret_tj_array_and_quote_operators() {
        let mut doc = Document::with_version("1.5");
        let resources = helvetica_resources(&mut doc);
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"BT /F1 10 Tf 14 TL 0 100 Td [(A) -500 (B)] TJ (C) ' ET",
            &resources,
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(text(&handler.chars), "ABC");
        // A = 667 -> 6.67, then -500 adjustment moves right by 5.
        assert!((handler.chars[1].text_matrix[4] - 11.67).abs() < 1e-6);
        assert_eq!(handler.chars[2].text_matrix[5], 86.0);
    }

    #[test]
    fn ctm_is_saved_and_restored() {
        let mut doc = Document::with_version("1.5");
        let resources = helvetica_resources(&mut doc);
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"q 2 0 0 2 10 20 cm BT /F1 12 Tf (a) Tj ET Q BT /F1 12 Tf (b) Tj ET",
            &resources,
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(handler.chars[0].ctm, [2.0, 0.0, 0.0, 2.0, 10.0, 20.0]);
        assert_eq!(handler.chars[1].ctm, [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_font_warns_and_uses_defaults() {
        let doc = Document::with_version("1.5");
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"BT /F9 12 Tf (x) Tj ET",
            &Dictionary::new(),
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(handler.chars.len(), 1);
        assert_eq!(handler.chars[0].displacement, 600.0);
        assert_eq!(handler.warnings[0].code, WarningCode::MissingFont);
        assert_eq!(handler.warnings[0].element.as_deref(), Some("F9"));
    }

    #[test]
    fn malformed_operand_is_skipped() {
        let mut doc = Document::with_version("1.5");
        let resources = helvetica_resources(&mut doc);
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"BT /F1 12 Tf 5 Tj (ok) Tj ET",
            &resources,
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(text(&handler.chars), "ok");
        assert_eq!(handler.warnings.len(), 1);
        assert_eq!(handler.warnings[0].code, WarningCode::MalformedText);
    }

    #[test]
    fn image_do_reports_placement() {
        let mut doc = Document::with_version("1.5");
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 800,
                "Height" => 1200,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0u8; 16],
        ));
        let resources = dictionary! { "XObject" => dictionary! { "Im0" => image_id } };
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"q 400 0 0 600 100 96 cm /Im0 Do Q",
            &resources,
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(handler.images.len(), 1);
        let image = &handler.images[0];
        assert_eq!(image.name, "Im0");
        assert_eq!(image.object_id, image_id);
        assert_eq!((image.width, image.height), (800, 1200));
        assert_eq!(image.ctm, [400.0, 0.0, 0.0, 600.0, 100.0, 96.0]);
    }

    #[test]
    fn unresolved_xobject_warns() {
        let doc = Document::with_version("1.5");
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"/Im7 Do",
            &Dictionary::new(),
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();
        assert!(handler.images.is_empty());
        assert_eq!(handler.warnings[0].code, WarningCode::UnresolvedImage);
    }

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    fn nested_forms(doc: &mut Document, levels: usize) -> Dictionary {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let mut inner_resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };
        let mut content = b"BT /F1 12 Tf 0 0 Td (deep) Tj ET".to_vec();
        for _ in 0..levels {
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => ints(&[0, 0, 100, 100]),
                    "Matrix" => ints(&[1, 0, 0, 1, 5, 0]),
                    "Resources" => inner_resources.clone(),
                },
                content,
            ));
            inner_resources = dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => dictionary! { "Fm" => form_id },
            };
            content = b"/Fm Do".to_vec();
        }
        inner_resources
    }

    #[test]
    fn form_xobject_text_is_scanned() {
        let mut doc = Document::with_version("1.5");
        let resources = nested_forms(&mut doc, 2);
        let mut handler = CollectingHandler::default();
        interpret_content(&doc, b"/Fm Do", &resources, &mut handler, &InterpretOptions::default())
            .unwrap();
        assert_eq!(text(&handler.chars), "deep");
        // Two nested /Matrix translations of 5 each.
        assert_eq!(handler.chars[0].ctm[4], 10.0);
    }

    #[test]
    fn form_xobject_is_traced() {
        let mut doc = Document::with_version("1.5");
        let resources = nested_forms(&mut doc, 1);
        let mut handler = CollectingHandler::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            interpret_content(&doc, b"/Fm Do", &resources, &mut handler, &InterpretOptions::default())
                .unwrap();
        });
        assert_eq!(text(&handler.chars), "deep");
    }

    #[test]
    fn form_recursion_limit_warns() {
        let mut doc = Document::with_version("1.5");
        let resources = nested_forms(&mut doc, 3);
        let mut handler = CollectingHandler::default();
        let options = InterpretOptions {
            max_recursion_depth: 2,
        };
        interpret_content(&doc, b"/Fm Do", &resources, &mut handler, &options).unwrap();
        assert!(handler.chars.is_empty());
        assert_eq!(handler.warnings[0].code, WarningCode::LimitReached);
    }

    #[test]
    fn to_unicode_cmap_is_applied() {
        let mut doc = Document::with_version("1.5");
        let cmap_id = doc.add_object(Stream::new(
            Dictionary::new(),
            b"beginbfchar <01> <004F> <02> <0063> endbfchar".to_vec(),
        ));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Custom",
            "ToUnicode" => cmap_id,
        });
        let resources = dictionary! { "Font" => dictionary! { "F1" => font_id } };
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"BT /F1 12 Tf <0102> Tj ET",
            &resources,
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();
        assert_eq!(text(&handler.chars), "Oc");
        assert_eq!(handler.chars[0].font_name, "Custom");
    }

    #[test]
    fn white_rect_fill_is_reported() {
        let doc = Document::with_version("1.5");
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"q 1 g 70 695 40 18 re f Q 0 0 10 10 re f 2 0 0 2 0 0 cm 1 1 1 rg 5 5 10 10 re f",
            &Dictionary::new(),
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();

        assert_eq!(handler.fills.len(), 3);
        let cover = handler.fills[0];
        assert!(cover.white);
        assert_eq!((cover.min_x, cover.min_y, cover.max_x, cover.max_y), (70.0, 695.0, 110.0, 713.0));
        // Q restores the default black fill.
        assert!(!handler.fills[1].white);
        let scaled = handler.fills[2];
        assert!(scaled.white);
        assert_eq!((scaled.min_x, scaled.max_y), (10.0, 30.0));
    }

    #[test]
    fn stroked_rect_is_not_a_fill() {
        let doc = Document::with_version("1.5");
        let mut handler = CollectingHandler::default();
        interpret_content(
            &doc,
            b"1 g 0 0 50 50 re S 0 0 20 20 re n",
            &Dictionary::new(),
            &mut handler,
            &InterpretOptions::default(),
        )
        .unwrap();
        assert!(handler.fills.is_empty());
    }
}
