//! End-to-end tests of the watermark pass: scan, classify, redact, prune.
//!
//! Fixture PDFs are built programmatically with lopdf.

mod common;

use common::{PageSpec, WATERMARK, build, filler_text, manga_page, operations};
use lopdf::Object;
use mangaclean::{CleanOptions, Document, PageDisposition, clean, inspect};

fn open(pages: &[PageSpec]) -> Document {
    Document::from_lopdf(build(pages)).unwrap()
}

fn page_text(doc: &Document, index: usize) -> String {
    String::from_utf8_lossy(&doc.page_content(index).unwrap()).into_owned()
}

fn boundary_document() -> Document {
    open(&[
        PageSpec::text(format!("{WATERMARK} {}", filler_text(285))),
        PageSpec::text(format!("{WATERMARK} {}", filler_text(286))),
        manga_page("Im1", 612, 792),
        PageSpec::text(filler_text(10)),
    ])
}

#[test]
fn classification_threshold_is_exact() {
    let doc = boundary_document();
    let report = inspect(&doc, &CleanOptions::default()).unwrap();

    let lens: Vec<usize> = report.pages.iter().map(|p| p.text_len).collect();
    assert_eq!(lens, [299, 300, 14, 10]);
    let dispositions: Vec<PageDisposition> = report.pages.iter().map(|p| p.disposition).collect();
    assert_eq!(
        dispositions,
        [
            PageDisposition::Remove,
            PageDisposition::Redact,
            PageDisposition::Redact,
            PageDisposition::Keep,
        ]
    );
    assert_eq!(report.removed, [0]);
}

#[test]
fn inspect_does_not_modify_document() {
    let doc = boundary_document();
    let before: Vec<String> = (0..doc.page_count()).map(|i| page_text(&doc, i)).collect();
    inspect(&doc, &CleanOptions::default()).unwrap();
    let after: Vec<String> = (0..doc.page_count()).map(|i| page_text(&doc, i)).collect();
    assert_eq!(before, after);
}

#[test]
fn page_without_watermark_is_left_unchanged() {
    let mut doc = boundary_document();
    let before = doc.page_content(3).unwrap();
    let report = clean(&mut doc, &CleanOptions::default()).unwrap();
    assert_eq!(report.pages[3].disposition, PageDisposition::Keep);
    // Page 0 was removed, so the kept page moved up by one.
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.page_content(2).unwrap(), before);
}

#[test]
fn cover_rectangle_is_aligned_with_the_watermark() {
    let mut doc = open(&[manga_page("Im1", 612, 792)]);
    let report = clean(&mut doc, &CleanOptions::default()).unwrap();
    assert_eq!(report.pages_redacted(), 1);
    assert_eq!(report.areas_found(), 1);

    let ops = operations(&doc.page_content(0).unwrap());
    let re = ops.iter().find(|(op, _)| op == "re").unwrap();
    // Glyph box 72..167.364 x 697..709 (user space), moved 2pt out and grown 6pt.
    let expected = [70.0, 695.0, 101.364, 18.0];
    for (got, want) in re.1.iter().zip(expected) {
        assert!((got - want).abs() < 1e-3, "{:?} != {expected:?}", re.1);
    }

    let operators: Vec<&str> = ops.iter().map(|(op, _)| op.as_str()).collect();
    assert_eq!(operators.first(), Some(&"q"));
    assert_eq!(&operators[operators.len() - 6..], ["Q", "q", "g", "re", "f", "Q"]);
}

#[test]
fn rotated_watermark_is_detected_and_covered() {
    // Margin stamp running up the right edge of the page.
    let content = "q 612 0 0 792 0 0 cm /Im1 Do Q BT /F1 12 Tf 0 1 -1 0 580 200 Tm (OceanofPDF.com) Tj ET";
    let mut doc = open(&[PageSpec::text(content).with_image("Im1", 612, 792)]);

    let report = inspect(&doc, &CleanOptions::default()).unwrap();
    assert_eq!(report.pages[0].disposition, PageDisposition::Redact);
    assert_eq!(report.pages[0].areas.len(), 1);
    let area = &report.pages[0].areas[0];
    assert_eq!(area.text, "OceanofPDF.com");
    assert!(area.bbox.height() > area.bbox.width());

    clean(&mut doc, &CleanOptions::default()).unwrap();
    let ops = operations(&doc.page_content(0).unwrap());
    let (_, re) = ops.iter().find(|(op, _)| op == "re").unwrap();
    // Glyphs span x 571..583 and y 200..295.364 in user space.
    assert!(re[0] <= 571.0 && re[0] + re[2] >= 583.0, "{re:?}");
    assert!(re[1] <= 200.0 && re[1] + re[3] >= 295.36, "{re:?}");
}

#[test]
fn small_image_keeps_a_sparse_page() {
    // 14 watermark characters plus 36 filler: 50 in total, with a 100x100 icon
    // well below the dominant-image floor.
    let content = format!("q 100 0 0 100 50 50 cm /Icon Do Q {WATERMARK} {}", filler_text(36));
    let mut doc = open(&[
        PageSpec::text(content).with_image("Icon", 100, 100),
        PageSpec::text(filler_text(10)),
    ]);

    let report = clean(&mut doc, &CleanOptions::default()).unwrap();
    assert_eq!(report.pages[0].text_len, 50);
    assert!(report.pages[0].has_image);
    assert_eq!(report.pages[0].disposition, PageDisposition::Redact);
    assert!(report.removed.is_empty());
    assert_eq!(doc.page_count(), 2);
}

#[test]
fn cleaning_twice_changes_nothing_more() {
    let mut doc = boundary_document();
    let first = clean(&mut doc, &CleanOptions::default()).unwrap();
    assert_eq!(first.pages_redacted(), 2);
    assert_eq!(first.removed.len(), 1);

    let bytes = doc.to_bytes().unwrap();
    let mut again = Document::open(&bytes).unwrap();
    let contents: Vec<Vec<u8>> = (0..again.page_count())
        .map(|i| again.page_content(i).unwrap())
        .collect();

    let second = clean(&mut again, &CleanOptions::default()).unwrap();
    assert_eq!(second.areas_found(), 0);
    assert!(second.removed.is_empty());
    assert!(second.is_untouched());
    assert_eq!(again.page_count(), 3);
    for (i, content) in contents.iter().enumerate() {
        assert_eq!(&again.page_content(i).unwrap(), content);
    }
    // Hidden watermark text still counts toward the page's text length.
    assert_eq!(second.pages[0].text_len, 300);
}

#[test]
fn filler_pages_are_removed_in_order() {
    let pages: Vec<PageSpec> = (0..10)
        .map(|i| {
            if [2, 5, 7].contains(&i) {
                PageSpec::text(WATERMARK)
            } else {
                PageSpec::text(format!("BT /F1 12 Tf 72 700 Td (p{i}) Tj ET"))
            }
        })
        .collect();
    let mut doc = open(&pages);
    let report = clean(&mut doc, &CleanOptions::default()).unwrap();
    assert_eq!(report.removed, [2, 5, 7]);
    assert_eq!(doc.page_count(), 7);

    let survivors: Vec<String> = (0..doc.page_count()).map(|i| page_text(&doc, i)).collect();
    for (text, expected) in survivors.iter().zip([0, 1, 3, 4, 6, 8, 9]) {
        assert!(text.contains(&format!("(p{expected})")), "{text}");
    }

    let bytes = doc.to_bytes().unwrap();
    assert_eq!(Document::open(&bytes).unwrap().page_count(), 7);
}

#[test]
fn watermark_links_are_removed_others_kept() {
    let mut doc = open(&[manga_page("Im1", 612, 792)
        .with_link("https://OceanofPDF.com/")
        .with_link("https://example.com/scanlator")]);
    let report = clean(&mut doc, &CleanOptions::default()).unwrap();
    assert_eq!(report.links_removed(), 1);
    assert_eq!(report.pages[0].links_removed, 1);

    let inner = doc.backend().inner();
    let page_id = doc.backend().page_id(0).unwrap();
    let annots = inner
        .get_dictionary(page_id)
        .unwrap()
        .get(b"Annots")
        .and_then(Object::as_array)
        .unwrap();
    assert_eq!(annots.len(), 1);
}

#[test]
fn custom_threshold_keeps_short_pages() {
    let mut doc = open(&[PageSpec::text(WATERMARK), PageSpec::text("BT /F1 12 Tf 72 700 Td (p1) Tj ET")]);
    let options = CleanOptions {
        min_content_chars: 10,
        ..CleanOptions::default()
    };
    let report = clean(&mut doc, &options).unwrap();
    assert!(report.removed.is_empty());
    assert_eq!(report.pages[0].disposition, PageDisposition::Redact);
    assert_eq!(doc.page_count(), 2);
}
