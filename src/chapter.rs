//! Chapter composition: the driver that turns a directory of page folders
//! into one finished PDF.
//!
//! For every configured page index the composer resolves the page
//! directory, extracts the scenario text, wraps it into the left column,
//! fits the rendered image into the right column, and stamps the page
//! number. A title page goes in front. Per-page problems (missing
//! directory, file, section, or image; overlong text) degrade with a
//! warning; only environment-level faults (unwritable output, undecodable
//! image) abort the chapter.

use crate::colour::colours;
use crate::config::{Chapter, Config, Script};
use crate::font::{self, Font};
use crate::image::Image;
use crate::info::Info;
use crate::layout::{fit_within, wrap_text};
use crate::page::{ImageLayout, Page, SpanFont, SpanLayout};
use crate::pagesize::{PageOrientation, PageSize, A4};
use crate::rect::Rect;
use crate::script;
use crate::units::Pt;
use crate::Document;
use anyhow::{Context, Result};
use id_arena::Id;
use log::{info, warn};
use std::path::{Path, PathBuf};

/// What rendering a chapter produced, for console reporting.
pub struct ChapterStats {
    /// Total pages in the written document, including the title page
    pub page_count: usize,
    /// Configured page indices whose directory was missing
    pub pages_skipped: usize,
}

/// Render one chapter to its configured output path.
pub fn render_chapter(config: &Config, chapter: &Chapter) -> Result<ChapterStats> {
    let size = A4.landscape();

    let font = match font::first_available(&config.fonts.candidates) {
        Some((font, path)) => {
            info!("using font {}", path.display());
            font
        }
        None => {
            warn!(
                "no usable font file found, falling back to the built-in Courier font \
                 (Cyrillic text will not render)"
            );
            Font::builtin()
        }
    };

    let mut doc = Document::new();
    let font_id = doc.add_font(font);
    doc.set_info(Info::new().title(&chapter.title).clone());

    let title = title_page(&doc, font_id, config, &chapter.title, size);
    doc.add_page(title);

    let mut skipped = 0usize;
    for index in chapter.page_indices() {
        let page_dir = chapter.base_dir.join(format!("Страница {index:02}"));
        if !page_dir.is_dir() {
            warn!("directory not found: {}", page_dir.display());
            skipped += 1;
            continue;
        }

        let page = compose_page(&mut doc, font_id, config, &page_dir, index)
            .with_context(|| format!("Failed to compose page {index}"))?;
        doc.add_page(page);
    }

    let stats = ChapterStats {
        page_count: doc.page_count(),
        pages_skipped: skipped,
    };

    let file = std::fs::File::create(&chapter.output)
        .with_context(|| format!("Failed to create output file {}", chapter.output.display()))?;
    let mut file = std::io::BufWriter::new(file);
    doc.write(&mut file).with_context(|| "Failed to render PDF")?;

    Ok(stats)
}

/// A full page with just the chapter title, centered on both axes.
fn title_page(
    doc: &Document,
    font_id: Id<Font>,
    config: &Config,
    title: &str,
    size: PageSize,
) -> Page {
    let (width, height) = size;
    let title_size = Pt(config.layout.title_size_pt);

    let mut page = Page::new(size, None);
    let x = (width - doc.fonts[font_id].width_of(title, title_size)) / 2.0;
    page.add_span(SpanLayout {
        text: title.to_string(),
        font: SpanFont {
            id: font_id,
            size: title_size,
        },
        colour: colours::BLACK,
        coords: (x, height / 2.0),
    });
    page
}

/// Compose a single comic page: wrapped scenario text on the left half,
/// the rendered image scaled into the right half, page number below.
fn compose_page(
    doc: &mut Document,
    font_id: Id<Font>,
    config: &Config,
    page_dir: &Path,
    index: u32,
) -> Result<Page> {
    let layout = &config.layout;
    let size = A4.landscape();
    let (width, height) = size;

    let scenario_path = page_dir.join(&config.script.scenario_file);
    let text = script::read_section(&scenario_path, &config.script.section_header)
        .with_context(|| format!("Failed to read {}", scenario_path.display()))?;

    let image_path = resolve_image(page_dir, &config.script, index);

    let mut page = Page::new(size, None);

    // left half: wrapped scenario text
    let font_size = Pt(layout.font_size_pt);
    let column_width = width / 2.0 - Pt(layout.margin_x_pt) - Pt(layout.gap_pt) / 2.0;
    let lines = wrap_text(&text, column_width, |candidate| {
        doc.fonts[font_id].width_of(candidate, font_size)
    });

    let mut y = height - Pt(layout.margin_top_pt);
    for line in lines {
        if y < Pt(layout.margin_bottom_pt) {
            warn!("text on page {index} truncated due to length");
            break;
        }
        if !line.is_empty() {
            page.add_span(SpanLayout {
                text: line,
                font: SpanFont {
                    id: font_id,
                    size: font_size,
                },
                colour: colours::BLACK,
                coords: (Pt(layout.margin_x_pt), y),
            });
        }
        y -= Pt(layout.line_height_pt);
    }

    // right half: the rendered image, scaled to fit without cropping
    if let Some(path) = image_path {
        let image = Image::from_path(&path)
            .with_context(|| format!("Failed to load image {}", path.display()))?;
        let bbox = Rect {
            x1: width / 2.0 + Pt(layout.gap_pt) / 2.0,
            y1: Pt(layout.margin_bottom_pt),
            x2: width - Pt(layout.margin_x_pt),
            y2: height - Pt(layout.margin_top_pt),
        };
        let position = fit_within(image.width, image.height, bbox);
        let image_id = doc.add_image(image);
        page.add_image(ImageLayout {
            image: image_id,
            position,
        });
    }

    // footer carries the declared page index, not the ordinal position
    // among rendered pages
    let footer_size = Pt(layout.footer_size_pt);
    let label = format!("Страница {index}");
    let x = (width - doc.fonts[font_id].width_of(&label, footer_size)) / 2.0;
    page.add_span(SpanLayout {
        text: label,
        font: SpanFont {
            id: font_id,
            size: footer_size,
        },
        colour: colours::BLACK,
        coords: (x, Pt(layout.footer_baseline_pt)),
    });

    Ok(page)
}

fn resolve_image(page_dir: &Path, script: &Script, index: u32) -> Option<PathBuf> {
    let primary = page_dir.join(&script.image_file);
    if primary.exists() {
        return Some(primary);
    }
    let fallback = page_dir.join(&script.image_file_fallback);
    if fallback.exists() {
        return Some(fallback);
    }
    warn!("image not found for page {index}");
    None
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Fonts;
    use crate::page::PageContents;

    /// Config with no font candidates so the built-in fallback is used and
    /// tests don't depend on system font files.
    fn test_config() -> Config {
        Config {
            fonts: Fonts {
                candidates: Vec::new(),
            },
            ..Config::default()
        }
    }

    fn builtin_doc() -> (Document, Id<Font>) {
        let mut doc = Document::new();
        let font_id = doc.add_font(Font::builtin());
        (doc, font_id)
    }

    fn text_spans(page: &Page) -> Vec<&SpanLayout> {
        page.contents
            .iter()
            .filter_map(|c| match c {
                PageContents::Text(span) => Some(span),
                PageContents::Image(_) => None,
            })
            .collect()
    }

    #[test]
    fn missing_directory_skips_the_page_entirely() {
        let dir = tempfile::tempdir().expect("can create temp dir");

        let page_dir = dir.path().join("Страница 01");
        std::fs::create_dir(&page_dir).expect("can create page dir");
        std::fs::write(
            page_dir.join("сценарий.md"),
            "## Текст (Левая страница)\nHello world\n## Дальше",
        )
        .expect("can write scenario");
        image::RgbaImage::new(8, 4)
            .save(page_dir.join("render.png"))
            .expect("can write test image");
        // no directory for page 2

        let chapter = Chapter {
            title: "Test Chapter".to_string(),
            base_dir: dir.path().to_path_buf(),
            output: dir.path().join("out.pdf"),
            first_page: 1,
            last_page: 2,
        };

        let stats = render_chapter(&test_config(), &chapter).expect("chapter renders");
        // title page + page 1 only
        assert_eq!(stats.page_count, 2);
        assert_eq!(stats.pages_skipped, 1);

        let written = std::fs::metadata(chapter.output).expect("output exists");
        assert!(written.len() > 0);
    }

    #[test]
    fn footer_uses_the_declared_page_index() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let page_dir = dir.path().join("Страница 04");
        std::fs::create_dir(&page_dir).expect("can create page dir");

        let (mut doc, font_id) = builtin_doc();
        let page =
            compose_page(&mut doc, font_id, &test_config(), &page_dir, 4).expect("page composes");

        assert!(text_spans(&page)
            .iter()
            .any(|span| span.text == "Страница 4"));
    }

    #[test]
    fn empty_page_directory_degrades_to_sentinel_text_and_no_image() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let page_dir = dir.path().join("Страница 01");
        std::fs::create_dir(&page_dir).expect("can create page dir");

        let (mut doc, font_id) = builtin_doc();
        let page =
            compose_page(&mut doc, font_id, &test_config(), &page_dir, 1).expect("page composes");

        assert!(text_spans(&page)
            .iter()
            .any(|span| span.text == script::MISSING_FILE));
        assert!(!page
            .contents
            .iter()
            .any(|c| matches!(c, PageContents::Image(_))));
    }

    #[test]
    fn image_fallback_filename_is_used() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let page_dir = dir.path().join("Страница 01");
        std::fs::create_dir(&page_dir).expect("can create page dir");
        image::RgbaImage::new(8, 4)
            .save(page_dir.join("рендер.png"))
            .expect("can write test image");

        let (mut doc, font_id) = builtin_doc();
        let page =
            compose_page(&mut doc, font_id, &test_config(), &page_dir, 1).expect("page composes");

        assert!(page
            .contents
            .iter()
            .any(|c| matches!(c, PageContents::Image(_))));
    }

    #[test]
    fn overflowing_text_is_truncated_at_the_bottom_margin() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let page_dir = dir.path().join("Страница 01");
        std::fs::create_dir(&page_dir).expect("can create page dir");

        let body: String = (0..100).map(|i| format!("line {i}\n")).collect();
        std::fs::write(
            page_dir.join("сценарий.md"),
            format!("## Текст (Левая страница)\n{body}"),
        )
        .expect("can write scenario");

        let config = test_config();
        let (mut doc, font_id) = builtin_doc();
        let page =
            compose_page(&mut doc, font_id, &config, &page_dir, 1).expect("page composes");

        let (_, height) = A4.landscape();
        let usable = height.0 - config.layout.margin_top_pt - config.layout.margin_bottom_pt;
        let max_lines = (usable / config.layout.line_height_pt).floor() as usize + 1;

        // every body line is short, so spans = drawn body lines + footer
        let spans = text_spans(&page);
        assert_eq!(spans.len(), max_lines + 1);
        // and every drawn baseline sits at or above the bottom margin
        assert!(spans
            .iter()
            .all(|span| span.coords.1 >= Pt(config.layout.margin_bottom_pt)));
    }
}
