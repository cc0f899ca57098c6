use crate::colour::Colour;
use crate::font::{EncodedText, Font};
use crate::image::Image;
use crate::layout::Margins;
use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::refs::{ObjectReferences, RefType};
use crate::units::Pt;
use crate::Error;
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Name, Pdf};
use std::io::Write;

/// Which document font a span is set in, and at what size
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpanFont {
    pub id: Id<Font>,
    pub size: Pt,
}

/// A single run of text positioned on a page. `coords` locate the baseline
/// of the first character.
#[derive(Clone, PartialEq, Debug)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

/// A document image positioned on a page
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ImageLayout {
    pub image: Id<Image>,
    pub position: Rect,
}

#[derive(Clone, PartialEq, Debug)]
pub enum PageContents {
    Text(SpanLayout),
    Image(ImageLayout),
}

/// A single page: its size, the box its margins leave for content, and the
/// ordered list of spans and images drawn on it.
pub struct Page {
    /// The size of the page
    pub media_box: Rect,
    /// Where content can live, i.e. within the margins
    pub content_box: Rect,
    /// Everything drawn on the page, in draw order
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: PageSize, margins: Option<Margins>) -> Page {
        let margins = margins.unwrap_or_default();
        Page {
            media_box: Rect {
                x1: Pt(0.0),
                y1: Pt(0.0),
                x2: size.0,
                y2: size.1,
            },
            content_box: Rect {
                x1: margins.left,
                y1: margins.bottom,
                x2: size.0 - margins.right,
                y2: size.1 - margins.top,
            },
            contents: Vec::default(),
        }
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(span));
    }

    pub fn add_image(&mut self, image: ImageLayout) {
        self.contents.push(PageContents::Image(image));
    }

    /// Render the page contents into a raw PDF content stream
    #[allow(clippy::write_with_newline)]
    fn render(&self, fonts: &Arena<Font>) -> Result<Vec<u8>, std::io::Error> {
        let mut content: Vec<u8> = Vec::default();

        for page_content in self.contents.iter() {
            match page_content {
                PageContents::Text(span) => {
                    let font = fonts
                        .get(span.font.id)
                        .expect("span font was added to the document");

                    write!(&mut content, "q\n")?;
                    match span.colour {
                        Colour::RGB { r, g, b } => write!(&mut content, "{} {} {} rg\n", r, g, b)?,
                        Colour::Grey { g } => write!(&mut content, "{} g\n", g)?,
                    }
                    write!(&mut content, "BT\n")?;
                    write!(
                        &mut content,
                        "/F{} {} Tf\n",
                        span.font.id.index(),
                        span.font.size
                    )?;
                    write!(&mut content, "{} {} Td\n", span.coords.0, span.coords.1)?;
                    match font.encode_text(&span.text) {
                        EncodedText::Glyphs(gids) => {
                            write!(&mut content, "<")?;
                            for gid in gids {
                                write!(&mut content, "{gid:04x}")?;
                            }
                            write!(&mut content, "> Tj\n")?;
                        }
                        EncodedText::Bytes(bytes) => {
                            content.push(b'(');
                            for byte in bytes {
                                if matches!(byte, b'(' | b')' | b'\\') {
                                    content.push(b'\\');
                                }
                                content.push(byte);
                            }
                            content.extend_from_slice(b") Tj\n");
                        }
                    }
                    write!(&mut content, "ET\nQ\n")?;
                }
                PageContents::Image(image) => {
                    write!(&mut content, "q\n")?;
                    write!(
                        &mut content,
                        "{} 0 0 {} {} {} cm\n",
                        image.position.width(),
                        image.position.height(),
                        image.position.x1,
                        image.position.y1
                    )?;
                    write!(&mut content, "/I{} Do\n", image.image.index())?;
                    write!(&mut content, "Q\n")?;
                }
            }
        }

        Ok(content)
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        page_index: usize,
        fonts: &Arena<Font>,
        images: &Arena<Image>,
        writer: &mut Pdf,
    ) -> Result<(), Error> {
        let id = refs
            .get(RefType::Page(page_index))
            .expect("page refs were pre-generated");
        let mut page = writer.page(id);
        page.media_box(self.media_box.into());
        page.art_box(self.content_box.into());
        page.parent(refs.get(RefType::PageTree).expect("page tree ref exists"));

        let mut resources = page.resources();
        let mut resource_fonts = resources.fonts();
        for (font_id, _) in fonts.iter() {
            resource_fonts.pair(
                Name(format!("F{}", font_id.index()).as_bytes()),
                refs.get(RefType::Font(font_id.index()))
                    .expect("fonts are written before pages"),
            );
        }
        resource_fonts.finish();
        let mut resource_xobjects = resources.x_objects();
        for (image_id, _) in images.iter() {
            resource_xobjects.pair(
                Name(format!("I{}", image_id.index()).as_bytes()),
                refs.get(RefType::Image(image_id.index()))
                    .expect("images are written before pages"),
            );
        }
        resource_xobjects.finish();
        resources.finish();

        let content_id = refs.gen(RefType::ContentForPage(page_index));
        page.contents(content_id);
        page.finish();

        let rendered = self.render(fonts)?;
        writer.stream(content_id, rendered.as_slice());

        Ok(())
    }
}
