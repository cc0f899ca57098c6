use crate::{
    font::Font,
    image::Image,
    info::Info,
    page::Page,
    refs::{ObjectReferences, RefType},
    Error,
};
use id_arena::{Arena, Id};
use pdf_writer::{Finish, Pdf, Ref};
use std::io::Write;

/// A document is the main object that stores all the contents of the PDF,
/// then renders them out with a call to [Document::write].
///
/// The document has exactly two states: while owned it accepts fonts,
/// images, and pages in append order; [Document::write] consumes it, so no
/// further mutation is possible once the PDF has been finalized.
#[derive(Default)]
pub struct Document {
    pub info: Option<Info>,
    pub fonts: Arena<Font>,
    pub images: Arena<Image>,
    pub pages: Arena<Page>,
    pub page_order: Vec<Id<Page>>,
}

impl Document {
    pub fn new() -> Document {
        Document::default()
    }

    /// Sets information about the document. If not provided, no information
    /// block will be written to the PDF
    pub fn set_info(&mut self, info: Info) {
        self.info = Some(info);
    }

    /// Add a font to the document structure. Fonts are stored "globally"
    /// within the document, so any page can use any font added here.
    pub fn add_font(&mut self, font: Font) -> Id<Font> {
        self.fonts.alloc(font)
    }

    /// Add an image to the document structure. Like fonts, images are
    /// stored "globally" and can be reused by any page.
    pub fn add_image(&mut self, image: Image) -> Id<Image> {
        self.images.alloc(image)
    }

    /// Add a page to the end of the document.
    pub fn add_page(&mut self, page: Page) -> Id<Page> {
        let id = self.pages.alloc(page);
        self.page_order.push(id);
        id
    }

    /// How many pages the document currently holds
    pub fn page_count(&self) -> usize {
        self.page_order.len()
    }

    /// Write the entire document to the writer, consuming it. The whole
    /// document is rendered in memory first, so very large documents can
    /// allocate a significant amount of memory.
    pub fn write<W: Write>(self, mut w: W) -> Result<(), Error> {
        let Document {
            info,
            fonts,
            images,
            pages,
            page_order,
        } = self;

        let mut refs = ObjectReferences::new();

        let catalog_id = refs.gen(RefType::Catalog);
        let page_tree_id = refs.gen(RefType::PageTree);

        let mut writer = Pdf::new();
        if let Some(info) = info {
            info.write(&mut refs, &mut writer);
        }

        // pre-generate page refs keyed by document order so pages can be
        // referenced before they are written
        let page_refs: Vec<Ref> = page_order
            .iter()
            .enumerate()
            .map(|(i, _)| refs.gen(RefType::Page(i)))
            .collect();

        writer
            .pages(page_tree_id)
            .count(page_refs.len() as i32)
            .kids(page_refs);

        for (id, font) in fonts.iter() {
            font.write(&mut refs, id.index(), &mut writer);
        }

        for (id, image) in images.iter() {
            image.write(&mut refs, id.index(), &mut writer)?;
        }

        for (page_index, id) in page_order.iter().enumerate() {
            let page = pages.get(*id).ok_or(Error::PageMissing)?;
            page.write(&mut refs, page_index, &fonts, &images, &mut writer)?;
        }

        let mut catalog = writer.catalog(catalog_id);
        catalog.pages(page_tree_id);
        catalog.finish();

        w.write_all(writer.finish().as_slice()).map_err(Into::into)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::colour::colours;
    use crate::page::{SpanFont, SpanLayout};
    use crate::pagesize::{PageOrientation, A4};
    use crate::units::Pt;

    #[test]
    fn writes_a_wellformed_document() {
        let mut doc = Document::new();
        let font_id = doc.add_font(Font::builtin());
        doc.set_info(Info::new().title("smoke test").clone());

        let mut page = Page::new(A4.landscape(), None);
        page.add_span(SpanLayout {
            text: "hello".to_string(),
            font: SpanFont {
                id: font_id,
                size: Pt(12.0),
            },
            colour: colours::BLACK,
            coords: (Pt(40.0), Pt(500.0)),
        });
        doc.add_page(page);

        let mut out: Vec<u8> = Vec::new();
        doc.write(&mut out).expect("can write document");
        assert!(out.starts_with(b"%PDF-"));
        assert!(out.len() > 100);
    }
}
