use thiserror::Error;

/// All errors that the PDF layer can generate
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    /// An I/O error occurred
    Io(#[from] std::io::Error),

    #[error(transparent)]
    /// [owned_ttf_parser] failed to parse the font
    FaceParsing(#[from] owned_ttf_parser::FaceParsingError),

    #[error(transparent)]
    /// [image] failed to parse the image
    Image(#[from] image::ImageError),

    /// A page listed in the document order is missing from the page arena
    #[error("page referenced by the document is missing")]
    PageMissing,
}
