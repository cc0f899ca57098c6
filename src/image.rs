use crate::refs::{ObjectReferences, RefType};
use crate::Error;
use image::{ColorType, DynamicImage};
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::{Filter, Finish, Pdf};
use std::path::{Path, PathBuf};

/// A raster image (the comic renders are PNG or JPEG files) with its
/// intrinsic pixel dimensions.
///
/// RGB JPEG files are embedded as-is with a DCT filter; everything else is
/// decoded, converted to RGB, and deflate-compressed, with the alpha
/// channel split off into a soft mask when present.
pub struct Image {
    data: ImageData,
    /// Intrinsic width in pixels
    pub width: u32,
    /// Intrinsic height in pixels
    pub height: u32,
}

enum ImageData {
    /// Original JPEG bytes which the PDF viewer can decode directly
    Jpeg(PathBuf),
    /// Any other decoded raster image, recompressed at write time
    Decoded(DynamicImage),
}

impl Image {
    /// Load an image from disk, sniffing the format from its content.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Image, Error> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let format = image::guess_format(&data)?;
        let decoded = image::load_from_memory_with_format(&data, format)?;

        let (width, height) = (decoded.width(), decoded.height());
        let data = match (format, decoded.color()) {
            // already in the one shape a PDF DCT stream accepts
            (image::ImageFormat::Jpeg, ColorType::Rgb8) => ImageData::Jpeg(path.to_path_buf()),
            _ => ImageData::Decoded(decoded),
        };

        Ok(Image {
            data,
            width,
            height,
        })
    }

    /// Wrap an already-decoded image.
    pub fn from_decoded(decoded: DynamicImage) -> Image {
        let (width, height) = (decoded.width(), decoded.height());
        Image {
            data: ImageData::Decoded(decoded),
            width,
            height,
        }
    }

    /// Intrinsic width / height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub(crate) fn write(
        &self,
        refs: &mut ObjectReferences,
        index: usize,
        writer: &mut Pdf,
    ) -> Result<(), Error> {
        let id = refs.gen(RefType::Image(index));

        let (filter, bytes, mask) = match &self.data {
            ImageData::Jpeg(path) => (Filter::DctDecode, std::fs::read(path)?, None),
            ImageData::Decoded(decoded) => {
                use image::GenericImageView;
                let level = CompressionLevel::DefaultLevel as u8;

                let mask = decoded.color().has_alpha().then(|| {
                    let alphas: Vec<u8> = decoded.pixels().map(|p| (p.2).0[3]).collect();
                    compress_to_vec_zlib(&alphas, level)
                });
                let bytes = compress_to_vec_zlib(decoded.to_rgb8().as_raw(), level);

                (Filter::FlateDecode, bytes, mask)
            }
        };

        let mut image = writer.image_xobject(id, bytes.as_slice());
        image.filter(filter);
        image.width(self.width as i32);
        image.height(self.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);

        let mask_id = mask
            .as_ref()
            .map(|_| refs.gen(RefType::ImageMask(index)));
        if let Some(mask_id) = mask_id {
            image.s_mask(mask_id);
        }
        image.finish();

        if let (Some(mask_id), Some(mask)) = (mask_id, mask) {
            let mut s_mask = writer.image_xobject(mask_id, mask.as_slice());
            s_mask.filter(Filter::FlateDecode);
            s_mask.width(self.width as i32);
            s_mask.height(self.height as i32);
            s_mask.color_space().device_gray();
            s_mask.bits_per_component(8);
        }

        Ok(())
    }
}
