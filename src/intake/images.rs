//! Pending image batch for the add form

use serde::Serialize;
use tracing::debug;
use crate::domain::aggregates::ProductImage;
use crate::domain::value_objects::to_data_uri;
use crate::ValidationError;

pub const MAX_IMAGES: usize = 5;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// A file as handed over by the picker or a drop.
#[derive(Clone, Debug)]
pub struct IncomingImage {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default, Serialize)]
pub struct IntakeReport {
    pub accepted: usize,
    #[serde(serialize_with = "serialize_rejections")]
    pub rejected: Vec<ValidationError>,
}

fn serialize_rejections<S: serde::Serializer>(errors: &[ValidationError], s: S) -> Result<S::Ok, S::Error> {
    s.collect_seq(errors.iter().map(ToString::to_string))
}

#[derive(Clone, Debug, Default)]
pub struct ImageBatch {
    images: Vec<ProductImage>,
}

impl ImageBatch {
    pub fn new() -> Self { Self::default() }
    pub fn images(&self) -> &[ProductImage] { &self.images }
    pub fn len(&self) -> usize { self.images.len() }
    pub fn is_empty(&self) -> bool { self.images.is_empty() }

    /// Checks run in order: batch capacity, file size, media type.
    pub fn accept(&mut self, file: IncomingImage) -> Result<&ProductImage, ValidationError> {
        if self.images.len() >= MAX_IMAGES {
            return Err(ValidationError::ImageLimitReached { max: MAX_IMAGES });
        }
        if file.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::ImageTooLarge { name: file.name, size: file.bytes.len() });
        }
        if !file.media_type.starts_with("image/") {
            return Err(ValidationError::NotAnImage { name: file.name, media_type: file.media_type });
        }
        debug!(name = %file.name, bytes = file.bytes.len(), "image accepted");
        let data = to_data_uri(&file.media_type, &file.bytes);
        self.images.push(ProductImage { name: file.name, data });
        Ok(&self.images[self.images.len() - 1])
    }

    /// Each file is judged on its own; a rejection does not stop the rest.
    pub fn accept_all(&mut self, files: impl IntoIterator<Item = IncomingImage>) -> IntakeReport {
        let mut report = IntakeReport::default();
        for file in files {
            match self.accept(file) {
                Ok(_) => report.accepted += 1,
                Err(e) => report.rejected.push(e),
            }
        }
        report
    }

    pub fn remove(&mut self, index: usize) -> Option<ProductImage> {
        (index < self.images.len()).then(|| self.images.remove(index))
    }

    pub fn clear(&mut self) { self.images.clear(); }

    pub fn take(&mut self) -> Vec<ProductImage> { std::mem::take(&mut self.images) }

    /// Merges already encoded images, e.g. those of a saved draft, into the batch.
    /// Images already pending are skipped and the batch never grows past [`MAX_IMAGES`].
    pub fn restore(&mut self, images: Vec<ProductImage>) -> IntakeReport {
        let mut report = IntakeReport::default();
        for image in images {
            if self.images.contains(&image) {
                continue;
            }
            if self.images.len() >= MAX_IMAGES {
                report.rejected.push(ValidationError::ImageLimitReached { max: MAX_IMAGES });
                continue;
            }
            self.images.push(image);
            report.accepted += 1;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(name: &str, size: usize) -> IncomingImage {
        IncomingImage { name: name.into(), media_type: "image/png".into(), bytes: vec![0u8; size] }
    }

    #[test]
    fn test_accept_encodes_data_uri() {
        let mut batch = ImageBatch::new();
        let img = batch.accept(IncomingImage { name: "a.png".into(), media_type: "image/png".into(), bytes: b"abc".to_vec() }).unwrap();
        assert_eq!(img.data, "data:image/png;base64,YWJj");
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_limits() {
        let mut batch = ImageBatch::new();
        let report = batch.accept_all((0..7).map(|i| png(&format!("{}.png", i), 4)));
        assert_eq!(report.accepted, 5);
        assert_eq!(report.rejected, vec![ValidationError::ImageLimitReached { max: 5 }; 2]);

        let mut batch = ImageBatch::new();
        assert!(batch.accept(png("edge.png", MAX_IMAGE_BYTES)).is_ok());
        let err = batch.accept(png("big.png", MAX_IMAGE_BYTES + 1)).unwrap_err();
        assert!(matches!(err, ValidationError::ImageTooLarge { .. }));
        let err = batch.accept(IncomingImage { name: "n.pdf".into(), media_type: "application/pdf".into(), bytes: vec![1] }).unwrap_err();
        assert!(matches!(err, ValidationError::NotAnImage { .. }));
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn test_remove_and_take() {
        let mut batch = ImageBatch::new();
        batch.accept_all(vec![png("a.png", 1), png("b.png", 1)]);
        assert_eq!(batch.remove(0).unwrap().name, "a.png");
        assert!(batch.remove(4).is_none());
        let taken = batch.take();
        assert_eq!(taken.len(), 1);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_restore_merges_up_to_the_limit() {
        let mut batch = ImageBatch::new();
        batch.accept_all(vec![png("new.png", 1), png("kept.png", 2)]);
        let kept = batch.images()[1].clone();
        let saved: Vec<ProductImage> = (0..5)
            .map(|i| ProductImage { name: format!("{}.png", i), data: format!("data:image/png;base64,{}", i) })
            .chain(std::iter::once(kept))
            .collect();

        let report = batch.restore(saved);
        assert_eq!(report.accepted, 3);
        assert_eq!(report.rejected, vec![ValidationError::ImageLimitReached { max: 5 }; 2]);
        let names: Vec<&str> = batch.images().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["new.png", "kept.png", "0.png", "1.png", "2.png"]);
    }
}
