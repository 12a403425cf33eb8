//! Turns uploaded screenshots into a timetable preview.
//!
//! Nothing here touches the store: the preview is sent back to the client,
//! which submits the reviewed rows through the timetable endpoints.

use railyard_multipart::Part;
use railyard_store_db::EntryFields;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ocr::{ImageInput, Recognizer};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// Timetable preview built from a set of screenshots.
#[derive(Debug, Serialize)]
pub(crate) struct Extraction {
    pub(crate) service_name: String,
    pub(crate) entries: Vec<PreviewEntry>,
    pub(crate) raw_text: Vec<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub(crate) struct PreviewEntry {
    pub(crate) sort_order: i64,
    #[serde(flatten)]
    pub(crate) fields: EntryFields,
}

fn is_image(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// Keep the image parts, order them by filename and run recognition.
///
/// Screenshot tools number their files in capture order, so the filename
/// order is the order the pages were seen in.
pub(crate) fn extract(parts: Vec<Part>, recognizer: &dyn Recognizer) -> Result<Extraction> {
    let mut images: Vec<ImageInput> = parts
        .into_iter()
        .filter_map(|part| {
            let filename = part.filename?;
            is_image(&filename).then_some(ImageInput {
                filename,
                data: part.data,
            })
        })
        .collect();
    if images.is_empty() {
        return Err(AppError::NoValidInput);
    }
    images.sort_by(|a, b| a.filename.as_bytes().cmp(b.filename.as_bytes()));

    let recognition = recognizer.recognize(&images).inspect_err(|e| {
        log::warn!("recognition of {} images failed: {}", images.len(), e);
    })?;

    let entries = recognition
        .rows
        .into_iter()
        .enumerate()
        .map(|(position, fields)| PreviewEntry {
            sort_order: position as i64,
            fields,
        })
        .collect();

    Ok(Extraction {
        service_name: recognition.service_name,
        entries,
        raw_text: recognition.raw_text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrError, Recognition};
    use bytes::Bytes;
    use rstest::rstest;
    use std::sync::Mutex;

    /// Remembers the filenames it was given and returns one row per image.
    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<String>>,
    }

    impl Recognizer for Recording {
        fn recognize(&self, images: &[ImageInput]) -> std::result::Result<Recognition, OcrError> {
            let names: Vec<String> = images.iter().map(|i| i.filename.clone()).collect();
            *self.seen.lock().unwrap() = names.clone();
            Ok(Recognition {
                service_name: "1A01".into(),
                rows: names
                    .into_iter()
                    .map(|name| EntryFields {
                        action: "Stop".into(),
                        location: Some(name),
                        ..Default::default()
                    })
                    .collect(),
                raw_text: vec!["1A01 London Euston".into()],
            })
        }
    }

    fn file(filename: &str) -> Part {
        Part {
            name: "screenshots".into(),
            filename: Some(filename.into()),
            content_type: None,
            data: Bytes::from_static(b"img"),
        }
    }

    #[rstest]
    #[case("a.png", true)]
    #[case("A.JPEG", true)]
    #[case("shot.Bmp", true)]
    #[case("anim.gif", true)]
    #[case("notes.txt", false)]
    #[case("png", false)]
    #[case("archive.png.zip", false)]
    fn recognizes_image_names(#[case] filename: &str, #[case] expected: bool) {
        assert_eq!(is_image(filename), expected);
    }

    #[test]
    fn images_reach_recognizer_sorted_by_name() {
        let recognizer = Recording::default();
        let parts = vec![
            file("3_stops.png"),
            file("readme.txt"),
            file("1_service.png"),
            Part {
                filename: None,
                ..file("ignored.png")
            },
            file("2_schedule.JPG"),
        ];

        let extraction = extract(parts, &recognizer).unwrap();

        assert_eq!(
            *recognizer.seen.lock().unwrap(),
            ["1_service.png", "2_schedule.JPG", "3_stops.png"]
        );
        assert_eq!(extraction.service_name, "1A01");
        let orders: Vec<_> = extraction.entries.iter().map(|e| e.sort_order).collect();
        assert_eq!(orders, [0, 1, 2]);
        assert_eq!(
            extraction.entries[0].fields.location.as_deref(),
            Some("1_service.png")
        );
    }

    #[test]
    fn no_images_is_rejected_before_recognition() {
        let recognizer = Recording::default();
        let err = extract(vec![file("timetable.pdf")], &recognizer).unwrap_err();
        assert!(matches!(err, AppError::NoValidInput));
        assert!(recognizer.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn recognizer_failure_propagates() {
        let err = extract(vec![file("a.png")], &crate::ocr::Unconfigured).unwrap_err();
        assert!(matches!(
            err,
            AppError::Recognition(OcrError::Unavailable { .. })
        ));
    }
}
