//! Text recognition collaborator.
//!
//! Recognition itself happens outside this process. [`CommandRecognizer`]
//! hands the screenshots to a configured program and reads its JSON answer.

use std::fs;
use std::io;
use std::process::Command;
use std::sync::Arc;

use bytes::Bytes;
use railyard_store_db::EntryFields;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

/// One uploaded screenshot.
#[derive(Debug, Clone)]
pub(crate) struct ImageInput {
    pub(crate) filename: String,
    pub(crate) data: Bytes,
}

/// What the recognizer read from a set of screenshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct Recognition {
    #[serde(default)]
    pub(crate) service_name: String,
    #[serde(default)]
    pub(crate) rows: Vec<EntryFields>,
    #[serde(default)]
    pub(crate) raw_text: Vec<String>,
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Text recognition is unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Text recognition failed: {reason}")]
    Failed { reason: String },
}

/// Reads timetable rows from screenshots given in capture order.
///
/// Implementations block; callers run them on the blocking pool.
pub(crate) trait Recognizer: Send + Sync {
    fn recognize(&self, images: &[ImageInput]) -> Result<Recognition, OcrError>;
}

/// Recognizer used when no command is configured.
pub(crate) struct Unconfigured;

impl Recognizer for Unconfigured {
    fn recognize(&self, _images: &[ImageInput]) -> Result<Recognition, OcrError> {
        Err(OcrError::Unavailable {
            reason: "no ocr_command configured".to_string(),
        })
    }
}

/// Runs an external program over the screenshots.
///
/// Images are written to a fresh temporary directory as `000.png`,
/// `001.jpg`, ... and their paths appended to the command line. The program
/// prints a [`Recognition`] as JSON on stdout.
pub(crate) struct CommandRecognizer {
    program: String,
    args: Vec<String>,
}

impl CommandRecognizer {
    pub(crate) fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }
}

impl Recognizer for CommandRecognizer {
    fn recognize(&self, images: &[ImageInput]) -> Result<Recognition, OcrError> {
        let failed = |reason: String| OcrError::Failed { reason };

        let dir = tempfile::tempdir()
            .map_err(|e| failed(format!("cannot create image directory: {e}")))?;
        let mut paths = Vec::with_capacity(images.len());
        for (index, image) in images.iter().enumerate() {
            let path = dir
                .path()
                .join(format!("{index:03}.{}", extension(&image.filename)));
            fs::write(&path, &image.data)
                .map_err(|e| failed(format!("cannot write {}: {e}", path.display())))?;
            paths.push(path);
        }

        let output = match Command::new(&self.program)
            .args(&self.args)
            .args(&paths)
            .output()
        {
            Ok(output) => output,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(OcrError::Unavailable {
                    reason: format!("{} not found", self.program),
                });
            }
            Err(e) => return Err(failed(format!("cannot run {}: {e}", self.program))),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| failed(format!("unreadable output from {}: {e}", self.program)))
    }
}

fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string())
}

pub(crate) fn from_config(config: &Config) -> Arc<dyn Recognizer> {
    match config.ocr_command.as_deref().and_then(CommandRecognizer::new) {
        Some(recognizer) => {
            log::info!("text recognition via {}", recognizer.program);
            Arc::new(recognizer)
        }
        None => {
            log::warn!("no ocr_command configured, uploads will be refused");
            Arc::new(Unconfigured)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(names: &[&str]) -> Vec<ImageInput> {
        names
            .iter()
            .map(|name| ImageInput {
                filename: name.to_string(),
                data: Bytes::from_static(b"\x89PNG"),
            })
            .collect()
    }

    fn shell(script: &str) -> CommandRecognizer {
        CommandRecognizer::new(&["sh".into(), "-c".into(), script.into(), "ocr".into()]).unwrap()
    }

    #[test]
    fn passes_images_in_capture_order() {
        // Report the basenames of the arguments as raw text.
        let recognizer = shell(
            r#"printf '{"service_name":"1A01","rows":[{"action":"Depart"}],"raw_text":['
               sep=""
               for f in "$@"; do printf '%s"%s"' "$sep" "$(basename "$f")"; sep=","; done
               printf ']}'"#,
        );
        let recognition = recognizer
            .recognize(&images(&["1_service.png", "2_schedule.JPG"]))
            .unwrap();
        assert_eq!(recognition.service_name, "1A01");
        assert_eq!(recognition.raw_text, ["000.png", "001.jpg"]);
        assert_eq!(recognition.rows[0].action, "Depart");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let recognizer =
            CommandRecognizer::new(&["/nonexistent/railyard-ocr".to_string()]).unwrap();
        assert!(matches!(
            recognizer.recognize(&images(&["a.png"])),
            Err(OcrError::Unavailable { .. })
        ));
    }

    #[test]
    fn failing_program_is_failure() {
        let err = shell("echo 'model not loaded' >&2; exit 3")
            .recognize(&images(&["a.png"]))
            .unwrap_err();
        match err {
            OcrError::Failed { reason } => assert!(reason.contains("model not loaded"), "{reason}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unreadable_output_is_failure() {
        assert!(matches!(
            shell("echo not json").recognize(&images(&["a.png"])),
            Err(OcrError::Failed { .. })
        ));
    }

    #[test]
    fn unconfigured_is_unavailable() {
        assert!(matches!(
            Unconfigured.recognize(&images(&["a.png"])),
            Err(OcrError::Unavailable { .. })
        ));
        assert!(CommandRecognizer::new(&[]).is_none());
    }
}
