//! Project export: one archive when an archive builder is available,
//! otherwise one download per file, spaced out by the caller.

use std::collections::{BTreeMap, VecDeque};

use crate::app::domain::FileKind;
use crate::app::infrastructure::error::{AppError, Result};

pub const ARCHIVE_NAME: &str = "ferrisplay-project.zip";
pub const ARCHIVE_MIME: &str = "application/zip";
/// Gap between sequential downloads.
pub const DOWNLOAD_SPACING_MS: u64 = 300;

/// Packs `path -> content` into a single binary blob.
pub trait ArchiveBuilder {
    fn build_archive(&mut self, files: &BTreeMap<String, String>) -> Result<Vec<u8>>;
}

/// Save-as style sink for generated files.
pub trait DownloadSink {
    fn download(&mut self, filename: &str, content: &[u8], mime: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Downloads still to be handed to the sink, in order.
#[derive(Debug, Default)]
pub struct ExportQueue {
    pending: VecDeque<PendingDownload>,
    total: usize,
    used_archive: bool,
}

/// Outcome of planning an export.
#[derive(Debug)]
pub struct ExportPlan {
    pub queue: ExportQueue,
    /// Set when an archive builder existed but failed; the queue then holds
    /// the per-file fallback.
    pub archive_error: Option<AppError>,
}

fn mime_for(path: &str) -> &'static str {
    FileKind::from_file_name(path)
        .map(FileKind::mime)
        .unwrap_or("text/plain")
}

fn per_file(files: &BTreeMap<String, String>) -> VecDeque<PendingDownload> {
    files
        .iter()
        .map(|(path, content)| PendingDownload {
            filename: path.clone(),
            bytes: content.as_bytes().to_vec(),
            mime: mime_for(path).to_string(),
        })
        .collect()
}

pub fn plan_export(
    files: &BTreeMap<String, String>,
    archive: Option<&mut (dyn ArchiveBuilder + '_)>,
) -> ExportPlan {
    let mut archive_error = None;
    if let Some(builder) = archive {
        match builder.build_archive(files) {
            Ok(bytes) => {
                let mut pending = VecDeque::new();
                pending.push_back(PendingDownload {
                    filename: ARCHIVE_NAME.to_string(),
                    bytes,
                    mime: ARCHIVE_MIME.to_string(),
                });
                return ExportPlan {
                    queue: ExportQueue {
                        total: 1,
                        pending,
                        used_archive: true,
                    },
                    archive_error: None,
                };
            }
            Err(e) => {
                tracing::warn!("Archive creation failed, falling back to single files: {}", e);
                archive_error = Some(match e {
                    AppError::ArchiveFailure(_) => e,
                    other => AppError::ArchiveFailure(other.to_string()),
                });
            }
        }
    }

    let pending = per_file(files);
    ExportPlan {
        queue: ExportQueue {
            total: pending.len(),
            pending,
            used_archive: false,
        },
        archive_error,
    }
}

impl ExportQueue {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn used_archive(&self) -> bool {
        self.used_archive
    }

    /// Hand the next file to the sink. Returns its name, or `None` when the
    /// queue is drained. A transfer failure drops the rest of the queue.
    pub fn send_next(&mut self, sink: &mut dyn DownloadSink) -> Option<Result<String>> {
        let next = self.pending.pop_front()?;
        match sink.download(&next.filename, &next.bytes, &next.mime) {
            Ok(()) => Some(Ok(next.filename)),
            Err(e) => {
                self.pending.clear();
                Some(Err(match e {
                    AppError::TransferFailure(_) => e,
                    other => AppError::TransferFailure(other.to_string()),
                }))
            }
        }
    }
}
