use std::fs::{File, OpenOptions, Permissions};
use std::io::{BufReader, BufWriter, ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::cleanup::PARTIAL_PREFIX;
use crate::error::JobError;
use crate::job::{Job, parent_dir};
use crate::media::MediaKind;
use crate::options::{ExecutorOptions, Transform};
use crate::processor::{self, Processor};

const PARTIAL_SUFFIX: &str = ".tmp";

/// Runs jobs synchronously, one call at a time.
///
/// Output is first written to a hidden sibling of the destination and only
/// renamed into place once the processor succeeded, so a failed job never
/// leaves a half-written file at the destination.
pub struct Executor {
    options: ExecutorOptions,
    processor: Box<dyn Processor>,
}

impl Executor {
    /// Creates an executor whose processor follows `options`.
    pub fn new(options: ExecutorOptions) -> Self {
        let processor = processor::from_options(&options);
        Self { options, processor }
    }

    /// Creates an executor from `IOCORE_CONFIG`, or defaults when unset.
    pub fn from_env() -> Result<Self, JobError> {
        Ok(Self::new(ExecutorOptions::from_env()?))
    }

    /// Replaces the processor chosen by the options.
    pub fn with_processor(mut self, processor: Box<dyn Processor>) -> Self {
        self.processor = processor;
        self
    }

    /// Options this executor was built from.
    pub fn options(&self) -> &ExecutorOptions {
        &self.options
    }

    /// Executes `job`, writing its artifact to the destination on success.
    pub fn execute(&self, job: &Job) -> Result<(), JobError> {
        let started = Instant::now();
        tracing::info!(
            source = %job.source().display(),
            destination = %job.destination().display(),
            processor = self.processor.name(),
            "processing image"
        );

        if self.options.transform == Transform::Transcode {
            reject_non_image(job.source())?;
            reject_non_image(job.destination())?;
        }

        let source = open_source(job.source())?;
        let target = resolve_destination(job.destination());
        let dir = parent_dir(&target);
        if !dir.is_dir() {
            return Err(JobError::DestinationDirMissing(dir.to_path_buf()));
        }

        let unwritable = |source: std::io::Error| JobError::DestinationUnwritable {
            path: job.destination().to_path_buf(),
            source,
        };

        let existing = std::fs::metadata(&target).ok();
        if existing.is_some() {
            if !self.options.overwrite {
                return Err(JobError::DestinationExists(job.destination().to_path_buf()));
            }
            // An existing destination must be writable by the caller.
            OpenOptions::new()
                .write(true)
                .open(&target)
                .map_err(unwritable)?;
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(PARTIAL_PREFIX).suffix(PARTIAL_SUFFIX);
        if let Some(permissions) = new_file_permissions() {
            builder.permissions(permissions);
        }
        let partial = builder.tempfile_in(dir).map_err(unwritable)?;
        if let Some(meta) = existing {
            partial
                .as_file()
                .set_permissions(meta.permissions())
                .map_err(unwritable)?;
        }

        let mut reader = BufReader::new(source);
        let mut writer = BufWriter::new(partial);
        self.processor.process(job, &mut reader, &mut writer)?;
        writer.flush().map_err(unwritable)?;
        let partial = writer.into_inner().map_err(|e| unwritable(e.into_error()))?;

        // Dropping `partial` on any error above removes the temporary file.
        if self.options.overwrite {
            partial.persist(&target).map_err(|e| unwritable(e.error))?;
        } else {
            partial
                .persist_noclobber(&target)
                .map_err(|e| match e.error.kind() {
                    IoErrorKind::AlreadyExists => {
                        JobError::DestinationExists(job.destination().to_path_buf())
                    }
                    _ => unwritable(e.error),
                })?;
        }

        tracing::info!(
            destination = %job.destination().display(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "output file saved"
        );
        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorOptions::default())
    }
}

/// Writes through a symlink at the destination instead of replacing the link.
fn resolve_destination(path: &Path) -> PathBuf {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

/// Mode requested for new outputs; the process umask still applies.
#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

fn reject_non_image(path: &Path) -> Result<(), JobError> {
    match MediaKind::of(path) {
        kind @ (MediaKind::Video | MediaKind::Audio) => Err(JobError::UnsupportedMedia {
            path: path.to_path_buf(),
            kind: kind.as_str(),
        }),
        _ => Ok(()),
    }
}

fn open_source(path: &Path) -> Result<File, JobError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        IoErrorKind::NotFound => JobError::SourceMissing(path.to_path_buf()),
        _ => JobError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let is_file = file
        .metadata()
        .map_err(|source| JobError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?
        .is_file();
    if !is_file {
        return Err(JobError::SourceUnreadable {
            path: path.to_path_buf(),
            source: std::io::Error::new(IoErrorKind::InvalidInput, "not a regular file"),
        });
    }

    Ok(file)
}

/// Executes a single job with default options.
pub fn execute(source: &str, destination: &str) -> Result<(), JobError> {
    let job = Job::new(source, destination)?;
    Executor::default().execute(&job)
}
