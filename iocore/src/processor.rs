use std::io::{BufRead, Seek, Write};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::error::JobError;
use crate::job::Job;
use crate::options::{ExecutorOptions, Transform};

/// Readable, seekable job input.
pub trait Source: BufRead + Seek {}
impl<T: BufRead + Seek + ?Sized> Source for T {}

/// Writable, seekable job output.
pub trait Sink: Write + Seek {}
impl<T: Write + Seek + ?Sized> Sink for T {}

/// A transformation from a job's source bytes to its destination bytes.
///
/// Implementations must only touch the streams they are handed; the executor
/// owns file creation, placement and cleanup.
pub trait Processor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Reads `source` and writes the result into `sink`.
    fn process(&self, job: &Job, source: &mut dyn Source, sink: &mut dyn Sink) -> Result<(), JobError>;
}

/// Decodes the source and re-encodes it in the format named by the
/// destination's extension.
#[derive(Debug, Clone)]
pub struct Transcoder {
    jpeg_quality: u8,
}

impl Transcoder {
    /// Creates a transcoder using `jpeg_quality` for JPEG output.
    pub fn new(jpeg_quality: u8) -> Self {
        Self { jpeg_quality }
    }
}

impl Processor for Transcoder {
    fn name(&self) -> &'static str {
        "transcode"
    }

    fn process(&self, job: &Job, source: &mut dyn Source, mut sink: &mut dyn Sink) -> Result<(), JobError> {
        let format = ImageFormat::from_path(job.destination())
            .map_err(|_| JobError::UnsupportedOutputFormat(job.destination().to_path_buf()))?;

        let image = ImageReader::new(source)
            .with_guessed_format()
            .map_err(|source| JobError::SourceUnreadable {
                path: job.source().to_path_buf(),
                source,
            })?
            .decode()
            .map_err(JobError::Decode)?;

        tracing::debug!(
            width = image.width(),
            height = image.height(),
            format = ?format,
            "decoded source image"
        );

        match format {
            // JPEG has no alpha channel.
            ImageFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                let encoder = JpegEncoder::new_with_quality(sink, self.jpeg_quality);
                rgb.write_with_encoder(encoder).map_err(JobError::Encode)
            }
            _ => image.write_to(&mut sink, format).map_err(JobError::Encode),
        }
    }
}

/// Copies the source verbatim.
#[derive(Debug, Clone, Default)]
pub struct Passthrough;

impl Processor for Passthrough {
    fn name(&self) -> &'static str {
        "copy"
    }

    fn process(&self, _job: &Job, source: &mut dyn Source, sink: &mut dyn Sink) -> Result<(), JobError> {
        let bytes = std::io::copy(source, sink)?;
        tracing::debug!(bytes, "copied source");
        Ok(())
    }
}

/// Builds the processor selected by `options`.
pub fn from_options(options: &ExecutorOptions) -> Box<dyn Processor> {
    match options.transform {
        Transform::Transcode => Box::new(Transcoder::new(options.jpeg_quality)),
        Transform::Copy => Box::new(Passthrough),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageBuffer, Rgba};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 128, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn run(processor: &dyn Processor, job: &Job, input: Vec<u8>) -> Result<Vec<u8>, JobError> {
        let mut source = Cursor::new(input);
        let mut sink = Cursor::new(Vec::new());
        processor.process(job, &mut source, &mut sink)?;
        Ok(sink.into_inner())
    }

    #[test]
    fn transcodes_png_to_jpeg() {
        let job = Job::new("in.png", "out.jpg").unwrap();
        let out = run(&Transcoder::new(80), &job, png_bytes(10, 10)).unwrap();

        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 10));
    }

    #[test]
    fn corrupt_source_is_decode_error() {
        let job = Job::new("in.png", "out.png").unwrap();
        let err = run(&Transcoder::new(90), &job, b"definitely not an image".to_vec()).unwrap_err();
        assert!(matches!(err, JobError::Decode(_)), "{err:?}");
    }

    #[test]
    fn unknown_destination_extension_is_rejected() {
        let job = Job::new("in.png", "out.unknownext").unwrap();
        let err = run(&Transcoder::new(90), &job, png_bytes(2, 2)).unwrap_err();
        assert!(matches!(err, JobError::UnsupportedOutputFormat(_)), "{err:?}");
    }

    #[test]
    fn passthrough_copies_bytes() {
        let job = Job::new("in.bin", "out.bin").unwrap();
        let out = run(&Passthrough, &job, b"raw bytes".to_vec()).unwrap();
        assert_eq!(out, b"raw bytes");
    }

    #[test]
    fn options_select_processor() {
        let copy = ExecutorOptions {
            transform: Transform::Copy,
            ..ExecutorOptions::default()
        };
        assert_eq!(from_options(&copy).name(), "copy");
        assert_eq!(from_options(&ExecutorOptions::default()).name(), "transcode");
    }
}
