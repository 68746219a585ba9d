use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "avi", "webm", "flv"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac", "flac"];

/// Media family of a path, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image or numbered frame pattern.
    Image,
    /// Video container.
    Video,
    /// Audio container.
    Audio,
    /// Anything else.
    Unknown,
}

impl MediaKind {
    /// Classifies `path` by extension.
    pub fn of(path: &Path) -> Self {
        if is_image(path) {
            MediaKind::Image
        } else if is_video(path) {
            MediaKind::Video
        } else if is_audio(path) {
            MediaKind::Audio
        } else {
            MediaKind::Unknown
        }
    }

    /// Lowercase name used in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Unknown => "unknown",
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

fn has_extension(path: &Path, set: &[&str]) -> bool {
    extension(path).is_some_and(|ext| set.contains(&ext.as_str()))
}

/// Returns true for `.jpg`, `.jpeg` and `.png` paths, including frame patterns
/// such as `frame_%05d.png`.
pub fn is_image(path: &Path) -> bool {
    let text = path.to_string_lossy();
    if text.contains('%') {
        let lower = text.to_ascii_lowercase();
        return IMAGE_EXTENSIONS
            .iter()
            .any(|ext| lower.ends_with(&format!(".{ext}")));
    }
    has_extension(path, IMAGE_EXTENSIONS)
}

/// Returns true for common video containers.
pub fn is_video(path: &Path) -> bool {
    has_extension(path, VIDEO_EXTENSIONS)
}

/// Returns true for common audio containers.
pub fn is_audio(path: &Path) -> bool {
    has_extension(path, AUDIO_EXTENSIONS)
}
