use std::path::{Path, PathBuf};

use crate::foundation::error::{EmoteError, EmoteResult};

/// Source raster format accepted from the fetcher. Exactly one is configured per engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    #[default]
    Webp,
    Gif,
    Png,
}

impl SourceFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Gif => "gif",
            Self::Png => "png",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Webp => image::ImageFormat::WebP,
            Self::Gif => image::ImageFormat::Gif,
            Self::Png => image::ImageFormat::Png,
        }
    }

    /// Whether `bytes` start with this format's signature.
    pub fn matches(self, bytes: &[u8]) -> bool {
        image::guess_format(bytes).is_ok_and(|f| f == self.image_format())
    }
}

/// Retrieves the raw bytes of a source emote by id.
pub trait AssetFetcher: Send + Sync {
    /// Fails with [`EmoteError::NotFound`] for unknown ids and [`EmoteError::Format`] when the
    /// content is not the accepted source format.
    fn fetch(&self, id: &str) -> EmoteResult<Vec<u8>>;
}

/// Reads `<dir>/<id>.<ext>` from a local directory.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    dir: PathBuf,
    format: SourceFormat,
}

impl DirFetcher {
    pub fn new(dir: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

impl AssetFetcher for DirFetcher {
    fn fetch(&self, id: &str) -> EmoteResult<Vec<u8>> {
        // The lexer admits ':' and parentheses in ids, never path separators or dots.
        if id.contains(['/', '\\', '.']) {
            return Err(EmoteError::invalid_argument(format!(
                "emote id '{id}' is not a plain name"
            )));
        }

        let path = self.dir.join(format!("{id}.{}", self.format.extension()));
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EmoteError::NotFound(id.to_owned()));
            }
            Err(e) => return Err(EmoteError::io(path.display().to_string(), e)),
        };

        if !self.format.matches(&bytes) {
            return Err(EmoteError::format(
                id,
                format!("expected {} content", self.format.extension()),
            ));
        }
        tracing::debug!(id, path = %path.display(), bytes = bytes.len(), "fetched source");
        Ok(bytes)
    }
}

#[cfg(test)]
#[path = "../tests/unit/fetch.rs"]
mod tests;
