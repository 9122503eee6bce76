use std::path::{Path, PathBuf};

use crate::fetch::SourceFormat;
use crate::foundation::error::{EmoteError, EmoteResult};
use crate::ops::{DEFAULT_STILL_FRAME_MILLIS, TransformCtx};
use crate::query::lexer::LexMode;

/// Encoding used for stored artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactFormat {
    /// Lossless `EMOTERAW` container.
    #[default]
    Raw,
    /// Animated GIF; timing is quantized to 10 ms and colors to a 256-entry palette.
    Gif,
}

/// Engine settings, usually read from a JSON file and then overridden by CLI flags.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Root of the artifact/source blob store.
    pub store_dir: PathBuf,
    /// Directory holding `<id>.<ext>` source emotes.
    pub sources_dir: PathBuf,
    pub source_format: SourceFormat,
    pub artifact_format: ArtifactFormat,
    pub lex_mode: LexMode,
    pub shake_seed: Option<u64>,
    pub still_frame_millis: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from("emote-store"),
            sources_dir: PathBuf::from("emotes"),
            source_format: SourceFormat::default(),
            artifact_format: ArtifactFormat::default(),
            lex_mode: LexMode::default(),
            shake_seed: None,
            still_frame_millis: DEFAULT_STILL_FRAME_MILLIS,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(s: &str) -> EmoteResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| EmoteError::config(format!("parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> EmoteResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| EmoteError::io(path.display().to_string(), e))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> EmoteResult<()> {
        if self.still_frame_millis <= 0 {
            return Err(EmoteError::config("still_frame_millis must be > 0"));
        }
        if self.store_dir.as_os_str().is_empty() {
            return Err(EmoteError::config("store_dir must be non-empty"));
        }
        if self.sources_dir.as_os_str().is_empty() {
            return Err(EmoteError::config("sources_dir must be non-empty"));
        }
        Ok(())
    }

    pub fn transform_ctx(&self) -> TransformCtx {
        TransformCtx {
            shake_seed: self.shake_seed,
            still_frame_millis: self.still_frame_millis,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
