//! Content-addressed storage for synthesized audio.
//!
//! A cache key is the first 32 bits (8 hex chars) of the SHA-256 digest of
//! `"{text}-{persona}"`, prefixed with the persona id. The same
//! `(text, persona)` pair maps to the same filename across restarts. The
//! truncated width makes collisions possible in principle; for short chat
//! replies this is accepted.
//!
//! Artifacts are written once and never rewritten or evicted.

use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::PersonaId;

/// URL path under which the cache directory is served.
pub const AUDIO_URL_PREFIX: &str = "/generated-audio";

/// Number of hex characters of the digest kept in the filename.
pub const KEY_HEX_CHARS: usize = 8;

/// Deterministic cache filename for a `(text, persona)` pair.
#[must_use]
pub fn filename_for(text: &str, persona: PersonaId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"-");
    hasher.update(persona.as_str().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    format!("{}_{}.mp3", persona.as_str(), &digest[..KEY_HEX_CHARS])
}

/// Result of [`SpeechCache::store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOutcome {
    /// The artifact was written by this call.
    Written,
    /// Another writer got there first; the existing file was left untouched.
    AlreadyPresent,
}

/// On-disk audio cache rooted at a directory that is served statically.
#[derive(Debug, Clone)]
pub struct SpeechCache {
    dir: PathBuf,
    url_prefix: String,
}

impl SpeechCache {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Cache living at `<public_dir>/generated-audio`, served at `/generated-audio`.
    pub fn in_public_dir(public_dir: &Path) -> Self {
        Self::new(
            public_dir.join(AUDIO_URL_PREFIX.trim_start_matches('/')),
            AUDIO_URL_PREFIX,
        )
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), filename)
    }

    /// Whether an artifact already exists. I/O errors count as a miss.
    pub async fn lookup(&self, filename: &str) -> bool {
        match tokio::fs::try_exists(self.path_for(filename)).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::debug!(filename, error = %e, "Cache lookup failed, treating as miss");
                false
            }
        }
    }

    /// Persist `audio` under `filename` without ever replacing an existing file.
    ///
    /// The bytes are written to a temporary file in the cache directory and
    /// then hard-linked into place, so readers never observe a partial file.
    pub async fn store(&self, filename: &str, audio: &[u8]) -> io::Result<StoreOutcome> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(filename);
        let tmp = self
            .dir
            .join(format!(".{filename}.{}.part", Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&tmp, audio).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e);
        }

        let linked = tokio::fs::hard_link(&tmp, &target).await;
        let _ = tokio::fs::remove_file(&tmp).await;

        match linked {
            Ok(()) => Ok(StoreOutcome::Written),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(StoreOutcome::AlreadyPresent),
            Err(e) => Err(e),
        }
    }
}
