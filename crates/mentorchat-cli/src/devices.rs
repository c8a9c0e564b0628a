//! Terminal audio through external programs.
//!
//! Generated audio is downloaded next to the system temp dir and handed to a
//! command-line player; fallback speech goes through `espeak-ng`. Both keep
//! the running child so `pause`/`cancel` can kill it.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use mentorchat_client::{AudioOutput, DoneCallback, LocalSpeech, LocalVoice, PlaybackError, Utterance};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_AUDIO_PLAYER: &str = "mpg123";
pub const DEFAULT_SPEECH_PROGRAM: &str = "espeak-ng";

/// espeak-ng's default speaking rate in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// The child process currently producing sound, if any.
#[derive(Default)]
struct ActiveChild {
    token: Mutex<Option<CancellationToken>>,
}

impl ActiveChild {
    fn lock(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.token.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self) {
        if let Some(token) = self.lock().take() {
            token.cancel();
        }
    }

    /// Wait for `child` in the background and report through `on_done`.
    /// A previously watched child is killed.
    fn watch(&self, mut child: Child, program: String, on_done: DoneCallback) {
        let token = CancellationToken::new();
        if let Some(previous) = self.lock().replace(token.clone()) {
            previous.cancel();
        }

        tokio::spawn(async move {
            let result = tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => Ok(()),
                    Ok(status) => Err(format!("{program} exited with {status}")),
                    Err(e) => Err(format!("{program} failed: {e}")),
                },
                () = token.cancelled() => {
                    if let Err(e) = child.kill().await {
                        tracing::debug!(%program, error = %e, "Failed to kill player process");
                    }
                    Ok(())
                }
            };
            on_done(result);
        });
    }
}

/// Plays audio URLs with an external player such as `mpg123`.
pub struct ProcessAudioOutput {
    http: reqwest::Client,
    program: String,
    clip_dir: PathBuf,
    active: ActiveChild,
}

impl ProcessAudioOutput {
    pub fn new(
        program: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, PlaybackError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            http,
            program: program.into(),
            clip_dir: std::env::temp_dir().join("mentorchat-audio"),
            active: ActiveChild::default(),
        })
    }

    #[must_use]
    pub fn with_clip_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.clip_dir = dir.into();
        self
    }

    /// Local file for `url`. Audio URLs are content-addressed, so the last
    /// path segment identifies the clip.
    fn clip_path(&self, url: &str) -> PathBuf {
        let name = url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty())
            .unwrap_or("clip.mp3");
        self.clip_dir.join(name)
    }

    async fn fetch(&self, url: &str, path: &Path) -> Result<(), PlaybackError> {
        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "Reusing downloaded clip");
            return Ok(());
        }

        let bytes = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::create_dir_all(&self.clip_dir)
            .await
            .map_err(|e| PlaybackError::Audio(format!("could not create clip dir: {e}")))?;
        tokio::fs::write(path, &bytes)
            .await
            .map_err(|e| PlaybackError::Audio(format!("could not save clip: {e}")))
    }
}

#[async_trait]
impl AudioOutput for ProcessAudioOutput {
    async fn play(&self, url: &str, on_done: DoneCallback) -> Result<(), PlaybackError> {
        let path = self.clip_path(url);
        self.fetch(url, &path).await?;

        let child = Command::new(&self.program)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::Audio(format!("could not start {}: {e}", self.program)))?;

        tracing::debug!(program = %self.program, path = %path.display(), "Playing clip");
        self.active.watch(child, self.program.clone(), on_done);
        Ok(())
    }

    fn pause(&self) {
        self.active.stop();
    }
}

/// Speaks text with `espeak-ng`.
pub struct ProcessLocalSpeech {
    program: String,
    voices: Vec<LocalVoice>,
    active: ActiveChild,
}

impl ProcessLocalSpeech {
    /// Query the installed voices once. A missing program leaves the list
    /// empty; speaking then fails with a process error.
    pub async fn detect(program: impl Into<String>) -> Self {
        let program = program.into();
        let voices = match Command::new(&program).arg("--voices").output().await {
            Ok(output) if output.status.success() => {
                parse_voice_list(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(output) => {
                tracing::warn!(%program, status = %output.status, "Could not list local voices");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(%program, error = %e, "Local speech program not available");
                Vec::new()
            }
        };
        tracing::debug!(%program, voices = voices.len(), "Local speech ready");

        Self {
            program,
            voices,
            active: ActiveChild::default(),
        }
    }
}

#[async_trait]
impl LocalSpeech for ProcessLocalSpeech {
    fn voices(&self) -> Vec<LocalVoice> {
        self.voices.clone()
    }

    async fn speak(
        &self,
        utterance: Utterance,
        on_done: DoneCallback,
    ) -> Result<(), PlaybackError> {
        let child = Command::new(&self.program)
            .args(speech_args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlaybackError::LocalSpeech(format!("could not start {}: {e}", self.program)))?;

        self.active.watch(child, self.program.clone(), on_done);
        Ok(())
    }

    fn cancel(&self) {
        self.active.stop();
    }
}

/// Parse the table printed by `espeak-ng --voices`:
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File          Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US     (en 2)
/// ```
fn parse_voice_list(output: &str) -> Vec<LocalVoice> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let lang = columns.nth(1)?;
            let name = columns.nth(1)?;
            Some(LocalVoice {
                name: name.replace('_', " "),
                lang: lang.to_string(),
            })
        })
        .collect()
}

/// Map rate/pitch/volume multipliers onto espeak-ng's scales.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn speech_args(utterance: &Utterance) -> Vec<String> {
    let words_per_minute = (BASE_WORDS_PER_MINUTE * utterance.rate).round().clamp(80.0, 450.0) as u32;
    let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
    let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0) as u32;

    let mut args = vec![
        "-s".to_string(),
        words_per_minute.to_string(),
        "-p".to_string(),
        pitch.to_string(),
        "-a".to_string(),
        amplitude.to_string(),
    ];
    if let Some(voice) = &utterance.voice {
        args.push("-v".to_string());
        args.push(voice.lang.clone());
    }
    args.push("--".to_string());
    args.push(utterance.text.clone());
    args
}
