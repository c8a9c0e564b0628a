use crate::playback::LocalVoice;

/// Pick a local voice for fallback speech.
///
/// In order of preference: the first voice whose name contains one of
/// `hints` (case-insensitive), the `voice_index`-th English voice (wrapping),
/// `voices[voice_index]`. `None` leaves the choice to the system default.
#[must_use]
pub fn select_voice<'a>(
    voices: &'a [LocalVoice],
    hints: &[&str],
    voice_index: usize,
) -> Option<&'a LocalVoice> {
    let by_hint = voices.iter().find(|voice| {
        let name = voice.name.to_lowercase();
        hints.iter().any(|hint| name.contains(&hint.to_lowercase()))
    });
    if by_hint.is_some() {
        return by_hint;
    }

    let english: Vec<&LocalVoice> = voices
        .iter()
        .filter(|v| v.lang.to_lowercase().starts_with("en"))
        .collect();
    if !english.is_empty() {
        return Some(english[voice_index % english.len()]);
    }

    voices.get(voice_index)
}
