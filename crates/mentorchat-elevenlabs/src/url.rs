//! URL construction for the `ElevenLabs` API.

use url::Url;

use crate::error::ElevenLabsResult;

/// `{base}/v1/text-to-speech/{voice_id}?output_format={format}`.
///
/// The voice id is pushed as a path segment so it is percent-encoded.
pub fn build_tts_url(base_url: &str, voice_id: &str, output_format: &str) -> ElevenLabsResult<Url> {
    let mut url = Url::parse(base_url)?;
    url.path_segments_mut()
        .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
        .pop_if_empty()
        .extend(["v1", "text-to-speech", voice_id]);
    url.query_pairs_mut()
        .append_pair("output_format", output_format);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_tts_url() {
        let url = build_tts_url("https://api.elevenlabs.io", "abc123", "mp3_44100_128").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/abc123?output_format=mp3_44100_128"
        );
    }

    #[test]
    fn test_trailing_slash_and_prefix_path() {
        let url = build_tts_url("http://localhost:8080/proxy/", "v", "mp3_22050_32").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/proxy/v1/text-to-speech/v?output_format=mp3_22050_32"
        );
    }

    #[test]
    fn test_voice_id_is_escaped() {
        let url = build_tts_url("https://api.elevenlabs.io", "a/b c", "mp3_44100_128").unwrap();
        assert!(url.path().ends_with("/a%2Fb%20c"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(build_tts_url("not a url", "v", "mp3").is_err());
    }
}
