//! Scene script types.
//!
//! A scene script is an ordered list of narrated beats plus the rendering
//! parameters the engine needs (image style/quality, voice table, optional
//! caption styling). Field names follow the wire format used by the
//! submission webhook and the record store.

use serde::{Deserialize, Serialize};

/// Image description used for the trailing credit beat on every render.
pub const CREDIT_IMAGE_DESCRIPTION: &str =
    "StoryReel branding card: logo centered on a dark gradient background";

/// One narrated unit of the script: who speaks, what they say, and what
/// should be on screen while they say it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beat {
    pub speaker: String,
    pub text: String,
    pub image_description: String,
}

/// Maps a speaker name to an engine voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceAssignment {
    pub name: String,
    pub voice_id: String,
}

/// Caption/subtitle styling. When present, the engine burns captions into
/// the output and may suffix the output filename with the language tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// The full scene script submitted for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneScript {
    pub beats: Vec<Beat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_quality: Option<String>,

    /// Declared voice table, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub voices: Vec<VoiceAssignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<CaptionStyle>,
}

impl SceneScript {
    /// Create a script from beats alone, with no rendering parameters.
    pub fn from_beats(beats: Vec<Beat>) -> Self {
        Self {
            beats,
            image_style: None,
            image_quality: None,
            voices: Vec::new(),
            caption: None,
        }
    }

    /// Whether caption burn-in was requested.
    pub fn wants_captions(&self) -> bool {
        self.caption.is_some()
    }

    /// Language tag for caption burn-in, if captions were requested.
    pub fn caption_language(&self) -> Option<&str> {
        self.caption.as_ref().map(|c| c.language.as_str())
    }

    /// Speaker attributed to the credit beat: the first declared voice,
    /// falling back to the first beat's speaker.
    pub fn credit_speaker(&self) -> Option<&str> {
        self.voices
            .first()
            .map(|v| v.name.as_str())
            .or_else(|| self.beats.first().map(|b| b.speaker.as_str()))
    }

    /// Append the fixed trailing credit beat: a branding image shown with
    /// no dialogue. Applied to every script before serialization, not
    /// configurable.
    pub fn with_credit_beat(mut self) -> Self {
        let speaker = self.credit_speaker().unwrap_or_default().to_string();
        self.beats.push(Beat {
            speaker,
            text: String::new(),
            image_description: CREDIT_IMAGE_DESCRIPTION.to_string(),
        });
        self
    }
}
