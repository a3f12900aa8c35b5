//! Artifact references.
//!
//! An artifact is either an inline payload (captured or uploaded bytes) or a
//! reference to something hosted elsewhere. On the wire both are plain
//! strings: inline payloads become `data:<mime>;base64,<payload>` URLs.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;

/// Reference to a media or image artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactRef {
    /// Bytes held in memory, tagged with their MIME type.
    Inline { mime: String, data: Vec<u8> },
    /// An external URL.
    Url(String),
}

/// Container produced by a capture, which fixes the artifact's MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    VideoWebm,
    AudioWebm,
    Png,
    Jpeg,
}

impl ContainerKind {
    pub fn mime(self) -> &'static str {
        match self {
            Self::VideoWebm => "video/webm",
            Self::AudioWebm => "audio/webm",
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl ArtifactRef {
    pub fn inline(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Inline {
            mime: mime.into(),
            data,
        }
    }

    pub fn from_container(container: ContainerKind, data: Vec<u8>) -> Self {
        Self::inline(container.mime(), data)
    }

    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    /// MIME type, when known. Remote URLs carry none.
    pub fn mime(&self) -> Option<&str> {
        match self {
            Self::Inline { mime, .. } => Some(mime),
            Self::Url(_) => None,
        }
    }

    /// Empty payloads and blank URLs do not count as media.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Inline { data, .. } => data.is_empty(),
            Self::Url(url) => url.trim().is_empty(),
        }
    }

    /// Payload size for inline artifacts.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Self::Inline { data, .. } => Some(data.len()),
            Self::Url(_) => None,
        }
    }

    /// String form used for storage and transport.
    pub fn to_uri(&self) -> String {
        match self {
            Self::Inline { mime, data } => {
                format!("data:{mime};base64,{}", STANDARD.encode(data))
            }
            Self::Url(url) => url.clone(),
        }
    }

    /// Parse the string form produced by [`ArtifactRef::to_uri`].
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let Some(rest) = value.strip_prefix("data:") else {
            return Ok(Self::Url(value.to_string()));
        };

        let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing ','"))?;
        let mime = header
            .strip_suffix(";base64")
            .ok_or_else(|| invalid("only base64 data URLs are supported"))?;
        let data = STANDARD
            .decode(payload)
            .map_err(|e| invalid(format!("bad base64 payload: {e}")))?;

        let mime = if mime.is_empty() {
            "application/octet-stream"
        } else {
            mime
        };
        Ok(Self::inline(mime, data))
    }
}

fn invalid(message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidArtifact {
        message: message.into(),
    }
}

impl FromStr for ArtifactRef {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline { mime, data } => write!(f, "<{mime}, {} bytes>", data.len()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

impl Serialize for ArtifactRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for ArtifactRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
