// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Media container detection.
//!
//! Local transforms that keep the container (compress, rotate, watermark)
//! name their output after the input container, so the container has to be
//! known without decoding anything. Magic bytes win over the file name; the
//! file extension is only consulted when the header is not recognised.

use serde::{Deserialize, Serialize};

/// MIME type used when nothing better is known.
pub const OCTET_STREAM: &str = "application/octet-stream";

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Mov,
    Mkv,
    Webm,
    Avi,
    Flv,
}

impl Container {
    /// Containers accepted as a `convert` target.
    pub const CONVERT_TARGETS: [Container; 5] = [
        Container::Mp4,
        Container::Avi,
        Container::Mkv,
        Container::Mov,
        Container::Webm,
    ];

    pub fn extension(&self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mov => "mov",
            Container::Mkv => "mkv",
            Container::Webm => "webm",
            Container::Avi => "avi",
            Container::Flv => "flv",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            Container::Mp4 => "video/mp4",
            Container::Mov => "video/quicktime",
            Container::Mkv => "video/x-matroska",
            Container::Webm => "video/webm",
            Container::Avi => "video/x-msvideo",
            Container::Flv => "video/x-flv",
        }
    }

    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "mp4" | "m4v" => Some(Container::Mp4),
            "mov" => Some(Container::Mov),
            "mkv" => Some(Container::Mkv),
            "webm" => Some(Container::Webm),
            "avi" => Some(Container::Avi),
            "flv" => Some(Container::Flv),
            _ => None,
        }
    }

    /// Detect the container of `source`, falling back to the extension of
    /// `name` and finally to MP4.
    pub fn sniff(source: &[u8], name: Option<&str>) -> Self {
        Self::from_magic(source)
            .or_else(|| name.and_then(extension_of).and_then(Self::from_extension))
            .unwrap_or(Container::Mp4)
    }

    fn from_magic(source: &[u8]) -> Option<Self> {
        if source.len() >= 12 && &source[4..8] == b"ftyp" {
            // QuickTime files carry the "qt  " major brand; everything else
            // in the ISO base media family is treated as MP4.
            return Some(if &source[8..12] == b"qt  " {
                Container::Mov
            } else {
                Container::Mp4
            });
        }

        if source.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            let header = &source[..source.len().min(64)];
            let is_webm = header.windows(4).any(|window| window == b"webm");
            return Some(if is_webm { Container::Webm } else { Container::Mkv });
        }

        if source.len() >= 12 && source.starts_with(b"RIFF") && &source[8..12] == b"AVI " {
            return Some(Container::Avi);
        }

        if source.starts_with(b"FLV") {
            return Some(Container::Flv);
        }

        None
    }
}

fn extension_of(name: &str) -> Option<&str> {
    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.contains('/') {
        return None;
    }
    Some(extension)
}

/// Best-effort MIME type for an artifact name, used for remote results
/// that only come back as a file name.
pub fn media_type_for_filename(name: &str) -> &'static str {
    match extension_of(name) {
        Some(extension) if extension.eq_ignore_ascii_case("gif") => "image/gif",
        Some(extension) => Container::from_extension(extension)
            .map(|container| container.media_type())
            .unwrap_or(OCTET_STREAM),
        None => OCTET_STREAM,
    }
}
