//! Folder-aware job paths
//!
//! Jenkins addresses a job nested in folders by repeating the `job` marker before every
//! segment: `a/b/c` lives at `/job/a/job/b/job/c`.

use std::borrow::Cow;
use std::fmt;

use url::Url;

use crate::error::{ClientError, Result};
use crate::request::PathParam;

/// Separator placed before every folder segment
pub const SEP: &str = "/job/";

const MARKER: &str = "job";

/// An ordered sequence of folder segments; empty denotes the root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderPath {
    segments: Vec<String>,
}

impl FolderPath {
    /// Resolves a slash-delimited name or an absolute job URL
    pub fn parse(input: &str) -> Self {
        if is_absolute_url(input) {
            if let Ok(url) = Url::parse(input) {
                return Self::from_url(&url);
            }
        }

        Self {
            segments: input
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Collects the contiguous `job/<name>` run starting at the first marker
    pub fn from_url(url: &Url) -> Self {
        let parts: Vec<&str> = url.path().split('/').collect();
        let mut segments = Vec::new();

        if let Some(start) = parts.iter().position(|part| *part == MARKER) {
            let mut pairs = parts[start..].chunks(2);

            while let Some([marker, value]) = pairs.next() {
                if *marker != MARKER || value.is_empty() {
                    break;
                }
                segments.push(decode(value));
            }
        }

        Self { segments }
    }

    /// Rejects the root, which no job-level operation can target
    pub fn required(self) -> Result<Self> {
        if self.is_empty() {
            return Err(ClientError::validation("name required"));
        }
        Ok(self)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, or an empty string for the root
    pub fn name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Path without its last segment; the parent of the root is the root
    pub fn parent(&self) -> Self {
        let len = self.segments.len().saturating_sub(1);
        Self {
            segments: self.segments[..len].to_vec(),
        }
    }

    /// Pre-encoded URL path, empty for the root
    pub fn path(&self) -> PathParam {
        if self.is_empty() {
            return PathParam::Raw(String::new());
        }

        let encoded: Vec<String> = self.segments.iter().map(|s| encode_component(s)).collect();
        PathParam::Raw(format!("{SEP}{}", encoded.join(SEP)))
    }

    /// Pre-encoded path of the parent folder
    pub fn dir(&self) -> PathParam {
        self.parent().path()
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

impl From<&str> for FolderPath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<&String> for FolderPath {
    fn from(value: &String) -> Self {
        Self::parse(value)
    }
}

impl From<String> for FolderPath {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&Url> for FolderPath {
    fn from(value: &Url) -> Self {
        Self::from_url(value)
    }
}

impl From<Vec<String>> for FolderPath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl From<&[&str]> for FolderPath {
    fn from(segments: &[&str]) -> Self {
        Self {
            segments: segments.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl<const N: usize> From<[&str; N]> for FolderPath {
    fn from(segments: [&str; N]) -> Self {
        Self::from(&segments[..])
    }
}

fn is_absolute_url(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| value.to_string())
}

/// Percent-encodes one URL component, leaving `A-Z a-z 0-9 - _ . ! ~ * ' ( )` literal
pub fn encode_component(value: &str) -> String {
    let encoded = urlencoding::encode(value);
    if !encoded.contains('%') {
        return encoded.into_owned();
    }

    encoded
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
}
