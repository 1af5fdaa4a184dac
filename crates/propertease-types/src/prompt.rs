//! Prompt types shared by the remote gateways and the on-device session.
//!
//! A [`Prompt`] is an ordered list of parts. Image parts may still be
//! unresolved references (a URL); gateways resolve them into
//! [`InlineImage`]s before anything leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// MIME type declared when an image source does not state one.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Input or output modality of a model session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Image,
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Text => write!(f, "text"),
            Modality::Image => write!(f, "image"),
        }
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Modality::Text),
            "image" => Ok(Modality::Image),
            other => Err(format!("invalid modality: '{other}'")),
        }
    }
}

/// Image bytes tagged with the MIME type declared to the model.
#[derive(Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

// Image payloads can be megabytes; Debug prints the size only.
impl fmt::Debug for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// An image part: either already resolved, or a reference to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    Inline(InlineImage),
    /// An `http(s)://` or `data:` URL.
    Url(String),
}

/// One part of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    Image(ImageInput),
}

impl PromptPart {
    pub fn modality(&self) -> Modality {
        match self {
            PromptPart::Text(_) => Modality::Text,
            PromptPart::Image(_) => Modality::Image,
        }
    }
}

/// An ordered, multimodal prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prompt {
    parts: Vec<PromptPart>,
}

impl Prompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// A prompt with a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(PromptPart::Text(text.into()));
        self
    }

    pub fn with_image(mut self, image: ImageInput) -> Self {
        self.parts.push(PromptPart::Image(image));
        self
    }

    pub fn parts(&self) -> &[PromptPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<PromptPart> {
        self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Whether any image part is still an unresolved URL.
    pub fn has_unresolved_images(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, PromptPart::Image(ImageInput::Url(_))))
    }

    /// Concatenated text of all text parts, separated by newlines.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                PromptPart::Text(t) => Some(t.as_str()),
                PromptPart::Image(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_builder_preserves_order() {
        let prompt = Prompt::text("Describe this image")
            .with_image(ImageInput::Url("https://example.com/a.jpg".to_string()));
        assert_eq!(prompt.parts().len(), 2);
        assert_eq!(prompt.parts()[0].modality(), Modality::Text);
        assert_eq!(prompt.parts()[1].modality(), Modality::Image);
        assert!(prompt.has_unresolved_images());
    }

    #[test]
    fn test_text_content_skips_images() {
        let prompt = Prompt::text("one")
            .with_image(ImageInput::Inline(InlineImage::new("image/png", vec![1, 2])))
            .with_text("two");
        assert_eq!(prompt.text_content(), "one\ntwo");
        assert!(!prompt.has_unresolved_images());
    }

    #[test]
    fn test_inline_image_debug_hides_bytes() {
        let img = InlineImage::new("image/png", vec![0u8; 4096]);
        let debug = format!("{img:?}");
        assert!(debug.contains("4096"));
        assert!(!debug.contains("0, 0"));
    }

    #[test]
    fn test_modality_serde() {
        let json = serde_json::to_string(&Modality::Image).unwrap();
        assert_eq!(json, "\"image\"");
        assert_eq!("TEXT".parse::<Modality>().unwrap(), Modality::Text);
    }
}
