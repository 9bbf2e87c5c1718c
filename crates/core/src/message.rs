use serde::{Deserialize, Serialize};

/// One unit of turn output, produced by intent logic and consumed by the
/// channel formatting stage. Serialization follows the host wire schema:
/// the `contentType` tag selects the variant, and the card body nests under
/// `imageResponseCard`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contentType")]
pub enum Message {
    PlainText {
        content: String,
    },
    #[serde(rename = "SSML")]
    Ssml {
        content: String,
    },
    #[serde(rename = "ImageResponseCard")]
    ImageCard {
        #[serde(rename = "imageResponseCard")]
        card: ImageCard,
    },
    CustomPayload {
        content: serde_json::Value,
    },
}

impl Message {
    pub fn plain(content: impl Into<String>) -> Self {
        Self::PlainText { content: content.into() }
    }

    pub fn ssml(content: impl Into<String>) -> Self {
        Self::Ssml { content: content.into() }
    }

    pub fn card(card: ImageCard) -> Self {
        Self::ImageCard { card }
    }

    pub fn custom(content: serde_json::Value) -> Self {
        Self::CustomPayload { content }
    }

    /// Wire name of the variant, as it appears in the `contentType` tag.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::PlainText { .. } => "PlainText",
            Self::Ssml { .. } => "SSML",
            Self::ImageCard { .. } => "ImageResponseCard",
            Self::CustomPayload { .. } => "CustomPayload",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageCard {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,
}

impl ImageCard {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), subtitle: None, image_url: None, buttons: Vec::new() }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn button(mut self, text: impl Into<String>, value: impl Into<String>) -> Self {
        self.buttons.push(Button { text: text.into(), value: value.into() });
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub value: String,
}
