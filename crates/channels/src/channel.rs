use parley_core::message::{ImageCard, Message};
use thiserror::Error;

use crate::{lex::LexChannel, sms::SmsChannel};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("channel `{channel}` has no formatter for message type `{content_type}`")]
    UnsupportedMessageType { channel: &'static str, content_type: &'static str },
}

/// Choices surfaced to the user while formatting (card buttons). Formatting
/// functions report them here; the assembler serializes the list into the
/// reserved `options_provided` session attribute.
#[derive(Debug, Default)]
pub struct OptionsSink {
    offered: Vec<String>,
}

impl OptionsSink {
    pub fn offer(&mut self, choice: impl Into<String>) {
        self.offered.push(choice.into());
    }

    pub fn is_empty(&self) -> bool {
        self.offered.is_empty()
    }

    pub fn drain(&mut self) -> Vec<String> {
        std::mem::take(&mut self.offered)
    }
}

/// One rendering contract per channel. Dispatch is by message variant: each
/// variant has exactly one formatting method, and a channel overrides only
/// the variants it treats specially. Exactly one output message per input
/// message.
pub trait Channel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this is the default conversational channel. The assembler's
    /// single-image-card rewrite applies only here.
    fn is_default_conversational(&self) -> bool {
        false
    }

    fn format_message(
        &self,
        message: Message,
        options: &mut OptionsSink,
    ) -> Result<Message, FormatError> {
        match message {
            Message::PlainText { content } => self.format_plain_text(content),
            Message::Ssml { content } => self.format_ssml(content),
            Message::ImageCard { card } => {
                for button in &card.buttons {
                    options.offer(button.text.clone());
                }
                self.format_image_card(card)
            }
            Message::CustomPayload { content } => self.format_custom_payload(content),
        }
    }

    fn format_plain_text(&self, content: String) -> Result<Message, FormatError> {
        Ok(Message::PlainText { content })
    }

    fn format_ssml(&self, content: String) -> Result<Message, FormatError> {
        Ok(Message::Ssml { content })
    }

    fn format_image_card(&self, card: ImageCard) -> Result<Message, FormatError> {
        Ok(Message::ImageCard { card })
    }

    /// A payload whose content is an object bearing a `text` or `message`
    /// key unwraps to plain text; anything else is re-wrapped with the
    /// content stringified.
    fn format_custom_payload(&self, content: serde_json::Value) -> Result<Message, FormatError> {
        if let Some(object) = content.as_object() {
            for key in ["text", "message"] {
                if let Some(value) = object.get(key) {
                    let text = match value.as_str() {
                        Some(text) => text.to_owned(),
                        None => value.to_string(),
                    };
                    return Ok(Message::plain(text));
                }
            }
        }
        let stringified = match content {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(Message::custom(serde_json::Value::String(stringified)))
    }
}

/// Render a rich card as plain text for surfaces without card support:
/// title, subtitle, `Image: <url>`, then the buttons as `[<text> -> <value>]`.
pub fn degraded_card_text(card: &ImageCard, separator: &str) -> String {
    let mut parts = vec![card.title.clone()];
    if let Some(subtitle) = &card.subtitle {
        parts.push(subtitle.clone());
    }
    if let Some(url) = &card.image_url {
        parts.push(format!("Image: {url}"));
    }
    if !card.buttons.is_empty() {
        let buttons = card
            .buttons
            .iter()
            .map(|button| format!("[{} -> {}]", button.text, button.value))
            .collect::<Vec<_>>()
            .join(" ");
        parts.push(format!("Buttons: {buttons}"));
    }
    parts.join(separator)
}

static LEX: LexChannel = LexChannel;
static SMS: SmsChannel = SmsChannel;

/// Select a channel by name, case-insensitive. Unknown names fall back to
/// the default conversational channel.
pub fn select(name: &str) -> &'static dyn Channel {
    match name.to_ascii_lowercase().as_str() {
        "sms" => &SMS,
        _ => &LEX,
    }
}

#[cfg(test)]
mod tests {
    use parley_core::message::ImageCard;

    use super::{degraded_card_text, select};

    #[test]
    fn selection_is_case_insensitive_and_defaults_to_lex() {
        assert_eq!(select("SMS").name(), "sms");
        assert_eq!(select("lex").name(), "lex");
        assert_eq!(select("carrier-pigeon").name(), "lex");
    }

    #[test]
    fn degraded_card_lists_every_present_field() {
        let card = ImageCard::new("Choose a size")
            .subtitle("Pick one")
            .image_url("https://example.com/pizza.png")
            .button("Small", "s")
            .button("Large", "l");
        assert_eq!(
            degraded_card_text(&card, "\n"),
            "Choose a size\nPick one\nImage: https://example.com/pizza.png\nButtons: [Small -> s] [Large -> l]"
        );
    }

    #[test]
    fn degraded_card_skips_absent_fields() {
        let card = ImageCard::new("Title only");
        assert_eq!(degraded_card_text(&card, " | "), "Title only");
    }
}
