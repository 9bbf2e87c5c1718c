use parley_core::message::{ImageCard, Message};

use crate::channel::{degraded_card_text, Channel, FormatError};

/// Separator used when a rich card is flattened into a single SMS body.
const SMS_SEPARATOR: &str = " | ";

/// Text-only surface. Rich cards degrade to plain text; speech markup has
/// no carrier here and is refused.
#[derive(Clone, Copy, Debug, Default)]
pub struct SmsChannel;

impl Channel for SmsChannel {
    fn name(&self) -> &'static str {
        "sms"
    }

    fn format_ssml(&self, _content: String) -> Result<Message, FormatError> {
        Err(FormatError::UnsupportedMessageType { channel: self.name(), content_type: "SSML" })
    }

    fn format_image_card(&self, card: ImageCard) -> Result<Message, FormatError> {
        Ok(Message::plain(degraded_card_text(&card, SMS_SEPARATOR)))
    }
}

#[cfg(test)]
mod tests {
    use parley_core::message::{ImageCard, Message};

    use crate::channel::{Channel, FormatError, OptionsSink};

    use super::SmsChannel;

    #[test]
    fn image_card_degrades_to_single_line_text() {
        let card = ImageCard::new("Order ready")
            .subtitle("Pickup counter 3")
            .button("Directions", "directions");
        let mut options = OptionsSink::default();
        let formatted = SmsChannel.format_message(Message::card(card), &mut options).unwrap();
        assert_eq!(
            formatted,
            Message::plain("Order ready | Pickup counter 3 | Buttons: [Directions -> directions]")
        );
        // Choices are still reported even though the card was flattened.
        assert_eq!(options.drain(), vec!["Directions".to_owned()]);
    }

    #[test]
    fn ssml_is_unsupported() {
        let mut options = OptionsSink::default();
        let result = SmsChannel.format_message(Message::ssml("<speak>hi</speak>"), &mut options);
        assert_eq!(
            result,
            Err(FormatError::UnsupportedMessageType { channel: "sms", content_type: "SSML" })
        );
    }

    #[test]
    fn plain_text_is_untouched() {
        let mut options = OptionsSink::default();
        let formatted =
            SmsChannel.format_message(Message::plain("short and sweet"), &mut options).unwrap();
        assert_eq!(formatted, Message::plain("short and sweet"));
    }
}
