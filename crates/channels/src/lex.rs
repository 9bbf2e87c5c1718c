use crate::channel::Channel;

/// The default conversational surface. Every variant passes through
/// unchanged; rich cards are carried natively, so no degradation applies.
/// The single-card quirk of this surface is handled at the assembler level,
/// not per message.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexChannel;

impl Channel for LexChannel {
    fn name(&self) -> &'static str {
        "lex"
    }

    fn is_default_conversational(&self) -> bool {
        true
    }
}
