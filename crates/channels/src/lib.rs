//! Parley Channels - per-channel rendering and the response assembler
//!
//! Converts the channel-agnostic message model into the bit-exact structure
//! a target surface expects:
//! - **Channel trait** (`channel`) - one formatting method per message
//!   variant, exhaustively matched, with channel-specific overrides
//! - **Lex channel** (`lex`) - the default conversational surface; rich
//!   cards pass through unchanged
//! - **SMS channel** (`sms`) - text-only surface; rich cards degrade to
//!   plain text, SSML is refused
//! - **Assembler** (`assembler`) - turn-level envelope: single-card rewrite,
//!   offered-option serialization, session-attribute stringification
//!
//! Channels are stateless and safely reusable; selection happens once per
//! invocation by name via `select`.

pub mod assembler;
pub mod channel;
pub mod lex;
pub mod sms;

pub use assembler::{assemble, WireIntent, WireResponse, WireSessionState};
pub use channel::{select, Channel, FormatError, OptionsSink};
pub use lex::LexChannel;
pub use sms::SmsChannel;
