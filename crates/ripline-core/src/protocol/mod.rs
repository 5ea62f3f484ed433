//! MakeMKV robot-mode protocol ("robot protocol").
//!
//! One record per `\n`-terminated ASCII line, `TAG:field,field,...`. Decoding
//! never fails: unknown tags and malformed lines are dropped so newer producers
//! keep working. The encoder is used by the mock generator.

mod decode;
mod disc;
mod encode;
mod fields;
mod record;
mod value;

pub use decode::decode_line;
pub use disc::{DiscInfo, DiscParser, StreamInfo, TitleInfo};
pub use encode::RecordWriter;
pub use fields::{split_fields, unquote};
pub use record::{attr, code, parse_saving_title, MessageKind, Record};
pub use value::{format_duration, format_size, parse_duration, parse_size};

/// Denominator of every `PRGV` record.
pub const PROGRESS_MAX: u32 = 65536;
