//! Decoded robot-protocol records and message classification.

/// Attribute ids carried by `CINFO`, `TINFO` and `SINFO` records.
pub mod attr {
    /// Disc media type (`CINFO`) or stream type (`SINFO`).
    pub const TYPE: u32 = 1;
    /// Disc name (`CINFO`) or title name (`TINFO`).
    pub const NAME: u32 = 2;
    pub const CHAPTER_COUNT: u32 = 8;
    pub const DURATION: u32 = 9;
    pub const SIZE: u32 = 10;
    pub const FILENAME: u32 = 27;
    pub const PANEL_TITLE: u32 = 30;
    /// Volume name, used as the disc id.
    pub const VOLUME_ID: u32 = 32;
}

/// Message and progress codes emitted by makemkvcon. Codes are not stable
/// across producer versions, so classification also looks at the text.
pub mod code {
    pub const STARTUP: u32 = 1005;
    pub const READ_ERROR: u32 = 2011;
    pub const COPY_COMPLETE: u32 = 5010;
    pub const SAVING_TITLES: u32 = 5021;
    pub const SAVING_TITLE: u32 = 5022;
    pub const COPY_FAILED: u32 = 5055;
    pub const DISC_TYPE_BLURAY: u32 = 6209;
    pub const STREAM_VIDEO: u32 = 6201;
    pub const STREAM_AUDIO: u32 = 6202;
}

/// One decoded protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// `DRV:index,visible,enabled,flags,"device","disc"`
    Drive {
        index: u32,
        visible: i32,
        enabled: i32,
        flags: i32,
        device: String,
        disc_name: String,
    },
    /// `CINFO:attr,code,"value"`
    DiscAttr { attr: u32, code: u32, value: String },
    /// `TCOUT:count`
    TitleCount(u32),
    /// `TINFO:title,attr,code,"value"`
    TitleAttr {
        title: usize,
        attr: u32,
        code: u32,
        value: String,
    },
    /// `SINFO:title,stream,attr,code,"value"`
    StreamAttr {
        title: usize,
        stream: usize,
        attr: u32,
        code: u32,
        value: String,
    },
    /// `PRGV:current,total,max`
    Progress { current: u32, total: u32, max: u32 },
    /// `PRGT:code,id,"name"`: name of the operation in progress.
    ProgressTitle { code: u32, id: u32, name: String },
    /// `PRGC:code,id,"name"`: name of the current sub-item.
    ProgressItem { code: u32, id: u32, name: String },
    /// `MSG:code,flags,count,"message","format"`
    Message {
        code: u32,
        flags: u32,
        count: u32,
        message: String,
        format: String,
    },
}

/// What a `MSG` record means to a consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Startup,
    SavingTitles,
    SavingTitle,
    CopyComplete,
    CopyFailed,
    ReadError,
    Other,
}

impl MessageKind {
    /// Classifies by message text first, falling back to the numeric code.
    pub fn classify(code: u32, text: &str) -> Self {
        let lower = text.to_ascii_lowercase();
        if lower.starts_with("copy complete") {
            return MessageKind::CopyComplete;
        }
        if lower.starts_with("copy failed") {
            return MessageKind::CopyFailed;
        }
        if lower.contains("read error") {
            return MessageKind::ReadError;
        }
        if parse_saving_title(text).is_some() {
            return MessageKind::SavingTitle;
        }
        if lower.starts_with("saving ") && lower.ends_with(" titles") {
            return MessageKind::SavingTitles;
        }
        match code {
            code::STARTUP => MessageKind::Startup,
            code::COPY_COMPLETE => MessageKind::CopyComplete,
            code::COPY_FAILED => MessageKind::CopyFailed,
            code::READ_ERROR => MessageKind::ReadError,
            code::SAVING_TITLES => MessageKind::SavingTitles,
            code::SAVING_TITLE => MessageKind::SavingTitle,
            _ => MessageKind::Other,
        }
    }

    /// True for the notices that mark a rip as failed.
    pub fn is_failure(self) -> bool {
        matches!(self, MessageKind::CopyFailed | MessageKind::ReadError)
    }
}

/// Parses `Saving title i of N` into `(i, N)`; `i` is 1-based.
pub fn parse_saving_title(text: &str) -> Option<(u32, u32)> {
    let rest = text.trim().strip_prefix("Saving title ")?;
    let (i, n) = rest.split_once(" of ")?;
    let i: u32 = i.trim().parse().ok()?;
    let n: u32 = n.trim().parse().ok()?;
    (i >= 1 && i <= n).then_some((i, n))
}
