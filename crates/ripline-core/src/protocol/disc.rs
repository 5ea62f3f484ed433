//! Incremental disc model built from decoded records.

use std::time::Duration;

use super::decode::decode_line;
use super::record::{attr, parse_saving_title, MessageKind, Record};
use super::value::{parse_duration, parse_size};
use crate::progress::{percent_of, ProgressTracker};

/// One stream of a title (`SINFO`). Only the type attribute is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: String,
}

/// Per-title attributes gathered from `TINFO` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleInfo {
    pub index: usize,
    pub name: String,
    pub duration: Duration,
    pub size: u64,
    pub filename: String,
    pub streams: Vec<StreamInfo>,
}

/// Highest title index accepted from a producer. Records beyond it are
/// dropped rather than growing the arena.
pub const MAX_TITLES: usize = 1024;

/// Disc-level view. Transient; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscInfo {
    pub name: String,
    pub id: String,
    pub title_count: u32,
    pub titles: Vec<TitleInfo>,
}

impl DiscInfo {
    /// Returns the slot for `index`, growing the title list so every index up
    /// to it exists. Titles may be announced out of order. `None` when
    /// `index` is at or past [`MAX_TITLES`].
    pub fn ensure_title(&mut self, index: usize) -> Option<&mut TitleInfo> {
        if index >= MAX_TITLES {
            return None;
        }
        while self.titles.len() <= index {
            let next = self.titles.len();
            self.titles.push(TitleInfo {
                index: next,
                ..TitleInfo::default()
            });
        }
        self.titles.get_mut(index)
    }

    /// Longest title by duration, ties broken by size.
    pub fn main_title(&self) -> Option<&TitleInfo> {
        self.titles
            .iter()
            .max_by(|a, b| a.duration.cmp(&b.duration).then(a.size.cmp(&b.size)))
    }

    pub fn total_size(&self) -> u64 {
        self.titles.iter().map(|t| t.size).sum()
    }
}

/// Stateful line consumer: decodes each line and folds it into a [`DiscInfo`],
/// message log, and progress tracker.
///
/// Feeding the same lines into a fresh parser always yields the same state.
#[derive(Debug, Default, Clone)]
pub struct DiscParser {
    disc: DiscInfo,
    messages: Vec<(MessageKind, String)>,
    last_progress: Option<u8>,
    tracker: ProgressTracker,
}

impl DiscParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one line. Returns the overall percentage if this line
    /// advanced it.
    pub fn feed_line(&mut self, line: &str) -> Option<u8> {
        decode_line(line).and_then(|record| self.apply(&record))
    }

    /// Convenience for whole transcripts.
    pub fn feed_str(&mut self, transcript: &str) {
        for line in transcript.lines() {
            self.feed_line(line);
        }
    }

    /// Applies an already decoded record.
    pub fn apply(&mut self, record: &Record) -> Option<u8> {
        match record {
            Record::TitleCount(n) => self.disc.title_count = *n,
            Record::DiscAttr { attr, value, .. } => match *attr {
                attr::NAME => self.disc.name = value.clone(),
                attr::VOLUME_ID => self.disc.id = value.clone(),
                _ => {}
            },
            Record::TitleAttr {
                title, attr, value, ..
            } => {
                let Some(slot) = self.disc.ensure_title(*title) else {
                    return None;
                };
                match *attr {
                    attr::NAME => slot.name = value.clone(),
                    attr::DURATION => slot.duration = parse_duration(value),
                    attr::SIZE => slot.size = parse_size(value),
                    attr::FILENAME => slot.filename = value.clone(),
                    _ => {}
                }
            }
            Record::StreamAttr {
                title,
                stream,
                attr,
                value,
                ..
            } => {
                if *attr == attr::TYPE {
                    let Some(slot) = self.disc.ensure_title(*title) else {
                        return None;
                    };
                    match slot.streams.iter_mut().find(|s| s.index == *stream) {
                        Some(existing) => existing.kind = value.clone(),
                        None => slot.streams.push(StreamInfo {
                            index: *stream,
                            kind: value.clone(),
                        }),
                    }
                }
            }
            Record::Progress { current, max, .. } => {
                if *max > 0 {
                    self.last_progress = Some(percent_of(*current, *max));
                }
                return self.tracker.observe(*current, *max);
            }
            Record::ProgressTitle { name, .. } => {
                if let Some((i, n)) = parse_saving_title(name) {
                    self.tracker.set_title(i, n);
                }
            }
            Record::Message { code, message, .. } => {
                let kind = MessageKind::classify(*code, message);
                if kind == MessageKind::SavingTitle {
                    if let Some((i, n)) = parse_saving_title(message) {
                        self.tracker.set_title(i, n);
                    }
                }
                self.messages.push((kind, message.clone()));
            }
            Record::Drive { .. } | Record::ProgressItem { .. } => {}
        }
        None
    }

    pub fn disc(&self) -> &DiscInfo {
        &self.disc
    }

    pub fn into_disc(self) -> DiscInfo {
        self.disc
    }

    /// All `MSG` records in arrival order.
    pub fn messages(&self) -> &[(MessageKind, String)] {
        &self.messages
    }

    pub fn completion_count(&self) -> usize {
        self.count(MessageKind::CopyComplete)
    }

    pub fn is_complete(&self) -> bool {
        self.completion_count() > 0
    }

    /// Failure notices (copy failed, read error) in arrival order.
    pub fn failures(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(k, _)| k.is_failure())
            .map(|(_, m)| m.as_str())
            .collect()
    }

    /// Raw percentage of the last `PRGV` record, if any arrived.
    pub fn last_progress(&self) -> Option<u8> {
        self.last_progress
    }

    /// Overall monotonic percentage across titles.
    pub fn overall_progress(&self) -> u8 {
        self.tracker.percent()
    }

    fn count(&self, kind: MessageKind) -> usize {
        self.messages.iter().filter(|(k, _)| *k == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_disc_from_lines() {
        let mut p = DiscParser::new();
        p.feed_str(
            "CINFO:2,0,\"Big Buck Bunny\"\n\
             CINFO:32,0,\"BIGBUCKBUNNY\"\n\
             TCOUT:2\n\
             TINFO:0,2,0,\"Big Buck Bunny\"\n\
             TINFO:0,9,0,\"0:09:56\"\n\
             TINFO:0,10,0,\"1.5 GB\"\n\
             TINFO:0,27,0,\"title_t00.mkv\"\n\
             TINFO:1,2,0,\"Trailer\"\n",
        );
        let disc = p.disc();
        assert_eq!(disc.name, "Big Buck Bunny");
        assert_eq!(disc.id, "BIGBUCKBUNNY");
        assert_eq!(disc.title_count, 2);
        assert_eq!(disc.titles.len(), 2);
        assert_eq!(disc.titles[0].duration, Duration::from_secs(596));
        assert_eq!(disc.titles[0].size, 1_610_612_736);
        assert_eq!(disc.titles[0].filename, "title_t00.mkv");
        assert_eq!(disc.titles[1].name, "Trailer");
    }

    #[test]
    fn out_of_order_titles_grow_the_arena() {
        let mut p = DiscParser::new();
        p.feed_line("TINFO:3,2,0,\"Fourth\"");
        p.feed_line("TINFO:1,2,0,\"Second\"");
        let disc = p.disc();
        assert_eq!(disc.titles.len(), 4);
        assert_eq!(disc.titles[0].name, "");
        assert_eq!(disc.titles[1].name, "Second");
        assert_eq!(disc.titles[2].index, 2);
        assert_eq!(disc.titles[3].name, "Fourth");
    }

    #[test]
    fn malformed_values_reset_to_zero() {
        let mut p = DiscParser::new();
        p.feed_line("TINFO:0,9,0,\"1:00:00\"");
        p.feed_line("TINFO:0,9,0,\"garbage\"");
        p.feed_line("TINFO:0,10,0,\"big\"");
        assert_eq!(p.disc().titles[0].duration, Duration::ZERO);
        assert_eq!(p.disc().titles[0].size, 0);
    }

    #[test]
    fn tracks_messages_and_progress() {
        let mut p = DiscParser::new();
        assert_eq!(p.feed_line("PRGV:0,0,65536"), Some(0));
        assert_eq!(p.feed_line("PRGV:29491,0,65536"), Some(45));
        p.feed_line("MSG:5055,0,0,\"Copy failed\",\"Copy failed\"");
        p.feed_line("MSG:2011,0,0,\"Read error at 45%\",\"Read error at 45%\"");
        assert!(!p.is_complete());
        assert_eq!(p.failures(), vec!["Copy failed", "Read error at 45%"]);
        assert_eq!(p.last_progress(), Some(45));
    }

    #[test]
    fn stream_types_are_recorded() {
        let mut p = DiscParser::new();
        p.feed_line("SINFO:0,0,1,6201,\"Video\"");
        p.feed_line("SINFO:0,1,1,6202,\"Audio\"");
        p.feed_line("SINFO:0,1,1,6202,\"Audio\"");
        let streams = &p.disc().titles[0].streams;
        assert_eq!(streams.len(), 2);
        assert_eq!(streams[1].kind, "Audio");
    }

    #[test]
    fn main_title_is_longest() {
        let mut disc = DiscInfo::default();
        disc.ensure_title(0).unwrap().duration = Duration::from_secs(60);
        disc.ensure_title(1).unwrap().duration = Duration::from_secs(600);
        disc.ensure_title(2).unwrap().duration = Duration::from_secs(30);
        assert_eq!(disc.main_title().map(|t| t.index), Some(1));
    }

    #[test]
    fn huge_title_index_is_dropped() {
        let mut p = DiscParser::new();
        p.feed_line("TINFO:4000000000,2,0,\"x\"");
        p.feed_line("SINFO:4000000000,0,1,6201,\"Video\"");
        p.feed_line("TINFO:1024,2,0,\"Just past the cap\"");
        assert!(p.disc().titles.is_empty());
        p.feed_line("TINFO:1023,2,0,\"Last slot\"");
        assert_eq!(p.disc().titles.len(), MAX_TITLES);
        assert_eq!(p.disc().titles[1023].name, "Last slot");
    }
}
