//! Producer side of the protocol. Field layout matches makemkvcon's robot mode.

use std::io::{self, Write};
use std::time::Duration;

use super::record::{attr, Record};
use super::value::{format_duration, format_size};

/// Writes robot-protocol lines to any [`Write`] sink.
pub struct RecordWriter<W: Write> {
    w: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(w: W) -> Self {
        Self { w }
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.w.flush()
    }

    /// Writes any decoded record back out in wire form.
    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        match record {
            Record::Drive {
                index,
                visible,
                enabled,
                flags,
                device,
                disc_name,
            } => writeln!(
                self.w,
                "DRV:{},{},{},{},{},{}",
                index,
                visible,
                enabled,
                flags,
                quote(device),
                quote(disc_name)
            ),
            Record::DiscAttr { attr, code, value } => {
                writeln!(self.w, "CINFO:{},{},{}", attr, code, quote(value))
            }
            Record::TitleCount(n) => writeln!(self.w, "TCOUT:{}", n),
            Record::TitleAttr {
                title,
                attr,
                code,
                value,
            } => writeln!(self.w, "TINFO:{},{},{},{}", title, attr, code, quote(value)),
            Record::StreamAttr {
                title,
                stream,
                attr,
                code,
                value,
            } => writeln!(
                self.w,
                "SINFO:{},{},{},{},{}",
                title,
                stream,
                attr,
                code,
                quote(value)
            ),
            Record::Progress { current, total, max } => {
                writeln!(self.w, "PRGV:{},{},{}", current, total, max)
            }
            Record::ProgressTitle { code, id, name } => {
                writeln!(self.w, "PRGT:{},{},{}", code, id, quote(name))
            }
            Record::ProgressItem { code, id, name } => {
                writeln!(self.w, "PRGC:{},{},{}", code, id, quote(name))
            }
            Record::Message {
                code,
                flags,
                count,
                message,
                format,
            } => writeln!(
                self.w,
                "MSG:{},{},{},{},{}",
                code,
                flags,
                count,
                quote(message),
                quote(format)
            ),
        }
    }

    pub fn drive(&mut self, index: u32, device: &str, disc_name: &str) -> io::Result<()> {
        self.write_record(&Record::Drive {
            index,
            visible: 2,
            enabled: 999,
            flags: 1,
            device: device.to_string(),
            disc_name: disc_name.to_string(),
        })
    }

    pub fn disc_attr(&mut self, attr: u32, code: u32, value: &str) -> io::Result<()> {
        self.write_record(&Record::DiscAttr {
            attr,
            code,
            value: value.to_string(),
        })
    }

    pub fn title_count(&mut self, count: u32) -> io::Result<()> {
        self.write_record(&Record::TitleCount(count))
    }

    pub fn title_attr(&mut self, title: usize, attr: u32, value: &str) -> io::Result<()> {
        self.write_record(&Record::TitleAttr {
            title,
            attr,
            code: 0,
            value: value.to_string(),
        })
    }

    /// Writes the standard name/duration/size/filename group for one title.
    pub fn title_group(
        &mut self,
        title: usize,
        name: &str,
        duration: Duration,
        size: u64,
        filename: &str,
    ) -> io::Result<()> {
        self.title_attr(title, attr::NAME, name)?;
        self.title_attr(title, attr::DURATION, &format_duration(duration))?;
        self.title_attr(title, attr::SIZE, &format_size(size))?;
        self.title_attr(title, attr::FILENAME, filename)
    }

    pub fn stream_attr(
        &mut self,
        title: usize,
        stream: usize,
        attr: u32,
        code: u32,
        value: &str,
    ) -> io::Result<()> {
        self.write_record(&Record::StreamAttr {
            title,
            stream,
            attr,
            code,
            value: value.to_string(),
        })
    }

    pub fn progress(&mut self, current: u32, total: u32, max: u32) -> io::Result<()> {
        self.write_record(&Record::Progress { current, total, max })
    }

    pub fn progress_title(&mut self, code: u32, name: &str) -> io::Result<()> {
        self.write_record(&Record::ProgressTitle {
            code,
            id: 0,
            name: name.to_string(),
        })
    }

    pub fn progress_item(&mut self, code: u32, name: &str) -> io::Result<()> {
        self.write_record(&Record::ProgressItem {
            code,
            id: 0,
            name: name.to_string(),
        })
    }

    /// `MSG` with the message doubling as its format string.
    pub fn message(&mut self, code: u32, message: &str) -> io::Result<()> {
        self.write_record(&Record::Message {
            code,
            flags: 0,
            count: 0,
            message: message.to_string(),
            format: message.to_string(),
        })
    }
}

// No escape syntax exists on the wire, so embedded quotes are downgraded.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_line;

    fn render(f: impl FnOnce(&mut RecordWriter<Vec<u8>>) -> io::Result<()>) -> String {
        let mut w = RecordWriter::new(Vec::new());
        f(&mut w).unwrap();
        String::from_utf8(w.into_inner()).unwrap()
    }

    #[test]
    fn wire_format_of_each_helper() {
        assert_eq!(
            render(|w| w.drive(0, "BD-ROM Mock Drive", "Disc")),
            "DRV:0,2,999,1,\"BD-ROM Mock Drive\",\"Disc\"\n"
        );
        assert_eq!(render(|w| w.disc_attr(32, 0, "ID")), "CINFO:32,0,\"ID\"\n");
        assert_eq!(render(|w| w.title_count(5)), "TCOUT:5\n");
        assert_eq!(render(|w| w.progress(0, 0, 65536)), "PRGV:0,0,65536\n");
        assert_eq!(
            render(|w| w.message(5055, "Copy failed")),
            "MSG:5055,0,0,\"Copy failed\",\"Copy failed\"\n"
        );
        assert_eq!(
            render(|w| w.progress_title(5022, "Saving title 1 of 3")),
            "PRGT:5022,0,\"Saving title 1 of 3\"\n"
        );
    }

    #[test]
    fn title_group_renders_values() {
        let out = render(|w| {
            w.title_group(
                1,
                "Making Of",
                Duration::from_secs(5),
                50 * 1024 * 1024,
                "title_t01.mkv",
            )
        });
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "TINFO:1,2,0,\"Making Of\"",
                "TINFO:1,9,0,\"0:00:05\"",
                "TINFO:1,10,0,\"50.0 MB\"",
                "TINFO:1,27,0,\"title_t01.mkv\"",
            ]
        );
    }

    #[test]
    fn embedded_quotes_stay_decodable() {
        let out = render(|w| w.title_attr(0, attr::NAME, "The \"Best\" Cut"));
        match decode_line(&out) {
            Some(Record::TitleAttr { value, .. }) => assert_eq!(value, "The 'Best' Cut"),
            other => panic!("expected TitleAttr, got {other:?}"),
        }
    }
}
