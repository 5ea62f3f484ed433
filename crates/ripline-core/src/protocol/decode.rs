//! Line decoder: `TAG:fields` to [`Record`].

use std::str::FromStr;

use super::fields::split_fields;
use super::record::Record;

/// Decodes one protocol line. Returns `None` for blank lines, unknown tags,
/// and lines whose structural fields (indices, attribute ids, counters) are
/// missing or non-numeric.
pub fn decode_line(line: &str) -> Option<Record> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (tag, payload) = line.split_once(':')?;
    let f = split_fields(payload);

    match tag {
        "TCOUT" => Some(Record::TitleCount(num(&f, 0)?)),
        "CINFO" => {
            let value = text(&f, 2)?;
            Some(Record::DiscAttr {
                attr: num(&f, 0)?,
                code: num(&f, 1).unwrap_or(0),
                value,
            })
        }
        "TINFO" => {
            let value = text(&f, 3)?;
            Some(Record::TitleAttr {
                title: num(&f, 0)?,
                attr: num(&f, 1)?,
                code: num(&f, 2).unwrap_or(0),
                value,
            })
        }
        "SINFO" => {
            let value = text(&f, 4)?;
            Some(Record::StreamAttr {
                title: num(&f, 0)?,
                stream: num(&f, 1)?,
                attr: num(&f, 2)?,
                code: num(&f, 3).unwrap_or(0),
                value,
            })
        }
        "PRGV" => {
            if f.len() != 3 {
                return None;
            }
            Some(Record::Progress {
                current: num(&f, 0)?,
                total: num(&f, 1)?,
                max: num(&f, 2)?,
            })
        }
        "PRGT" | "PRGC" => {
            let code = num(&f, 0)?;
            let id = num(&f, 1).unwrap_or(0);
            let name = text(&f, 2)?;
            if tag == "PRGT" {
                Some(Record::ProgressTitle { code, id, name })
            } else {
                Some(Record::ProgressItem { code, id, name })
            }
        }
        "MSG" => {
            let message = text(&f, 3)?;
            Some(Record::Message {
                code: num(&f, 0)?,
                flags: num(&f, 1).unwrap_or(0),
                count: num(&f, 2).unwrap_or(0),
                format: text(&f, 4).unwrap_or_else(|| message.clone()),
                message,
            })
        }
        "DRV" => Some(Record::Drive {
            index: num(&f, 0)?,
            visible: num(&f, 1).unwrap_or(0),
            enabled: num(&f, 2).unwrap_or(0),
            flags: num(&f, 3).unwrap_or(0),
            device: text(&f, 4).unwrap_or_default(),
            disc_name: text(&f, 5).unwrap_or_default(),
        }),
        _ => None,
    }
}

fn num<T: FromStr>(fields: &[String], i: usize) -> Option<T> {
    fields.get(i)?.trim().parse().ok()
}

fn text(fields: &[String], i: usize) -> Option<String> {
    fields.get(i).cloned()
}
