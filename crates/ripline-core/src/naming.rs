//! Filesystem-safe names and staging directory layout.

use std::path::{Path, PathBuf};

use crate::model::{MediaType, Stage};

/// Filesystem-safe form of a display name.
///
/// - Spaces and tabs become `_`
/// - `/`, `\`, NUL, and control characters become `_`
/// - Runs of `_` collapse; leading/trailing `_`, `.` and spaces are trimmed
pub fn safe_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for c in name.chars() {
        let c = if c == ' ' || c == '\t' || c == '/' || c == '\\' || c.is_control() {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out.trim_matches(|c| c == '_' || c == '.' || c == ' ')
        .to_string()
}

/// Staging subdirectory for a stage's output.
pub fn stage_dir(stage: Stage) -> &'static str {
    match stage {
        Stage::Rip => "1-ripped",
        Stage::Remux => "2-remuxed",
        Stage::Transcode => "3-transcoded",
        Stage::Organize => "4-ready",
        Stage::Publish => "5-published",
    }
}

/// `<media_base>/staging/<stage>/<movies|tv>/<safe_name>`, plus
/// `S<season>/Disc<disc>` for TV rips.
pub fn staging_path(
    media_base: &Path,
    stage: Stage,
    media_type: MediaType,
    safe_name: &str,
    season: Option<u32>,
    disc: Option<u32>,
) -> PathBuf {
    let mut path = media_base
        .join("staging")
        .join(stage_dir(stage))
        .join(media_type.staging_dir())
        .join(safe_name);
    if media_type == MediaType::Tv {
        if let Some(season) = season {
            path.push(format!("S{:02}", season));
        }
        if let Some(disc) = disc {
            path.push(format!("Disc{}", disc));
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(safe_name("Big Buck Bunny"), "Big_Buck_Bunny");
        assert_eq!(safe_name("The Simpsons"), "The_Simpsons");
    }

    #[test]
    fn strips_separators_and_collapses() {
        assert_eq!(safe_name("  AC/DC  Live \\ 1991 "), "AC_DC_Live_1991");
        assert_eq!(safe_name("..hidden.."), "hidden");
    }

    #[test]
    fn staging_layout() {
        let base = Path::new("/mnt/media");
        assert_eq!(
            staging_path(base, Stage::Rip, MediaType::Movie, "Big_Buck_Bunny", None, None),
            PathBuf::from("/mnt/media/staging/1-ripped/movies/Big_Buck_Bunny")
        );
        assert_eq!(
            staging_path(base, Stage::Remux, MediaType::Tv, "The_Simpsons", Some(1), Some(2)),
            PathBuf::from("/mnt/media/staging/2-remuxed/tv/The_Simpsons/S01/Disc2")
        );
        // Season/disc are ignored for movies.
        assert_eq!(
            staging_path(base, Stage::Rip, MediaType::Movie, "X", Some(1), Some(1)),
            PathBuf::from("/mnt/media/staging/1-ripped/movies/X")
        );
    }
}
