use std::fmt;

use crate::model::{FileStatus, TranscodeFile};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Aggregate result of a job's files after a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodeSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Pending or in_progress; non-zero only after cancellation or a crash.
    pub remaining: usize,
    /// Input bytes of completed files.
    pub input_bytes: u64,
    /// Output bytes of completed files.
    pub output_bytes: u64,
}

impl TranscodeSummary {
    pub fn from_files(files: &[TranscodeFile]) -> Self {
        let mut s = TranscodeSummary {
            total: files.len(),
            ..Default::default()
        };
        for f in files {
            match f.status {
                FileStatus::Completed => {
                    s.completed += 1;
                    s.input_bytes += f.input_size;
                    s.output_bytes += f.output_size;
                }
                FileStatus::Failed => s.failed += 1,
                FileStatus::Skipped => s.skipped += 1,
                FileStatus::Pending | FileStatus::InProgress => s.remaining += 1,
            }
        }
        s
    }

    pub fn saved_bytes(&self) -> i64 {
        self.input_bytes as i64 - self.output_bytes as i64
    }

    /// `output / input` over completed files, 0 when nothing completed.
    pub fn ratio(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        self.output_bytes as f64 / self.input_bytes as f64
    }

    pub fn counts_line(&self) -> String {
        format!(
            "Summary: {} completed, {} failed, {} skipped",
            self.completed, self.failed, self.skipped
        )
    }

    pub fn bytes_line(&self) -> String {
        format!(
            "Total: {:.2} GB -> {:.2} GB (saved {:.2} GB, {:.1}%)",
            self.input_bytes as f64 / GIB,
            self.output_bytes as f64 / GIB,
            self.saved_bytes() as f64 / GIB,
            self.ratio() * 100.0
        )
    }
}

impl fmt::Display for TranscodeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}; {}", self.counts_line(), self.bytes_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(status: FileStatus, input_size: u64, output_size: u64) -> TranscodeFile {
        TranscodeFile {
            id: 0,
            job_id: 1,
            relative_path: String::new(),
            status,
            input_size,
            output_size,
            progress: 0,
            duration_secs: 0.0,
            started_at: None,
            completed_at: None,
            error_message: None,
        }
    }

    #[test]
    fn counts_and_bytes() {
        let files = vec![
            file(FileStatus::Completed, 1000, 400),
            file(FileStatus::Completed, 1000, 600),
            file(FileStatus::Failed, 500, 0),
            file(FileStatus::Skipped, 700, 0),
            file(FileStatus::Pending, 100, 0),
        ];
        let s = TranscodeSummary::from_files(&files);
        assert_eq!((s.total, s.completed, s.failed, s.skipped, s.remaining), (5, 2, 1, 1, 1));
        assert_eq!(s.input_bytes, 2000);
        assert_eq!(s.output_bytes, 1000);
        assert_eq!(s.saved_bytes(), 1000);
        assert!((s.ratio() - 0.5).abs() < 1e-9);
        assert_eq!(s.counts_line(), "Summary: 2 completed, 1 failed, 1 skipped");
    }

    #[test]
    fn empty_summary() {
        let s = TranscodeSummary::from_files(&[]);
        assert_eq!(s.ratio(), 0.0);
        assert_eq!(
            s.to_string(),
            "Summary: 0 completed, 0 failed, 0 skipped; Total: 0.00 GB -> 0.00 GB (saved 0.00 GB, 0.0%)"
        );
    }
}
