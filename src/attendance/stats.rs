use crate::models::{AttendanceRecord, AttendanceStatus};

/// Counters shown above the attendance list, recomputed on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    /// Rounded percentage, 0 for an empty roster.
    pub presence_rate: u32,
}

impl AttendanceStats {
    pub fn compute<'a>(
        total: usize,
        records: impl IntoIterator<Item = &'a AttendanceRecord>,
    ) -> Self {
        let mut present = 0;
        let mut absent = 0;
        for record in records {
            match record.status {
                Some(AttendanceStatus::Present) => present += 1,
                Some(AttendanceStatus::Absent) => absent += 1,
                None => {}
            }
        }

        let presence_rate = if total == 0 {
            0
        } else {
            (present as f64 / total as f64 * 100.0).round() as u32
        };

        Self {
            total,
            present,
            absent,
            presence_rate,
        }
    }

    pub fn unmarked(&self) -> usize {
        self.total.saturating_sub(self.present + self.absent)
    }

    pub fn rate_label(&self) -> String {
        format!("{}%", self.presence_rate)
    }
}
