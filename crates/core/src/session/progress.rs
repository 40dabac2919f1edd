/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionProgress {
    pub total: u32,
    pub answered: u32,
    pub remaining: u32,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn new(total: u32, answered: u32, is_complete: bool) -> Self {
        Self {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete,
        }
    }

    /// One-based number of the question on screen, capped at `total`.
    #[must_use]
    pub fn position(&self) -> u32 {
        (self.answered + 1).min(self.total)
    }

    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.position()) * 100 / u64::from(self.total);
        u8::try_from(pct).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_tracks_question_on_screen() {
        let progress = SessionProgress::new(3, 0, false);
        assert_eq!(progress.position(), 1);
        assert_eq!(progress.percent(), 33);
        assert_eq!(progress.remaining, 3);

        let done = SessionProgress::new(3, 3, true);
        assert_eq!(done.position(), 3);
        assert_eq!(done.percent(), 100);
    }

    #[test]
    fn empty_session_reports_zero_percent() {
        assert_eq!(SessionProgress::default().percent(), 0);
    }
}
