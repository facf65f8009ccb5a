pub mod archive_download;
pub mod archive_renormalize;
pub mod clean;
pub mod current_stats;
pub mod status;

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }

    pub fn merge(&mut self, mut other: CommandReport) {
        self.ok &= other.ok;
        self.details.append(&mut other.details);
        self.issues.append(&mut other.issues);
    }

    pub fn summary(&self) -> String {
        if self.ok {
            format!("{} details", self.details.len())
        } else {
            self.issues.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CommandReport;

    #[test]
    fn issue_flips_ok_and_merge_carries_it() {
        let mut outer = CommandReport::new("current-stats");
        outer.detail("downloaded");
        let mut inner = CommandReport::new("county");
        inner.issue("missing column");
        outer.merge(inner);
        assert!(!outer.ok);
        assert_eq!(outer.details, vec!["downloaded"]);
        assert_eq!(outer.summary(), "missing column");
    }
}
