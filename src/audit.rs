use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::warn;

/// Append-only log of destructive actions
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: Option<PathBuf>,
}

impl AuditLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// A log that records nothing
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        if config.audit_enabled {
            Self::new(PathBuf::from(&config.audit_path))
        } else {
            Self::disabled()
        }
    }

    /// Write an entry to the audit log
    pub fn log(&self, entry: &str) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;

        writeln!(
            file,
            "[{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            entry
        )?;
        Ok(())
    }

    /// Record an executed delete; failures are logged, never raised
    pub fn log_delete(&self, collection: &str, topic: Option<&str>, removed: usize) {
        let entry = format!(
            "DELETE {} | TOPIC: {} | REMOVED: {}",
            collection,
            topic.unwrap_or("*"),
            removed
        );
        if let Err(e) = self.log(&entry) {
            warn!("⚠️ Failed to write audit log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("audit.log");
        let audit = AuditLog::new(path.clone());

        audit.log_delete("flashcards", Some("react"), 3);
        audit.log_delete("notes", None, 0);

        let contents = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("DELETE flashcards | TOPIC: react | REMOVED: 3"));
        assert!(lines[1].contains("TOPIC: *"));
    }

    #[test]
    fn test_disabled_log_is_noop() {
        assert!(AuditLog::disabled().log("anything").is_ok());
    }
}
