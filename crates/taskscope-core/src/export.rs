use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::Task;
use crate::report::display_name;
use crate::Result;

/// CSV exporter for the task report
pub struct CsvExporter;

impl CsvExporter {
    /// Write the report to a file at `path`, header row first.
    pub fn write_to_file<P: AsRef<Path>>(
        tasks: &[Task],
        usernames: &HashMap<String, String>,
        path: P,
    ) -> Result<()> {
        let content = Self::to_csv(tasks, usernames);
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Render the report as CSV, one row per task in the given order.
    pub fn to_csv(tasks: &[Task], usernames: &HashMap<String, String>) -> String {
        let mut output = String::new();
        output.push_str("id,title,projects,status,priority,created,modified,url,author,owner\n");

        for task in tasks {
            output.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                task.id,
                Self::escape_csv(&task.title),
                Self::escape_csv(&task.projects.join(", ")),
                Self::escape_csv(&task.status),
                Self::escape_csv(&task.priority),
                task.created_at.format("%Y-%m-%d %H:%M:%S"),
                task.modified_at.format("%Y-%m-%d %H:%M:%S"),
                Self::escape_csv(&task.url),
                Self::escape_csv(&display_name(&task.author_phid, usernames)),
                Self::escape_csv(&display_name(&task.owner_phid, usernames)),
            ));
        }

        output
    }

    /// Escape CSV special characters
    fn escape_csv(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
