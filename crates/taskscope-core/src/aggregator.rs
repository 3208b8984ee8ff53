use std::collections::HashMap;

use tracing::debug;

use crate::{
    models::{CombineMode, ProjectDirectory, Task, TaskFilter},
    source::TrackerSource,
    Result,
};

/// Merges task queries across projects into one deduplicated, sorted list.
///
/// In `Any` mode each project is queried on its own and the results are
/// merged keyed by numeric task id; in `All` mode one combined query asks
/// the server for the intersection. Queries run strictly one after another.
pub struct TaskAggregator<'a> {
    source: &'a dyn TrackerSource,
    directory: &'a ProjectDirectory,
}

impl<'a> TaskAggregator<'a> {
    pub fn new(source: &'a dyn TrackerSource, directory: &'a ProjectDirectory) -> Self {
        Self { source, directory }
    }

    /// Run the aggregation and return tasks sorted by creation time, newest
    /// first. The sort is stable, so ties keep their merge order.
    pub async fn collect(&self, filter: &TaskFilter, mode: CombineMode) -> Result<Vec<Task>> {
        let mut tasks = match mode {
            CombineMode::Any => self.collect_any(filter).await?,
            CombineMode::All => self.collect_all(filter).await?,
        };

        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    /// One query per project PHID; a task seen under several projects keeps
    /// its first-seen fields and accumulates project names as provenance.
    async fn collect_any(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let mut merged: Vec<Task> = Vec::new();
        let mut index: HashMap<u64, usize> = HashMap::new();

        for phid in &filter.project_phids {
            let single = TaskFilter {
                project_phids: vec![phid.clone()],
                ..filter.clone()
            };
            let found = self.source.tasks(&single).await?;
            let project_name = self.display_name(phid);
            debug!(project = %project_name, tasks = found.len(), "project query finished");

            for mut task in found {
                match index.get(&task.id) {
                    Some(&pos) => {
                        let projects = &mut merged[pos].projects;
                        if !projects.iter().any(|p| p == &project_name) {
                            projects.push(project_name.clone());
                        }
                    }
                    None => {
                        task.projects = vec![project_name.clone()];
                        index.insert(task.id, merged.len());
                        merged.push(task);
                    }
                }
            }
        }

        Ok(merged)
    }

    /// One combined query; every task carries the full requested project set
    /// as provenance. An empty PHID set queries with no project constraint.
    async fn collect_all(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let found = self.source.tasks(filter).await?;
        let provenance: Vec<String> = filter
            .project_phids
            .iter()
            .map(|phid| self.display_name(phid))
            .collect();

        Ok(found
            .into_iter()
            .map(|mut task| {
                task.projects = provenance.clone();
                task
            })
            .collect())
    }

    fn display_name(&self, phid: &str) -> String {
        self.directory
            .name_of(phid)
            .map(str::to_string)
            .unwrap_or_else(|| phid.to_string())
    }
}
