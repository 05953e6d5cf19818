//! Cluster seed files.
//!
//! A seed file is a JSON document listing the machines to register and the
//! jobs to submit when the binary starts:
//!
//! ```json
//! {
//!   "topology": [
//!     { "resource_desc": { "uuid": "...", "type": "machine" },
//!       "children": [ { "resource_desc": { "uuid": "...", "type": "pu" } } ] }
//!   ],
//!   "jobs": [
//!     { "uuid": "...", "name": "web", "tasks": [ { "uid": 1, "name": "web-0" } ] }
//!   ]
//! }
//! ```
//!
//! Parent links inside each machine are filled in on load.

use std::path::{Path, PathBuf};

use flowsched_id::TaskId;
use flowsched_proto::{JobDescriptor, ResourceTopologyNodeDescriptor, TaskDescriptor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub uid: TaskId,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskSpec>,
}

impl JobSpec {
    /// Splits the entry into the job descriptor and its runnable tasks.
    pub fn into_descriptors(self) -> (JobDescriptor, Vec<TaskDescriptor>) {
        let tasks = self
            .tasks
            .into_iter()
            .map(|t| TaskDescriptor::new(t.uid, t.name, self.uuid.clone()))
            .collect();
        (JobDescriptor::new(self.uuid, self.name, Vec::new()), tasks)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    #[serde(default)]
    pub topology: Vec<ResourceTopologyNodeDescriptor>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

impl ClusterSpec {
    pub fn load(path: &Path) -> Result<Self, ClusterError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ClusterError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ClusterError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        let mut spec: Self = serde_json::from_str(raw)?;
        for root in &mut spec.topology {
            link_parents(root);
        }
        Ok(spec)
    }
}

fn link_parents(node: &mut ResourceTopologyNodeDescriptor) {
    let uuid = node.resource_desc.uuid.clone();
    for child in &mut node.children {
        child.parent_id = uuid.clone();
        child.resource_desc.parent = Some(uuid.clone());
        link_parents(child);
    }
}
