//! Resource descriptors and the topology forest.

use std::collections::VecDeque;

use flowsched_id::{IdError, ResourceId, TaskId};
use serde::{Deserialize, Serialize};

/// Kind of a node in the machine topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Processing unit. The only directly schedulable kind.
    Pu,
    Core,
    Cache,
    Nic,
    Disk,
    Ssd,
    Machine,
    Logical,
    NumaNode,
    Socket,
    Coordinator,
}

/// A node in the resource topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    pub uuid: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub schedulable: bool,
    /// UUID of the parent resource; `None` for roots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Tasks the cluster reports as actually running here.
    #[serde(default)]
    pub current_running_tasks: Vec<TaskId>,
}

impl ResourceDescriptor {
    /// Creates an unschedulable descriptor with no parent.
    pub fn new(
        uuid: impl Into<String>,
        friendly_name: impl Into<String>,
        resource_type: ResourceType,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            friendly_name: friendly_name.into(),
            resource_type,
            schedulable: false,
            parent: None,
            current_running_tasks: Vec::new(),
        }
    }

    /// Derives the resource's numeric handle from its UUID.
    pub fn id(&self) -> Result<ResourceId, IdError> {
        ResourceId::from_uuid_str(&self.uuid)
    }

    pub fn is_pu(&self) -> bool {
        self.resource_type == ResourceType::Pu
    }
}

/// A resource plus its children in the topology tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTopologyNodeDescriptor {
    pub resource_desc: ResourceDescriptor,
    #[serde(default)]
    pub children: Vec<ResourceTopologyNodeDescriptor>,
    /// Parent UUID; empty for the root of a machine or detached subtree.
    #[serde(default)]
    pub parent_id: String,
}

impl ResourceTopologyNodeDescriptor {
    /// Creates a leaf node with no parent.
    pub fn new(resource_desc: ResourceDescriptor) -> Self {
        Self {
            resource_desc,
            children: Vec::new(),
            parent_id: String::new(),
        }
    }

    /// Appends a child, wiring both parent links to this node.
    pub fn with_child(mut self, mut child: ResourceTopologyNodeDescriptor) -> Self {
        child.parent_id = self.resource_desc.uuid.clone();
        child.resource_desc.parent = Some(self.resource_desc.uuid.clone());
        self.children.push(child);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }

    /// Visits the subtree breadth-first, starting with this node.
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst {
            queue: VecDeque::from([self]),
        }
    }

    /// Visits every descriptor in the subtree breadth-first, mutably.
    pub fn for_each_breadth_first_mut<F>(&mut self, mut visit: F)
    where
        F: FnMut(&mut ResourceDescriptor),
    {
        let mut queue: VecDeque<&mut ResourceTopologyNodeDescriptor> = VecDeque::from([self]);
        while let Some(node) = queue.pop_front() {
            let ResourceTopologyNodeDescriptor {
                resource_desc,
                children,
                ..
            } = node;
            visit(resource_desc);
            queue.extend(children.iter_mut());
        }
    }
}

/// Breadth-first iterator over a topology subtree.
pub struct BreadthFirst<'a> {
    queue: VecDeque<&'a ResourceTopologyNodeDescriptor>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = &'a ResourceTopologyNodeDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children.iter());
        Some(node)
    }
}

/// A registered resource with its runtime status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStatus {
    pub descriptor: ResourceDescriptor,
    #[serde(default)]
    pub endpoint_uri: String,
    /// Unix seconds of the last heartbeat; zero if never seen.
    #[serde(default)]
    pub last_heartbeat: u64,
}

impl ResourceStatus {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            descriptor,
            endpoint_uri: String::new(),
            last_heartbeat: 0,
        }
    }

    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }
}
