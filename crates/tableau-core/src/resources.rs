// crates/tableau-core/src/resources.rs
use crate::{Result, TableauError};
use glam::Vec2;
use std::collections::HashMap;

/// Registry of assets the host has already loaded. Decoding happens
/// elsewhere; drawables only look entries up by name.
#[derive(Debug, Clone)]
pub struct ResourceManager {
    pub resources: HashMap<String, ResourceEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    pub name: String,
    pub resource_type: ResourceType,
    /// Pixel dimensions for images, zero for fonts.
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Font,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self {
            resources: HashMap::new(),
        }
    }
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_resource(&mut self, entry: ResourceEntry) {
        self.resources.insert(entry.name.clone(), entry);
    }

    pub fn add_image(&mut self, name: impl Into<String>, size: Vec2) {
        let name = name.into();
        self.add_resource(ResourceEntry {
            name,
            resource_type: ResourceType::Image,
            size,
        });
    }

    pub fn add_font(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.add_resource(ResourceEntry {
            name,
            resource_type: ResourceType::Font,
            size: Vec2::ZERO,
        });
    }

    pub fn get_resource(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.get(name)
    }

    /// Looks up a resource of the given type on behalf of `node`.
    pub fn require(&self, name: &str, resource_type: ResourceType, node: &str) -> Result<&ResourceEntry> {
        self.resources
            .get(name)
            .filter(|entry| entry.resource_type == resource_type)
            .ok_or_else(|| TableauError::ResourceNotFound {
                node: node.to_string(),
                resource: name.to_string(),
            })
    }
}
