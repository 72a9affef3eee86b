//! traQ channel directory: tree flattening and the shared cache.

mod cache;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

pub use cache::{ChannelDirectory, DEFAULT_EXPIRE_AFTER, DEFAULT_FRESH_FOR};

/// A channel as reported by the chat platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub children: Vec<String>,
}

/// A channel with its full `/`-joined path, e.g. `general/random`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelEntry {
    pub id: String,
    pub path: String,
}

/// Upstream source of the channel hierarchy.
#[async_trait]
pub trait ChannelSource: Send + Sync {
    async fn fetch_channels(&self) -> Result<Vec<RawChannel>, UpstreamError>;
}

/// Drop archived channels and list every remaining channel with its path,
/// roots in input order, each followed depth-first by its descendants.
///
/// Children that are archived or unknown are skipped together with their
/// subtrees.
pub fn flatten_channels(channels: &[RawChannel]) -> Vec<ChannelEntry> {
    let by_id: HashMap<&str, &RawChannel> = channels
        .iter()
        .filter(|c| !c.archived)
        .map(|c| (c.id.as_str(), c))
        .collect();

    let mut out = Vec::with_capacity(by_id.len());
    let mut visited = HashSet::with_capacity(by_id.len());
    for root in channels
        .iter()
        .filter(|c| !c.archived && c.parent_id.is_none())
    {
        if !visited.insert(root.id.as_str()) {
            continue;
        }
        out.push(ChannelEntry {
            id: root.id.clone(),
            path: root.name.clone(),
        });
        push_descendants(root, &root.name, &by_id, &mut visited, &mut out);
    }
    out
}

fn push_descendants<'a>(
    parent: &'a RawChannel,
    path: &str,
    by_id: &HashMap<&'a str, &'a RawChannel>,
    visited: &mut HashSet<&'a str>,
    out: &mut Vec<ChannelEntry>,
) {
    for child_id in &parent.children {
        let Some(&child) = by_id.get(child_id.as_str()) else {
            continue;
        };
        // guards against malformed trees that list a channel twice
        if !visited.insert(child.id.as_str()) {
            continue;
        }
        let child_path = format!("{path}/{}", child.name);
        out.push(ChannelEntry {
            id: child.id.clone(),
            path: child_path.clone(),
        });
        push_descendants(child, &child_path, by_id, visited, out);
    }
}
