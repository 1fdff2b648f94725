//! cache_keys tool implementation.
//!
//! Lists cache partitions and the requests stored in each.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use volta_core::{CacheDb, Error};

use crate::tools::json_result;

/// Parameters for the cache_keys tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysParams {
    /// Only list this partition. Omit to list all of them.
    #[serde(default)]
    pub partition: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EntryKey {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub response_type: String,
    pub stored_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PartitionKeys {
    pub name: String,
    /// Whether this is the partition the worker reads and writes.
    pub current: bool,
    pub entries: Vec<EntryKey>,
}

/// Output from the cache_keys tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheKeysOutput {
    pub version_tag: String,
    pub partitions: Vec<PartitionKeys>,
}

/// Implementation of the cache_keys tool.
pub async fn keys_impl(cache: &CacheDb, version_tag: &str, params: CacheKeysParams) -> Result<CallToolResult, McpError> {
    let names = match params.partition {
        Some(name) => {
            if !cache.has_partition(&name).await? {
                return Err(Error::CacheMiss(format!("no partition named {name}")).into());
            }
            vec![name]
        }
        None => cache.partition_names().await?,
    };

    let mut partitions = Vec::with_capacity(names.len());
    for name in names {
        let entries = cache
            .entries(&name)
            .await?
            .into_iter()
            .map(|entry| EntryKey {
                method: entry.method,
                url: entry.url,
                status: entry.response.status,
                response_type: entry.response.response_type.to_string(),
                stored_at: entry.stored_at,
            })
            .collect();
        partitions.push(PartitionKeys { current: name == version_tag, name, entries });
    }

    json_result(&CacheKeysOutput { version_tag: version_tag.to_string(), partitions })
}
