//! Broadcast channel records supplied by the tuner side
//!
//! A service instance addresses a broadcast service by its DVB triplet; the
//! caller passes in the channels its tuners can reach, and only instances
//! whose triplet resolves here are offered.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// (original network id, transport stream id, service id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triplet {
    pub orig_net_id: u16,
    pub ts_id: u16,
    pub service_id: u16,
}

impl Triplet {
    pub fn new(orig_net_id: u16, ts_id: u16, service_id: u16) -> Self {
        Self {
            orig_net_id,
            ts_id,
            service_id,
        }
    }
}

impl fmt::Display for Triplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.orig_net_id, self.ts_id, self.service_id)
    }
}

/// A tunable broadcast service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvbChannel {
    #[serde(alias = "onid")]
    pub orig_net_id: u16,
    #[serde(alias = "tsid")]
    pub ts_id: u16,
    #[serde(alias = "sid")]
    pub service_id: u16,
    #[serde(default)]
    pub name: Option<String>,
    /// Tuner-specific tuning string
    #[serde(default)]
    pub tune: Option<String>,
    /// Tuner-specific demux selection
    #[serde(default)]
    pub demux: Option<String>,
    /// Stream path or URL the channel is published at
    #[serde(default)]
    pub source: Option<String>,
    /// Channel number when the channel is published as a service list
    #[serde(default, alias = "number")]
    pub lcn: Option<u32>,
}

impl DvbChannel {
    pub fn triplet(&self) -> Triplet {
        Triplet::new(self.orig_net_id, self.ts_id, self.service_id)
    }
}

/// Ordered channel records with triplet lookup. On duplicate triplets the
/// later record wins.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    channels: Vec<DvbChannel>,
    index: HashMap<Triplet, usize>,
}

impl ChannelMap {
    pub fn new(channels: Vec<DvbChannel>) -> Self {
        let index = channels
            .iter()
            .enumerate()
            .map(|(i, channel)| (channel.triplet(), i))
            .collect();
        Self { channels, index }
    }

    /// Load a JSON array of channel records
    pub fn from_json(json: &str) -> Result<Self> {
        let channels: Vec<DvbChannel> = serde_json::from_str(json)?;
        Ok(Self::new(channels))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn get(&self, triplet: &Triplet) -> Option<&DvbChannel> {
        self.index.get(triplet).map(|&i| &self.channels[i])
    }

    pub fn channels(&self) -> &[DvbChannel] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
