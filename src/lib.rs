//! DVB-I service list catalogue
//!
//! Turns a DVB-I service list into a [`Catalogue`] of numbered services with
//! their playable delivery instances, and answers the questions a client
//! asks of it: which region a postcode falls in, which services a region
//! gets, and which instances are usable right now.

pub mod availability;
pub mod channel_map;
pub mod config;
pub mod download;
pub mod error;
pub mod instance;
pub mod labels;
pub mod lcn;
pub mod postcode;
pub mod provider;
pub mod query;
pub mod region;
pub mod related;
pub mod service_list;
pub mod text;
pub mod writer;
pub mod xml;

pub use channel_map::{ChannelMap, DvbChannel, Triplet};
pub use error::{CatalogueError, Result};
pub use instance::{DeliveryInstance, DeliverySource, ResolveOptions};
pub use region::Region;
pub use service_list::{parse_service_list, Catalogue, Service};
