//! Cloud network and security metadata lookup boundary.
//!
//! Resolvers backed by a real cloud inventory live outside this crate. The
//! [`StaticCloudMetadata`] implementation serves fixed fixtures, which is
//! enough for tests and offline tooling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lookup failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No record matches the query.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing inventory failed to answer.
    #[error("lookup backend error: {0}")]
    Backend(String),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupSummary {
    pub name: String,
    pub id: String,
    pub account: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: Option<String>,
    pub account: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityZone {
    pub name: String,
    pub account: String,
    pub vpc_id: String,
    pub region: String,
}

/// Resolve cloud metadata by account, region and identifier.
pub trait CloudMetadataLookup: Send + Sync {
    fn security_group_summary_by(
        &self,
        account: &str,
        region: &str,
        id: &str,
    ) -> Result<SecurityGroupSummary, LookupError>;

    fn network_by_id(&self, id: &str) -> Result<Network, LookupError>;

    /// Resolve a network by name. `None` selects the unnamed default network.
    fn network_by_name(
        &self,
        name: Option<&str>,
        account: &str,
        region: &str,
    ) -> Result<Network, LookupError>;

    /// Zone names for a VPC. Unknown VPCs are `NotFound`, never an empty list.
    fn availability_zones_by(
        &self,
        account: &str,
        vpc_id: &str,
        region: &str,
    ) -> Result<Vec<String>, LookupError>;
}

/// Fixture-backed lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticCloudMetadata {
    pub security_groups: Vec<SecurityGroupSummary>,
    pub networks: Vec<Network>,
    pub availability_zones: Vec<AvailabilityZone>,
}

impl CloudMetadataLookup for StaticCloudMetadata {
    fn security_group_summary_by(
        &self,
        account: &str,
        region: &str,
        id: &str,
    ) -> Result<SecurityGroupSummary, LookupError> {
        self.security_groups
            .iter()
            .find(|sg| sg.account == account && sg.region == region && sg.id == id)
            .cloned()
            .ok_or_else(|| {
                LookupError::NotFound(format!(
                    "security group {} in {}/{}",
                    id, account, region
                ))
            })
    }

    fn network_by_id(&self, id: &str) -> Result<Network, LookupError> {
        self.networks
            .iter()
            .find(|network| network.id == id)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(format!("network {}", id)))
    }

    fn network_by_name(
        &self,
        name: Option<&str>,
        account: &str,
        region: &str,
    ) -> Result<Network, LookupError> {
        self.networks
            .iter()
            .find(|network| {
                network.name.as_deref() == name
                    && network.account == account
                    && network.region == region
            })
            .cloned()
            .ok_or_else(|| {
                LookupError::NotFound(format!(
                    "network {} in {}/{}",
                    name.unwrap_or("<default>"),
                    account,
                    region
                ))
            })
    }

    fn availability_zones_by(
        &self,
        account: &str,
        vpc_id: &str,
        region: &str,
    ) -> Result<Vec<String>, LookupError> {
        let zones: Vec<String> = self
            .availability_zones
            .iter()
            .filter(|zone| zone.account == account && zone.vpc_id == vpc_id && zone.region == region)
            .map(|zone| zone.name.clone())
            .collect();
        if zones.is_empty() {
            return Err(LookupError::NotFound(format!(
                "availability zones for {} in {}/{}",
                vpc_id, account, region
            )));
        }
        Ok(zones)
    }
}
