//! Repository configuration and the overlay applied when a repository is created.
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::bytesrepr::{self, FromBytes, ToBytes, U32_SERIALIZED_LENGTH};

/// Errors raised while merging a configuration update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The update does not describe a valid configuration.
    #[error("invalid repository config: {0}")]
    Invalid(String),
    /// The tally method is only meaningful when owners are the voters.
    #[error("tally method {0} requires owner voters")]
    TallyMethodRequiresOwnerVoter(TallyMethod),
}

/// Who votes on a repository's proposals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoterType {
    /// Only repository owners vote.
    Owner,
    /// Holders of network stake vote.
    NetStakers,
    /// Holders of network stake vote; owners with veto rights can veto.
    NetStakersAndVetoOwner,
}

/// How a vote is converted into a weight.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyMethod {
    /// Every voter has a weight of one.
    Identity,
    /// Weight is the voter's spendable balance.
    CoinWeighted,
    /// Weight is the voter's stake with delegation-conflict resolution.
    NetStake,
    /// Weight is the value of tickets the voter holds for themselves.
    NetStakeNonDelegated,
    /// Weight is the value of tickets delegated to the voter.
    NetStakeOfDelegators,
}

impl TallyMethod {
    /// Whether the method can only be used by owner-voted repositories.
    pub fn requires_owner_voter(&self) -> bool {
        matches!(self, TallyMethod::Identity | TallyMethod::CoinWeighted)
    }
}

impl Display for TallyMethod {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self {
            TallyMethod::Identity => write!(formatter, "identity"),
            TallyMethod::CoinWeighted => write!(formatter, "coin_weighted"),
            TallyMethod::NetStake => write!(formatter, "net_stake"),
            TallyMethod::NetStakeNonDelegated => write!(formatter, "net_stake_non_delegated"),
            TallyMethod::NetStakeOfDelegators => write!(formatter, "net_stake_of_delegators"),
        }
    }
}

/// Governance parameters. Every proposal keeps its own copy taken when it was created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GovernanceConfig {
    /// Who may vote.
    pub voter: VoterType,
    /// How votes are weighted.
    pub tally_method: TallyMethod,
    /// Number of blocks a proposal stays open.
    pub proposal_duration: u64,
    /// Fraction of eligible weight that must vote.
    pub proposal_quorum: f64,
    /// Fraction of votes that must be Yes.
    pub proposal_threshold: f64,
    /// Fraction of votes that must be NoWithVeto to veto.
    pub proposal_veto_quorum: f64,
    /// Fraction of veto owners that must veto.
    pub proposal_veto_owners_quorum: f64,
    /// Register the creator's key as a contributor when the repository is created.
    pub creator_as_contributor: bool,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        GovernanceConfig {
            voter: VoterType::Owner,
            tally_method: TallyMethod::Identity,
            proposal_duration: 10,
            proposal_quorum: 0.0,
            proposal_threshold: 0.51,
            proposal_veto_quorum: 0.0,
            proposal_veto_owners_quorum: 0.0,
            creator_as_contributor: true,
        }
    }
}

/// An access control rule: `subject` may perform `action` on `object`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Who the rule applies to, e.g. `"contrib"` or a push key id.
    pub subject: String,
    /// What the rule applies to, e.g. `"refs/heads"`.
    pub object: String,
    /// The permitted action, e.g. `"write"`.
    pub action: String,
}

impl Policy {
    /// Creates a new policy.
    pub fn new(subject: &str, object: &str, action: &str) -> Self {
        Policy {
            subject: subject.to_string(),
            object: object.to_string(),
            action: action.to_string(),
        }
    }
}

/// The configuration of a repository.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RepoConfig {
    /// Governance parameters.
    pub governance: GovernanceConfig,
    /// Access control rules.
    pub policies: Vec<Policy>,
}

impl RepoConfig {
    /// Overlays `update` onto this config.
    ///
    /// Objects are merged key by key, any other value replaces what was there. Nothing is
    /// modified unless the merged result is a valid config.
    pub fn merge(&mut self, update: &RepoConfigUpdate) -> Result<(), ConfigError> {
        let mut merged =
            serde_json::to_value(&*self).map_err(|error| ConfigError::Invalid(error.to_string()))?;
        overlay(&mut merged, &Value::Object(update.0.clone()));
        let merged: RepoConfig = serde_json::from_value(merged)
            .map_err(|error| ConfigError::Invalid(error.to_string()))?;
        merged.validate()?;
        *self = merged;
        Ok(())
    }

    /// Checks combinations that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let governance = &self.governance;
        if governance.tally_method.requires_owner_voter() && governance.voter != VoterType::Owner
        {
            return Err(ConfigError::TallyMethodRequiresOwnerVoter(
                governance.tally_method,
            ));
        }
        Ok(())
    }
}

fn overlay(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => {
            for (key, value) in update {
                if value.is_null() && target.contains_key(key) {
                    continue;
                }
                overlay(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, update) => *target = update.clone(),
    }
}

/// A partial repository config carried by a repository-creation transaction.
///
/// Encoded as compact JSON with sorted keys, so equal updates always produce equal bytes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoConfigUpdate(Map<String, Value>);

impl RepoConfigUpdate {
    /// Creates an empty update.
    pub fn new() -> Self {
        RepoConfigUpdate::default()
    }

    /// Whether the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sets a top-level key.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    fn to_json(&self) -> Result<String, bytesrepr::Error> {
        serde_json::to_string(&self.0).map_err(|_| bytesrepr::Error::Formatting)
    }
}

impl From<Map<String, Value>> for RepoConfigUpdate {
    fn from(map: Map<String, Value>) -> Self {
        RepoConfigUpdate(map)
    }
}

impl ToBytes for RepoConfigUpdate {
    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH + self.to_json().map(|json| json.len()).unwrap_or_default()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.to_json()?.write_bytes(writer)
    }
}

impl FromBytes for RepoConfigUpdate {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (json, remainder) = String::from_bytes(bytes)?;
        let map: Map<String, Value> =
            serde_json::from_str(&json).map_err(|_| bytesrepr::Error::Formatting)?;
        let update = RepoConfigUpdate(map);
        if update.to_json()? != json {
            return Err(bytesrepr::Error::Formatting);
        }
        Ok((update, remainder))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn update(value: Value) -> RepoConfigUpdate {
        match value {
            Value::Object(map) => RepoConfigUpdate::from(map),
            _ => panic!("update must be an object"),
        }
    }

    #[test]
    fn explicit_fields_win_and_absent_fields_keep_defaults() {
        let mut config = RepoConfig::default();
        config
            .merge(&update(json!({
                "governance": { "voter": "net_stakers", "tally_method": "net_stake" }
            })))
            .unwrap();
        assert_eq!(config.governance.voter, VoterType::NetStakers);
        assert_eq!(config.governance.tally_method, TallyMethod::NetStake);
        assert_eq!(
            config.governance.proposal_duration,
            GovernanceConfig::default().proposal_duration
        );
        assert!(config.governance.creator_as_contributor);
    }

    #[test]
    fn null_fields_keep_current_values() {
        let mut config = RepoConfig::default();
        config
            .merge(&update(json!({
                "governance": { "proposal_quorum": null, "proposal_duration": 30 }
            })))
            .unwrap();
        assert_eq!(
            config.governance.proposal_quorum,
            GovernanceConfig::default().proposal_quorum
        );
        assert_eq!(config.governance.proposal_duration, 30);

        let error = config.merge(&update(json!({ "colour": null }))).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
    }

    #[test]
    fn should_replace_policies_wholesale() {
        let mut config = RepoConfig {
            policies: vec![Policy::new("contrib", "refs/heads", "write")],
            ..RepoConfig::default()
        };
        config
            .merge(&update(json!({
                "policies": [{ "subject": "all", "object": "refs/tags", "action": "read" }]
            })))
            .unwrap();
        assert_eq!(config.policies, vec![Policy::new("all", "refs/tags", "read")]);
    }

    #[test]
    fn should_reject_unknown_and_mistyped_fields() {
        let original = RepoConfig::default();

        let mut config = original.clone();
        let error = config.merge(&update(json!({ "colour": "blue" }))).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
        assert_eq!(config, original);

        let mut config = original.clone();
        let error = config
            .merge(&update(json!({ "governance": { "proposal_duration": "soon" } })))
            .unwrap_err();
        assert!(matches!(error, ConfigError::Invalid(_)));
        assert_eq!(config, original);
    }

    #[test]
    fn should_reject_owner_only_tally_for_stakers() {
        let mut config = RepoConfig::default();
        let error = config
            .merge(&update(json!({ "governance": { "voter": "net_stakers" } })))
            .unwrap_err();
        assert_eq!(
            error,
            ConfigError::TallyMethodRequiresOwnerVoter(TallyMethod::Identity)
        );
    }

    #[test]
    fn update_encoding_is_key_sorted_and_canonical() {
        let encoded = update(json!({ "policies": [], "governance": { "voter": "owner" } }))
            .to_bytes()
            .unwrap();
        let (json, _) = String::from_bytes(&encoded).unwrap();
        assert_eq!(json, r#"{"governance":{"voter":"owner"},"policies":[]}"#);

        let spaced = r#"{ "policies": [] }"#.to_string().to_bytes().unwrap();
        assert_eq!(
            bytesrepr::deserialize::<RepoConfigUpdate>(&spaced),
            Err(bytesrepr::Error::Formatting)
        );

        bytesrepr::test_serialization_roundtrip(&update(json!({
            "governance": { "proposal_quorum": 0.25, "creator_as_contributor": false }
        })));
    }
}
