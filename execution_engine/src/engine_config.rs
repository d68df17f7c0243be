//! Support for runtime configuration of the execution engine.
use serde::{Deserialize, Serialize};

use repochain_types::{Policy, RepoConfig};

/// Default number of blocks before a validator ticket matures.
pub const DEFAULT_TICKET_MATURITY_BLOCKS: u64 = 60;
/// Default number of blocks a mature validator ticket stays active.
pub const DEFAULT_TICKET_DURATION_BLOCKS: u64 = 10_000;

/// Parameters of validator tickets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketConfig {
    /// Blocks between purchase and maturity.
    pub maturity_blocks: u64,
    /// Blocks a mature ticket stays active.
    pub duration_blocks: u64,
}

impl Default for TicketConfig {
    fn default() -> Self {
        TicketConfig {
            maturity_blocks: DEFAULT_TICKET_MATURITY_BLOCKS,
            duration_blocks: DEFAULT_TICKET_DURATION_BLOCKS,
        }
    }
}

impl TicketConfig {
    /// Height at which a validator ticket bought while the chain is at `chain_height` unbonds.
    ///
    /// The ticket is included in the next block, matures, then stays active for the duration.
    pub fn validator_unbond_height(&self, chain_height: u64) -> u64 {
        chain_height
            .saturating_add(1)
            .saturating_add(self.maturity_blocks)
            .saturating_add(self.duration_blocks)
    }
}

/// The runtime configuration of the execution engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct EngineConfig {
    /// Config every new repository starts from before its own overrides are applied.
    pub default_repo_config: RepoConfig,
    /// Access rules given to a new repository whose config ends up without any.
    pub default_policies: Vec<Policy>,
    /// Validator ticket parameters.
    pub ticket: TicketConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            default_repo_config: RepoConfig::default(),
            default_policies: default_policies(),
            ticket: TicketConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a new engine configuration with provided parameters.
    pub fn new(
        default_repo_config: RepoConfig,
        default_policies: Vec<Policy>,
        ticket: TicketConfig,
    ) -> Self {
        EngineConfig {
            default_repo_config,
            default_policies,
            ticket,
        }
    }

    /// Parses a configuration from TOML. Missing fields take their default values.
    pub fn from_toml_str(config: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config)
    }
}

fn default_policies() -> Vec<Policy> {
    vec![
        Policy::new("all", "refs/heads", "update"),
        Policy::new("all", "refs/tags", "update"),
        Policy::new("creator", "refs/heads", "delete"),
        Policy::new("creator", "refs/tags", "delete"),
    ]
}

#[cfg(test)]
mod tests {
    use repochain_types::{TallyMethod, VoterType};

    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(
            EngineConfig::from_toml_str("").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn should_parse_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            [ticket]
            maturity_blocks = 5
            duration_blocks = 100

            [default_repo_config.governance]
            voter = "net_stakers"
            tally_method = "net_stake"
            proposal_duration = 20
            proposal_quorum = 0.0
            proposal_threshold = 0.5
            proposal_veto_quorum = 0.0
            proposal_veto_owners_quorum = 0.0
            creator_as_contributor = false
            "#,
        )
        .unwrap();
        assert_eq!(config.ticket.validator_unbond_height(10), 116);
        assert_eq!(
            config.default_repo_config.governance.voter,
            VoterType::NetStakers
        );
        assert_eq!(
            config.default_repo_config.governance.tally_method,
            TallyMethod::NetStake
        );
        assert_eq!(config.default_policies, default_policies());
    }

    #[test]
    fn unbond_height_saturates() {
        let config = EngineConfig::from_toml_str(
            "[ticket]\nmaturity_blocks = 9223372036854775807\nduration_blocks = 9223372036854775807\n",
        )
        .unwrap();
        assert_eq!(config.ticket.validator_unbond_height(10), u64::MAX);
        assert_eq!(
            TicketConfig::default().validator_unbond_height(u64::MAX),
            u64::MAX
        );
    }

    #[test]
    fn should_reject_unknown_fields() {
        assert!(EngineConfig::from_toml_str("max_query_depth = 5").is_err());
    }
}
