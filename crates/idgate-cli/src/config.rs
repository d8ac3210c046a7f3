use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use idgate::{Authenticator, NodeId};

/// Runtime configuration for the `idgate` binary.
///
/// Shared settings come from CLI flags or environment variables (a `.env`
/// file in the working directory is loaded first). Subcommands that touch
/// tokens require a signing secret.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "idgate",
    version,
    about = "Mint snowflake IDs and issue or verify HS256 session tokens"
)]
pub struct CliArgs {
    /// Secret used to sign and verify tokens.
    ///
    /// Environment variable: `IDGATE_SECRET`
    #[arg(long, env = "IDGATE_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// Node id to embed in generated IDs, overriding the value derived from
    /// the host's first non-loopback IPv4 address.
    ///
    /// Environment variable: `IDGATE_NODE_ID`
    #[arg(long, env = "IDGATE_NODE_ID", global = true)]
    pub node_id: Option<u64>,

    /// Default token lifetime in seconds.
    ///
    /// Environment variable: `IDGATE_TOKEN_TTL`
    #[arg(long, env = "IDGATE_TOKEN_TTL", global = true, default_value_t = 3600)]
    pub token_ttl: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated identifiers, one per line.
    Id {
        /// How many identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Issue a session token for a user.
    Issue {
        #[arg(long)]
        user_id: u64,
        #[arg(long)]
        email: String,
        /// Lifetime in seconds; defaults to `--token-ttl`.
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Verify a credential (with or without the `Bearer ` prefix) and print
    /// its claims as JSON.
    Verify { credential: String },
    /// Print the node id this host would use.
    Node,
}

/// What the binary has been asked to do, after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Id { count: usize },
    Issue { user_id: u64, email: String, ttl: u64 },
    Verify { credential: String },
    Node,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit override; `None` derives the id from the host.
    pub node_id: Option<NodeId>,
    pub authenticator: Option<Authenticator>,
    pub action: Action,
}

impl Config {
    /// The configured node id, or the one derived from host interfaces.
    pub fn node_id(&self) -> NodeId {
        self.node_id.unwrap_or_else(NodeId::from_host)
    }

    pub fn authenticator(&self) -> anyhow::Result<&Authenticator> {
        self.authenticator
            .as_ref()
            .ok_or_else(|| anyhow!("IDGATE_SECRET must be set"))
    }
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let node_id = args.node_id.map(NodeId::new).transpose()?;

        let authenticator = match args.secret {
            Some(secret) if secret.is_empty() => bail!("IDGATE_SECRET must not be empty"),
            Some(secret) => Some(Authenticator::new(secret)),
            None => None,
        };

        if args.token_ttl == 0 {
            bail!("IDGATE_TOKEN_TTL must be greater than 0");
        }

        let action = match args.command {
            Command::Id { count } => {
                if count == 0 {
                    bail!("--count must be greater than 0");
                }
                Action::Id { count }
            }
            Command::Issue {
                user_id,
                email,
                ttl,
            } => {
                let ttl = ttl.unwrap_or(args.token_ttl);
                if ttl == 0 {
                    bail!("--ttl must be greater than 0");
                }
                Action::Issue {
                    user_id,
                    email,
                    ttl,
                }
            }
            Command::Verify { credential } => Action::Verify { credential },
            Command::Node => Action::Node,
        };

        if matches!(action, Action::Issue { .. } | Action::Verify { .. }) && authenticator.is_none()
        {
            bail!("IDGATE_SECRET must be set to issue or verify tokens");
        }

        Ok(Self {
            node_id,
            authenticator,
            action,
        })
    }
}
