use crate::config::settings::DEFAULT_SETTINGS_FILE;
use crate::domain::model::ItemState;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "pocket-lint")]
#[command(about = "Authenticate with Pocket, list saved items and tidy them up")]
pub struct CliConfig {
    #[arg(long, short = 'c', default_value = DEFAULT_SETTINGS_FILE)]
    pub config: String,

    #[arg(long, short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Request a token and print the URL to approve it in a browser
    Auth,
    /// Exchange an approved request token for an access token
    Authorise { code: String },
    /// List saved items
    Retrieve {
        #[arg(long, default_value = "10")]
        count: u32,
        #[arg(long, value_enum)]
        state: Option<StateArg>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Apply one action to one item, e.g. `modify tags_add 42 rust cli`
    Modify {
        action: String,
        item_id: i64,
        args: Vec<String>,
    },
    /// Shorthand for `modify archive <item_id>`
    Archive { item_id: i64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateArg {
    Unread,
    Archive,
    All,
}

impl From<StateArg> for ItemState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Unread => ItemState::Unread,
            StateArg::Archive => ItemState::Archive,
            StateArg::All => ItemState::All,
        }
    }
}
