use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

use crate::config::DEFAULT_USER_AGENT;
use crate::model::{Stance, VoteChoice};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ProgressMode {
    /// Enable progress UI when stderr is a TTY.
    Auto,
    /// Always enable progress UI (even when piped).
    Always,
    /// Never show progress UI.
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VoteArg {
    Agree,
    Disagree,
}

impl From<VoteArg> for VoteChoice {
    fn from(v: VoteArg) -> Self {
        match v {
            VoteArg::Agree => VoteChoice::Agree,
            VoteArg::Disagree => VoteChoice::Disagree,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StanceArg {
    Agree,
    Disagree,
    Neutral,
}

impl From<StanceArg> for Stance {
    fn from(s: StanceArg) -> Self {
        match s {
            StanceArg::Agree => Stance::Agree,
            StanceArg::Disagree => Stance::Disagree,
            StanceArg::Neutral => Stance::Neutral,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Base URL of the Agora backend (e.g. `https://agora.example.com`).
    /// Falls back to `AGORA_API_URL`, then to the development host.
    #[arg(long, global = true)]
    pub base_url: Option<Url>,

    /// HTTP User-Agent sent with every request.
    #[arg(long, global = true, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Do not send the tunnel interstitial bypass header.
    #[arg(long, global = true)]
    pub no_tunnel_bypass: bool,

    /// Progress display: `auto`, `always`, or `never`.
    #[arg(long, global = true, value_enum, default_value = "auto")]
    pub progress: ProgressMode,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List discussions, optionally filtered client-side.
    List {
        /// Case-insensitive match against title and description.
        #[arg(long, default_value = "")]
        search: String,
        /// Category to keep (`전체` keeps all).
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one discussion with its comments (counts as a visit).
    Show { id: String },
    /// Start a new discussion.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Defaults to `일반`.
        #[arg(long)]
        category: Option<String>,
    },
    /// Vote on a discussion.
    Vote {
        id: String,
        #[arg(value_enum)]
        choice: VoteArg,
    },
    /// Post a comment.
    Comment {
        id: String,
        /// Display name; empty posts anonymously.
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        content: String,
        #[arg(long, value_enum, default_value = "neutral")]
        stance: StanceArg,
        /// Comma-separated reference titles.
        #[arg(long, default_value = "")]
        reference_title: String,
        /// Comma-separated reference URLs, paired with titles by position.
        #[arg(long, default_value = "")]
        reference_url: String,
    },
    /// Toggle the like on a comment.
    Like { comment_id: String },
    /// Increment a discussion's visitor count.
    Visit { id: String },
}
