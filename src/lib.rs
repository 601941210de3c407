mod cli;
mod client;
mod config;
mod decode;
mod error;
mod filter;
mod model;
pub mod normalize;
mod page;
mod progress;
mod reconcile;
mod service;
mod transport;
mod wire;

use anyhow::Context as _;
use serde::Serialize;

pub use cli::{Args as CliArgs, Command, ProgressMode, StanceArg, VoteArg};
pub use client::AgoraClient;
pub use config::{BASE_URL_ENV, ClientConfig, DEFAULT_BASE_URL};
pub use decode::{Decoded, decode, decode_or, decode_strict, success_default, vote_default};
pub use error::{ApiError, Operation};
pub use filter::{ALL_CATEGORIES, DiscussionFilter};
pub use model::{
    Comment, CommentDraft, DEFAULT_CATEGORY, Discussion, DiscussionDetail, DiscussionDraft,
    Reference, Stance, VoteChoice, VoteCounts, VoteResult, parse_references,
};
pub use page::{DiscussionListPage, DiscussionPage, placeholder_discussion, placeholder_discussions};
pub use progress::Progress;
pub use reconcile::{
    LikeBackend, LikeState, Outcome, VoteBackend, VotePhase, VoteSnapshot, VoteState, cast_vote,
    toggle_like,
};
pub use service::{AgoraService, local_comment};
pub use transport::{RawResponse, TUNNEL_BYPASS_HEADER, Transport};

pub async fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut out = std::io::stdout();
    run_to(args, &mut out).await
}

/// Runs one command and writes its JSON result to `out`.
pub async fn run_to(args: CliArgs, out: &mut impl std::io::Write) -> anyhow::Result<()> {
    use std::io::IsTerminal as _;

    let config = match args.base_url {
        Some(url) => ClientConfig::new(url),
        None => ClientConfig::from_env().context("resolve backend url")?,
    };
    let config = config
        .with_user_agent(args.user_agent)
        .with_tunnel_bypass(!args.no_tunnel_bypass);

    let progress_enabled = match args.progress {
        ProgressMode::Always => true,
        ProgressMode::Never => false,
        ProgressMode::Auto => std::io::stderr().is_terminal(),
    };
    let progress = Progress::new(progress_enabled);
    let client = AgoraClient::new(&config, Some(progress.clone())).context("build api client")?;
    let service = AgoraService::new(client);

    let res = execute(&service, &progress, args.command, out).await;
    progress.finish();
    res
}

async fn execute(
    service: &AgoraService,
    progress: &Progress,
    command: Command,
    out: &mut impl std::io::Write,
) -> anyhow::Result<()> {
    match command {
        Command::List { search, category } => {
            progress.set_stage("토론 목록 불러오는 중");
            let list = service.discussions().await.context("list discussions")?;
            let filter = DiscussionFilter::new(search, category);
            print_json(out, &filter.apply(&list))
        }
        Command::Show { id } => {
            progress.set_stage("토론을 불러오는 중");
            let detail = service
                .open_discussion(&id)
                .await
                .with_context(|| format!("show discussion {id}"))?;
            print_json(out, &detail)
        }
        Command::Create {
            name,
            title,
            content,
            category,
        } => {
            if title.trim().is_empty() || content.trim().is_empty() {
                anyhow::bail!("--title and --content must not be blank");
            }
            progress.set_stage("토론 작성 중");
            let draft = DiscussionDraft {
                name,
                title: title.trim().to_string(),
                content: content.trim().to_string(),
                category,
            };
            let created = service
                .create_discussion(&draft)
                .await
                .context("create discussion")?;
            print_json(out, &created)
        }
        Command::Vote { id, choice } => {
            progress.set_stage("투표 중");
            let result = service
                .vote(&id, choice.into())
                .await
                .with_context(|| format!("vote on discussion {id}"))?;
            print_json(out, &result)
        }
        Command::Comment {
            id,
            name,
            content,
            stance,
            reference_title,
            reference_url,
        } => {
            if content.trim().is_empty() {
                anyhow::bail!("--content must not be blank");
            }
            progress.set_stage("댓글 작성 중");
            let draft = CommentDraft {
                nickname: name,
                content,
                stance: stance.into(),
                references: parse_references(&reference_title, &reference_url),
            };
            let comment = service
                .submit_comment(&id, &draft)
                .await
                .with_context(|| format!("comment on discussion {id}"))?;
            print_json(out, &comment)
        }
        Command::Like { comment_id } => {
            progress.set_stage("좋아요 처리 중");
            let ack = service
                .toggle_like(&comment_id)
                .await
                .with_context(|| format!("toggle like on comment {comment_id}"))?;
            print_json(out, &ack)
        }
        Command::Visit { id } => {
            progress.set_stage("방문 기록 중");
            let ack = service
                .visit(&id)
                .await
                .with_context(|| format!("record visit on discussion {id}"))?;
            print_json(out, &ack)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(out: &mut impl std::io::Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("serialize output")?;
    writeln!(out).context("write output")?;
    Ok(())
}
