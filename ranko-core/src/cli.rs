//! Command-line surface over the engine

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use ranko_common::db::{Geolocation, NewItem, NewRanking, RankingPatch};
use serde::Serialize;

use ranko_core::scores::ScoreInput;
use ranko_core::{DomainError, Engine};

/// Command-line arguments for ranko
#[derive(Parser, Debug)]
#[command(name = "ranko")]
#[command(about = "Collaborative ranking and scoring engine")]
#[command(version)]
pub struct Cli {
    /// Root folder holding the database
    #[arg(short, long, env = "RANKO_ROOT_FOLDER", global = true)]
    pub root_folder: Option<PathBuf>,

    /// Explicit config file
    #[arg(short, long, env = "RANKO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database if needed and exit
    Init,
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Ranking(RankingCommand),
    #[command(subcommand)]
    Criteria(CriteriaCommand),
    #[command(subcommand)]
    Invite(InviteCommand),
    #[command(subcommand)]
    Item(ItemCommand),
    #[command(subcommand)]
    Score(ScoreCommand),
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    Add {
        email: String,
        name: String,
        #[arg(long)]
        push: Option<String>,
    },
    /// Set (or clear, when omitted) the push destination
    Push {
        user: String,
        #[arg(long)]
        destination: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RankingCommand {
    Create {
        #[arg(long)]
        owner: String,
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        banner: Option<String>,
        #[arg(long)]
        geolocation: bool,
    },
    List {
        #[arg(long)]
        user: String,
    },
    Show {
        ranking: String,
        #[arg(long)]
        user: String,
    },
    Update {
        ranking: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        banner: Option<String>,
        #[arg(long)]
        geolocation: Option<bool>,
    },
    Delete {
        ranking: String,
        #[arg(long)]
        user: String,
    },
}

#[derive(Args, Debug)]
pub struct Scope {
    #[arg(long)]
    pub ranking: String,
    #[arg(long)]
    pub user: String,
}

#[derive(Subcommand, Debug)]
pub enum CriteriaCommand {
    Add {
        #[command(flatten)]
        scope: Scope,
        name: String,
    },
    List {
        #[command(flatten)]
        scope: Scope,
    },
}

#[derive(Subcommand, Debug)]
pub enum InviteCommand {
    Create {
        #[arg(long)]
        ranking: String,
        #[arg(long)]
        inviter: String,
        email: String,
    },
    Accept {
        invite: String,
        #[arg(long)]
        user: String,
    },
    Decline {
        invite: String,
        #[arg(long)]
        user: String,
    },
    Cancel {
        invite: String,
        #[arg(long)]
        user: String,
    },
    /// List by invitee email, or by ranking for one of its members
    List {
        #[arg(long, conflicts_with = "ranking")]
        email: Option<String>,
        #[arg(long, requires = "user")]
        ranking: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ItemCommand {
    Add {
        #[command(flatten)]
        scope: Scope,
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
        /// Photo reference; repeat for several
        #[arg(long = "photo")]
        photos: Vec<String>,
    },
    List {
        #[command(flatten)]
        scope: Scope,
    },
    Delete {
        item: String,
        #[arg(long)]
        user: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScoreCommand {
    Set {
        #[arg(long)]
        item: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        criteria: String,
        score: f64,
    },
    /// Several scores at once, each given as CRITERIA_ID=SCORE
    Batch {
        #[arg(long)]
        item: String,
        #[arg(long)]
        user: String,
        pairs: Vec<String>,
    },
    List {
        #[arg(long)]
        item: String,
        #[arg(long)]
        user: String,
    },
    Average {
        #[arg(long)]
        item: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    Ranking {
        #[arg(long)]
        ranking: String,
        #[arg(long)]
        user: String,
        description: String,
    },
    Item {
        #[arg(long)]
        ranking: String,
        #[arg(long)]
        item: String,
        #[arg(long)]
        user: String,
        description: String,
    },
}

/// Run one command and print its result as JSON
pub async fn run(engine: &Engine, command: Command) -> Result<()> {
    match command {
        Command::Init => print(&serde_json::json!({ "status": "ok" })),
        Command::User(cmd) => match cmd {
            UserCommand::Add { email, name, push } => print(
                &engine
                    .accounts
                    .register_user(&email, &name, push.as_deref())
                    .await
                    .map_err(domain)?,
            ),
            UserCommand::Push { user, destination } => {
                engine
                    .accounts
                    .set_push_destination(&user, destination.as_deref())
                    .await
                    .map_err(domain)?;
                print(&engine.accounts.profile(&user).await.map_err(domain)?)
            }
        },
        Command::Ranking(cmd) => run_ranking(engine, cmd).await,
        Command::Criteria(cmd) => match cmd {
            CriteriaCommand::Add { scope, name } => print(
                &engine
                    .rankings
                    .create_criteria(&scope.ranking, &scope.user, &name)
                    .await
                    .map_err(domain)?,
            ),
            CriteriaCommand::List { scope } => print(
                &engine
                    .rankings
                    .list_criteria(&scope.ranking, &scope.user)
                    .await
                    .map_err(domain)?,
            ),
        },
        Command::Invite(cmd) => run_invite(engine, cmd).await,
        Command::Item(cmd) => run_item(engine, cmd).await,
        Command::Score(cmd) => run_score(engine, cmd).await,
        Command::Report(cmd) => match cmd {
            ReportCommand::Ranking {
                ranking,
                user,
                description,
            } => print(
                &engine
                    .reports
                    .report_ranking(&ranking, &user, &description)
                    .await
                    .map_err(domain)?,
            ),
            ReportCommand::Item {
                ranking,
                item,
                user,
                description,
            } => print(
                &engine
                    .reports
                    .report_item(&ranking, &item, &user, &description)
                    .await
                    .map_err(domain)?,
            ),
        },
    }
}

async fn run_ranking(engine: &Engine, cmd: RankingCommand) -> Result<()> {
    let rankings = &engine.rankings;
    match cmd {
        RankingCommand::Create {
            owner,
            name,
            description,
            banner,
            geolocation,
        } => {
            let data = NewRanking {
                name,
                description,
                banner,
                geolocation_enabled: geolocation,
            };
            print(&rankings.create_ranking(&owner, data).await.map_err(domain)?)
        }
        RankingCommand::List { user } => {
            print(&rankings.list_rankings_for_user(&user).await.map_err(domain)?)
        }
        RankingCommand::Show { ranking, user } => {
            print(&rankings.get_ranking(&ranking, &user).await.map_err(domain)?)
        }
        RankingCommand::Update {
            ranking,
            user,
            name,
            description,
            banner,
            geolocation,
        } => {
            let patch = RankingPatch {
                name,
                description,
                banner,
                geolocation_enabled: geolocation,
            };
            print(
                &rankings
                    .update_ranking(&ranking, &user, patch)
                    .await
                    .map_err(domain)?,
            )
        }
        RankingCommand::Delete { ranking, user } => {
            rankings.delete_ranking(&ranking, &user).await.map_err(domain)?;
            print(&serde_json::json!({ "deleted": ranking }))
        }
    }
}

async fn run_invite(engine: &Engine, cmd: InviteCommand) -> Result<()> {
    let invites = &engine.invites;
    match cmd {
        InviteCommand::Create {
            ranking,
            inviter,
            email,
        } => print(
            &invites
                .create_invite(&ranking, &email, &inviter)
                .await
                .map_err(domain)?,
        ),
        InviteCommand::Accept { invite, user } => {
            print(&invites.accept_invite(&invite, &user).await.map_err(domain)?)
        }
        InviteCommand::Decline { invite, user } => {
            invites.decline_invite(&invite, &user).await.map_err(domain)?;
            print(&serde_json::json!({ "declined": invite }))
        }
        InviteCommand::Cancel { invite, user } => {
            invites.cancel_invite(&invite, &user).await.map_err(domain)?;
            print(&serde_json::json!({ "cancelled": invite }))
        }
        InviteCommand::List {
            email,
            ranking,
            user,
        } => match (email, ranking, user) {
            (Some(email), _, _) => {
                print(&invites.list_invites_by_email(&email).await.map_err(domain)?)
            }
            (None, Some(ranking), Some(user)) => print(
                &invites
                    .list_invites_by_ranking(&ranking, &user)
                    .await
                    .map_err(domain)?,
            ),
            _ => bail!("pass --email, or --ranking with --user"),
        },
    }
}

async fn run_item(engine: &Engine, cmd: ItemCommand) -> Result<()> {
    let items = &engine.items;
    match cmd {
        ItemCommand::Add {
            scope,
            name,
            description,
            link,
            latitude,
            longitude,
            photos,
        } => {
            let geolocation = match (latitude, longitude) {
                (Some(latitude), Some(longitude)) => Some(Geolocation {
                    latitude,
                    longitude,
                }),
                _ => None,
            };
            let data = NewItem {
                name,
                description,
                link,
                geolocation,
                photos,
            };
            print(
                &items
                    .create_item(&scope.ranking, &scope.user, data)
                    .await
                    .map_err(domain)?,
            )
        }
        ItemCommand::List { scope } => print(
            &items
                .list_items(&scope.ranking, &scope.user)
                .await
                .map_err(domain)?,
        ),
        ItemCommand::Delete { item, user } => {
            items.delete_item(&item, &user).await.map_err(domain)?;
            print(&serde_json::json!({ "deleted": item }))
        }
    }
}

async fn run_score(engine: &Engine, cmd: ScoreCommand) -> Result<()> {
    let scores = &engine.scores;
    match cmd {
        ScoreCommand::Set {
            item,
            user,
            criteria,
            score,
        } => print(
            &scores
                .upsert_score(&item, &user, &criteria, score)
                .await
                .map_err(domain)?,
        ),
        ScoreCommand::Batch { item, user, pairs } => {
            let pairs = pairs
                .iter()
                .map(|pair| parse_pair(pair))
                .collect::<Result<Vec<_>>>()?;
            print(
                &scores
                    .batch_upsert_scores(&item, &user, &pairs)
                    .await
                    .map_err(domain)?,
            )
        }
        ScoreCommand::List { item, user } => {
            print(&scores.list_scores(&item, &user).await.map_err(domain)?)
        }
        ScoreCommand::Average { item } => {
            let average = scores.average_score(&item).await.map_err(domain)?;
            print(&serde_json::json!({ "item_id": item, "average_score": average }))
        }
    }
}

fn parse_pair(pair: &str) -> Result<ScoreInput> {
    let (criteria_id, score) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("expected CRITERIA_ID=SCORE, got {pair}"))?;
    let score = score
        .trim()
        .parse::<f64>()
        .map_err(|e| anyhow!("invalid score in {pair}: {e}"))?;
    Ok(ScoreInput {
        criteria_id: criteria_id.trim().to_string(),
        score,
    })
}

fn domain(err: DomainError) -> anyhow::Error {
    anyhow!("{}: {}", err.kind(), err)
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
