//! CLI commands

use anyhow::{Context, Result, bail};
use avatarmart_core::{Locale, RegisterRequest, Role};
use avatarmart_frontend::{AppConfig, AuthOutcome, AuthSession, Route};
use avatarmart_http::{AvatarUpdate, NewTrainingRequest, Upload};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config;

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and store the session tokens
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "AVATARMART_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log into it
    Register {
        #[arg(long)]
        email: String,

        #[arg(long, env = "AVATARMART_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        nickname: Option<String>,

        /// buyer or influencer
        #[arg(long, default_value = "buyer")]
        role: String,

        /// en, ko or ja
        #[arg(long, default_value = "en")]
        locale: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Request the influencer role for the current account
    Upgrade,

    /// List generations charged to the current buyer
    Generations,

    /// List avatars owned by the current seller
    Avatars,

    /// Edit one of your avatars
    AvatarUpdate {
        /// Avatar ID
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        credits: Option<i64>,

        #[arg(long)]
        description: Option<String>,

        /// Replacement preview image
        #[arg(long)]
        preview: Option<PathBuf>,
    },

    /// List training requests submitted by the current seller
    TrainingRequests,

    /// Submit a new avatar for training
    TrainingRequestCreate(TrainingRequestArgs),

    /// Resolve a location path through the router
    Route {
        /// Path such as /avatars/42
        path: String,
    },
}

#[derive(Args)]
pub struct TrainingRequestArgs {
    /// Avatar name
    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "")]
    pub negative_prompt: String,

    /// Credits charged per generation
    #[arg(long)]
    pub credits: i64,

    #[arg(long)]
    pub national: String,

    #[arg(long)]
    pub gender: String,

    #[arg(long, default_value = "")]
    pub description: String,

    /// The avatar depicts a real person
    #[arg(long)]
    pub real_person: bool,

    /// Instagram handle, sent only with --real-person
    #[arg(long)]
    pub instagram_id: Option<String>,

    #[arg(long)]
    pub preview: PathBuf,

    #[arg(long)]
    pub front: Vec<PathBuf>,

    #[arg(long)]
    pub side: Vec<PathBuf>,

    #[arg(long)]
    pub fullbody: Vec<PathBuf>,

    #[arg(long)]
    pub other: Vec<PathBuf>,
}

impl Commands {
    pub async fn execute(self, settings: &AppConfig) -> Result<()> {
        match self {
            // Offline, no token file needed
            Commands::Route { path } => resolve_route(&path),
            command => command.run(config::open_session(settings)?).await,
        }
    }

    async fn run(self, session: AuthSession) -> Result<()> {
        match self {
            Commands::Login { email, password } => {
                let outcome = session.login(&email, &password).await;
                finish_auth(&session, outcome)
            }
            Commands::Register {
                email,
                password,
                nickname,
                role,
                locale,
            } => {
                let mut registration = RegisterRequest::new(email, password)
                    .role(Role::from(role))
                    .locale(Locale::from(locale));
                if let Some(nickname) = nickname {
                    registration = registration.nickname(nickname);
                }
                let outcome = session.register(&registration).await;
                finish_auth(&session, outcome)
            }
            Commands::Logout => {
                session.logout();
                println!("Logged out");
                Ok(())
            }
            Commands::Whoami => {
                session.fetch_current_user().await?;
                let user = session.user().context("Not logged in")?;
                print_json(&*user)
            }
            Commands::Upgrade => {
                session.upgrade_to_seller().await?;
                let user = session.user().context("Upgrade returned no user")?;
                info!(role = %user.role, "Account upgraded");
                print_json(&*user)
            }
            Commands::Generations => print_json(&session.client().my_generations().await?),
            Commands::Avatars => print_json(&session.client().my_avatars().await?),
            Commands::AvatarUpdate {
                id,
                title,
                credits,
                description,
                preview,
            } => {
                let preview_image = match preview {
                    Some(path) => Some(read_upload(&path).await?),
                    None => None,
                };
                let update = AvatarUpdate {
                    title,
                    credit_per_generation: credits,
                    description,
                    preview_image,
                };
                print_json(&session.client().update_avatar(id, &update).await?)
            }
            Commands::TrainingRequests => {
                print_json(&session.client().my_training_requests().await?)
            }
            Commands::TrainingRequestCreate(args) => {
                let request = args.into_request().await?;
                let created = session.client().create_training_request(&request).await?;
                info!(id = created.id, "Training request submitted");
                print_json(&created)
            }
            Commands::Route { path } => resolve_route(&path),
        }
    }
}

impl TrainingRequestArgs {
    async fn into_request(self) -> Result<NewTrainingRequest> {
        Ok(NewTrainingRequest {
            avatar_name: self.name,
            negative_prompt: self.negative_prompt,
            credit_per_generation: self.credits,
            national: self.national,
            gender: self.gender,
            description: self.description,
            is_real_person: self.real_person,
            instagram_id: self.instagram_id,
            preview_image: read_upload(&self.preview).await?,
            front_photos: read_uploads(&self.front).await?,
            side_photos: read_uploads(&self.side).await?,
            fullbody_photos: read_uploads(&self.fullbody).await?,
            other_photos: read_uploads(&self.other).await?,
        })
    }
}

fn finish_auth(session: &AuthSession, outcome: AuthOutcome) -> Result<()> {
    match outcome {
        AuthOutcome::Success => {
            let user = session.user().context("Login returned no user")?;
            print_json(&*user)
        }
        AuthOutcome::Failure { error } => bail!(error),
    }
}

fn resolve_route(path: &str) -> Result<()> {
    let route = Route::resolve(path).with_context(|| format!("No route matches {path}"))?;
    let mut value = serde_json::to_value(route.entry())?;
    if let Route::AvatarDetail { id } = &route {
        value["params"] = serde_json::json!({ "id": id });
    }
    print_json(&value)
}

async fn read_upload(path: &Path) -> Result<Upload> {
    Upload::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

async fn read_uploads(paths: &[PathBuf]) -> Result<Vec<Upload>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        uploads.push(read_upload(path).await?);
    }
    Ok(uploads)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
