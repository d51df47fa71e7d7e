//! Configuration for Probe
//!
//! CLI arguments and environment variable handling using clap. Sampling
//! parameters for generation are fixed in `probe-agent` and are not
//! configurable here.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use probe_agent::backend::gemini::DEFAULT_BASE_URL;
use probe_agent::ROADMAP_MODEL;
use probe_store::StoreConfig;
use roadmap::{RoadmapRequest, SkillLevel};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Probe - learning roadmaps from the command line
#[derive(Parser, Debug, Clone)]
#[command(name = "probe")]
#[command(about = "Create and track learning roadmaps")]
pub struct Args {
    /// API key for the generation service
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Generation model
    #[arg(long, env = "GEMINI_MODEL", default_value = ROADMAP_MODEL)]
    pub gemini_model: String,

    /// Generation service base URL
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    /// Hosted backend project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Hosted backend public anon key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub supabase_anon_key: Option<String>,

    /// Request timeout for the hosted backend in seconds
    #[arg(long, env = "SUPABASE_TIMEOUT_SECS", default_value = "30")]
    pub supabase_timeout_secs: u64,

    /// Where the signed-in session is kept between runs
    #[arg(long, env = "PROBE_SESSION_FILE", default_value = ".probe/session.json")]
    pub session_file: PathBuf,

    /// Public site URL; password recovery links land on {site}/reset-password
    #[arg(long, env = "PROBE_SITE_URL", default_value = "http://localhost:5173")]
    pub site_url: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PROBE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    SignUp {
        #[arg(long)]
        email: String,
        #[arg(long, env = "PROBE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Sign out and forget the saved session
    SignOut,
    /// Email password recovery instructions
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password using the token from a recovery link
    ResetPassword {
        /// Access token carried by the recovery link
        #[arg(long, env = "PROBE_RECOVERY_TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    /// Show remaining creations and your roadmaps
    Dashboard,
    /// Print a stored roadmap
    Show { id: String },
    /// Generate and store an AI roadmap
    CreateAi(RoadmapArgs),
    /// Store a custom roadmap
    CreateCustom(RoadmapArgs),
    /// Generate a roadmap and print it without storing anything
    Generate(RoadmapArgs),
    /// Send a message to the team
    Contact {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Show what navigating to a path would do
    Route { path: String },
}

/// Roadmap request fields shared by the creation commands.
#[derive(ClapArgs, Debug, Clone)]
pub struct RoadmapArgs {
    /// What you want to learn
    #[arg(long)]
    pub title: String,

    /// beginner, intermediate or advanced
    #[arg(long, default_value = "beginner")]
    pub skill_level: SkillLevel,

    /// Hours per week
    #[arg(long, default_value = "5")]
    pub hours: u32,

    /// Learning style; repeat for several
    #[arg(long = "style", required = true)]
    pub styles: Vec<String>,
}

impl RoadmapArgs {
    pub fn to_request(&self) -> RoadmapRequest {
        self.styles.iter().fold(
            RoadmapRequest::new(self.title.clone(), self.skill_level).with_weekly_hours(self.hours),
            |request, style| request.with_learning_style(style.trim()),
        )
    }
}

impl Args {
    /// Whether the command talks to the hosted backend.
    pub fn needs_backend(&self) -> bool {
        !matches!(self.command, Command::Generate(_))
    }

    /// Whether the command calls the generation service.
    pub fn needs_generator(&self) -> bool {
        matches!(self.command, Command::CreateAi(_) | Command::Generate(_))
    }

    /// Backend client settings. Call after [`validate`](Self::validate).
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            base_url: self.supabase_url.clone().unwrap_or_default(),
            anon_key: self.supabase_anon_key.clone().unwrap_or_default(),
            timeout_secs: self.supabase_timeout_secs,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "LOG_LEVEL must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if self.needs_generator() && self.gemini_api_key.as_deref().map_or(true, str::is_empty) {
            return Err("GEMINI_API_KEY is required to generate roadmaps".to_string());
        }

        if self.needs_backend() {
            match self.supabase_url.as_deref() {
                None | Some("") => return Err("SUPABASE_URL is required".to_string()),
                Some(url) if !url.starts_with("http://") && !url.starts_with("https://") => {
                    return Err(format!("SUPABASE_URL must be an http(s) URL, got {}", url));
                }
                _ => {}
            }
            if self.supabase_anon_key.as_deref().map_or(true, str::is_empty) {
                return Err("SUPABASE_ANON_KEY is required".to_string());
            }
        }

        Ok(())
    }
}
