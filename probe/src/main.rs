//! Probe - learning roadmaps from the command line

use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use probe::{
    config::{Args, Command, RoadmapArgs},
    routes::{self, Route},
    screens::{
        ContactForm, ContactScreen, CreateAiRoadmapScreen, CreateCustomRoadmapScreen,
        DashboardScreen, ForgotPasswordForm, ForgotPasswordScreen, ResetPasswordForm,
        ResetPasswordScreen, SignInForm, SignInScreen, SignUpForm, SignUpResult, SignUpScreen,
    },
    AppContext, AppError, FileSession, Notification, SessionContext, Toaster,
};
use probe_agent::{backend::GeminiBackend, RoadmapGenerator};
use probe_store::{GoTrueAuth, ProbeData, RestStore, RoadmapBody};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging. Logs go to stderr; results go to stdout.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("probe={},info", args.log_level.to_lowercase()).into());
    let json_layer = args
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!args.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let generator = if args.needs_generator() {
        let backend = GeminiBackend::new(
            &args.gemini_base_url,
            &args.gemini_model,
            args.gemini_api_key.clone().unwrap_or_default(),
        )?;
        let generator = RoadmapGenerator::new(Arc::new(backend));
        info!(backend = generator.backend_id(), "Generation backend ready");
        Some(Arc::new(generator))
    } else {
        None
    };

    // Offline generation needs no backend or session.
    if let Command::Generate(roadmap) = &args.command {
        let generator = generator.ok_or_else(|| anyhow::anyhow!("generator not configured"))?;
        return generate(&generator, roadmap).await;
    }

    let store_config = args.store_config();
    let store = Arc::new(RestStore::new(store_config.clone())?);
    let auth = Arc::new(GoTrueAuth::new(store_config)?);
    let session = SessionContext::init(
        auth,
        ProbeData::new(store),
        Arc::new(FileSession::new(&args.session_file)),
    )
    .await;

    let toaster = Toaster::default();
    let mut notes = toaster.subscribe();
    let ctx = AppContext::new(Arc::new(session), toaster, args.site_url.clone());

    let result = run(&ctx, generator, args.command.clone()).await;

    print_notifications(&mut notes);
    if let Ok(session) = Arc::try_unwrap(ctx.session) {
        session.teardown();
    }

    match result {
        Ok(()) => Ok(()),
        Err(AppError::Validation(errors)) => {
            for e in errors {
                eprintln!("{}: {}", e.field, e.message);
            }
            std::process::exit(2);
        }
        Err(AppError::NotSignedIn) => {
            eprintln!("Not signed in. Run `probe sign-in` first.");
            std::process::exit(1);
        }
        Err(_) => std::process::exit(1),
    }
}

async fn generate(generator: &RoadmapGenerator, roadmap: &RoadmapArgs) -> anyhow::Result<()> {
    let request = roadmap.to_request();
    if let Err(errors) = request.validate() {
        for e in errors {
            eprintln!("{}: {}", e.field, e.message);
        }
        std::process::exit(2);
    }
    let generation = generator.generate_detailed(&request).await?;
    println!("{}", serde_json::to_string_pretty(&generation.content)?);
    Ok(())
}

async fn run(
    ctx: &AppContext,
    generator: Option<Arc<RoadmapGenerator>>,
    command: Command,
) -> Result<(), AppError> {
    match command {
        Command::SignIn { email, password } => {
            let next = SignInScreen::new(ctx.clone())
                .submit(&SignInForm { email, password })
                .await?;
            println!("→ {}", next);
        }
        Command::SignUp {
            email,
            password,
            confirm_password,
        } => {
            let form = SignUpForm {
                email,
                password,
                confirm_password,
            };
            match SignUpScreen::new(ctx.clone()).submit(&form).await? {
                SignUpResult::AwaitingConfirmation => {
                    println!("We've sent you a confirmation email. Follow the link to activate your account.");
                }
                SignUpResult::SignedIn(next) => println!("→ {}", next),
            }
        }
        Command::SignOut => {
            ctx.session.sign_out().await?;
            println!("Signed out");
        }
        Command::ForgotPassword { email } => {
            ForgotPasswordScreen::new(ctx.clone())
                .submit(&ForgotPasswordForm { email })
                .await?;
        }
        Command::ResetPassword {
            token,
            password,
            confirm_password,
        } => {
            if let Some(token) = token {
                // A rejected token leaves no session; the screen reports it.
                if let Err(e) = ctx.session.adopt_access_token(&token).await {
                    info!(error = %e, "Recovery token rejected");
                }
            }
            let next = ResetPasswordScreen::new(ctx.clone())
                .submit(&ResetPasswordForm {
                    password,
                    confirm_password,
                })
                .await?;
            println!("→ {}", next);
        }
        Command::Dashboard => {
            let view = DashboardScreen::new(ctx.clone()).load().await?;
            println!(
                "AI roadmaps remaining: {}\nCustom roadmaps remaining: {}",
                view.profile.ai_roadmaps_remaining, view.profile.custom_roadmaps_remaining
            );
            if view.show_upgrade_prompt() {
                println!("Upgrade to premium for more roadmaps.");
            }
            if view.roadmaps.is_empty() {
                println!("No roadmaps yet.");
            }
            for r in &view.roadmaps {
                println!(
                    "{}  {:<6} {:<12} {}  {}",
                    r.created_at.format("%Y-%m-%d"),
                    r.kind,
                    r.skill_level,
                    r.id,
                    r.title
                );
            }
        }
        Command::Show { id } => {
            let roadmap = DashboardScreen::new(ctx.clone()).open(&id).await?;
            match &roadmap.content {
                RoadmapBody::Tree(content) => println!("{}", serde_json::to_string_pretty(content)?),
                RoadmapBody::Text(text) => println!("{}", text),
            }
        }
        Command::CreateAi(roadmap) => {
            let generator = generator.ok_or_else(|| AppError::Config("generator not configured".into()))?;
            let created = CreateAiRoadmapScreen::new(ctx.clone(), generator)
                .submit(&roadmap.to_request())
                .await?;
            println!("→ {}", created.navigate);
        }
        Command::CreateCustom(roadmap) => {
            let created = CreateCustomRoadmapScreen::new(ctx.clone())
                .submit(&roadmap.to_request())
                .await?;
            println!("→ {}", created.navigate);
        }
        Command::Contact {
            name,
            email,
            message,
        } => {
            let screen = ContactScreen::new(ctx.clone());
            let prefilled = screen.form();
            let form = ContactForm {
                name: name.unwrap_or(prefilled.name),
                email: email.unwrap_or(prefilled.email),
                message,
            };
            screen.submit(&form).await?;
        }
        Command::Route { path } => {
            let route = Route::parse(&path)
                .ok_or_else(|| AppError::Rejected(format!("No page at {}", path)))?;
            println!("{:?}", routes::guard(&route, &ctx.session.state()));
        }
        Command::Generate(_) => {
            return Err(AppError::Config("generate runs without a session".to_string()));
        }
    }
    Ok(())
}

fn print_notifications(notes: &mut broadcast::Receiver<Notification>) {
    while let Ok(note) = notes.try_recv() {
        println!("{}", note);
    }
}
