//! appt - command-line client for Appointly

use std::path::PathBuf;

use anyhow::{Context, Result};
use appt_screens::app::{provider_rows, reduce, Action, AppState};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use libappointly::api::picker::FilePicker;
use libappointly::logging::LoggingConfig;
use libappointly::service::submission::messages;
use libappointly::service::AvatarOutcome;
use libappointly::types::{ProfileForm, SignUpForm, UserProfile};
use libappointly::{AppointlyError, BookingService, Config, SubmissionError};

#[derive(Parser, Debug)]
#[command(name = "appt")]
#[command(version, about = "Book appointments and manage your Appointly profile")]
#[command(long_about = r#"Book appointments and manage your Appointly profile.

EXAMPLES:
    # List providers
    appt providers

    # Preview a booking for provider 42 on a given day
    appt book --provider 42 --date 2026-03-14

    # Change name and email
    appt profile update --name "Ana Maria" --email ana@example.com

    # Change password
    appt profile update --name Ana --email ana@example.com \
        --old-password old --password new-secret --password-confirmation new-secret

    # Upload a new avatar
    appt profile avatar ~/me.jpg

SESSION:
    There is no sign-in command. `profile` commands read the session file at
    [session] path in the config (default ~/.local/share/appointly/session.toml):

        token = "<bearer token>"
        signed_in_at = "2026-01-05T10:00:00Z"

        [user]
        id = "u1"
        name = "Ana"
        email = "ana@example.com"

    `appt sign-out` deletes it.

EXIT CODES:
    0 - Success (including a cancelled avatar pick)
    1 - Remote, configuration or session file error
    2 - Not signed in
    3 - Validation failed
"#)]
struct Cli {
    /// Path to the configuration file (defaults to $APPOINTLY_CONFIG or the XDG config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List bookable providers
    Providers,

    /// Select a provider and date for a new appointment
    Book {
        /// Provider to book with
        #[arg(long, value_name = "ID")]
        provider: String,

        /// Appointment day (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },

    /// Show or change the signed-in profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },

    /// Create an account
    SignUp {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    SignOut,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the signed-in profile
    Show,

    /// Update name, email and optionally password
    Update {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        old_password: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        password_confirmation: String,
    },

    /// Upload a new avatar; without a path nothing is changed
    Avatar {
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env().verbose(cli.verbose).init();

    let json = cli.format == "json";
    if let Err(e) = run(cli).await {
        report_error(&e, json);
        std::process::exit(exit_code(&e));
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::load_or_default()?,
    };
    let service = BookingService::from_config(config)?;
    let json = cli.format == "json";

    match cli.command {
        Command::Providers => {
            let providers = service.providers().fetch().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&providers)?);
            } else if providers.is_empty() {
                println!("No providers available");
            } else {
                for provider in providers {
                    println!("{}\t{}", provider.id, provider.name);
                }
            }
        }

        Command::Book { provider, date } => book(&service, provider, date, json).await?,

        Command::Profile { command } => match command {
            ProfileCommand::Show => {
                print_profile(&service.session().current_user()?, json)?;
            }
            ProfileCommand::Update {
                name,
                email,
                old_password,
                password,
                password_confirmation,
            } => {
                service.session().current_user()?;
                let form = ProfileForm {
                    name,
                    email,
                    old_password,
                    password,
                    password_confirmation,
                };
                let profile = service.profile().submit(&form).await?;
                if !json {
                    println!("{}", messages::PROFILE_UPDATED);
                }
                print_profile(&profile, json)?;
            }
            ProfileCommand::Avatar { path } => {
                let picker = FilePicker::new(path);
                match service.avatar().update(&picker).await? {
                    AvatarOutcome::Updated(profile) => print_profile(&profile, json)?,
                    AvatarOutcome::Cancelled => {
                        if !json {
                            println!("Avatar unchanged");
                        }
                    }
                }
            }
        },

        Command::SignUp {
            name,
            email,
            password,
        } => {
            let user = service
                .sign_up()
                .submit(&SignUpForm {
                    name,
                    email,
                    password,
                })
                .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
            } else {
                println!("Account created for {} ({})", user.email, user.id);
            }
        }

        Command::SignOut => {
            service.sign_out()?;
            if !json {
                println!("Signed out");
            }
        }
    }

    Ok(())
}

/// Drive the booking screen state: open it for `provider_id`, load the
/// provider list and apply the chosen day
async fn book(
    service: &BookingService,
    provider_id: String,
    date: Option<NaiveDate>,
    json: bool,
) -> Result<()> {
    let state = AppState::for_session(
        service.session().current_user().ok(),
        service.config(),
    );
    let state = reduce(state, Action::OpenCreateAppointment { provider_id });
    let state = reduce(state, Action::ProvidersRequested);

    let state = match service.providers().fetch().await {
        Ok(providers) => reduce(state, Action::ProvidersLoaded(providers)),
        Err(e) => {
            let state = reduce(state, Action::ProvidersFailed(e.to_string()));
            if let Some(status) = &state.status {
                tracing::warn!("{}", status);
            }
            return Err(e.into());
        }
    };

    let state = match date {
        Some(day) => {
            let at = day.and_time(Utc::now().time()).and_utc();
            reduce(state, Action::SelectDate(at))
        }
        None => state,
    };

    let appointment = state
        .appointment
        .context("booking screen closed unexpectedly")?;
    let rows = provider_rows(&appointment.providers, &appointment.selection);
    let selection = &appointment.selection;

    if json {
        let providers: Vec<_> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.provider.id,
                    "name": row.provider.name,
                    "avatar_url": row.provider.avatar_url,
                    "selected": row.selected,
                })
            })
            .collect();
        let output = serde_json::json!({
            "selected_provider_id": selection.selected_provider_id,
            "selected_date": selection.selected_date,
            "providers": providers,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Booking with provider {} on {}",
            selection.selected_provider_id,
            selection.selected_date.format("%Y-%m-%d")
        );
        for row in rows {
            let mark = if row.selected { "x" } else { " " };
            println!("  [{}] {} ({})", mark, row.provider.name, row.provider.id);
        }
    }

    Ok(())
}

fn print_profile(profile: &UserProfile, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(profile)?);
    } else {
        println!("Name:   {}", profile.name);
        println!("Email:  {}", profile.email);
        println!(
            "Avatar: {}",
            profile.avatar_url.as_deref().unwrap_or("(none)")
        );
    }
    Ok(())
}

fn report_error(error: &anyhow::Error, json: bool) {
    let fields = error
        .downcast_ref::<SubmissionError>()
        .and_then(SubmissionError::validation_errors);

    if json {
        let output = serde_json::json!({
            "error": error.to_string(),
            "fields": fields,
        });
        println!("{}", output);
        return;
    }

    match fields {
        Some(fields) => {
            eprintln!("Error: validation failed");
            for (field, message) in fields.iter() {
                eprintln!("  {}: {}", field, message);
            }
        }
        None => eprintln!("Error: {:#}", error),
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    if let Some(e) = error.downcast_ref::<SubmissionError>() {
        return e.exit_code();
    }
    if let Some(e) = error.downcast_ref::<AppointlyError>() {
        return e.exit_code();
    }
    1
}
