//! Command-line interface for the assistant.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use serde::de::DeserializeOwned;
use serde::Serialize;

use civicai_shared::{Message, UserProfile};

use crate::client::GeminiClient;
use crate::config::AssistantConfig;
use crate::error::{AssistantError, Result};
use crate::language::Language;
use crate::request::{InlineImage, DEFAULT_IMAGE_MIME_TYPE};
use crate::schema::ResponseShape;
use crate::service::{ChatMode, CitizenAssistant};

/// CivicAI - citizen-services assistant backed by a hosted language model.
#[derive(Parser)]
#[command(name = "civicai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Response language code (en, hi, mr, ta, bn)
    #[arg(short, long, global = true, default_value = "en")]
    pub lang: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find welfare schemes matching a need and a citizen profile.
    Schemes {
        query: String,

        /// Profile JSON file (camelCase fields)
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Ask the service guide; answers cite official sources.
    Ask {
        query: String,

        /// Conversation history JSON file, updated with this turn
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Ask the identity vault assistant.
    ProfileChat {
        query: String,

        /// Conversation history JSON file, updated with this turn
        #[arg(long)]
        history: Option<PathBuf>,
    },

    /// Read identity fields from a document image.
    ExtractProfile {
        image: PathBuf,

        /// Profile JSON file to merge the extracted fields into
        #[arg(short, long)]
        profile: Option<PathBuf>,
    },

    /// Turn a free-text request into a formal application draft.
    Draft { conversation: String },

    /// Explain a government service.
    ServiceInfo { service_name: String },

    /// Estimate the rejection risk of an application.
    Risk {
        service_name: String,

        /// Short description of the service
        #[arg(short, long, default_value = "")]
        summary: String,
    },

    /// Explain a form from a text file.
    AnalyzeForm { file: PathBuf },

    /// Transcribe the text of an image.
    Transcribe { image: PathBuf },

    /// Classify a citizen query.
    Classify { query: String },

    /// Classify and file a grievance.
    Grievance {
        description: String,

        #[arg(short, long, default_value = "")]
        subject: String,
    },
}

/// Run the CLI.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let language = Language::from_code(&cli.lang);

    let config = AssistantConfig::from_env()?;
    let client = GeminiClient::new(&config)?;
    let assistant = CitizenAssistant::new(&client);

    match cli.command {
        Commands::Schemes { query, profile } => {
            let profile = match profile {
                Some(path) => read_json::<UserProfile>(&path).await?,
                None => UserProfile::default(),
            };
            announce("Searching schemes", &query);
            let schemes = assistant
                .find_eligible_schemes(&query, &profile, language)
                .await?;
            print_json(&schemes)
        }
        Commands::Ask { query, history } => {
            announce("Asking", &query);
            chat(&assistant, ChatMode::ServiceGuide, &query, history, language).await
        }
        Commands::ProfileChat { query, history } => {
            announce("Asking", &query);
            chat(&assistant, ChatMode::Profile, &query, history, language).await
        }
        Commands::ExtractProfile { image, profile } => {
            let inline = read_image(&image).await?;
            announce("Reading", &image.display().to_string());
            match profile {
                Some(path) => {
                    let existing = if path.exists() {
                        read_json::<UserProfile>(&path).await?
                    } else {
                        UserProfile::default()
                    };
                    let updated = assistant
                        .digitize_document(existing, &inline, language)
                        .await?;
                    write_json(&path, &updated).await?;
                    saved(&path);
                    print_json(&updated)
                }
                None => {
                    let extracted = assistant
                        .extract_profile_from_image(&inline, language)
                        .await?;
                    print_json(&extracted)
                }
            }
        }
        Commands::Draft { conversation } => {
            announce("Drafting", "application");
            print_json(&assistant.parse_generic_draft(&conversation, language).await?)
        }
        Commands::ServiceInfo { service_name } => {
            announce("Looking up", &service_name);
            print_json(&assistant.fetch_service_info(&service_name, language).await?)
        }
        Commands::Risk {
            service_name,
            summary,
        } => {
            announce("Assessing", &service_name);
            print_json(
                &assistant
                    .predict_rejection_risk(&service_name, &summary, language)
                    .await?,
            )
        }
        Commands::AnalyzeForm { file } => {
            let form_text = tokio::fs::read_to_string(&file).await?;
            announce("Analyzing", &file.display().to_string());
            print_json(&assistant.analyze_form(&form_text, language).await?)
        }
        Commands::Transcribe { image } => {
            let inline = read_image(&image).await?;
            announce("Transcribing", &image.display().to_string());
            print_text(&assistant.extract_text_from_image(&inline, language).await?);
            Ok(())
        }
        Commands::Classify { query } => {
            announce("Classifying", &query);
            print_json(&assistant.classify_query(&query, language).await?)
        }
        Commands::Grievance {
            description,
            subject,
        } => {
            announce("Filing", "grievance");
            let grievance = assistant
                .file_grievance(&subject, &description, language)
                .await?;
            eprintln!(
                "{} {} to {}",
                style("Filed").green().bold(),
                style(&grievance.id).cyan(),
                style(&grievance.department).green()
            );
            println!("{}", serde_json::to_string_pretty(&grievance)?);
            Ok(())
        }
    }
}

async fn chat(
    assistant: &CitizenAssistant<'_, GeminiClient>,
    mode: ChatMode,
    query: &str,
    history_path: Option<PathBuf>,
    language: Language,
) -> Result<()> {
    let Some(path) = history_path else {
        let reply = match mode {
            ChatMode::ServiceGuide => assistant.ask_assistant(query, &[], language).await?,
            ChatMode::Profile => assistant.ask_profile_assistant(query, &[], language).await?,
        };
        print_text(&reply);
        return Ok(());
    };

    let history = if path.exists() {
        read_json::<Vec<Message>>(&path).await?
    } else {
        Vec::new()
    };
    let history = assistant.converse(mode, history, query, language).await?;
    write_json(&path, &history).await?;

    if let Some(reply) = history.last() {
        print_text(&reply.content);
    }
    saved(&path);
    Ok(())
}

/// MIME type for an image path, by extension.
fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("pdf") => "application/pdf",
        _ => DEFAULT_IMAGE_MIME_TYPE,
    }
}

async fn read_image(path: &Path) -> Result<InlineImage> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.is_empty() {
        return Err(AssistantError::InvalidInput(format!(
            "image file is empty: {}",
            path.display()
        )));
    }
    Ok(InlineImage::from_bytes(mime_type_for(path), &bytes))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

fn announce(action: &str, subject: &str) {
    eprintln!("{} {}", style(action).bold(), style(subject).cyan());
}

fn saved(path: &Path) {
    eprintln!("{} {}", style("Saved to:").green().bold(), path.display());
}

fn print_text(text: &str) {
    if text.trim().is_empty() {
        eprintln!("{}", style("No results.").dim());
    } else {
        println!("{text}");
    }
}

/// Pretty JSON for a decoded record, or `None` when the model gave nothing usable.
fn render_json<T: ResponseShape + Serialize + PartialEq>(value: &T) -> Result<Option<String>> {
    if value.is_empty_value() {
        return Ok(None);
    }
    Ok(Some(serde_json::to_string_pretty(value)?))
}

fn print_json<T: ResponseShape + Serialize + PartialEq>(value: &T) -> Result<()> {
    match render_json(value)? {
        Some(json) => println!("{json}"),
        None => eprintln!("{}", style("No results.").dim()),
    }
    Ok(())
}
