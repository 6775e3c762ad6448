use anyhow::Result;
use clap::{Parser, Subcommand};
use product_studio::app::{read_image, App};
use product_studio::models::{parse_aspect_ratio, Config, GenerationRequest, StyleTag};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "product-studio")]
#[command(about = "Generate, edit and animate product imagery with Vertex AI")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Interactive studio session (default).
    Shell,
    /// Generate images from a prompt and/or a reference image.
    Image {
        prompt: Option<String>,
        #[arg(long, default_value = "ecommerce", value_parser = parse_style_arg)]
        style: StyleTag,
        #[arg(long, default_value_t = 1)]
        count: u8,
        /// Elements to avoid.
        #[arg(long)]
        negative: Option<String>,
        /// One of 1:1, 3:4, 4:3, 9:16, 16:9.
        #[arg(long, value_parser = parse_aspect_arg)]
        aspect_ratio: Option<String>,
        /// Reference image of the product.
        #[arg(long = "ref", value_name = "PATH")]
        reference: Option<PathBuf>,
    },
    /// Transform an existing image in a style.
    Edit {
        image: PathBuf,
        instruction: Option<String>,
        #[arg(long, default_value = "ecommerce", value_parser = parse_style_arg)]
        style: StyleTag,
        #[arg(long)]
        negative: Option<String>,
    },
    /// Generate a video, optionally animating a reference image.
    Video {
        prompt: String,
        #[arg(long = "ref", value_name = "PATH")]
        reference: Option<PathBuf>,
    },
}

fn parse_style_arg(input: &str) -> std::result::Result<StyleTag, String> {
    input.parse::<StyleTag>().map_err(|e| e.to_string())
}

fn parse_aspect_arg(input: &str) -> std::result::Result<String, String> {
    parse_aspect_ratio(input).map_err(|e| e.to_string())
}

async fn run(app: &mut App, command: CliCommand) -> product_studio::Result<()> {
    match command {
        CliCommand::Shell => app.run_shell().await,
        CliCommand::Image {
            prompt,
            style,
            count,
            negative,
            aspect_ratio,
            reference,
        } => {
            let mut request =
                GenerationRequest::new(prompt.unwrap_or_default(), style).with_count(count);
            request.negative_prompt = negative;
            request.aspect_ratio = aspect_ratio;
            if let Some(path) = reference {
                request.reference_image = Some(read_image(&path).await?);
            }
            for path in app.generate_once(&request).await? {
                println!("{}", path.display());
            }
            Ok(())
        }
        CliCommand::Edit {
            image,
            instruction,
            style,
            negative,
        } => {
            let path = app
                .edit_once(&image, instruction.as_deref(), negative.as_deref(), style)
                .await?;
            println!("{}", path.display());
            Ok(())
        }
        CliCommand::Video { prompt, reference } => {
            let cancel = CancellationToken::new();
            let watcher = {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                })
            };
            let result = app.video_once(&prompt, reference.as_deref(), &cancel).await;
            watcher.abort();
            println!("{}", result?.display());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_studio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting product-studio");

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    match App::new(&config).await {
        Ok(mut app) => match run(&mut app, args.command.unwrap_or(CliCommand::Shell)).await {
            // A shell left with Ctrl-C still has a stdin read pending on the
            // blocking pool, which would keep the runtime from shutting down.
            Ok(_) => std::process::exit(0),
            Err(e) => {
                error!("{}", e);
                if let Some(text) = e.fallback_text() {
                    error!("Model response: {}", text);
                }
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    }
}
