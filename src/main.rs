use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};

use rednote::{
  Category
, ContentGenerator
, GenerationRequest
, GenerationResult
, GeneratorConfig
, History
, HistoryEntry
, Length
, Style
};

/// Generate a Xiaohongshu note from a theme
#[derive(Debug, Parser)]
#[command(name = "rednote", version)]
struct Cli
{   /// Core theme of the note
    #[arg(short, long)]
    theme: String
  , /// Style label or name (种草, 干货, 测评, 情感, 搞笑, 治愈, 教程)
    #[arg(short, long, default_value = "种草")]
    style: Style
  , /// Length label (短/中/长 or short/medium/long)
    #[arg(short, long, default_value = "中（200字）")]
    length: String
  , /// Category label or name (美妆, 美食, 职场, 旅行, 数码, 教育, 健康, 其他)
    #[arg(short, long, default_value = "其他")]
    category: Category
  , /// Moonshot API key
    #[arg(long, env = "MOONSHOT_API_KEY", hide_env_values = true)]
    api_key: String
  , /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>
  , /// Directory to write the generated note into
    #[arg(long)]
    save: Option<PathBuf>
}

fn load_config(path: Option<&PathBuf>)
  -> Result<GeneratorConfig, rednote::Error>
{   let config = match path
    {   Some(path) => GeneratorConfig::from_file(path)?
      , None => GeneratorConfig::default()
    };
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::init();
    let cli = Cli::parse();

    let generator = match load_config(cli.config.as_ref())
      .and_then(|config| ContentGenerator::new(&config))
    {   Ok(generator) => generator
      , Err(e) => {
          error!("Configuration error: {}", e);
          eprintln!("❌ {}", e);
          return ExitCode::FAILURE;
        }
    };

    let request = GenerationRequest::new(
      cli.theme
    , cli.style
    , Length::from(cli.length.as_str())
    , cli.category
    , cli.api_key
    );

    match generator.generate(&request).await
    {   GenerationResult::Success { text } => {
          println!("{}", text);
          let history = History::new()
            .record(HistoryEntry::from_success(&request, text));
          if let Some(dir) = cli.save
          {   for entry in history.newest_first()
              {   let path = dir.join(entry.export_file_name());
                  debug!("Writing {}", path.display());
                  if let Err(e) = std::fs::write(&path, &entry.text)
                  {   error!("Failed to write {}: {}", path.display(), e);
                      eprintln!("❌ {}: {}", path.display(), e);
                      return ExitCode::FAILURE;
                  }
                  eprintln!("💾 {}", path.display());
              }
          }
          ExitCode::SUCCESS
        }
      , GenerationResult::Failure(failure) => {
          eprintln!("❌ {}", failure);
          if let Some(trace) = &failure.trace
          {   eprintln!("{}", trace);
          }
          ExitCode::FAILURE
        }
    }
}
