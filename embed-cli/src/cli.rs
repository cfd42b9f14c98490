//! CLI parser and request building.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgMatches, Args, CommandFactory, FromArgMatches, Parser, Subcommand};
use embedding::{EmbedInput, EmbedRequest, EmbedResponse, ProviderConfig, ProviderId};
use serde_json::{json, Value};

/// Number of leading vector components shown in output.
const PREVIEW_COMPONENTS: usize = 8;

#[derive(Parser, Debug)]
#[command(name = "embed")]
#[command(about = "Text embeddings CLI: providers, embed, auto", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Also append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Parses `args`, keeping the command-line order of `--text` and `--file` inputs.
    pub fn try_parse_ordered<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        let mut cli = Self::from_arg_matches(&matches)?;
        if let (Some((_, sub)), Some(inputs)) = (matches.subcommand(), cli.command.inputs_mut()) {
            inputs.record_positions(sub);
        }
        Ok(cli)
    }

    /// Parses the process arguments like [`Parser::parse`], exiting on error.
    pub fn parse_ordered() -> Self {
        Self::try_parse_ordered(std::env::args_os()).unwrap_or_else(|e| e.exit())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List supported provider ids.
    Providers,
    /// Embed with one named provider (credential and overrides from env).
    Embed {
        #[arg(short, long)]
        provider: ProviderId,
        #[arg(short, long)]
        model: Option<String>,
        #[command(flatten)]
        inputs: InputArgs,
    },
    /// Embed with the first available provider.
    Auto {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

impl Commands {
    fn inputs_mut(&mut self) -> Option<&mut InputArgs> {
        match self {
            Commands::Providers => None,
            Commands::Embed { inputs, .. } | Commands::Auto { inputs } => Some(inputs),
        }
    }
}

#[derive(Args, Debug)]
pub struct InputArgs {
    /// Literal text; repeat for a batch.
    #[arg(short, long = "text")]
    pub texts: Vec<String>,
    /// UTF-8 file to embed; repeat for a batch.
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,
    /// Command-line positions of `texts` and `files`, when parsed with [`Cli::try_parse_ordered`].
    #[arg(skip)]
    positions: Option<(Vec<usize>, Vec<usize>)>,
}

impl InputArgs {
    fn record_positions(&mut self, matches: &ArgMatches) {
        let indices = |id: &str| -> Vec<usize> {
            matches
                .indices_of(id)
                .map(|indices| indices.collect())
                .unwrap_or_default()
        };
        self.positions = Some((indices("texts"), indices("files")));
    }

    /// One input is a single request; several are a batch in command-line order
    /// (texts before files when positions were not recorded).
    pub fn into_request(self) -> Result<EmbedRequest> {
        let text_count = self.texts.len();
        let (text_positions, file_positions) = self.positions.unwrap_or_else(|| {
            let files = text_count..text_count + self.files.len();
            ((0..text_count).collect(), files.collect())
        });
        let texts = text_positions
            .into_iter()
            .zip(self.texts.into_iter().map(EmbedInput::Text));
        let files = file_positions
            .into_iter()
            .zip(self.files.into_iter().map(EmbedInput::File));
        let mut positioned: Vec<(usize, EmbedInput)> = texts.chain(files).collect();
        positioned.sort_by_key(|(position, _)| *position);

        let mut inputs: Vec<EmbedInput> = positioned.into_iter().map(|(_, input)| input).collect();
        match inputs.len() {
            0 => anyhow::bail!("at least one --text or --file is required"),
            1 => Ok(EmbedRequest::Single(inputs.remove(0))),
            _ => Ok(EmbedRequest::Batch(inputs)),
        }
    }
}

/// Config for `provider` with env credentials and overrides, plus the CLI model override.
pub fn provider_config(
    env: &dyn embedding::EmbeddingConfig,
    provider: ProviderId,
    model: Option<String>,
) -> ProviderConfig {
    let mut config = env.provider_config(provider);
    if model.is_some() {
        config.model = model;
    }
    config
}

/// JSON summary: provider, model, dimensions, and a short preview of each vector.
pub fn summarize(response: &EmbedResponse) -> Value {
    let preview = |v: &[f32]| v.iter().take(PREVIEW_COMPONENTS).copied().collect::<Vec<f32>>();
    match response {
        EmbedResponse::Single(r) => json!({
            "provider": r.provider,
            "model": r.model,
            "dimensions": r.dimensions,
            "usage": r.usage,
            "preview": preview(&r.embedding),
        }),
        EmbedResponse::Batch(r) => json!({
            "provider": r.provider,
            "model": r.model,
            "dimensions": r.dimensions,
            "count": r.embeddings.len(),
            "usage": r.usage,
            "preview": r.embeddings.iter().map(|v| preview(v)).collect::<Vec<_>>(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedding::{EmbedResult, EnvEmbeddingConfig, ProviderSettings};

    #[test]
    fn parses_embed_with_provider_alias() {
        let cli = Cli::try_parse_from(["embed", "embed", "--provider", "google", "--text", "hi"])
            .unwrap();
        let Commands::Embed { provider, model, inputs } = cli.command else {
            panic!("expected embed command");
        };
        assert_eq!(provider, ProviderId::Gemini);
        assert!(model.is_none());
        assert_eq!(
            inputs.into_request().unwrap(),
            EmbedRequest::Single(EmbedInput::text("hi"))
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(Cli::try_parse_from(["embed", "embed", "-p", "cohere", "-t", "x"]).is_err());
    }

    #[test]
    fn repeated_inputs_keep_command_line_order() {
        let cli = Cli::try_parse_ordered(["embed", "auto", "-t", "a", "-f", "doc.txt", "-t", "b"])
            .unwrap();
        let Commands::Auto { inputs } = cli.command else {
            panic!("expected auto command");
        };
        assert_eq!(
            inputs.into_request().unwrap(),
            EmbedRequest::Batch(vec![
                EmbedInput::text("a"),
                EmbedInput::file("doc.txt"),
                EmbedInput::text("b"),
            ])
        );
    }

    #[test]
    fn embed_subcommand_keeps_file_first_order() {
        let args = ["embed", "embed", "-p", "native", "-f", "x.txt", "-t", "y"];
        let cli = Cli::try_parse_ordered(args).unwrap();
        let Commands::Embed { inputs, .. } = cli.command else {
            panic!("expected embed command");
        };
        assert_eq!(
            inputs.into_request().unwrap(),
            EmbedRequest::Batch(vec![EmbedInput::file("x.txt"), EmbedInput::text("y")])
        );
    }

    #[test]
    fn derive_parse_falls_back_to_texts_then_files() {
        let cli = Cli::try_parse_from(["embed", "auto", "-f", "doc.txt", "-t", "a"]).unwrap();
        let Commands::Auto { inputs } = cli.command else {
            panic!("expected auto command");
        };
        assert_eq!(
            inputs.into_request().unwrap(),
            EmbedRequest::Batch(vec![EmbedInput::text("a"), EmbedInput::file("doc.txt")])
        );
    }

    #[test]
    fn no_input_is_an_error() {
        let cli = Cli::try_parse_from(["embed", "auto"]).unwrap();
        let Commands::Auto { inputs } = cli.command else {
            panic!("expected auto command");
        };
        assert!(inputs.into_request().is_err());
    }

    #[test]
    fn model_flag_overrides_env_model() {
        let env = EnvEmbeddingConfig {
            openai: ProviderSettings {
                api_key: Some("sk".to_string()),
                base_url: None,
                model: Some("text-embedding-3-small".to_string()),
            },
            ..Default::default()
        };
        let large = Some("text-embedding-3-large".to_string());
        let config = provider_config(&env, ProviderId::OpenAi, large);
        assert_eq!(config.model.as_deref(), Some("text-embedding-3-large"));
        assert_eq!(config.credential(), Some("sk"));

        let config = provider_config(&env, ProviderId::OpenAi, None);
        assert_eq!(config.model.as_deref(), Some("text-embedding-3-small"));
    }

    #[test]
    fn summary_truncates_vector_preview() {
        let response = EmbedResponse::Single(EmbedResult {
            embedding: vec![0.5; 20],
            dimensions: 20,
            provider: "native".to_string(),
            model: "m".to_string(),
            usage: None,
        });
        let value = summarize(&response);
        assert_eq!(value["dimensions"], 20);
        assert_eq!(value["preview"].as_array().map(Vec::len), Some(PREVIEW_COMPONENTS));
    }
}
