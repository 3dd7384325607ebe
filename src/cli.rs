use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jamtracks::clients::errors::Result;
use jamtracks::exporter::{ConfigBuilder, Exporter};
use log::info;

#[derive(Parser)]
#[command(name = "jamtracks")]
#[command(version, about = "Export Jamendo tracks by genre tag to CSV", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch tracks for each tag and write them to the CSV file (default)
    Export(ExportArgs),
}

#[derive(Args, Default)]
struct ExportArgs {
    /// Jamendo client id [env: JAMENDO_CLIENT_ID]
    #[arg(long)]
    client_id: Option<String>,

    /// API base URL [env: JAMENDO_API_URL]
    #[arg(long)]
    api_url: Option<String>,

    /// Genre tag to query, repeat for several. Replaces the default list.
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Tracks requested per tag
    #[arg(long)]
    limit: Option<u32>,

    /// Directory the CSV is written into
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// CSV file name
    #[arg(long)]
    out_file: Option<String>,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    export_tracks(cli.export_args()).await
}

impl Cli {
    // No subcommand means `export` with defaults
    fn export_args(self) -> ExportArgs {
        match self.command {
            Some(Commands::Export(args)) => args,
            None => ExportArgs::default(),
        }
    }
}

impl ExportArgs {
    fn into_builder(self) -> ConfigBuilder {
        let mut builder = ConfigBuilder::new();
        if let Some(client_id) = self.client_id {
            builder = builder.client_id(client_id);
        }
        if let Some(api_url) = self.api_url {
            builder = builder.api_url(api_url);
        }
        if !self.tags.is_empty() {
            builder = builder.tags(self.tags);
        }
        if let Some(limit) = self.limit {
            builder = builder.limit(limit);
        }
        if let Some(out_dir) = self.out_dir {
            builder = builder.out_dir(out_dir);
        }
        if let Some(out_file) = self.out_file {
            builder = builder.out_file(out_file);
        }
        builder
    }
}

async fn export_tracks(args: ExportArgs) -> Result<()> {
    info!("Building config ...");
    let exporter = Exporter::new(args.into_builder().build()?);
    exporter.export(&mut std::io::stdout()).await?;
    Ok(())
}
