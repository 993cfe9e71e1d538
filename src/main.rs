use clap::{ArgAction, Args, Parser, Subcommand};
use immich_tools::client::Client;
use immich_tools::config::{self, AutoCreateOptions};
use immich_tools::{albums, auth, info, logging, output};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn version_string() -> &'static str {
    let target = env!("BUILD_TARGET");
    let version = if env!("ON_RELEASE_TAG") == "true" {
        env!("CARGO_PKG_VERSION").to_string()
    } else {
        match env!("GIT_HASH") {
            "" => "dev@unknown".to_string(),
            hash => format!("dev@{hash}"),
        }
    };
    // Leaked once at startup, called exactly once
    Box::leak(format!("{version} ({target})").into_boxed_str())
}

#[derive(Parser)]
#[command(name = "immich-tools")]
#[command(about = "Command-line tools for an Immich photo server")]
#[command(long_about = "\
Command-line tools for an Immich photo server

Log in once with an API key, then manage the server from the terminal.
The main command turns a folder tree into albums:

  /mnt/photos/
  ├── 2023/
  │   ├── japan/          → album \"japan\"
  │   └── food/           → album \"food\"
  └── 2024/
      └── food/           → album \"food\" (same album)

  immich-tools album auto-create /mnt/photos/ --recursive --skip-levels 1 \\
      --original-path /usr/src/app/upload/library/

Folders keep their assets on the server; auto-create only looks them up by
path and adds them to albums. Existing albums with the same name are reused.

Run 'immich-tools album gen-config' for a documented batch config file.")]
#[command(version = version_string())]
struct Cli {
    /// Credentials file (default: ~/.config/immich-tools/auth.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the server host and API key
    Login {
        /// Server URL, e.g. http://immich.local:2283
        host: String,
        /// API key. Read from stdin when omitted
        #[arg(long)]
        key: Option<String>,
    },
    /// Remove stored credentials
    Logout {
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Show server version, storage and statistics
    Info,
    /// Manage albums
    #[command(subcommand)]
    Album(AlbumCommand),
}

#[derive(Subcommand)]
enum AlbumCommand {
    /// Create albums from the folder structure and fill them with assets
    AutoCreate(AutoCreateArgs),
    /// List albums stored on the server
    List,
    /// Print a stock auto-create config with all options documented
    GenConfig,
}

#[derive(Args)]
struct AutoCreateArgs {
    /// Folder to scan. Keep the trailing slash to scan the folder itself
    folder: Option<String>,

    /// Read the folder tree recursively
    #[arg(long)]
    recursive: bool,

    /// Leading folder levels below the root that never become album names
    #[arg(long, default_value_t = 0, value_name = "N")]
    skip_levels: usize,

    /// Path where the server stores the same photos
    #[arg(long, value_name = "PATH")]
    original_path: Option<String>,

    /// Exclude folders matching a glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    exclude: Vec<String>,

    /// Rename a folder to an album name, as folder=album (repeatable)
    #[arg(long, value_name = "FOLDER=ALBUM")]
    rename: Vec<String>,

    /// Add assets to every parent folder's album, not only the leaf
    #[arg(long)]
    parent_group_assets: bool,

    /// Cap on concurrent asset lookups per album
    #[arg(long, value_name = "N")]
    max_concurrent_lookups: Option<usize>,

    /// Load all options from a JSON or TOML file; other options are ignored
    #[arg(long, value_name = "FILE")]
    from_config: Option<PathBuf>,
}

impl AutoCreateArgs {
    fn into_options(self) -> Result<AutoCreateOptions, config::ConfigError> {
        let flags = AutoCreateOptions {
            folder: self.folder.unwrap_or_default(),
            recursive: self.recursive,
            skip_levels: self.skip_levels,
            original_path: self.original_path,
            exclude: self.exclude,
            parent_group_assets: self.parent_group_assets,
            max_concurrent_lookups: self.max_concurrent_lookups,
            ..Default::default()
        };
        AutoCreateOptions::from_flags(flags, &self.rename, self.from_config.as_deref())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let credentials_file = cli.config.as_deref();

    match cli.command {
        Command::Login { host, key } => {
            let key = match key {
                Some(key) => key,
                None => read_line("Enter Immich API key: ")?,
            };
            // Validates host and key before anything is written.
            Client::new(&host, &key)?;
            let path = auth::login(&auth::Credentials { host, key }, credentials_file)?;
            println!("Credentials stored in {}", path.display());
        }
        Command::Logout { yes } => {
            if yes || confirm("Do you really want to remove the credentials?")? {
                let path = auth::logout(credentials_file)?;
                println!("Removed {}", path.display());
            }
        }
        Command::Info => {
            let client = connect(credentials_file)?;
            let server = info::server_info(&client).await?;
            output::print_server_info(&server);
        }
        Command::Album(AlbumCommand::AutoCreate(args)) => {
            let opts = args.into_options()?;
            let client = Arc::new(connect(credentials_file)?);
            let summary = albums::auto_create_albums(client, &opts).await?;
            output::print_auto_create_summary(&summary);
        }
        Command::Album(AlbumCommand::List) => {
            let client = connect(credentials_file)?;
            let list = albums::list_albums(&client).await?;
            output::print_album_list(&list);
        }
        Command::Album(AlbumCommand::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build a client from the stored credentials.
fn connect(credentials_file: Option<&Path>) -> Result<Client, Box<dyn std::error::Error>> {
    let credentials = auth::session(credentials_file)?;
    Ok(Client::new(&credentials.host, &credentials.key)?)
}

/// Prompt on stderr and read one trimmed line from stdin.
fn read_line(prompt: &str) -> std::io::Result<String> {
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> std::io::Result<bool> {
    let answer = read_line(&format!("{question} [y/N] "))?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}
