use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotbridge::{
    cli::{self, PlayerAction},
    config::{self, Config},
    error,
    spotify::playlists::DEFAULT_LIMIT,
    types::RepeatMode,
    utils, warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the OAuth relay server
    Serve,

    /// Log in with Spotify through the browser
    Login,

    /// Forget the stored session
    Logout,

    /// Show whether the stored session is still valid
    Status,

    /// List your playlists
    Playlists(PlaylistsOptions),

    /// Search tracks
    Search(SearchOptions),

    /// Watch or control playback on a Spotify Connect device
    Player(PlayerOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Only show playlists whose name contains this text
    #[clap(long)]
    pub search: Option<String>,

    /// Number of playlists to fetch
    #[clap(long, default_value_t = DEFAULT_LIMIT, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,

    /// Index of the first playlist to fetch
    #[clap(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Search text
    pub query: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PlayerOptions {
    #[command(subcommand)]
    pub command: PlayerSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlayerSubcommand {
    /// Print playback changes until Ctrl-C
    Watch,
    /// Play or pause
    Toggle,
    /// Skip to the next track
    Next,
    /// Go back to the previous track
    Previous,
    /// Seek to a position in milliseconds
    Seek { position_ms: u64 },
    /// Set the volume between 0.0 and 1.0
    Volume { level: f32 },
    /// Turn shuffle on or off
    Shuffle {
        #[clap(value_parser = utils::parse_switch, action = clap::ArgAction::Set)]
        state: bool,
    },
    /// Repeat the current track or turn repeat off
    Repeat {
        #[clap(value_enum)]
        mode: RepeatArg,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum RepeatArg {
    Track,
    Off,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Track => RepeatMode::Track,
            RepeatArg::Off => RepeatMode::Off,
        }
    }
}

impl From<PlayerSubcommand> for PlayerAction {
    fn from(cmd: PlayerSubcommand) -> Self {
        match cmd {
            PlayerSubcommand::Watch => PlayerAction::Watch,
            PlayerSubcommand::Toggle => PlayerAction::Toggle,
            PlayerSubcommand::Next => PlayerAction::Next,
            PlayerSubcommand::Previous => PlayerAction::Previous,
            PlayerSubcommand::Seek { position_ms } => PlayerAction::Seek(position_ms),
            PlayerSubcommand::Volume { level } => PlayerAction::Volume(level),
            PlayerSubcommand::Shuffle { state } => PlayerAction::Shuffle(state),
            PlayerSubcommand::Repeat { mode } => PlayerAction::Repeat(mode.into()),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve(load_config()).await,
        Command::Login => cli::login(&load_config()).await,
        Command::Logout => cli::logout().await,
        Command::Status => cli::status(&load_config()).await,
        Command::Playlists(opt) => {
            cli::list_playlists(&load_config(), opt.search, opt.limit, opt.offset).await
        }
        Command::Search(opt) => cli::search_tracks(&load_config(), opt.query).await,
        Command::Player(opt) => cli::player(&load_config(), opt.command.into()).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
