use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use uno_quiz::quiz_game::api::{start_api_server, ServerConfig};
use uno_quiz::quiz_game::controller::GameController;
use uno_quiz::quiz_game::recorder::{JsonFileRecorder, MatchRecorder};
use uno_quiz::quiz_game::ui::ConsoleUI;

const DEFAULT_HISTORY_FILE: &str = "uno-quiz-history.json";

#[derive(Parser)]
#[command(name = "uno-quiz", version, about = "UNO where every card asks a trivia question")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play a pass-the-device match in the terminal
    Play {
        #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
        history_file: PathBuf,
        /// Seconds allowed per question
        #[arg(long, default_value_t = 15)]
        time_limit: u64,
    },
    /// Serve rounds over HTTP
    Serve {
        #[arg(long, default_value = "sessions")]
        sessions_dir: PathBuf,
        #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
        history_file: PathBuf,
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
    /// Show or clear recorded rounds
    History {
        #[arg(long, default_value = DEFAULT_HISTORY_FILE)]
        history_file: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            history_file,
            time_limit,
        } => {
            env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
            play(history_file, Duration::from_secs(time_limit))
        }
        Command::Serve {
            sessions_dir,
            history_file,
            addr,
        } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(start_api_server(ServerConfig {
                sessions_dir,
                history_file,
                addr,
            }))
        }
        Command::History {
            history_file,
            limit,
            clear,
        } => {
            env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));
            history(history_file, limit, clear)
        }
    }
}

fn play(history_file: PathBuf, time_limit: Duration) -> Result<(), Box<dyn Error>> {
    let recorder = JsonFileRecorder::new(history_file)?;
    let mut ui = ConsoleUI::new();

    let player_names = ui.get_player_names(&recorder.player_names())?;
    recorder.save_player_names(&player_names)?;
    info!("Starting match for {:?}", player_names);

    let mut controller = GameController::new(ui, recorder, time_limit);
    controller.run(player_names)
}

fn history(history_file: PathBuf, limit: usize, clear: bool) -> Result<(), Box<dyn Error>> {
    let mut recorder = JsonFileRecorder::new(history_file)?;
    let mut ui = ConsoleUI::new();

    if clear {
        recorder.clear_history()?;
        ui.show_message("History cleared.")?;
        return Ok(());
    }

    let rounds = recorder.list_recent(limit)?;
    let wins = recorder.win_tally()?;
    ui.display_history(&rounds, &wins)?;
    Ok(())
}
