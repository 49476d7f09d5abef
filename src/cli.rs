use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Scout pest assistant chat in the terminal", long_about = None)]
pub struct Args {
    #[arg(
        long = "base-url",
        help = "Origin serving the chat API (e.g., http://localhost:3000)"
    )]
    pub base_url: Option<String>,

    #[arg(long = "storage-dir", help = "Directory for the saved session id")]
    pub storage_dir: Option<PathBuf>,

    #[arg(long = "no-auto-open", help = "Do not open the chat panel automatically")]
    pub no_auto_open: bool,

    #[arg(
        long = "open-delay-ms",
        help = "Delay before the chat panel opens automatically"
    )]
    pub open_delay_ms: Option<u64>,

    #[arg(short = 'v', long = "verbose", help = "Print diagnostic output")]
    pub verbose: bool,

    #[arg(long = "reset", help = "Forget the saved session before starting")]
    pub reset: bool,

    #[arg(long = "config-init", help = "Write an example config file and exit")]
    pub config_init: bool,
}
