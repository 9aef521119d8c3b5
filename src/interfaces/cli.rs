use clap::Parser;

#[derive(Parser)]
#[command(name = "qiita")]
#[command(about = "Browse the Qiita API from the terminal.")]
#[command(version)]
pub struct Cli {
    /// Page number to show
    #[arg(short = 'p', long)]
    pub page: Option<i64>,

    /// Items per page (1-100)
    #[arg(short = 'n', long)]
    pub per_page: Option<i64>,

    /// Search filter, e.g. "tag:Rust" or "user:qiita"
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Start from a shared link
    #[arg(long)]
    pub url: Option<String>,

    /// Also list items written by the authenticated user
    #[arg(short = 'u', long)]
    pub user_items: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Choose color theme
    #[arg(short = 'T', long)]
    pub theme: Option<String>,

    /// Read commands from stdin after the first page
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Generate config sample
    #[arg(long)]
    pub generate_config: bool,

    /// Show status
    #[arg(long)]
    pub status: bool,
}
