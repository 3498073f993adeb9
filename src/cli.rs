//! Command-line interface.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE", global = true)]
    pub config: Option<String>,

    /// Server origin, e.g. http://127.0.0.1:8000
    #[arg(long, env = "PLATE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// File holding the session and client preferences
    #[arg(long, env = "PLATE_STATE_FILE", global = true)]
    pub state_file: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "PLATE_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long, env = "PLATE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Remember the username for next time
        #[arg(long)]
        remember: bool,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// Run plate detection
    #[command(group(ArgGroup::new("input").required(true).args(["file", "camera", "manual"])))]
    Detect {
        /// Image to upload
        #[arg(long)]
        file: Option<PathBuf>,
        /// Still image served as the camera feed
        #[arg(long)]
        camera: Option<PathBuf>,
        /// Plate number typed by hand
        #[arg(long)]
        manual: Option<String>,
    },
    #[command(subcommand)]
    Violations(ViolationsCommand),
    #[command(subcommand)]
    Payments(PaymentsCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Appeals(AppealsCommand),
    #[command(subcommand)]
    Owners(OwnersCommand),
    #[command(subcommand)]
    Vehicles(VehiclesCommand),
    /// List violation types
    ViolationTypes,
    /// Dashboard statistics
    Stats,
    /// Recent detections
    DetectionLogs {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 50)]
        limit: u32,
    },
    #[command(subcommand)]
    Sidebar(SidebarCommand),
}

/// `key=value` filters.
fn parse_filter(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{s}`"))
}

#[derive(Subcommand, Debug)]
pub enum ViolationsCommand {
    List {
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    Ticket {
        ticket_number: String,
    },
    /// Create from a JSON object
    Create {
        #[arg(long)]
        data: String,
    },
    SetStatus {
        id: String,
        status: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PaymentsCommand {
    List {
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    Create {
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List,
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: String,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: String,
    },
    ChangePassword {
        id: String,
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum AppealsCommand {
    List {
        #[arg(long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    /// Approve or reject an appeal
    Review {
        id: String,
        status: String,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum OwnersCommand {
    List,
    Create {
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum VehiclesCommand {
    List,
    Create {
        #[arg(long)]
        data: String,
    },
    Plate {
        plate_number: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum SidebarCommand {
    /// Collapse or expand the sidebar
    Toggle,
    /// Show chrome state for the signed-in user's landing page
    Show,
}
