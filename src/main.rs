use anyhow::Result;
use chainbazaar::core::log::init_logging;
use chainbazaar::core::{Category, NewListing};
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for chainbazaar::AppCommand {
    fn from(cmd: Commands) -> chainbazaar::AppCommand {
        use chainbazaar::AppCommand;
        match cmd {
            Commands::Prices => AppCommand::Prices,
            Commands::Convert { usd } => AppCommand::Convert { usd },
            Commands::Listings { seller, search } => AppCommand::Listings { seller, search },
            Commands::Show { id } => AppCommand::Show { id },
            Commands::Create {
                title,
                description,
                price,
                category,
                images,
            } => AppCommand::Create(NewListing {
                title,
                description,
                price,
                category,
                image_urls: images,
            }),
            Commands::Delete { id } => AppCommand::Delete { id },
            Commands::Login { email, password } => AppCommand::Login { email, password },
            Commands::Signup {
                name,
                email,
                password,
            } => AppCommand::Signup {
                name,
                email,
                password,
            },
            Commands::Logout => AppCommand::Logout,
            Commands::Profile => AppCommand::Profile,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show current crypto prices
    Prices,
    /// Convert a USD amount to crypto
    Convert {
        /// Amount in USD
        usd: f64,
    },
    /// Browse listings
    Listings {
        /// Only show listings from this seller id
        #[arg(long)]
        seller: Option<String>,
        /// Only show listings whose title or category contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single listing
    Show { id: String },
    /// Create a listing as the signed-in user
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Price in USD
        #[arg(long)]
        price: f64,
        /// One of Electronics, Clothing, Home, Sports, Books, Other
        #[arg(long, default_value = "Electronics")]
        category: Category,
        /// Image reference; repeat for multiple images
        #[arg(long = "image")]
        images: Vec<String>,
    },
    /// Delete a listing
    Delete { id: String },
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out of the current profile
    Logout,
    /// Show the current profile
    Profile,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => chainbazaar::cli::setup::setup(),
        Some(cmd) => chainbazaar::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
