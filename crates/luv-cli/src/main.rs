use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use luv_cli::CliError;
use luv_cli::admin;
use luv_cli::seeder::{self, SeedConfig};
use luv_models::users::UserRole;
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "luv-cli")]
#[command(about = "Luv CLI - Administrative tools for the Luv API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Change the role of an existing user
    SetRole {
        #[arg(short = 'e', long)]
        email: String,

        /// admin, streamer or viewer
        #[arg(short = 'r', long)]
        role: UserRole,
    },
    /// Seed the database with fake users, streamer profiles, streams and follows
    Seed {
        #[arg(long, default_value = "50")]
        viewers: usize,

        #[arg(long, default_value = "10")]
        streamers: usize,

        /// Streams per streamer
        #[arg(long, default_value = "3")]
        streams: usize,

        /// Streamers each viewer follows
        #[arg(long, default_value = "5")]
        follows: usize,
    },
    /// Delete seeded accounts and everything they own (keeps admins)
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    let pool = luv_db::connect(&database_url, 5).await?;

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => handle_create_admin(&pool, username, email, password).await,
        Commands::SetRole { email, role } => {
            admin::set_role(&pool, &email, role).await?;
            println!("✅ {} is now {}", email, role);
            Ok(())
        }
        Commands::Seed {
            viewers,
            streamers,
            streams,
            follows,
        } => {
            let config = SeedConfig {
                viewers,
                streamers,
                streams_per_streamer: streams,
                follows_per_viewer: follows,
            };
            seeder::seed_all(&pool, config).await
        }
        Commands::ClearSeed => seeder::clear_all(&pool).await,
    }
}

fn prompt_text(value: Option<String>, prompt: &str) -> Result<String, dialoguer::Error> {
    match value {
        Some(value) => Ok(value),
        None => Input::new().with_prompt(prompt).interact_text(),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<(), CliError> {
    let username = prompt_text(username, "Username")?;
    let email = prompt_text(email, "Email address")?;
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let id = admin::create_admin(pool, &username, &email, &password).await?;

    println!("\n✅ Admin created successfully!");
    println!("   ID: {}", id);
    println!("   Username: {}", username);
    println!("   Email: {}", email);
    Ok(())
}
