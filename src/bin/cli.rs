//! fsstore CLI Client
//!
//! Command-line interface for interacting with an fsstore server.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fsstore::network::{check_unique_names, check_upload_paths, Client};
use fsstore::FsStoreError;

/// fsstore CLI
#[derive(Parser, Debug)]
#[command(name = "fsstore-cli")]
#[command(about = "CLI for the fsstore file storage server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload one or more local files
    Upload {
        /// Paths of the files to upload
        #[arg(required = true, num_args = 1..)]
        paths: Vec<PathBuf>,

        /// Store under this name instead of the file name (single file only)
        #[arg(short, long)]
        name: Option<String>,

        /// Replace existing files with the same name
        #[arg(short, long)]
        overwrite: bool,
    },

    /// Delete one or more stored files
    Delete {
        /// Names of the files to delete
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
    },

    /// List stored files
    List {
        /// Maximum number of files to show (0 = server maximum)
        #[arg(short, long, default_value = "0")]
        limit: u32,
    },

    /// Download a stored file
    Fetch {
        /// The name of the file to download
        name: String,

        /// Write to this path instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> fsstore::Result<()> {
    let server = args.server.as_str();

    match args.command {
        Commands::Upload {
            paths,
            name,
            overwrite,
        } => {
            // Every path is checked before anything is sent
            check_upload_paths(&paths)?;
            if name.is_some() && paths.len() > 1 {
                return Err(FsStoreError::InvalidArgument(
                    "--name can only be used with a single file".to_string(),
                ));
            }

            let mut client = Client::connect(server)?;
            for path in &paths {
                println!("Uploading {} to {}", path.display(), server);
                client.upload_file(path, name.as_deref(), overwrite)?;
            }
            println!("Uploaded {} file(s)", paths.len());
        }
        Commands::Delete { names } => {
            check_unique_names(&names)?;

            let mut client = Client::connect(server)?;
            for name in &names {
                client.delete(name)?;
                println!("Deleted {}", name);
            }
        }
        Commands::List { limit } => {
            let records = Client::connect(server)?.list(limit)?;
            println!("{:<40} {:>12} {:>16}", "NAME", "SIZE", "CREATED_AT_MS");
            for record in records {
                println!(
                    "{:<40} {:>12} {:>16}",
                    record.name, record.size, record.created_at_ms
                );
            }
        }
        Commands::Fetch { name, output } => {
            let mut client = Client::connect(server)?;
            match output {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(&path)?);
                    let size = client.fetch(&name, &mut writer)?;
                    writer.flush()?;
                    println!("Fetched {} ({} bytes) to {}", name, size, path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut lock = stdout.lock();
                    client.fetch(&name, &mut lock)?;
                    lock.flush()?;
                }
            }
        }
        Commands::Ping => {
            Client::connect(server)?.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}
