use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use otzaria_backend::corpus::convert_corpus;
use otzaria_backend::logger;

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a Sefaria JSON export into an Otzaria text library", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log verbosity: silent, error, warn, info or debug.
    #[arg(long, global = true, value_name = "LEVEL", env = "LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert all books in an export to flat text files plus a citation index
    #[command(arg_required_else_help = true)]
    Convert {
        /// Directory of per-book text trees (<Title>/Hebrew/merged.json)
        #[arg(long, value_name = "DIR")]
        json_dir: PathBuf,

        /// Directory of per-book schema files (<Title>.json)
        #[arg(long, value_name = "DIR")]
        schemas_dir: PathBuf,

        /// Root directory for the generated library
        #[arg(long, value_name = "DIR")]
        output_dir: PathBuf,

        /// Newline-delimited list of book titles to skip
        #[arg(long, value_name = "FILE", default_value = "blacklist.txt")]
        blacklist: PathBuf,

        /// Path of the citation index CSV
        #[arg(long, value_name = "FILE", default_value = "refs.csv")]
        refs_csv: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Cli::parse();

    if let Some(level) = &args.log_level {
        if !logger::set_log_level_str(level) {
            eprintln!("Invalid log level: {}", level);
            exit(1);
        }
    }

    match args.command {
        Commands::Convert { json_dir, schemas_dir, output_dir, blacklist, refs_csv } => {
            let stats = convert_corpus(&json_dir, &schemas_dir, &output_dir, &blacklist, &refs_csv)?;
            println!("Books written:     {}", stats.books_written);
            println!("Books blacklisted: {}", stats.books_blacklisted);
            println!("Books failed:      {}", stats.books_failed);
            println!("Citation records:  {}", stats.citation_count);
        }
    }

    Ok(())
}
