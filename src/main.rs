use std::path::PathBuf;

use clap::Parser;
use quizcard::{logging, Config, Quiz, DEFAULT_LOG_FILE, DEFAULT_QUESTIONS_PATH};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file to load the questions from
    #[arg(short, long, default_value = DEFAULT_QUESTIONS_PATH)]
    questions: PathBuf,

    /// Directory the score report is saved into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// File that receives log output
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Config {
            questions: args.questions,
            output_dir: args.output_dir,
            log_file: args.log_file,
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from(Args::parse());

    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let quiz = match Quiz::from_config(&config) {
        Ok(quiz) => quiz,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = quiz.run().await {
        eprintln!("Error running quiz: {}", e);
        std::process::exit(1);
    }
}
