use std::env;
use std::io::{self, BufRead, Write};

use docqa_core::config::Config;
use docqa_core::Role;
use docqa_embed::default_embedder;
use docqa_llm::default_generator;
use docqa_pipeline::Session;

fn main() -> anyhow::Result<()> {
    docqa_cli::init_tracing();
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: docqa-chat <pdf|dir>...");
        eprintln!("Commands: :history prints the conversation, :quit ends the session");
        std::process::exit(1);
    }
    let settings = Config::load()?.settings()?;
    let files = docqa_cli::input_files(&args)?;
    let key = docqa_cli::api_key();
    let embedder = default_embedder(&settings.embedding, key.as_deref())?;
    let generator = default_generator(&settings.generation, key.as_deref())?;

    let mut session = Session::new(settings, embedder, generator);
    let documents = session.ingest(&files)?;
    println!("Ready. Loaded {} documents:", documents.len());
    for name in documents {
        println!("  - {name}");
    }
    println!("Ask a question, or type :history / :quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("\n> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        match question {
            "" => continue,
            ":quit" | ":q" => break,
            ":history" => {
                for turn in session.history() {
                    let who = match turn.role {
                        Role::User => "you",
                        Role::Assistant => "assistant",
                    };
                    println!("[{who}] {}", turn.content);
                }
            }
            _ => match session.ask(question) {
                Ok(answer) => println!("\n{answer}"),
                Err(e) => eprintln!("Error: {e}"),
            },
        }
    }
    session.end();
    Ok(())
}
