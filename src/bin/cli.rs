//! relayq CLI Client
//!
//! Command-line interface for sending requests and inspecting results.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use relayq::protocol::{read_response, write_request, Request, Response};
use relayq::storage::ResultStore;
use relayq::task::TaskId;
use relayq::{RelayError, Result};

/// relayq CLI
#[derive(Parser, Debug)]
#[command(name = "relayq-cli")]
#[command(about = "CLI for the relayq task relay")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:5001")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a single request
    Send {
        /// Operation: uppercase, hash or echo
        op: String,

        /// Payload
        #[arg(default_value = "")]
        data: String,
    },

    /// Interactive session: `<op> <data>` per line, `quit` to leave
    Repl,

    /// Show the persisted record and blob of a task
    Show {
        /// Task id from a response
        task_id: String,

        /// Server data directory
        #[arg(short, long, default_value = "./relayq_data")]
        data_dir: PathBuf,
    },
}

/// Request/response session over one connection
struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    fn call(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        read_response(&mut self.reader)
    }
}

fn main() {
    let args = Args::parse();

    let outcome = match args.command {
        Commands::Send { op, data } => send(&args.server, Request::new(op, data)),
        Commands::Repl => repl(&args.server),
        Commands::Show { task_id, data_dir } => show(&task_id, &data_dir),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn send(addr: &str, request: Request) -> Result<()> {
    let mut client = Client::connect(addr)?;
    let response = client.call(&request)?;
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn repl(addr: &str) -> Result<()> {
    let mut client = Client::connect(addr)?;
    println!("Connected to {}. Commands: uppercase <txt> | hash <txt> | echo <txt> | quit", addr);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            return Ok(());
        }

        let (op, data) = line.split_once(' ').unwrap_or((line, ""));
        let response = client.call(&Request::new(op, data))?;
        println!("{}", serde_json::to_string(&response)?);
    }
}

fn show(task_id: &str, data_dir: &Path) -> Result<()> {
    let id: TaskId = task_id
        .parse()
        .map_err(|e| RelayError::Config(format!("invalid task id {}: {}", task_id, e)))?;
    let store = ResultStore::open(data_dir)?;

    match store.find_record(&id)? {
        Some(record) => {
            println!("record #{} at {}", record.id, record.timestamp);
            println!("  task:   {}", serde_json::to_string(&record.task)?);
            println!("  result: {}", serde_json::to_string(&record.result)?);
        }
        None => println!("no record for {}", id),
    }

    match store.read_blob(&id)? {
        Some(_) => println!("blob:     {}", store.blobs().path_for(&id).display()),
        None => println!("no blob for {}", id),
    }

    Ok(())
}
