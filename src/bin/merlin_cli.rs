//! Small command-line front end for manual testing against a live or mock server.
//!
//! ```text
//! merlin-cli upload <path> <purpose> [mime-type]
//! merlin-cli stream <model> <prompt...>
//! merlin-cli file <file-id>
//! merlin-cli files [purpose]
//! merlin-cli decode <recorded-sse-file>
//! ```
//!
//! Configuration comes from `MERLIN_*` / `OPENAI_*` variables; log verbosity from `RUST_LOG`.

use bytes::Bytes;
use futures::{stream, StreamExt};
use merlin::files::ListFilesParams;
use merlin::{
    ByteSource, CreateResponseRequest, EventStream, MerlinClient, MultipartUpload,
    StreamAccumulator,
};
use std::io::Write;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: merlin-cli <upload|stream|file|files|decode> [args...]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    match (command.as_str(), &args[1..]) {
        ("upload", [path, purpose, rest @ ..]) => {
            let mime = rest
                .first()
                .cloned()
                .unwrap_or_else(|| "application/octet-stream".to_string());
            upload(path, purpose, &mime).await?
        }
        ("stream", [model, prompt @ ..]) if !prompt.is_empty() => {
            stream_response(model, &prompt.join(" ")).await?
        }
        ("file", [id]) => {
            let file = MerlinClient::from_env()?.files().retrieve(id).await?;
            println!("{}", serde_json::to_string_pretty(&file.raw)?);
        }
        ("files", rest) => {
            let params = ListFilesParams {
                purpose: rest.first().cloned(),
                ..Default::default()
            };
            let page = MerlinClient::from_env()?.files().list(&params).await?;
            for file in &page {
                println!("{}\t{}\t{}\t{}", file.id, file.bytes, file.purpose, file.filename);
            }
            if let Some(cursor) = page.next_after() {
                println!("... more after {}", cursor);
            }
        }
        ("decode", [path]) => decode(path).await?,
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }
    Ok(())
}

async fn upload(path: &str, purpose: &str, mime: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = MerlinClient::from_env()?;
    let file = client
        .uploads()
        .multipart_upload(ByteSource::from_path(path), MultipartUpload::new(purpose, mime))
        .await?;
    println!("✅ {} ({} bytes) -> {}", file.filename, file.bytes, file.id);
    Ok(())
}

async fn stream_response(model: &str, prompt: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = MerlinClient::from_env()?;
    let request = CreateResponseRequest::new(model, prompt);
    let events = client.responses().create_stream(&request).await?;
    let acc = print_events(events, true).await?;
    println!();
    summarize(&acc);
    Ok(())
}

/// Replay a recorded SSE transcript through the decoder without touching the network.
async fn decode(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let body = Bytes::from(tokio::fs::read(path).await?);
    let events = EventStream::from_bytes(Box::pin(stream::iter([Ok::<_, merlin::Error>(body)])));
    let acc = print_events(events, false).await?;
    summarize(&acc);
    Ok(())
}

async fn print_events(
    mut events: EventStream,
    text_only: bool,
) -> Result<StreamAccumulator, Box<dyn std::error::Error>> {
    let mut acc = StreamAccumulator::new();
    let mut stdout = std::io::stdout();
    while let Some(event) = events.next().await {
        let event = event?;
        if text_only {
            if let Some(delta) = &event.delta {
                if event.event_type == merlin::streaming::event_types::OUTPUT_TEXT_DELTA {
                    write!(stdout, "{}", delta)?;
                    stdout.flush()?;
                }
            }
        } else {
            let marker = if event.is_known() { " " } else { "?" };
            println!(
                "{}{:>5} {:?} {}",
                marker,
                event.sequence_number.map(|n| n.to_string()).unwrap_or_default(),
                event.group(),
                event.event_type
            );
        }
        acc.push(&event);
    }
    Ok(acc)
}

fn summarize(acc: &StreamAccumulator) {
    match (acc.terminal_type(), acc.error()) {
        (_, Some(err)) => eprintln!(
            "❌ stream error {}: {}",
            err.error_code.as_deref().unwrap_or("unknown"),
            err.error_message.as_deref().unwrap_or("")
        ),
        (Some(terminal), None) => eprintln!("✅ {} after {} events", terminal, acc.event_count()),
        (None, None) => eprintln!("⚠️  stream closed without a terminal event"),
    }
    if acc.sequence_gaps() > 0 || acc.out_of_order() > 0 {
        eprintln!(
            "   sequence gaps: {}, out of order: {}",
            acc.sequence_gaps(),
            acc.out_of_order()
        );
    }
}
