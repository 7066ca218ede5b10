//! notify-sim: drive a message list section headlessly.
//!
//! Usage:
//!   notify-sim                         # 3 messages, print the final state
//!   notify-sim --messages 6 --clear    # staggered clear animation
//!   notify-sim --expand --json         # expand the first message, JSON output

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use notification_list::animation::Timeline;
use notification_list::config::PanelConfig;
use notification_list::message_list::{Message, MessageListSection, MessageSignal, SectionSignal, SectionSnapshot};
use notification_list::shell::{Cursor, Services, ShellHost};
use notification_list::text::DefaultMarkup;

#[derive(Parser)]
#[command(name = "notify-sim")]
#[command(about = "Headless notification list simulator")]
struct Cli {
    /// Number of messages to add
    #[arg(short = 'n', long, default_value_t = 3)]
    messages: usize,

    /// Expand the first message
    #[arg(long)]
    expand: bool,

    /// Clear the section after adding messages
    #[arg(long)]
    clear: bool,

    /// Animation tick interval in milliseconds
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Config file (defaults to the user config)
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Host that logs every request.
struct LogHost;

impl ShellHost for LogHost {
    fn launch_uri(&self, uri: &str) {
        tracing::info!("launch {}", uri);
    }

    fn set_cursor(&self, cursor: Cursor) {
        tracing::debug!(?cursor, "set cursor");
    }

    fn sync_pointer(&self) {
        tracing::trace!("sync pointer");
    }

    fn hide_overview(&self) {
        tracing::info!("hide overview");
    }

    fn close_calendar(&self) {
        tracing::info!("close calendar");
    }
}

#[derive(Debug)]
enum ListEvent {
    EmptyChanged(bool),
    Expanded(usize),
    Closed(usize),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => PanelConfig::load_from(path),
        None => PanelConfig::load(),
    };
    tracing::info!("Using config {}", config.path().display());

    let timeline = Rc::new(Timeline::new());
    let services = Services::new(timeline.clone(), Rc::new(DefaultMarkup), Rc::new(LogHost), config);
    let (tx, rx) = mpsc::unbounded_channel();

    let section = MessageListSection::new("Notifications", &services);
    {
        let tx = tx.clone();
        let weak = Rc::downgrade(&section);
        section.connect(SectionSignal::EmptyChanged, move || {
            if let Some(section) = weak.upgrade() {
                let _ = tx.send(ListEvent::EmptyChanged(section.is_empty()));
            }
        });
    }

    for i in 0..cli.messages {
        let message = Message::new(
            &format!("Message {}", i + 1),
            &format!("Details for item {} at https://example.org/items/{}\nSee also www.gnome.org", i + 1, i + 1),
            &services,
        );
        if i == 0 && cli.messages > 1 {
            message.add_media_control("media-playback-pause-symbolic", || tracing::info!("pause"));
        }
        let expanded_tx = tx.clone();
        message.connect(MessageSignal::Expanded, move || {
            let _ = expanded_tx.send(ListEvent::Expanded(i));
        });
        let closed_tx = tx.clone();
        message.connect(MessageSignal::Close, move || {
            let _ = closed_tx.send(ListEvent::Closed(i));
        });
        section.add_message(&message, true)?;
    }

    if cli.expand {
        if let Some(first) = section.messages().first() {
            first.expand(true);
        }
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build()?;
    runtime.block_on(run(&timeline, &section, cli.clear, cli.tick_ms, rx));

    let snapshot = section.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot);
    }
    Ok(())
}

/// Tick the timeline until idle. With `clear`, clear once the insertion
/// animations have settled, then tick until idle again.
async fn run(
    timeline: &Timeline,
    section: &MessageListSection,
    clear: bool,
    tick_ms: u64,
    mut events: mpsc::UnboundedReceiver<ListEvent>,
) {
    let step = Duration::from_millis(tick_ms.max(1));
    let mut interval = tokio::time::interval(step);
    let mut pending_clear = clear;

    loop {
        interval.tick().await;
        timeline.tick(step.as_secs_f64());

        while let Ok(event) = events.try_recv() {
            tracing::info!(?event, "list event");
        }

        if timeline.is_idle() {
            if !pending_clear {
                break;
            }
            pending_clear = false;
            tracing::info!("Clearing section");
            section.clear();
        }
    }
}

fn print_snapshot(snapshot: &SectionSnapshot) {
    println!(
        "{} ({}): {} message(s), empty={}, visible={}, can_clear={}",
        snapshot.title,
        snapshot.date,
        snapshot.messages.len(),
        snapshot.empty,
        snapshot.visible,
        snapshot.can_clear
    );
    for message in &snapshot.messages {
        let state = if message.expanded { "expanded" } else { "collapsed" };
        println!("  - {} [{}] scale={:.2} can_close={}", message.title, state, message.scale, message.can_close);
        for url in &message.urls {
            println!("      url @{}+{}: {}", url.offset, url.length, url.text);
        }
    }
}
