use clap::Parser;
use colored::*;
use scout_chat::api::{HttpBackend, ImageUpload};
use scout_chat::cli::Args;
use scout_chat::config::{Config, FileConfig};
use scout_chat::models::Message;
use scout_chat::storage::{FilesystemStore, KeyValueStore, MemoryStore};
use scout_chat::ui::output::log_error;
use scout_chat::ui::render::terminal_width;
use scout_chat::ui::{display_notice, PanelRenderer};
use scout_chat::widget::{ChatWidget, PanelState, WidgetEvent};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.config_init {
        match FileConfig::init_user_config() {
            Ok(path) => {
                println!("{}", format!("Wrote {}", path.display()).green());
                return Ok(());
            }
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red(), e);
                process::exit(1);
            }
        }
    }

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    let backend = Arc::new(HttpBackend::new(&config.base_url)?);
    let durable: Arc<dyn KeyValueStore> = match &config.storage_dir {
        Some(dir) => Arc::new(FilesystemStore::new(dir)),
        None => Arc::new(FilesystemStore::in_default_location()?),
    };
    let session_store = Arc::new(MemoryStore::new());

    let mut widget = ChatWidget::new(backend, durable, session_store, config.widget_settings());
    if args.reset {
        widget.reset();
    }

    let renderer = PanelRenderer::new(terminal_width());
    let view = TranscriptView::new(widget.messages().to_vec(), renderer);
    let render_task = tokio::spawn(view.run(widget.subscribe()));

    widget.mount().await;
    let _auto_open = widget.schedule_auto_open();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&mut widget, &line).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
            Some(signal) = widget.next_signal() => widget.apply_signal(signal),
        }
    }

    // Dropping the widget closes the event stream and lets the view finish.
    drop(widget);
    finish_view(render_task).await;
    Ok(())
}

/// Wait for the transcript view, reporting a crash. Returns true on a clean exit.
async fn finish_view(task: JoinHandle<()>) -> bool {
    match task.await {
        Ok(()) => true,
        Err(e) => {
            log_error(&format!("Transcript view stopped unexpectedly: {}", e));
            false
        }
    }
}

/// Returns false when the user asked to quit.
async fn handle_line(widget: &mut ChatWidget, line: &str) -> bool {
    let line = line.trim_end();

    if let Some(command) = line.strip_prefix('/') {
        let (name, rest) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "quit" | "exit" => return false,
            "open" => widget.open(),
            "close" => widget.close(),
            "toggle" => widget.toggle(),
            "min" | "minimize" => widget.toggle_minimize(),
            "reset" => {
                if widget.can_reset() {
                    widget.reset();
                } else {
                    display_notice("Wait for Scout to answer before resetting.");
                }
            }
            "upload" => upload(widget, rest.trim()).await,
            "discard" => widget.clear_staged_image(),
            "status" => print_status(widget),
            "help" => print_help(),
            _ => display_notice(&format!("Unknown command /{} (try /help)", name)),
        }
        return true;
    }

    if widget.panel() != PanelState::Expanded {
        display_notice("The chat is not open. Type /open to talk to Scout.");
        return true;
    }

    widget.set_input(line);
    if !widget.send().await && widget.is_loading() {
        display_notice("Scout is still answering the previous message.");
    }
    true
}

async fn upload(widget: &mut ChatWidget, path: &str) {
    if path.is_empty() {
        display_notice("Usage: /upload <path-to-image>");
        return;
    }
    if !widget.can_upload() {
        display_notice("An upload or reply is already in progress.");
        return;
    }

    match ImageUpload::from_path(Path::new(path)).await {
        Ok(image) => {
            widget.upload_image(image).await;
        }
        Err(e) => eprintln!("{} could not read {}: {}", "Error:".red(), path, e),
    }
}

fn print_status(widget: &ChatWidget) {
    let session = widget.session();
    println!(
        "{}",
        format!(
            "panel: {:?}\nsession: {}\nmessages: {}\nstaged image: {}\nloading: {}  uploading: {}",
            widget.panel(),
            if session.is_empty() { "(none)" } else { session.session_id.as_str() },
            widget.messages().len(),
            widget.staged_image().unwrap_or("(none)"),
            widget.is_loading(),
            widget.is_uploading()
        )
        .dimmed()
    );
}

fn print_help() {
    println!("{}", "Type a message and press Enter to send it to Scout.".dimmed());
    for (command, description) in [
        ("/open", "Open the chat panel"),
        ("/close", "Close the chat panel"),
        ("/toggle", "Open or close the chat panel"),
        ("/min", "Minimize or expand the chat panel"),
        ("/upload <path>", "Attach an image to the next message"),
        ("/discard", "Remove the attached image"),
        ("/reset", "Start a new conversation"),
        ("/status", "Show widget state"),
        ("/quit", "Exit"),
    ] {
        println!("  {:<16} {}", command.cyan(), description.dimmed());
    }
}

/// Terminal view mirroring the widget transcript from its event stream.
struct TranscriptView {
    messages: Vec<Message>,
    panel: PanelState,
    renderer: PanelRenderer,
}

impl TranscriptView {
    fn new(messages: Vec<Message>, renderer: PanelRenderer) -> Self {
        Self {
            messages,
            panel: PanelState::Hidden,
            renderer,
        }
    }

    async fn run(mut self, mut events: UnboundedReceiver<WidgetEvent>) {
        while let Some(event) = events.recv().await {
            self.apply(event);
        }
    }

    fn expanded(&self) -> bool {
        self.panel == PanelState::Expanded
    }

    fn apply(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::PanelChanged(panel) => {
                self.panel = panel;
                match panel {
                    PanelState::Expanded => {
                        println!("{}", self.renderer.header(panel));
                        println!("{}", self.renderer.transcript(&self.messages));
                    }
                    PanelState::Minimized => println!("{}", self.renderer.header(panel)),
                    PanelState::Closed => println!("{}", self.renderer.button()),
                    PanelState::Hidden => {}
                }
            }
            WidgetEvent::MessageAppended(message) => {
                if self.expanded() {
                    println!("{}", self.renderer.message(&message));
                }
                self.messages.push(message);
            }
            WidgetEvent::MessageResolved(message) => {
                if self.expanded() {
                    println!("{}", self.renderer.message(&message));
                }
                if let Some(existing) = self.messages.iter_mut().find(|m| m.id == message.id) {
                    *existing = message;
                }
            }
            WidgetEvent::MessageRemoved(id) => self.messages.retain(|m| m.id != id),
            WidgetEvent::TranscriptReplaced(messages) => {
                self.messages = messages;
                if self.expanded() {
                    println!("{}", self.renderer.transcript(&self.messages));
                }
            }
            WidgetEvent::StagedImageChanged(Some(url)) => {
                println!("{}", self.renderer.staged_image(&url));
            }
            WidgetEvent::StagedImageChanged(None) => {}
            WidgetEvent::UploadingChanged(true) => display_notice("Uploading image..."),
            WidgetEvent::UploadingChanged(false) | WidgetEvent::LoadingChanged(_) => {}
            WidgetEvent::Reset => display_notice("Conversation reset."),
        }
    }
}
