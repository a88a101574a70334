use anyhow::{Context, Result};
use chatmark::components::layout::page_wrapper;
use chatmark::{
    Config, CopyController, HIGHLIGHT_CSS, HtmlSurface, LogNotifier, MESSAGE_CSS, Message,
    MessageActions, MessageRenderer, MessageView, UnavailableClipboard, write_css_assets,
};
use std::fs;
use std::io::{self, Read};
use std::rc::Rc;
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber; `RUST_LOG` overrides the level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(config: &Config) -> Result<String> {
    if config.reads_stdin() {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read message from stdin")?;
        return Ok(text);
    }

    fs::read_to_string(&config.input)
        .with_context(|| format!("Failed to read message file: {}", config.input.display()))
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(config.verbose);
    config.validate().context("Invalid configuration")?;

    let text = read_input(&config)?;
    let mut message = Message::new(config.id.clone(), config.role, text);
    if let Some(avatar) = &config.avatar {
        message = message.with_avatar(avatar.clone());
    }

    let actions = MessageActions {
        show_retry: config.show_retry,
        on_retry: Some(Box::new(|| info!("Regenerate requested"))),
        on_delete: Some(Box::new(|id: &str| info!(id, "Delete requested"))),
    };

    let mut surface = HtmlSurface::new();
    surface.attach();

    let controller = CopyController::new(
        Rc::new(UnavailableClipboard),
        Rc::new(LogNotifier),
        Rc::new(LocalSet::new()),
    );
    let renderer = MessageRenderer::new().context("Failed to create renderer")?;
    let mut view = MessageView::new(message, actions, renderer, controller, surface);
    view.mount()?;

    info!(
        id = view.message().id(),
        role = %view.message().role(),
        code_blocks = view.surface().affordance_count(),
        "Rendered message"
    );

    let markup = view.markup();
    view.unmount();

    if config.fragment {
        println!("{}", markup.into_string());
        return Ok(());
    }

    fs::create_dir_all(&config.output).context("Failed to create output directory")?;

    let assets_dir = config.output.join("assets");
    fs::create_dir_all(&assets_dir).context("Failed to create assets directory")?;
    write_css_assets(&assets_dir, &config.theme).context("Failed to write CSS assets")?;

    let stylesheets = [
        format!("assets/{}", MESSAGE_CSS),
        format!("assets/{}", HIGHLIGHT_CSS),
    ];
    let stylesheet_refs: Vec<&str> = stylesheets.iter().map(String::as_str).collect();
    let title = format!("{} message", config.role);
    let page = page_wrapper(&title, &stylesheet_refs, markup);

    let index_path = config.output.join("index.html");
    fs::write(&index_path, page.into_string())
        .with_context(|| format!("Failed to write {}", index_path.display()))?;

    println!("Generated: {}", index_path.display());

    if config.open {
        open::that(&index_path)
            .with_context(|| format!("Failed to open {}", index_path.display()))?;
    }

    Ok(())
}
