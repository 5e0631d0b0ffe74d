//! Interactive chat shell for any provider the gateway can route to.
//!
//! # Usage
//!
//! ```bash
//! # Default model (github/Phi-4), key from ~/.llmchat/secrets.yaml
//! llmchat
//!
//! # Pick a model
//! llmchat --model claude-3-haiku-20240307
//!
//! # Talk to a local OpenAI-compatible server
//! llmchat --model ollama/llama2 --api-base http://localhost:11434/v1
//!
//! # Disable colors (useful for piping output)
//! llmchat --no-color
//! ```
//!
//! # Commands
//!
//! - `/model <name>` - Change the model
//! - `/key <key>` - Set the API key
//! - `/clear` - Clear conversation history
//! - `/stats` - Show message count and model info
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use llmchat::gateway::POPULAR_MODELS;
use llmchat::{
    ChatArgs, ChatCommand, ChatSession, Clock, HttpGateway, MetricsSnapshot, ModelRoute,
    PlainTextRenderer, Renderer, SecretStore, SessionConfig, help_text, mask_api_key,
    parse_command,
};

const TITLE: &str = "AI Chat Assistant";
const SUBTITLE: &str = "Chat with various AI models through one completion API";

/// Main entry point for the llmchat application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Resolve the local offset while this is still the only thread.
    let clock = Clock::local();

    let (args, _) = ChatArgs::from_command_line_relaxed("llmchat [OPTIONS]");
    init_tracing(args.verbose)?;
    let collector = biometrics::Collector::new();
    llmchat::register_biometrics(&collector);

    let mut renderer = PlainTextRenderer::with_color(!args.no_color);

    let secrets = match args.secrets_path() {
        Some(path) => SecretStore::load(&path).unwrap_or_else(|err| {
            tracing::error!(error = %err, "ignoring secrets file");
            renderer.print_error(&err.to_string());
            SecretStore::new()
        }),
        None => SecretStore::new(),
    }
    .with_env_override();

    let config = SessionConfig::from_args(&args, &secrets);
    let gateway = HttpGateway::with_options(args.api_base.as_deref(), None)?;
    let mut session = ChatSession::with_clock(gateway, config, clock);
    let mut rl = DefaultEditor::new()?;

    renderer.print_banner(TITLE, SUBTITLE);
    renderer.print_info(&format!("Model: {}", session.model()));
    renderer.print_info("Type /help for commands, /quit to exit\n");
    if !session.gate().is_open() {
        print_setup(&mut renderer);
    }

    loop {
        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let command = parse_command(&line);

                // Keep keys out of the line editor's history.
                if !matches!(command, Some(ChatCommand::Key(_))) {
                    let _ = rl.add_history_entry(line.as_str());
                }

                if let Some(cmd) = command {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.clear();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                renderer.print_info(&format!("    {}", line));
                            }
                        }
                        ChatCommand::Model(model) => {
                            if session.set_model(&model) {
                                let route = ModelRoute::parse(&model);
                                renderer.print_info(&format!(
                                    "Model changed to: {} (via {})",
                                    model, route.provider
                                ));
                            } else {
                                renderer.print_info(&format!("Model is already {}", model));
                            }
                        }
                        ChatCommand::Key(key) => {
                            session.set_api_key(&key);
                            if key.is_empty() {
                                renderer.print_info("API key cleared.");
                            } else {
                                renderer.print_info(&format!("API key set: {}", mask_api_key(&key)));
                            }
                        }
                        ChatCommand::Models => print_models(&mut renderer),
                        ChatCommand::History => {
                            if session.transcript().is_empty() {
                                renderer.print_info("No messages yet.");
                            }
                            for message in session.transcript() {
                                renderer.print_message(message);
                            }
                        }
                        ChatCommand::Stats => print_stats(&session, &collector, &mut renderer),
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                if !session.gate().is_open() {
                    print_setup(&mut renderer);
                    continue;
                }

                renderer.start_thinking();
                match session.send(&line).await {
                    Ok(exchange) => {
                        renderer.finish_thinking();
                        renderer.print_exchange(&exchange.user, &exchange.assistant);
                    }
                    Err(err) => renderer.print_error(&err.to_string()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("llmchat=debug")
        } else {
            EnvFilter::new("error")
        }
    });
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_setup(renderer: &mut dyn Renderer) {
    renderer.print_warning("Please enter your API key and model name to start chatting.");
    for line in llmchat::config::setup_instructions().lines() {
        renderer.print_info(&format!("    {}", line));
    }
}

fn print_models(renderer: &mut dyn Renderer) {
    renderer.print_info("    Popular models:");
    for (group, models) in POPULAR_MODELS {
        renderer.print_info(&format!("      {}:", group));
        for model in *models {
            renderer.print_info(&format!("        - {}", model));
        }
    }
}

fn print_stats(
    session: &ChatSession<HttpGateway>,
    collector: &biometrics::Collector,
    renderer: &mut dyn Renderer,
) {
    let stats = session.stats();
    let route = ModelRoute::parse(&stats.model);
    renderer.print_info("    Chat Stats:");
    renderer.print_info(&format!("      Messages: {}", stats.message_count));
    renderer.print_info(&format!(
        "      Exchanges: {} ({} failed)",
        stats.exchanges, stats.failed_exchanges
    ));
    renderer.print_info("    Model Info:");
    renderer.print_info(&format!("      Current model: {}", stats.model));
    renderer.print_info(&format!(
        "      Provider: {} ({})",
        route.provider,
        session
            .gateway()
            .api_base()
            .map(|base| base.as_str())
            .unwrap_or(route.provider.default_base_url())
    ));
    renderer.print_info(&format!(
        "      API key set: {}",
        if stats.api_key_set { "yes" } else { "no" }
    ));
    renderer.print_info("    Metrics:");
    for line in MetricsSnapshot::take(collector).lines() {
        renderer.print_info(&format!("      {}", line));
    }
}
