//! Dry-run harness
//! Boots an engine, steps a session deterministically, and dumps state.
//!
//! Proves that the engine loads, the industry loads, sessions advance,
//! and work, decisions, and events are generated safely.

use clap::Parser;
use std::path::PathBuf;

use worksim::content::{self, ScenarioHooks};
use worksim::core::config::EngineConfig;
use worksim::engine::Engine;
use worksim::session::Session;

/// Step a simulation session and print everything it produced
#[derive(Parser, Debug)]
#[command(name = "dry_run")]
#[command(about = "Run a deterministic dry-run of a simulation session")]
struct Args {
    /// Industry module to load
    #[arg(long, default_value = "tech")]
    industry: String,

    /// Actor role for the session
    #[arg(long, default_value = "junior_project_manager")]
    role: String,

    /// Number of ticks to run
    #[arg(long, default_value_t = 6)]
    ticks: u64,

    /// Event schedule seed for reproducible runs
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Scenario TOML to drive hooks from instead of the built-in industry
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Answer every open decision with its first option each tick
    #[arg(long, default_value_t = false)]
    auto_decide: bool,
}

fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{}", title);
    println!("{}", "=".repeat(60));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    print_section("BOOTSTRAP ENGINE");

    let config = EngineConfig {
        event_seed: args.seed,
        ..EngineConfig::default()
    };
    let session = Session::new(&args.industry, &args.role);
    let mut engine = match &args.scenario {
        Some(path) => {
            let scenario = content::load_scenario(path)?;
            Engine::with_hooks(
                session,
                Box::new(ScenarioHooks::new(&args.industry, scenario)),
                config,
            )
        }
        None => Engine::new(session, config)?,
    };

    engine.start()?;

    println!("Session ID: {}", engine.session().id());
    println!("Industry:   {}", engine.session().industry());
    println!("Role:       {}", engine.session().role());

    for step in 0..args.ticks {
        print_section(&format!("SIMULATION STEP {}", step + 1));

        engine.step()?;

        if args.auto_decide {
            let open: Vec<_> = engine
                .session()
                .decisions()
                .iter()
                .filter(|d| d.is_available(engine.session().current_time()))
                .filter_map(|d| {
                    d.options()
                        .first()
                        .map(|o| (d.id, o.id.clone(), d.title.clone()))
                })
                .collect();
            for (decision_id, option_id, title) in open {
                match engine.make_decision(decision_id, &option_id) {
                    Ok(()) => println!("decided '{}' -> {}", title, option_id),
                    Err(e) => println!("could not decide '{}': {}", title, e),
                }
            }
        }

        let session = engine.session();
        println!("Current time: {}", session.current_time());

        println!("\nActive work:");
        for work in session.active_work().values() {
            println!(
                " - [{}] {} (effort {}, priority {})",
                work.status, work.title, work.estimated_effort, work.priority
            );
        }

        println!("\nDecisions:");
        for decision in session.decisions() {
            let status = match decision.selected_option() {
                Some(option) => format!("made: {}", option),
                None => "open".to_string(),
            };
            println!(" - {} ({})", decision.title, status);
        }

        println!("\nEvents:");
        for event in session.events() {
            println!(" - {} @ {:?}", event.name, event.triggered_at);
        }
    }

    print_section("END SESSION");
    engine.end()?;

    let snapshot = engine.session().snapshot();
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    println!("\nSession ended cleanly; {} evidence records.", snapshot.evidence.len());

    Ok(())
}
