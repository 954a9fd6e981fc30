// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! lumen CLI - runs catalog scenarios against a console panel.
//!
//! The console stands in for the collaborator UI: lock state and light
//! changes print as they land on the affinity thread. Fatal scenarios are
//! expected to go quiet or report a fault; that is what they demonstrate.

use std::env;
use std::process;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use lumen_rt::fault::FatalHook;
use lumen_scenarios::catalog;
use lumen_scenarios::engine::Engine;
use lumen_scenarios::panel::{PanelHooks, LIGHT_COUNT};

/// How long each scenario step pretends to work.
const PACE: Duration = Duration::from_millis(400);

/// Wall clock granted to a scenario before the final state prints. No
/// scenario is cancelled; the deadlocking and crashing ones simply get
/// reported as they stand when this expires.
const OBSERVATION_WINDOW: Duration = Duration::from_secs(4);

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("list") => cmd_list(),
        Some("run") => {
            let Some(id) = args.get(2).and_then(|arg| arg.parse::<usize>().ok()) else {
                eprintln!("Usage: lumen run <id>");
                process::exit(1);
            };
            cmd_run(id);
        }
        Some("help") | Some("--help") | Some("-h") | None => print_usage(),
        Some(other) => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    println!("Usage: lumen <command>");
    println!();
    println!("Commands:");
    println!("  list        print the scenario catalog");
    println!("  run <id>    run one scenario against the console panel");
}

fn cmd_list() {
    for scenario in &catalog::SCENARIOS {
        println!("{:>2}  {:<26} {}", scenario.id, scenario.name, scenario.summary);
    }
}

fn cmd_run(id: usize) {
    let lights = Arc::new(Mutex::new([false; LIGHT_COUNT]));
    let hooks = PanelHooks {
        lock_ui: Box::new(|locked| {
            println!("[ui] input {}", if locked { "locked" } else { "unlocked" });
        }),
        reset: {
            let lights = Arc::clone(&lights);
            Box::new(move || {
                *lights.lock().unwrap() = [false; LIGHT_COUNT];
                println!("[ui] reset");
            })
        },
        light_up: {
            let lights = Arc::clone(&lights);
            Box::new(move |index| {
                let mut lights = lights.lock().unwrap();
                lights[index] = true;
                println!("[ui] lights {}", render(&lights));
            })
        },
    };

    let engine = Engine::start(hooks, PACE, FatalHook::default());
    match engine.run(id) {
        Ok(scenario) => println!("running {} - {}", scenario.name, scenario.summary),
        Err(error) => {
            eprintln!("{error}");
            process::exit(1);
        }
    }

    thread::sleep(OBSERVATION_WINDOW);
    println!("final lights {}", render(&lights.lock().unwrap()));
    // Deliberately no join here: a deadlocked or crashed scenario would
    // never release the drain loop. Process exit reaps it.
}

fn render(lights: &[bool; LIGHT_COUNT]) -> String {
    lights
        .iter()
        .map(|on| if *on { '*' } else { '.' })
        .collect()
}
