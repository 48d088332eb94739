use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use ksim_ca::{
    canonical_history_hash, history_to_json, Automaton, AutomatonConfig, CellState,
    InitialCondition,
};
use serde::Serialize;
use tracing::info;

use crate::output::{csv_writer, write_json};

#[derive(Args, Debug)]
pub struct AutomatonArgs {
    /// Optional YAML configuration; flags below override its values.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Rule number in `[0, K^(K^2))`.
    #[arg(long)]
    pub rule: Option<u64>,
    /// Number of states per cell (K).
    #[arg(long)]
    pub states: Option<u32>,
    /// Length of a random initial configuration.
    #[arg(long, conflicts_with = "initial")]
    pub length: Option<usize>,
    /// Seed for the random initial configuration.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Explicit initial configuration, e.g. `0,1,2,1`.
    #[arg(long, value_delimiter = ',')]
    pub initial: Option<Vec<CellState>>,
    /// Number of synchronous updates.
    #[arg(long)]
    pub steps: Option<usize>,
    /// Output directory for artefacts.
    #[arg(long)]
    pub out: PathBuf,
}

#[derive(Debug, Serialize)]
struct AutomatonSummary {
    rule_number: u64,
    num_states: u32,
    length: usize,
    steps: usize,
    seed: Option<u64>,
    lookup_table: Vec<CellState>,
    final_configuration: Vec<CellState>,
    history_hash: String,
}

pub fn run(args: &AutomatonArgs) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(args)?;
    let automaton = config.run()?;
    fs::create_dir_all(&args.out)?;

    write_spacetime(args, &automaton)?;
    fs::write(args.out.join("history.json"), history_to_json(automaton.history())?)?;

    let summary = AutomatonSummary {
        rule_number: automaton.rule_number(),
        num_states: automaton.num_states(),
        length: automaton.current().len(),
        steps: automaton.steps_evolved(),
        seed: match config.initial {
            InitialCondition::Random { .. } => Some(config.seed),
            InitialCondition::Explicit { .. } => None,
        },
        lookup_table: automaton.lookup_table().outputs().to_vec(),
        final_configuration: automaton.current().as_slice().to_vec(),
        history_hash: canonical_history_hash(automaton.history()),
    };
    write_json(args.out.join("summary.json"), &summary)?;
    info!(
        rule_number = summary.rule_number,
        num_states = summary.num_states,
        steps = summary.steps,
        hash = %summary.history_hash,
        out = %args.out.display(),
        "automaton artefacts written"
    );
    Ok(())
}

fn resolve_config(args: &AutomatonArgs) -> Result<AutomatonConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => AutomatonConfig::load(path)?,
        None => {
            let Some(rule_number) = args.rule else {
                return Err("--rule is required unless --config is given".into());
            };
            if args.initial.is_none() && args.length.is_none() {
                return Err("either --initial or --length is required".into());
            }
            AutomatonConfig::new(rule_number, InitialCondition::Random { length: 0 })
        }
    };
    if let Some(rule_number) = args.rule {
        config.rule_number = rule_number;
    }
    if let Some(states) = args.states {
        config.num_states = states;
    }
    if let Some(steps) = args.steps {
        config.steps = steps;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(cells) = &args.initial {
        config.initial = InitialCondition::Explicit {
            cells: cells.clone(),
        };
    } else if let Some(length) = args.length {
        config.initial = InitialCondition::Random { length };
    }
    Ok(config)
}

fn write_spacetime(args: &AutomatonArgs, automaton: &Automaton) -> Result<(), Box<dyn Error>> {
    let mut writer = csv_writer(&args.out.join("spacetime.csv"))?;
    for row in automaton.history() {
        writer.write_record(row.as_slice().iter().map(|cell| cell.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
