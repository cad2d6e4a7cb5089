// Command line front end. Parsing and printing live here; everything else
// is in the library.

pub mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

use commands::{Commands, GruArgs, RunArgs};
use gradscan::config::{ElmanConfig, GruConfig, RnnXorConfig};
use gradscan::data::{BitEncoding, SentenceTask, XorTask};
use gradscan::demo::SoftmaxDemo;
use gradscan::{train_loop, Elman, Gru, Matrix, RnnXor};

#[derive(Parser, Debug)]
#[command(
    name = "gradscan",
    version,
    about = "Train small recurrent networks with reverse-mode autodiff and print their running error."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::RnnXor(args) => run_rnn_xor(&args),
            Commands::GruXor(args) => run_gru_xor(&args),
            Commands::Elman(args) => run_elman(&args),
            Commands::Softmax => run_softmax(),
        }
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn load_or_default<T: Default>(
    path: Option<&str>,
    load: fn(&str) -> std::result::Result<T, gradscan::error::ConfigError>,
) -> Result<T> {
    match path {
        Some(path) => load(path).with_context(|| format!("loading {path}")),
        None => Ok(T::default()),
    }
}

fn run_rnn_xor(args: &RunArgs) -> Result<()> {
    let mut config: RnnXorConfig = load_or_default(args.config.as_deref(), RnnXorConfig::load_json)?;
    args.apply(&mut config.train, &mut config.seed);
    config.validate()?;

    let mut rng = make_rng(config.seed);
    let mut model = RnnXor::from_config(&config, &mut rng);
    let task = XorTask::new(config.bits, BitEncoding::ZeroOne);
    info!(hidden = config.hidden, bits = config.bits, "training rnn-xor");

    train_loop(&mut model, &mut rng, |rng| task.sample(rng), &config.train)?;

    let Some(all) = task.all_sequences() else {
        info!(bits = config.bits, "too many sequences to list");
        return Ok(());
    };
    for sample in all {
        let out = model.classify(&sample.inputs)?;
        println!("{:?} -> {:.4}", sample.bits, out.data[0][0]);
    }
    Ok(())
}

fn run_gru_xor(args: &GruArgs) -> Result<()> {
    let mut config: GruConfig = load_or_default(args.run.config.as_deref(), GruConfig::load_json)?;
    args.run.apply(&mut config.train, &mut config.seed);
    if let Some(batch_size) = args.batch_size {
        config.train.batch_size = batch_size;
    }
    config.validate()?;

    let mut rng = make_rng(config.seed);
    let mut model = Gru::from_config(&config, &mut rng);
    let task = XorTask::new(config.bits, config.encoding);
    info!(
        hidden = config.hidden,
        bits = config.bits,
        batch_size = config.train.batch_size,
        "training gru-xor"
    );

    train_loop(&mut model, &mut rng, |rng| task.sample(rng), &config.train)?;

    let Some(all) = task.all_sequences() else {
        info!(bits = config.bits, "too many sequences to list");
        return Ok(());
    };
    let mut correct = 0;
    for sample in &all {
        let out = model.classify(&sample.inputs)?.data[0][0];
        if task.encoding.decode(out) == sample.parity() {
            correct += 1;
        }
        println!("{:?} -> {:.4}", sample.bits, out);
    }
    println!("parity correct on {correct}/{} sequences", all.len());
    Ok(())
}

fn run_elman(args: &RunArgs) -> Result<()> {
    let mut config: ElmanConfig = load_or_default(args.config.as_deref(), ElmanConfig::load_json)?;
    args.apply(&mut config.train, &mut config.seed);
    config.validate()?;

    let mut rng = make_rng(config.seed);
    let mut model = Elman::from_config(&config, &mut rng);
    let task = SentenceTask::new(
        config.vocab_size,
        config.classes,
        config.window,
        config.min_sentence,
        config.max_sentence,
    )?;
    info!(
        hidden = config.hidden,
        classes = config.classes,
        vocab_size = config.vocab_size,
        input_dim = config.input_dim(),
        "training elman"
    );

    train_loop(&mut model, &mut rng, |rng| task.sample(rng), &config.train)?;

    let held_out = 200;
    let mut correct = 0;
    for _ in 0..held_out {
        let sample = task.sample(&mut rng);
        let predicted = model.classify(&sample.windows)?;
        if predicted.last() == Some(&sample.label) {
            correct += 1;
        }
    }
    println!("last-word accuracy on {held_out} fresh sentences: {correct}/{held_out}");
    Ok(())
}

fn run_softmax() -> Result<()> {
    let demo = SoftmaxDemo::default();
    let report = demo.run();

    println!("---------------------");
    println!("Recorded softmax:");
    print_matrix(&report.softmax.graph);
    println!("Direct softmax:");
    print_matrix(&report.softmax.direct);
    println!("---------------------");
    println!();
    println!("---------------------");
    println!("Recorded P(y | x):");
    print_matrix(&report.p_y_given_x.graph);
    println!("Direct P(y | x):");
    print_matrix(&report.p_y_given_x.direct);
    println!("---------------------");
    info!(
        softmax_diff = report.softmax.max_abs_diff(),
        p_y_given_x_diff = report.p_y_given_x.max_abs_diff(),
        "largest disagreement"
    );
    Ok(())
}

fn print_matrix(m: &Matrix) {
    for row in &m.data {
        let cells: Vec<String> = row.iter().map(|x| format!("{x:.6}")).collect();
        println!("[{}]", cells.join(", "));
    }
}
