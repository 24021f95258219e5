use {
    anyhow::Result,
    candle_core::Device,
    clap::{
        Parser,
        ValueEnum,
    },
    drive_rl::{
        agents::DDPG,
        configs::{
            DDPGConfig,
            TrainConfig,
        },
        engines::run_experiment_off_policy,
        envs::{
            PointMassEnv,
            TrackEnv,
        },
        logging::setup_logging,
    },
    tracing::Level,
};

#[derive(ValueEnum, Debug, Clone)]
enum Env {
    Track,
    Pointmass,
}

#[derive(ValueEnum, Debug, Clone)]
enum Loglevel {
    Error, // put these only during active debugging and then downgrade later
    Warn,  // main events in the program
    Info,  // all the little details
    None,  // don't log anything
}
impl Loglevel {
    fn level(&self) -> Option<Level> {
        match self {
            Loglevel::Error => Some(Level::ERROR),
            Loglevel::Warn => Some(Level::WARN),
            Loglevel::Info => Some(Level::INFO),
            Loglevel::None => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Setup logging
    #[arg(long, value_enum, default_value_t=Loglevel::Warn)]
    log: Loglevel,

    /// The environment to train on.
    #[arg(long, value_enum)]
    env: Env,

    /// Directory (under data/) to write the collected data to.
    #[arg(long)]
    output: Option<String>,

    /// The number of repeated, identical runs to perform.
    #[arg(long, default_value_t = 1)]
    runs: usize,

    /// Load pretrained model weights from this directory before training.
    #[arg(long)]
    load_model: Option<String>,

    /// The name of the pretrained model to load.
    #[arg(long, default_value = "run_0")]
    model_name: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(level) = args.log.level() {
        setup_logging(&"debug.log", level, Some(level))?;
    }

    let device = Device::Cpu;
    let load_model = args
        .load_model
        .clone()
        .map(|path| (path, args.model_name.clone()));

    match args.env {
        Env::Track => run_experiment_off_policy::<DDPG, TrackEnv, _, _>(
            &args.output.unwrap_or_else(|| "track".to_owned()),
            args.runs,
            Default::default(),
            DDPGConfig::track(),
            TrainConfig::track(),
            load_model,
            &device,
        )?,
        Env::Pointmass => run_experiment_off_policy::<DDPG, PointMassEnv, _, _>(
            &args.output.unwrap_or_else(|| "point_mass".to_owned()),
            args.runs,
            Default::default(),
            DDPGConfig::point_mass(),
            TrainConfig::point_mass(),
            load_model,
            &device,
        )?,
    }
    Ok(())
}
