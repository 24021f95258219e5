use {
    super::train::training_loop_off_policy,
    crate::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            SaveableAlgorithm,
        },
        configs::TrainConfig,
        envs::{
            Environment,
            Sampleable,
            TensorConvertible,
        },
        util::write_config,
    },
    anyhow::{
        anyhow,
        Result,
    },
    candle_core::Device,
    polars::prelude::{
        DataFrame,
        NamedFrom,
        ParquetWriter,
        Series,
    },
    serde::Serialize,
    std::{
        fs::{
            create_dir_all,
            File,
        },
        path::Path,
    },
    tracing::warn,
};

/// Run an experiment with an off-policy algorithm.
///
/// Performs `n_repetitions` identical runs (up to the run seed, which
/// is shifted per repetition so the episodes differ), writes the
/// environment / algorithm / training configs as RON next to the
/// collected data, one parquet file of returns and successes plus one
/// of critic losses per run, and the final model weights of each run.
///
/// Refuses to overwrite a directory that already contains config files.
pub fn run_experiment_off_policy<Alg, Env, Obs, Act>(
    path: &dyn AsRef<Path>,
    n_repetitions: usize,
    env_config: Env::Config,
    alg_config: Alg::Config,
    train_config: TrainConfig,
    load_model: Option<(String, String)>,
    device: &Device,
) -> Result<()>
where
    Env: Environment<Action = Act, Observation = Obs>,
    Env::Config: Clone + Serialize,
    Alg: Algorithm + OffPolicyAlgorithm + SaveableAlgorithm,
    Alg::Config: Clone + Serialize,
    Obs: Clone + TensorConvertible,
    Act: Clone + TensorConvertible + Sampleable,
{
    let path = Path::new("data/").join(path);

    let alg_config_exists = path.join("config_algorithm.ron").try_exists()?;
    let env_config_exists = path.join("config_environment.ron").try_exists()?;
    if alg_config_exists || env_config_exists {
        Err(anyhow!(concat!(
            "Config files already exist in this directory!\n",
            "I am assuming I would be overwriting existing data!",
        )))?
    }

    create_dir_all(path.as_path())?;
    write_config(&alg_config, path.join("config_algorithm.ron"))?;
    write_config(&env_config, path.join("config_environment.ron"))?;
    write_config(&train_config, path.join("config_training.ron"))?;

    for n in 0..n_repetitions {
        warn!("Collecting data, run {n}/{n_repetitions}");

        let mut env = *Env::new(env_config.clone())?;
        let mut alg = *Alg::from_config(
            device,
            &alg_config,
            env.observation_space().iter().product::<usize>(),
            env.action_space().iter().product::<usize>(),
            &env.action_domain(),
        )?;

        if let Some((model_path, model_name)) = load_model.clone() {
            warn!("Loading model weights from {model_path} with name {model_name}");
            alg.load(Path::new(&model_path), &model_name)?;
        }

        let mut train_config = train_config.clone();
        train_config.set_seed(train_config.seed().wrapping_add(n as u64));

        let results = training_loop_off_policy(&mut env, &mut alg, &train_config, device)?;

        let mut df = DataFrame::new(vec![
            Series::new(
                &format!("run_{n}_total_rewards"),
                &results.mc_returns,
            ),
            Series::new(
                &format!("run_{n}_successes"),
                &results.successes,
            ),
        ])?;
        ParquetWriter::new(
            File::create(path.join(format!("run_{n}_data.parquet")))?
        ).finish(&mut df)?;

        let mut losses = DataFrame::new(vec![Series::new(
            &format!("run_{n}_critic_losses"),
            &results.critic_losses,
        )])?;
        ParquetWriter::new(
            File::create(path.join(format!("run_{n}_losses.parquet")))?
        ).finish(&mut losses)?;

        alg.save(&path, &format!("run_{n}"))?;
    }
    Ok(())
}
