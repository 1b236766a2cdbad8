use clap::{Args, Parser, Subcommand, ValueEnum};
use review_score::config::AppConfig;
use review_score::error::AppError;
use review_score::scoring::{
    CycleId, EngineerLevel, EvaluationSource, FinalScoreCalculationService,
    InMemoryAdjustmentRepository, InMemoryFinalScoreRepository, Pillar, PillarScores,
    ScoreCalculationService, ScoreCycleService, ScoreServiceError, WeightTable,
};
use review_score::telemetry;
use serde::Deserialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "review-score",
    about = "Compute and calibrate final performance review scores",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the active level weight table
    Weights,
    /// Score a single set of pillar values at a level
    Score(ScoreArgs),
    /// Calculate final scores for a whole cycle from a JSON evaluation file
    Cycle(CycleArgs),
}

#[derive(Args, Debug)]
struct ScoreArgs {
    /// Engineer level used for weighting (junior, mid, senior, lead, manager)
    #[arg(long)]
    level: EngineerLevel,
    #[arg(long)]
    project_impact: u8,
    #[arg(long)]
    direction: u8,
    #[arg(long)]
    engineering_excellence: u8,
    #[arg(long)]
    operational_ownership: u8,
    #[arg(long)]
    people_impact: u8,
}

#[derive(Args, Debug)]
struct CycleArgs {
    /// JSON file with `cycle_id` and an `evaluations` array
    #[arg(long)]
    input: PathBuf,
    /// Output format for the cycle report
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,
    /// Lock every calculated score after the batch (calibration freeze)
    #[arg(long)]
    lock: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
struct CycleInput {
    cycle_id: CycleId,
    evaluations: Vec<EvaluationSource>,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let weights = config.scoring.weight_table()?;
    let calculator = FinalScoreCalculationService::new(
        ScoreCalculationService::new(weights),
        config.scoring.default_level,
    );

    match cli.command {
        Command::Weights => print_weights(calculator.calculator().weight_table()),
        Command::Score(args) => run_score(&calculator, args),
        Command::Cycle(args) => {
            run_cycle(calculator, config.scoring.batch_concurrency, args).await
        }
    }
}

fn print_weights(table: &WeightTable) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{:<8}", "LEVEL")?;
    for pillar in Pillar::ALL {
        write!(stdout, " {:>24}", pillar.label())?;
    }
    writeln!(stdout)?;

    for (level, weights) in table.iter() {
        write!(stdout, "{:<8}", level.label())?;
        for pillar in Pillar::ALL {
            write!(stdout, " {:>24.2}", weights.get(pillar))?;
        }
        writeln!(stdout)?;
    }
    Ok(())
}

fn run_score(calculator: &FinalScoreCalculationService, args: ScoreArgs) -> Result<(), AppError> {
    let scores = PillarScores::new(
        args.project_impact,
        args.direction,
        args.engineering_excellence,
        args.operational_ownership,
        args.people_impact,
    )
    .map_err(ScoreServiceError::from)?;
    let weighted = calculator
        .calculator()
        .calculate_weighted_score(&scores, args.level)
        .map_err(ScoreServiceError::from)?;

    let payload = serde_json::json!({
        "level": args.level,
        "weighted_score": weighted.value(),
        "percentage": weighted.percentage(),
        "bonus_tier": weighted.bonus_tier(),
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

async fn run_cycle(
    calculator: FinalScoreCalculationService,
    concurrency: usize,
    args: CycleArgs,
) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.input)?;
    let input: CycleInput = serde_json::from_str(&raw)?;

    let service = ScoreCycleService::new(
        Arc::new(InMemoryFinalScoreRepository::default()),
        Arc::new(InMemoryAdjustmentRepository::default()),
        calculator,
    )
    .with_batch_concurrency(concurrency);

    let outcome = service
        .calculate_cycle(&input.cycle_id, input.evaluations)
        .await;
    for (employee_id, err) in &outcome.failures {
        eprintln!("skipped {employee_id}: {err} ({:?})", err.kind());
    }

    if args.lock {
        let locked = service.lock_cycle(&input.cycle_id).await?;
        info!(cycle_id = %input.cycle_id, locked, "cycle locked from CLI");
    }

    let report = service.cycle_report(&input.cycle_id).await?;
    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Csv => report.write_csv(std::io::stdout().lock())?,
    }
    Ok(())
}
