//! sales-forecast - predict daily store sales and review past accuracy
//!
//! Usage:
//!   sales-forecast predict --date 2015-08-01 --store 1 --promo
//!   sales-forecast history --store 1
//!   sales-forecast stores
//!   sales-forecast schema

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sales_forecast::{round_currency, DashboardConfig, ForecastError, SalesForecaster};
use std::path::{Path, PathBuf};
use store_features::{
    Assortment, Promo2Since, PromoInterval, RawInputs, StateHoliday, StoreType, YearMonth,
};

#[derive(Parser)]
#[command(name = "sales-forecast")]
#[command(about = "Predict daily store sales and review historical model accuracy")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, default_value = "sales-forecast.toml")]
    config: PathBuf,

    /// Log debug output (otherwise RUST_LOG applies)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict sales for one store and date
    Predict(PredictArgs),

    /// Show actual vs predicted sales from the historical scoring run
    History {
        /// Store id
        #[arg(short, long)]
        store: u32,
    },

    /// List stores that have historical results
    Stores,

    /// Print the feature layout the model expects
    Schema,
}

#[derive(Args)]
struct PredictArgs {
    /// Prediction date (YYYY-MM-DD)
    #[arg(long, default_value = "2015-08-01")]
    date: NaiveDate,

    /// Store id
    #[arg(short, long, default_value_t = 1)]
    store: u32,

    /// Meters to the nearest competitor (100000 = no known competitor)
    #[arg(long, default_value_t = 5000.0)]
    competition_distance: f64,

    /// Month the competitor opened (YYYY-MM)
    #[arg(long)]
    competition_open: Option<YearMonth>,

    /// A promotion runs on the date
    #[arg(long)]
    promo: bool,

    /// The store takes part in the continuing promotion
    #[arg(long)]
    promo2: bool,

    /// Week and year the continuing promotion started (WEEK/YEAR)
    #[arg(long)]
    promo2_since: Option<Promo2Since>,

    /// Continuing promotion interval (None, Jan,Apr,Jul,Oct, Feb,May,Aug,Nov, Mar,Jun,Sept,Dec)
    #[arg(long, default_value = "None")]
    promo_interval: PromoInterval,

    /// Store type (a-d)
    #[arg(long, default_value = "a")]
    store_type: StoreType,

    /// Assortment (a-c)
    #[arg(long, default_value = "a")]
    assortment: Assortment,

    /// State holiday (0, a, b, c)
    #[arg(long, default_value = "0")]
    state_holiday: StateHoliday,

    /// School holiday on the date
    #[arg(long)]
    school_holiday: bool,

    /// Print the derived feature vector
    #[arg(long)]
    show_features: bool,
}

impl PredictArgs {
    fn to_inputs(&self) -> RawInputs {
        let mut builder = RawInputs::builder(self.date, self.store)
            .competition_distance(self.competition_distance)
            .competition_open_since(self.competition_open)
            .promo(self.promo)
            .store_type(self.store_type)
            .assortment(self.assortment)
            .state_holiday(self.state_holiday)
            .school_holiday(self.school_holiday);
        if self.promo2 {
            builder = builder.promo2(self.promo_interval, self.promo2_since);
        }
        builder.build()
    }
}

/// `1234567.891` -> `1,234,567.89`
fn format_amount(amount: f64) -> String {
    let amount = round_currency(amount);
    let rounded = format!("{:.2}", amount.abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

fn load_config(path: &Path) -> Result<DashboardConfig> {
    if path.exists() {
        DashboardConfig::load(path).with_context(|| format!("loading {}", path.display()))
    } else {
        log::info!("{} not found, using default configuration", path.display());
        Ok(DashboardConfig::default())
    }
}

fn predict(forecaster: &SalesForecaster, args: &PredictArgs) -> Result<()> {
    let raw = args.to_inputs();

    match forecaster.predict(&raw) {
        Ok(prediction) => {
            println!("Predicted sales: {}", format_amount(prediction.sales));
            if args.show_features {
                println!("\nFeature vector:\n{}", prediction.features);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(features) = e.features() {
                eprintln!("Scored feature vector:\n{}", features);
            } else if matches!(e, ForecastError::SchemaMismatch(_)) {
                if let Ok(features) = forecaster.derive_features(&raw) {
                    eprintln!("Derived feature vector:\n{}", features);
                }
            }
            Err(e).context("prediction failed")
        }
    }
}

fn history(forecaster: &SalesForecaster, store: u32) -> Result<()> {
    let records = forecaster.history_for_store(store);
    if records.is_empty() {
        println!("No historical data available for store {}.", store);
        return Ok(());
    }

    println!("{:<12} {:>14} {:>14}", "Date", "Actual", "Predicted");
    for record in &records {
        println!(
            "{:<12} {:>14} {:>14}",
            record.date.to_string(),
            format_amount(record.actual_sales),
            format_amount(record.predicted_sales)
        );
    }
    println!();
    print!("{}", forecaster.store_accuracy(store));
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = load_config(&cli.config)?;
    let forecaster = SalesForecaster::new(&config);

    match &cli.command {
        Commands::Predict(args) => predict(&forecaster, args)?,
        Commands::History { store } => history(&forecaster, *store)?,
        Commands::Stores => {
            let stores = forecaster.available_stores();
            if stores.is_empty() {
                println!("No historical results loaded.");
            }
            for store in stores {
                println!("{}", store);
            }
        }
        Commands::Schema => {
            for (position, slot) in forecaster.schema().slots().iter().enumerate() {
                println!("{:>2}  {:<32} {:?}", position, slot.name(), slot.kind());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(-4321.5), "-4,321.50");
        assert_eq!(format_amount(-0.004), "0.00");
        assert_eq!(format_amount(-0.02), "-0.02");
    }

    #[test]
    fn test_cli_builds_inputs() {
        let cli = Cli::parse_from([
            "sales-forecast",
            "predict",
            "--date",
            "2015-09-15",
            "--store",
            "12",
            "--promo2",
            "--promo-interval",
            "Mar,Jun,Sept,Dec",
            "--competition-open",
            "2010-04",
            "--store-type",
            "c",
        ]);
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let raw = args.to_inputs();
        assert_eq!(raw.store_id, 12);
        assert!(raw.promo2);
        assert_eq!(raw.promo_interval, PromoInterval::MarJunSeptDec);
        assert_eq!(raw.store_type, StoreType::C);
        assert_eq!(raw.competition_open_since, Some(YearMonth::new(2010, 4).unwrap()));
    }

    #[test]
    fn test_interval_ignored_without_promo2() {
        let cli = Cli::parse_from([
            "sales-forecast",
            "predict",
            "--promo-interval",
            "Jan,Apr,Jul,Oct",
        ]);
        let Commands::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        let raw = args.to_inputs();
        assert!(!raw.promo2);
        assert_eq!(raw.promo_interval, PromoInterval::None);
    }
}
