use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use log::error;
use rentalroi::{Compounding, Rental, RentalConfig, ReportFormat};
use simple_logger::SimpleLogger;
use std::process::ExitCode;

/// Cash-flow schedule and ROI summary for a rental property.
#[derive(Parser, Debug)]
#[command(name = "rentalroi", version)]
struct Cli {
    /// Purchase price
    #[arg(long)]
    price: f64,

    #[arg(long)]
    monthly_rent: f64,

    #[arg(long, default_value_t = 0.)]
    monthly_hoa: f64,

    #[arg(long, default_value_t = 0.)]
    monthly_utilities: f64,

    /// Management fee as a fraction of rent
    #[arg(long, default_value_t = 0.)]
    management_fee: f64,

    /// Annual property tax as a fraction of price
    #[arg(long, default_value_t = 0.0035)]
    tax_rate: f64,

    #[arg(long, default_value_t = 0.007)]
    home_ins_rate: f64,

    #[arg(long, default_value_t = 0.003)]
    flood_ins_rate: f64,

    #[arg(long, default_value_t = 0.85)]
    loan_ratio: f64,

    /// Loan term in years
    #[arg(long, default_value_t = 15)]
    loan_term: u32,

    #[arg(long, default_value_t = 0.06)]
    loan_rate: f64,

    #[arg(long, value_enum, default_value_t = CompoundingArg::Monthly)]
    compounding: CompoundingArg,

    #[arg(long, default_value_t = 0.37)]
    income_tax_rate: f64,

    #[arg(long, default_value_t = 0.)]
    additional_investment: f64,

    /// Finance the additional investment together with the price
    #[arg(long)]
    include_add_inv_in_loan: bool,

    /// Date of the first loan payment (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    first_payment: Option<NaiveDate>,

    #[arg(long, default_value = "$")]
    currency: String,

    /// Report format: txt or html
    #[arg(long, default_value = "txt")]
    format: String,

    /// Print every period of the schedule before the summary
    #[arg(long)]
    show_schedule: bool,

    #[arg(long, default_value_t = log::LevelFilter::Warn)]
    log_level: log::LevelFilter,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompoundingArg {
    Monthly,
    Quarterly,
    SemiAnnually,
    Annually,
}

impl From<CompoundingArg> for Compounding {
    fn from(arg: CompoundingArg) -> Self {
        match arg {
            CompoundingArg::Monthly => Compounding::Monthly,
            CompoundingArg::Quarterly => Compounding::Quarterly,
            CompoundingArg::SemiAnnually => Compounding::SemiAnnually,
            CompoundingArg::Annually => Compounding::Annually,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
}

impl Cli {
    fn to_config(&self) -> RentalConfig {
        RentalConfig {
            monthly_utilities: self.monthly_utilities,
            management_fee_rate: self.management_fee,
            tax_rate: self.tax_rate,
            home_insurance_rate: self.home_ins_rate,
            flood_insurance_rate: self.flood_ins_rate,
            loan_ratio: self.loan_ratio,
            loan_term: self.loan_term,
            loan_rate: self.loan_rate,
            income_tax_rate: self.income_tax_rate,
            additional_investment: self.additional_investment,
            include_additional_investment_in_loan: self.include_add_inv_in_loan,
            compounding: self.compounding.into(),
            first_payment_date: self.first_payment,
            currency: self.currency.clone(),
            ..RentalConfig::new(self.price, self.monthly_rent, self.monthly_hoa)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new().with_level(cli.log_level).init() {
        eprintln!("failed to initialise logging: {}", e);
    }

    let result = cli
        .format
        .parse::<ReportFormat>()
        .and_then(|format| {
            let rental = Rental::new(cli.to_config())?;
            if cli.show_schedule {
                rental.show_schedule();
            }
            rental.summarize(Some(format))
        });

    match result {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
