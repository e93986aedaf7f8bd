use crate::error::{RentalError, RentalResult};
use crate::loan::Compounding;
use chrono::NaiveDate;

/// Longest loan the schedule will amortize, in years.
pub const MAX_LOAN_TERM: u32 = 100;

/// Property, financing and running-cost parameters for one rental.
///
/// Rates are annual fractions (0.0035 for 0.35%) except `management_fee_rate`,
/// which is a fraction of the monthly rent. `loan_term` is in years.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RentalConfig {
    pub price: f64,
    pub monthly_rent: f64,
    pub monthly_hoa: f64,
    pub monthly_utilities: f64,
    pub management_fee_rate: f64,
    pub tax_rate: f64,
    pub home_insurance_rate: f64,
    pub flood_insurance_rate: f64,
    pub loan_ratio: f64,
    pub loan_term: u32,
    pub loan_rate: f64,
    pub income_tax_rate: f64,
    pub additional_investment: f64,
    pub include_additional_investment_in_loan: bool,
    pub compounding: Compounding,
    pub first_payment_date: Option<NaiveDate>,
    pub currency: String,
}

/// Financing derived from a config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoanTerms {
    pub loan_amount: f64,
    pub principal_financed: f64,
}

impl RentalConfig {
    pub fn new(price: f64, monthly_rent: f64, monthly_hoa: f64) -> Self {
        Self {
            price,
            monthly_rent,
            monthly_hoa,
            monthly_utilities: 0.,
            management_fee_rate: 0.,
            tax_rate: 0.0035,
            home_insurance_rate: 0.007,
            flood_insurance_rate: 0.003,
            loan_ratio: 0.85,
            loan_term: 15,
            loan_rate: 0.06,
            income_tax_rate: 0.37,
            additional_investment: 0.,
            include_additional_investment_in_loan: false,
            compounding: Compounding::Monthly,
            first_payment_date: None,
            currency: String::from("$"),
        }
    }

    pub fn validate(&self) -> RentalResult<()> {
        positive("price", self.price)?;
        positive("monthly_rent", self.monthly_rent)?;
        non_negative("monthly_hoa", self.monthly_hoa)?;
        non_negative("monthly_utilities", self.monthly_utilities)?;
        non_negative("additional_investment", self.additional_investment)?;
        if self.loan_term > MAX_LOAN_TERM {
            return Err(RentalError::invalid_config(
                "loan_term",
                format!("must be at most {} years, got {}", MAX_LOAN_TERM, self.loan_term),
            ));
        }

        for (field, rate) in [
            ("management_fee_rate", self.management_fee_rate),
            ("tax_rate", self.tax_rate),
            ("home_insurance_rate", self.home_insurance_rate),
            ("flood_insurance_rate", self.flood_insurance_rate),
            ("loan_ratio", self.loan_ratio),
            ("loan_rate", self.loan_rate),
            ("income_tax_rate", self.income_tax_rate),
        ] {
            fraction(field, rate)?;
        }
        Ok(())
    }

    pub fn loan_terms(&self) -> LoanTerms {
        let loan_amount = if self.include_additional_investment_in_loan {
            self.price + self.additional_investment
        } else {
            self.price
        };
        LoanTerms {
            loan_amount,
            principal_financed: loan_amount * self.loan_ratio,
        }
    }

    pub fn management_fee(&self) -> f64 {
        self.monthly_rent * self.management_fee_rate
    }

    pub fn monthly_tax(&self) -> f64 {
        self.price * self.tax_rate / 12.
    }

    pub fn monthly_home_insurance(&self) -> f64 {
        self.price * self.home_insurance_rate / 12.
    }

    pub fn monthly_flood_insurance(&self) -> f64 {
        self.price * self.flood_insurance_rate / 12.
    }
}

fn positive(field: &'static str, value: f64) -> RentalResult<()> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(RentalError::invalid_config(
            field,
            format!("must be positive, got {}", value),
        ))
    }
}

fn non_negative(field: &'static str, value: f64) -> RentalResult<()> {
    if value >= 0. && value.is_finite() {
        Ok(())
    } else {
        Err(RentalError::invalid_config(
            field,
            format!("must not be negative, got {}", value),
        ))
    }
}

fn fraction(field: &'static str, value: f64) -> RentalResult<()> {
    if (0. ..=1.).contains(&value) {
        Ok(())
    } else {
        Err(RentalError::invalid_config(
            field,
            format!("must be within [0, 1], got {}", value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_log::test;

    #[test]
    fn test_defaults_are_valid() {
        let config = RentalConfig::new(300000., 2000., 100.);
        assert!(config.validate().is_ok());
        assert_eq!(config.loan_term, 15);
        assert_eq!(config.currency, "$");
    }

    #[test]
    fn test_monthly_figures() {
        let mut config = RentalConfig::new(300000., 2000., 100.);
        config.management_fee_rate = 0.1;

        assert_relative_eq!(config.management_fee(), 200., epsilon = 1e-9);
        assert_relative_eq!(config.monthly_tax(), 87.5, epsilon = 1e-9);
        assert_relative_eq!(config.monthly_home_insurance(), 175., epsilon = 1e-9);
        assert_relative_eq!(config.monthly_flood_insurance(), 75., epsilon = 1e-9);
    }

    #[test]
    fn test_loan_terms() {
        let mut config = RentalConfig::new(300000., 2000., 100.);
        config.additional_investment = 20000.;

        let terms = config.loan_terms();
        assert_eq!(terms.loan_amount, 300000.);
        assert_relative_eq!(terms.principal_financed, 255000., epsilon = 1e-6);

        config.include_additional_investment_in_loan = true;
        let terms = config.loan_terms();
        assert_eq!(terms.loan_amount, 320000.);
        assert_relative_eq!(terms.principal_financed, 272000., epsilon = 1e-6);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let mut config = RentalConfig::new(300000., 2000., 100.);
        config.loan_ratio = 1.2;
        assert_eq!(
            config.validate(),
            Err(RentalError::invalid_config(
                "loan_ratio",
                "must be within [0, 1], got 1.2"
            ))
        );

        let config = RentalConfig::new(0., 2000., 100.);
        assert!(config.validate().unwrap_err().is_invalid_config());

        let config = RentalConfig::new(300000., -5., 100.);
        assert!(config.validate().is_err());

        let mut config = RentalConfig::new(300000., 2000., 100.);
        config.income_tax_rate = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = RentalConfig::new(300000., 2000., 100.);
        config.loan_term = 400_000_000;
        assert_eq!(
            config.validate(),
            Err(RentalError::invalid_config(
                "loan_term",
                "must be at most 100 years, got 400000000"
            ))
        );
        config.loan_term = MAX_LOAN_TERM;
        assert!(config.validate().is_ok());
    }
}
