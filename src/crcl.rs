use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{DoseError, DoseResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    fn correction_factor(self) -> f64 {
        match self {
            Sex::Male => 1.0,
            Sex::Female => 0.85,
        }
    }
}

/// One calculation request's demographic and lab inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: f64,
    pub weight_kg: f64,
    pub sex: Sex,
    pub serum_creatinine: f64,
}

impl PatientInput {
    pub fn validate(&self) -> DoseResult<()> {
        if !self.age.is_finite() || self.age < 0.0 {
            return Err(DoseError::Validation(
                "Age must be zero or greater".to_string(),
            ));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(DoseError::Validation(
                "Weight must be positive".to_string(),
            ));
        }
        if !self.serum_creatinine.is_finite() || self.serum_creatinine <= 0.0 {
            return Err(DoseError::Validation(
                "Serum creatinine must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn crcl(&self) -> f64 {
        calculate_crcl(self.age, self.weight_kg, self.sex, self.serum_creatinine)
    }
}

/// Cockcroft-Gault creatinine clearance estimate in mL/min, rounded to two
/// decimal places. No output bounds are applied: extreme inputs yield
/// extreme estimates, and callers gate input ranges via validation.
pub fn calculate_crcl(age: f64, weight_kg: f64, sex: Sex, serum_creatinine: f64) -> f64 {
    let crcl = ((140.0 - age) * weight_kg * sex.correction_factor()) / (72.0 * serum_creatinine);
    round2(crcl)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
