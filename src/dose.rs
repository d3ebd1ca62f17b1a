use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::range;
use crate::table::DoseTable;

/// Outcome of a dose lookup. The two failure shapes are user-visible
/// messages, not errors; the computation itself always succeeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DoseOutcome {
    Recommended {
        drug: String,
        crcl: f64,
        dose: String,
    },
    DrugNotFound {
        drug: String,
    },
    NoMatchingRange {
        drug: String,
        crcl: f64,
    },
}

impl DoseOutcome {
    pub fn is_recommendation(&self) -> bool {
        matches!(self, Self::Recommended { .. })
    }
}

impl fmt::Display for DoseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recommended { drug, crcl, dose } => {
                write!(
                    f,
                    "Dose for {} (CrCl: {} mL/min): {}",
                    title_case(drug),
                    crcl,
                    dose
                )
            }
            Self::DrugNotFound { drug } => {
                write!(f, "Warning: drug '{}' not found in the reference table.", drug)
            }
            Self::NoMatchingRange { drug, crcl } => {
                write!(
                    f,
                    "Warning: no matching CrCl range found for {} (CrCl: {} mL/min).",
                    title_case(drug),
                    crcl
                )
            }
        }
    }
}

/// Look up the recommended dose for a drug at a given clearance. Rows are
/// filtered case-insensitively and evaluated in table order; the first row
/// whose range covers the clearance wins.
pub fn resolve_dose(drug: &str, crcl: f64, weight_kg: f64, table: &DoseTable) -> DoseOutcome {
    let rows = table.rows_for_drug(drug);
    if rows.is_empty() {
        return DoseOutcome::DrugNotFound {
            drug: drug.to_string(),
        };
    }

    for row in rows {
        if range::matches(crcl, &row.range) {
            return DoseOutcome::Recommended {
                drug: drug.to_string(),
                crcl,
                dose: apply_weight(&row.recommended_dose, weight_kg),
            };
        }
    }

    DoseOutcome::NoMatchingRange {
        drug: drug.to_string(),
        crcl,
    }
}

fn mg_per_kg_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\s*mg/kg").expect("valid mg/kg pattern"))
}

/// Replace a per-kilogram dose expression with the absolute amount for this
/// patient. Text without an `<integer> mg/kg` pattern passes through as-is.
fn apply_weight(dose_text: &str, weight_kg: f64) -> String {
    let pattern = mg_per_kg_pattern();
    let Some(caps) = pattern.captures(dose_text) else {
        return dose_text.to_string();
    };
    let per_kg: u64 = match caps[1].parse() {
        Ok(value) => value,
        Err(_) => return dose_text.to_string(),
    };
    let total = per_kg as f64 * weight_kg;
    pattern
        .replace(dose_text, format!("{} mg", format_amount(total)))
        .into_owned()
}

// Whole amounts print without a decimal point.
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> DoseTable {
        let csv = "Drug,Range,Recommended Dose\n\
            vancomycin,>=60,15 mg/kg every 12 h\n\
            vancomycin,30-59,15 mg/kg every 24 h\n\
            vancomycin,<30,15 mg/kg every 48 h\n\
            gentamicin,>=60,5 mg/kg every 24 h\n\
            meropenem,>50,1000 mg every 8 h\n";
        DoseTable::from_bytes(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_mg_per_kg_substitution() {
        let table = sample_table();
        let outcome = resolve_dose("gentamicin", 75.0, 70.0, &table);
        assert_eq!(
            outcome,
            DoseOutcome::Recommended {
                drug: "gentamicin".to_string(),
                crcl: 75.0,
                dose: "350 mg every 24 h".to_string(),
            }
        );
    }

    #[test]
    fn test_absolute_dose_passes_through() {
        let table = sample_table();
        let outcome = resolve_dose("meropenem", 80.0, 70.0, &table);
        assert_eq!(
            outcome,
            DoseOutcome::Recommended {
                drug: "meropenem".to_string(),
                crcl: 80.0,
                dose: "1000 mg every 8 h".to_string(),
            }
        );
    }

    #[test]
    fn test_drug_not_found() {
        let table = sample_table();
        let outcome = resolve_dose("amikacin", 68.06, 70.0, &table);
        assert_eq!(
            outcome,
            DoseOutcome::DrugNotFound {
                drug: "amikacin".to_string()
            }
        );
        assert!(!outcome.is_recommendation());
    }

    #[test]
    fn test_no_matching_range() {
        let table = sample_table();
        let outcome = resolve_dose("meropenem", 20.0, 70.0, &table);
        assert_eq!(
            outcome,
            DoseOutcome::NoMatchingRange {
                drug: "meropenem".to_string(),
                crcl: 20.0,
            }
        );
    }

    #[test]
    fn test_first_matching_row_wins() {
        let table = sample_table();
        // 60 satisfies both ">=60" and nothing earlier; 45 falls to the
        // second vancomycin row.
        let at_60 = resolve_dose("vancomycin", 60.0, 50.0, &table);
        let at_45 = resolve_dose("vancomycin", 45.0, 50.0, &table);
        assert_eq!(
            at_60,
            DoseOutcome::Recommended {
                drug: "vancomycin".to_string(),
                crcl: 60.0,
                dose: "750 mg every 12 h".to_string(),
            }
        );
        assert_eq!(
            at_45,
            DoseOutcome::Recommended {
                drug: "vancomycin".to_string(),
                crcl: 45.0,
                dose: "750 mg every 24 h".to_string(),
            }
        );
    }

    #[test]
    fn test_drug_lookup_is_case_insensitive() {
        let table = sample_table();
        let outcome = resolve_dose("Vancomycin", 70.0, 70.0, &table);
        assert!(outcome.is_recommendation());
    }

    #[test]
    fn test_apply_weight_whole_amount() {
        assert_eq!(apply_weight("5 mg/kg", 70.0), "350 mg");
    }

    #[test]
    fn test_apply_weight_fractional_weight() {
        assert_eq!(apply_weight("5 mg/kg", 70.5), "352.5 mg");
    }

    #[test]
    fn test_apply_weight_without_pattern() {
        assert_eq!(apply_weight("500 mg twice daily", 70.0), "500 mg twice daily");
    }

    #[test]
    fn test_display_title_cases_drug_name() {
        let outcome = DoseOutcome::Recommended {
            drug: "vancomycin".to_string(),
            crcl: 68.06,
            dose: "1050 mg every 12 h".to_string(),
        };
        assert_eq!(
            outcome.to_string(),
            "Dose for Vancomycin (CrCl: 68.06 mL/min): 1050 mg every 12 h"
        );
    }

    #[test]
    fn test_display_not_found_messages() {
        let not_found = DoseOutcome::DrugNotFound {
            drug: "amikacin".to_string(),
        };
        assert!(not_found.to_string().contains("not found"));

        let no_range = DoseOutcome::NoMatchingRange {
            drug: "meropenem".to_string(),
            crcl: 20.0,
        };
        assert!(no_range.to_string().contains("no matching CrCl range"));
    }
}
