#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareOp {
    GreaterOrEqual,
    Greater,
    LessOrEqual,
    Less,
}

/// Parsed form of a CrCl range expression from the reference table.
#[derive(Debug, Clone, PartialEq)]
pub enum CrclRange {
    Any,
    Bounded { low: f64, high: f64 },
    Comparison { op: CompareOp, threshold: f64 },
}

impl CrclRange {
    /// Parse a range expression, case-insensitively and ignoring surrounding
    /// whitespace. Malformed expressions yield `None`; callers treat that as
    /// a non-match rather than an error, which is the documented contract for
    /// bad reference-table data.
    pub fn parse(expr: &str) -> Option<Self> {
        let expr = expr.trim().to_lowercase();

        if expr == "any" {
            return Some(Self::Any);
        }

        if expr.contains('-') {
            let (low, high) = expr.split_once('-')?;
            if high.contains('-') {
                return None;
            }
            let low = low.trim().parse().ok()?;
            let high = high.trim().parse().ok()?;
            return Some(Self::Bounded { low, high });
        }

        // Two-character operators must be tested first: a substring check
        // for ">" alone would also fire on ">=".
        let operators = [
            (">=", CompareOp::GreaterOrEqual),
            (">", CompareOp::Greater),
            ("<=", CompareOp::LessOrEqual),
            ("<", CompareOp::Less),
        ];
        for (token, op) in operators {
            if expr.contains(token) {
                let threshold = expr.replace(token, "").trim().parse().ok()?;
                return Some(Self::Comparison { op, threshold });
            }
        }

        None
    }

    pub fn contains(&self, crcl: f64) -> bool {
        match self {
            Self::Any => true,
            Self::Bounded { low, high } => *low <= crcl && crcl <= *high,
            Self::Comparison { op, threshold } => match op {
                CompareOp::GreaterOrEqual => crcl >= *threshold,
                CompareOp::Greater => crcl > *threshold,
                CompareOp::LessOrEqual => crcl <= *threshold,
                CompareOp::Less => crcl < *threshold,
            },
        }
    }
}

/// True iff the expression parses and the clearance falls inside it.
pub fn matches(crcl: f64, expr: &str) -> bool {
    CrclRange::parse(expr).map_or(false, |range| range.contains(crcl))
}
