use std::fmt::Display;

/// A count of altered subjects over the subjects of a population
///
/// Displayed as `numerator/denominator`, e.g. `1/3`.
///
/// # Examples
///
/// ```
/// use cnv_frequencies::Fraction;
///
/// let fraction = Fraction::new(1, 3);
/// assert_eq!(fraction.to_string(), "1/3");
/// assert_eq!(fraction.percentage(), "33.33%");
///
/// assert_eq!(Fraction::zero(10).to_string(), "0/10");
/// assert_eq!(Fraction::zero(0).percentage(), "0.00%");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: usize,
    denominator: usize,
}

impl Fraction {
    /// Constructs a new [`Fraction`]
    pub fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Constructs a [`Fraction`] without any altered subject
    pub fn zero(denominator: usize) -> Self {
        Self::new(0, denominator)
    }

    /// The number of altered subjects
    pub fn numerator(&self) -> usize {
        self.numerator
    }

    /// The number of subjects in the population
    pub fn denominator(&self) -> usize {
        self.denominator
    }

    /// The percentage in hundredths of a percent, rounded half-up
    ///
    /// An empty population has a percentage of 0.
    pub fn hundredths_percent(&self) -> usize {
        if self.denominator == 0 {
            return 0;
        }
        // floor(10_000 * n / d + 1/2)
        (20_000 * self.numerator + self.denominator) / (2 * self.denominator)
    }

    /// The percentage with two decimals, e.g. `33.33%`
    pub fn percentage(&self) -> String {
        let hundredths = self.hundredths_percent();
        format!("{}.{:02}%", hundredths / 100, hundredths % 100)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
