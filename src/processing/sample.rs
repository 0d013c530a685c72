// Row sampling
// Author: Gabriel Demetrios Lafis

use std::str::FromStr;

use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use crate::data::{DataSet, Row};
use super::{DataProcessor, ProcessingError, ProcessorType};

/// How a sample is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleMethod {
    #[default]
    First,
    Last,
    Random,
}

impl FromStr for SampleMethod {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" => Ok(SampleMethod::First),
            "last" => Ok(SampleMethod::Last),
            "random" => Ok(SampleMethod::Random),
            _ => Err(ProcessingError::InvalidArgument(format!(
                "Unknown sample method: {}",
                s
            ))),
        }
    }
}

/// Take `size` rows. All rows come back unchanged when `size` covers them.
///
/// `Random` shuffles a copy of the rows with `rng` and keeps the first
/// `size`, so results are reproducible under a seeded generator.
pub fn sample_rows<R: Rng + ?Sized>(
    rows: &[Row],
    size: usize,
    method: SampleMethod,
    rng: &mut R,
) -> Vec<Row> {
    if size >= rows.len() {
        return rows.to_vec();
    }

    let sampled = match method {
        SampleMethod::First => rows[..size].to_vec(),
        SampleMethod::Last => rows[rows.len() - size..].to_vec(),
        SampleMethod::Random => {
            let mut shuffled = rows.to_vec();
            shuffled.shuffle(rng);
            shuffled.truncate(size);
            shuffled
        }
    };

    debug!("Sampled {} of {} rows ({:?})", sampled.len(), rows.len(), method);
    sampled
}

/// Sample rows from a dataset
pub struct SampleProcessor {
    size: usize,
    method: SampleMethod,
    seed: Option<u64>,
}

impl SampleProcessor {
    /// Create a new sample processor
    pub fn new(size: usize, method: SampleMethod) -> Self {
        SampleProcessor {
            size,
            method,
            seed: None,
        }
    }

    /// Fix the random generator seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl DataProcessor for SampleProcessor {
    fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(input.derive(sample_rows(&input.rows, self.size, self.method, &mut rng)))
    }

    fn name(&self) -> &str {
        "sample"
    }

    fn processor_type(&self) -> ProcessorType {
        ProcessorType::Sample
    }
}
