use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::dataset::types::{AnswerDistribution, McqaDataset, McqaItem};

pub const SUBSET_NAME: &str = "DialFact-MCQA-Subset";
pub const SUBSET_VERSION: &str = "1.0";
pub const DEFAULT_CALIBRATION_SIZE: usize = 1000;
pub const DEFAULT_TEST_SIZE: usize = 1000;
pub const DEFAULT_SEED: u64 = 42;

pub struct SubsetOutcome {
    pub dataset: McqaDataset,
    pub calibration_distribution: AnswerDistribution,
    pub test_distribution: AnswerDistribution,
    /// Sizes asked for, before clamping.
    pub requested: (usize, usize),
    pub clamped: bool,
}

/// Re-split a dataset into seeded random calibration and test buckets.
///
/// Both buckets of the input are pooled and shuffled with `seed`. When fewer
/// items exist than requested, the calibration size is clamped to the pool
/// and the test size to what remains. Items past the requested sizes are
/// dropped. IDs are rewritten 1..=n, calibration first.
pub fn subset(dataset: McqaDataset, calib_size: usize, test_size: usize, seed: u64) -> SubsetOutcome {
    let mut pool: Vec<McqaItem> = dataset.calibration;
    pool.extend(dataset.test);

    let mut rng = StdRng::seed_from_u64(seed);
    pool.shuffle(&mut rng);

    let requested = (calib_size, test_size);
    let available = pool.len();
    let mut calib_size = calib_size;
    let mut test_size = test_size;
    let clamped = available < calib_size.saturating_add(test_size);
    if clamped {
        warn!(
            available,
            requested = calib_size.saturating_add(test_size),
            "Not enough samples for requested subset sizes"
        );
        calib_size = calib_size.min(available);
        test_size = test_size.min(available - calib_size);
    }

    pool.truncate(calib_size + test_size);
    let mut test = pool.split_off(calib_size);
    let mut calibration = pool;

    for (i, item) in calibration.iter_mut().chain(test.iter_mut()).enumerate() {
        item.id = i as u64 + 1;
    }

    let calibration_distribution = AnswerDistribution::of(&calibration);
    let test_distribution = AnswerDistribution::of(&test);

    let dataset = McqaDataset {
        name: SUBSET_NAME.to_string(),
        description: format!(
            "Subset of DialFact MCQA dataset with {} calibration and {} test samples",
            calib_size, test_size
        ),
        version: SUBSET_VERSION.to_string(),
        calibration,
        test,
    };

    info!(
        seed,
        calibration = dataset.calibration_samples(),
        test = dataset.test_samples(),
        total = dataset.total_samples(),
        "Subset created"
    );
    info!(distribution = %calibration_distribution, "Calibration answer distribution");
    info!(distribution = %test_distribution, "Test answer distribution");

    SubsetOutcome {
        dataset,
        calibration_distribution,
        test_distribution,
        requested,
        clamped,
    }
}
