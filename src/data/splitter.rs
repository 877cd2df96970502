// ============================================================
// Layer 4 - Train/Validation Splitter
// ============================================================
// Seeded shuffling for the corpus texts.
//
//   split_train_val() - used when the corpus has no dev file;
//                       carves a validation slice out of the
//                       training texts.
//   take_fraction()   - keeps a random subset of texts for quick
//                       runs on a large corpus.
//
// Both take an explicit seed: the same corpus and seed always
// produce the same split, so a continued training run validates
// against the same texts as the run it resumes.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

/// Shuffle `samples` with `seed` and split into (train, validation).
pub fn split_train_val<T>(mut samples: Vec<T>, train_fraction: f64, seed: u64) -> (Vec<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let total    = samples.len();
    let split_at = ((total as f64) * train_fraction).round() as usize;
    let split_at = split_at.min(total);

    let val = samples.split_off(split_at);

    tracing::debug!(
        "Dataset split: {} training, {} validation ({}% / {}%)",
        samples.len(),
        val.len(),
        (samples.len() * 100) / total.max(1),
        (val.len()     * 100) / total.max(1),
    );

    (samples, val)
}

/// Keep a seeded random `fraction` of `samples`. A fraction of 1.0
/// or more returns the input untouched, order included.
pub fn take_fraction<T>(mut samples: Vec<T>, fraction: f64, seed: u64) -> Vec<T> {
    if fraction >= 1.0 {
        return samples;
    }
    let keep = ((samples.len() as f64) * fraction.max(0.0)).round() as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);
    samples.truncate(keep);
    samples
}
