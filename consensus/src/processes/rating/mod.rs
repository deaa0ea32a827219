pub mod cone;
pub mod uniform;

pub use cone::ConeRatingCalculator;
pub use uniform::UniformRatingCalculator;

use crate::model::stores::errors::StoreResult;
use tangle_hashes::Hash;

/// Computes the population of transactions reachable forward from an entry
/// point via approver edges, consumed as the candidate set of a tip
/// selection walk.
pub trait RatingCalculator {
    fn calculate(&self, entry_point: Hash) -> StoreResult<Vec<Hash>>;
}
