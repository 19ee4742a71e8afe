use crate::{
    error::{EngineError, Result},
    search::{AlgorithmKind, RankingAlgorithm, ScoredDocument, SearchParams},
};

/// Reserved ranking algorithm, every search fails
pub struct DistanceRanking;

impl RankingAlgorithm for DistanceRanking {
    fn search(&self, _params: &SearchParams) -> Result<Vec<ScoredDocument>> {
        Err(EngineError::UnimplementedAlgorithm(AlgorithmKind::Distance))
    }
}
