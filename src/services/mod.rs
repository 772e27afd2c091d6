//! Business logic services

pub mod ban;
pub mod catalog;
pub mod circulation;
pub mod identity;
pub mod members;
pub mod reports;
pub mod sequence;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::{clock::Clock, config::CirculationConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub identity: identity::IdentityResolver,
    pub members: members::MembersService,
    pub catalog: catalog::CatalogService,
    pub circulation: circulation::CirculationService,
    pub reports: reports::ReportsService,
}

impl Services {
    /// Create all services with the given repository, ids drawn from store counters
    pub fn new(
        repository: Repository,
        config: CirculationConfig,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        let sequence = sequence::StoreSequence::new(repository.clone(), &config.member_id_seed)?;
        Ok(Self::with_id_generator(
            repository,
            config,
            clock,
            Arc::new(sequence),
        ))
    }

    pub fn with_id_generator(
        repository: Repository,
        config: CirculationConfig,
        clock: Arc<dyn Clock>,
        next_id: Arc<dyn sequence::NextId>,
    ) -> Self {
        let identity = identity::IdentityResolver::new(repository.clone());
        Self {
            members: members::MembersService::new(
                repository.clone(),
                identity.clone(),
                next_id,
                clock.clone(),
                &config,
            ),
            catalog: catalog::CatalogService::new(repository.clone(), identity.clone()),
            circulation: circulation::CirculationService::new(
                repository.clone(),
                identity.clone(),
                clock.clone(),
                &config,
            ),
            reports: reports::ReportsService::new(repository.clone(), identity.clone(), clock),
            identity,
            repository,
        }
    }

    /// Readiness: the backing store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.store.ping().await
    }
}
