//! Collections and query templates a run draws from.

use crate::database::Namespace;
use crate::error::{Result, RunnerError};
use loadtest_generator::DocumentGenerator;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info};
use workload_core::{OperationKind, QueryTemplate};

/// One collection under load.
#[derive(Debug, Clone)]
pub struct CollectionTarget {
    pub namespace: Namespace,
    pub generator: DocumentGenerator,
}

impl CollectionTarget {
    pub fn new(generator: DocumentGenerator) -> Self {
        let spec = generator.collection();
        Self {
            namespace: Namespace::new(spec.database.clone(), spec.name.clone()),
            generator,
        }
    }

    /// True when the template addresses this collection.
    pub fn serves(&self, template: &QueryTemplate) -> bool {
        self.namespace.collection == template.collection
            && template
                .database
                .as_deref()
                .map_or(true, |db| db == self.namespace.database)
    }
}

/// Everything the workers need to build operations.
#[derive(Debug, Clone)]
pub struct Workload {
    targets: Vec<CollectionTarget>,
    /// Templates in file order, for fixed mode
    templates: Vec<QueryTemplate>,
    /// Target index -> operation kind -> templates
    by_target: Vec<HashMap<OperationKind, Vec<QueryTemplate>>>,
}

impl Workload {
    /// Build a workload, dropping templates whose collection is unknown.
    pub fn new(targets: Vec<CollectionTarget>, templates: Vec<QueryTemplate>) -> Result<Self> {
        if targets.is_empty() {
            return Err(RunnerError::Config(
                "at least one collection is required".to_string(),
            ));
        }

        let mut by_target: Vec<HashMap<OperationKind, Vec<QueryTemplate>>> =
            vec![HashMap::new(); targets.len()];
        let mut kept = Vec::with_capacity(templates.len());
        let mut skipped = 0usize;

        for mut template in templates {
            let position = targets.iter().position(|t| t.serves(&template));
            let Some(idx) = position else {
                debug!(
                    "Skipping {} template for unknown collection '{}'",
                    template.operation, template.collection
                );
                skipped += 1;
                continue;
            };
            if template.database.is_none() {
                template.database = Some(targets[idx].namespace.database.clone());
            }
            by_target[idx]
                .entry(template.operation)
                .or_default()
                .push(template.clone());
            kept.push(template);
        }

        if skipped > 0 {
            info!("Ignored {skipped} query templates for collections not in the workload");
        }

        Ok(Self {
            targets,
            templates: kept,
            by_target,
        })
    }

    pub fn targets(&self) -> &[CollectionTarget] {
        &self.targets
    }

    pub fn templates(&self) -> &[QueryTemplate] {
        &self.templates
    }

    /// Pick a collection uniformly at random.
    pub fn random_target<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, &CollectionTarget) {
        let idx = rng.gen_range(0..self.targets.len());
        (idx, &self.targets[idx])
    }

    /// Find the target a template belongs to.
    pub fn target_for(&self, template: &QueryTemplate) -> Option<&CollectionTarget> {
        self.targets.iter().find(|t| t.serves(template))
    }

    /// Pick a random template of `kind` for the target, if any exist.
    pub fn random_template<R: Rng + ?Sized>(
        &self,
        target: usize,
        kind: OperationKind,
        rng: &mut R,
    ) -> Option<&QueryTemplate> {
        self.by_target
            .get(target)?
            .get(&kind)?
            .choose(rng)
    }
}
