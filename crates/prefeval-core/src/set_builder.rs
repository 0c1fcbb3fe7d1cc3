//! Groups evaluation settings into numbered, reducible sets.

use crate::dataset::{Dataset, DatasetFile};
use crate::setting::{AlgorithmId, EvaluationSetting};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Number of a set within one run. Allocated sequentially from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(pub u32);

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which settings share a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetGrouping {
    /// One set per (algorithm, training dataset file); folds and repeats are averaged.
    PerCombination,
    /// One set per split pair; nothing is averaged.
    PerPair,
}

/// Settings that are folds or repeats of the same comparison.
#[derive(Debug)]
pub struct EvaluationSet<D: Dataset, M> {
    pub id: SetId,
    pub algorithm: AlgorithmId,
    /// Training dataset the settings were derived from.
    pub dataset: DatasetFile,
    pub settings: Vec<EvaluationSetting<D, M>>,
}

pub struct SetBuilder<D: Dataset, M> {
    grouping: SetGrouping,
    next_id: u32,
    sets: Vec<EvaluationSet<D, M>>,
    by_combination: HashMap<(AlgorithmId, DatasetFile), usize>,
}

impl<D: Dataset, M> SetBuilder<D, M> {
    pub fn new(grouping: SetGrouping) -> Self {
        Self {
            grouping,
            next_id: 0,
            sets: Vec::new(),
            by_combination: HashMap::new(),
        }
    }

    pub fn grouping(&self) -> SetGrouping {
        self.grouping
    }

    /// Registers one setting produced for `(algorithm, dataset)` and returns its set.
    pub fn add(
        &mut self,
        algorithm: &AlgorithmId,
        dataset: &DatasetFile,
        setting: EvaluationSetting<D, M>,
    ) -> SetId {
        if self.grouping == SetGrouping::PerCombination {
            let key = (algorithm.clone(), dataset.clone());
            if let Some(&idx) = self.by_combination.get(&key) {
                let set = &mut self.sets[idx];
                set.settings.push(setting);
                return set.id;
            }
            let id = self.open_set(algorithm, dataset, setting);
            self.by_combination.insert(key, self.sets.len() - 1);
            return id;
        }
        self.open_set(algorithm, dataset, setting)
    }

    /// Registers every setting of one combination. Returns the distinct set ids used.
    pub fn add_combination(
        &mut self,
        algorithm: &AlgorithmId,
        dataset: &DatasetFile,
        settings: Vec<EvaluationSetting<D, M>>,
    ) -> Vec<SetId> {
        let mut ids: Vec<SetId> = Vec::new();
        for setting in settings {
            let id = self.add(algorithm, dataset, setting);
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
        ids
    }

    fn open_set(
        &mut self,
        algorithm: &AlgorithmId,
        dataset: &DatasetFile,
        setting: EvaluationSetting<D, M>,
    ) -> SetId {
        let id = SetId(self.next_id);
        self.next_id += 1;
        self.sets.push(EvaluationSet {
            id,
            algorithm: algorithm.clone(),
            dataset: dataset.clone(),
            settings: vec![setting],
        });
        id
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn sets(&self) -> &[EvaluationSet<D, M>] {
        &self.sets
    }

    /// Sets in id order.
    pub fn finish(self) -> Vec<EvaluationSet<D, M>> {
        self.sets
    }
}
