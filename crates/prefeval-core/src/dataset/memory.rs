use super::{Dataset, DatasetFile};
use rand::seq::SliceRandom;
use rand::Rng;

/// `Vec`-backed dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryDataset<I> {
    file: DatasetFile,
    instances: Vec<I>,
}

impl<I: Clone> MemoryDataset<I> {
    pub fn new(file: DatasetFile, instances: Vec<I>) -> Self {
        Self { file, instances }
    }

    pub fn instances(&self) -> &[I] {
        &self.instances
    }

    pub fn into_instances(self) -> Vec<I> {
        self.instances
    }
}

impl<I: Clone> Dataset for MemoryDataset<I> {
    type Instance = I;

    fn dataset_file(&self) -> &DatasetFile {
        &self.file
    }

    fn len(&self) -> usize {
        self.instances.len()
    }

    fn instance(&self, index: usize) -> Option<&I> {
        self.instances.get(index)
    }

    fn subrange(&self, from: usize, to: usize) -> Self {
        let to = to.min(self.instances.len());
        let from = from.min(to);
        Self {
            file: self.file.clone(),
            instances: self.instances[from..to].to_vec(),
        }
    }

    fn empty_like(&self) -> Self {
        Self {
            file: self.file.clone(),
            instances: Vec::new(),
        }
    }

    fn push(&mut self, instance: I) {
        self.instances.push(instance);
    }

    fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.instances.shuffle(rng);
    }
}
