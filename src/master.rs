//! src/master.rs
use crate::file_splitter::InputSplit;

/// The input splits one map worker processes, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapAssignment {
    pub worker_id: usize,
    pub splits: Vec<InputSplit>,
}

impl MapAssignment {
    pub fn bytes(&self) -> u64 {
        self.splits.iter().map(InputSplit::len).sum()
    }
}

/// Hands input splits to a fixed pool of map workers.
pub struct Master {
    assignments: Vec<MapAssignment>,
}

impl Master {
    /// Deals the splits round-robin. Workers that would get nothing are not
    /// given an assignment.
    pub fn new(workers: usize, splits: Vec<InputSplit>) -> Self {
        let count = workers.max(1).min(splits.len());
        let mut assignments: Vec<MapAssignment> = (0..count)
            .map(|worker_id| MapAssignment {
                worker_id,
                splits: vec![],
            })
            .collect();
        for (i, split) in splits.into_iter().enumerate() {
            assignments[i % count].splits.push(split);
        }
        Master { assignments }
    }

    pub fn worker_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn task_count(&self) -> usize {
        self.assignments.iter().map(|a| a.splits.len()).sum()
    }

    pub fn assignments(&self) -> &[MapAssignment] {
        &self.assignments
    }

    pub fn into_assignments(self) -> Vec<MapAssignment> {
        self.assignments
    }
}
