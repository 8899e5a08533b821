use crate::error::Result;
use crate::functions::DataSampleFunction;
use crate::sampling::DataSample;
use crate::types::DataPoint;
use async_trait::async_trait;
use std::sync::Mutex;

/// Merges the input sample with a set of additional samples into one
/// descending-ordered sequence.
///
/// The merged sample's disposal disposes every input. The side samples are
/// consumed by the first application; a merge function instance is built
/// for one pipeline run and not reused.
pub struct DataMergeFunction {
    others: Mutex<Vec<DataSample>>,
}

impl DataMergeFunction {
    pub fn new(others: Vec<DataSample>) -> Self {
        Self {
            others: Mutex::new(others),
        }
    }
}

/// K-way merge of descending point lists, stable for equal timestamps.
fn merge_descending(lists: Vec<Vec<DataPoint>>) -> Vec<DataPoint> {
    let total: usize = lists.iter().map(Vec::len).sum();
    let mut heads = vec![0usize; lists.len()];
    let mut out = Vec::with_capacity(total);
    while out.len() < total {
        let mut best: Option<usize> = None;
        for (i, list) in lists.iter().enumerate() {
            let Some(candidate) = list.get(heads[i]) else {
                continue;
            };
            let newer = match best {
                Some(b) => candidate.timestamp > lists[b][heads[b]].timestamp,
                None => true,
            };
            if newer {
                best = Some(i);
            }
        }
        let Some(i) = best else { break };
        out.push(lists[i][heads[i]].clone());
        heads[i] += 1;
    }
    out
}

#[async_trait]
impl DataSampleFunction for DataMergeFunction {
    async fn map_sample(&self, sample: DataSample) -> Result<DataSample> {
        let others = std::mem::take(
            &mut *self.others.lock().unwrap_or_else(|e| e.into_inner()),
        );

        let mut lists = Vec::with_capacity(others.len() + 1);
        lists.push(sample.to_vec());
        for other in &others {
            lists.push(other.to_vec());
        }
        let merged = merge_descending(lists);

        // Merged points are no longer regular to any one bin size.
        let mut properties = sample.properties().clone();
        properties.regularity = None;

        let mut inputs = others;
        inputs.push(sample);
        Ok(DataSample::from_sequence(
            merged.into_iter(),
            properties,
            Some(Box::new(move || {
                // Every input gets disposed even when an earlier one
                // fails; the first error is reported afterwards.
                let mut first_error = None;
                for mut input in inputs {
                    if let Err(e) = input.dispose() {
                        first_error.get_or_insert(e);
                    }
                }
                match first_error {
                    Some(e) => Err(e),
                    None => Ok(()),
                }
            })),
        ))
    }
}
