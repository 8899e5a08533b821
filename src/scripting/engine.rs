//! Graph script evaluation on pooled engines

use crate::error::{EngineError, Result};
use crate::sampling::DataSample;
use crate::scripting::adapters::adapt_result;
use crate::scripting::{
    parse_color, palette_index, stable_hash32, Color, GraphData, GraphResult, SeededRandom,
    VmPool, GRAPH_PALETTE,
};
use rhai::Dynamic;
use std::sync::Arc;
use std::time::Duration;

/// How long one evaluation may wait for a free engine before giving up.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a script engine with the crate's script API and safety limits.
///
/// Scripts are user-supplied, so runaway loops and oversized allocations
/// are cut off by the engine rather than trusted not to happen.
pub fn configure_engine() -> rhai::Engine {
    let mut engine = rhai::Engine::new();

    engine.set_max_operations(5_000_000);
    engine.set_max_expr_depths(64, 64);
    engine.set_max_call_levels(64);
    engine.set_max_string_size(1_000_000);
    engine.set_max_array_size(100_000);
    engine.set_max_map_size(10_000);

    engine.register_type_with_name::<SeededRandom>("SeededRandom");
    engine.register_fn("seeded_random", SeededRandom::new);
    engine.register_fn("seeded_random", SeededRandom::from_seed);
    engine.register_fn("next", |rng: &mut SeededRandom| rng.next_unit());
    engine.register_fn(
        "next_range",
        |rng: &mut SeededRandom, min: f64, max: f64| rng.next_range(min, max),
    );

    engine.register_type_with_name::<Color>("Color");
    engine.register_fn("to_hex", |color: &mut Color| color.to_hex());
    engine.register_fn("parse_color", |s: &str| {
        parse_color(s).map_err(|e| -> Box<rhai::EvalAltResult> { e.to_string().into() })
    });
    engine.register_fn("palette_color", |key: rhai::INT| {
        GRAPH_PALETTE[palette_index(key as u64)]
    });
    engine.register_fn("palette_index", |key: rhai::INT| {
        palette_index(key as u64) as rhai::INT
    });
    engine.register_fn("stable_hash", |key: rhai::INT| {
        stable_hash32(key as u64) as rhai::INT
    });

    engine
}

/// Evaluates graph scripts against bound data samples.
///
/// Each sample is exposed to the script as an array of maps with
/// `timestamp` (epoch milliseconds), `value` and `label` fields, in the
/// sample's own (most-recent-first) order.
pub struct ScriptEngine {
    pool: Arc<VmPool>,
}

impl ScriptEngine {
    pub fn new() -> Self {
        Self {
            pool: Arc::new(VmPool::new(configure_engine)),
        }
    }

    /// Share an existing pool, e.g. between engines serving different
    /// callers.
    pub fn with_pool(pool: Arc<VmPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<VmPool> {
        &self.pool
    }

    /// Evaluate one graph script. Failures are captured in the returned
    /// [`GraphResult`]; the pooled engine stays healthy either way.
    pub async fn run_graph_script(
        &self,
        script: &str,
        sources: &[(&str, &DataSample)],
    ) -> GraphResult {
        match self.eval_graph(script, sources).await {
            Ok(data) => GraphResult::success(data),
            Err(error) => {
                tracing::warn!("Graph script evaluation failed: {}", error);
                GraphResult::failure(error)
            }
        }
    }

    async fn eval_graph(
        &self,
        script: &str,
        sources: &[(&str, &DataSample)],
    ) -> Result<GraphData> {
        let mut guard = self.pool.acquire_timeout(ACQUIRE_TIMEOUT).await?;
        tracing::debug!("Evaluating graph script on {}", guard.name());

        let mut scope = rhai::Scope::new();
        for (name, sample) in sources {
            scope.push_constant(name.to_string(), sample_to_dynamic(sample));
        }

        let value = guard
            .engine()
            .eval_with_scope::<Dynamic>(&mut scope, script)
            .map_err(EngineError::from_rhai_error)?;
        adapt_result(&value)
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_to_dynamic(sample: &DataSample) -> Dynamic {
    let array: rhai::Array = sample
        .iter()
        .map(|point| {
            let mut map = rhai::Map::new();
            map.insert(
                "timestamp".into(),
                Dynamic::from(point.timestamp.timestamp_millis()),
            );
            map.insert("value".into(), Dynamic::from(point.value));
            map.insert("label".into(), Dynamic::from(point.label));
            Dynamic::from_map(map)
        })
        .collect();
    Dynamic::from_array(array)
}
