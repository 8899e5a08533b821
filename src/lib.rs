//! # Graphstat Engine: data sampling and scripted graph evaluation
//!
//! An engine for turning tracked time-series data into graph descriptions
//! via user-written scripts. It powers statistics views where each graph is
//! defined by a small script bound to one or more data series.
//!
//! ## Architecture
//!
//! - **Sampling**: [`sampling::DataSample`] wraps a lazily-paged row cursor
//!   in a replayable, disposable sequence of points
//! - **Functions**: [`functions::DataSampleFunction`] transforms compose
//!   into pipelines (clipping, calendar-aligned aggregation)
//! - **Time**: [`timeutil::TimeHelper`] locates calendar bucket boundaries
//!   in any time zone
//! - **Scripting**: [`scripting::ScriptEngine`] evaluates graph scripts on
//!   a bounded pool of [rhai](https://rhai.rs) engines with deterministic
//!   randomness and stable palette hashing
//! - **Localization**: diagnostics render through rust-i18n in the
//!   language selected via [`i18n::set_language`]
//!
//! ## Example
//!
//! ```ignore
//! use graphstat_engine::{
//!     functions::{DataClippingFunction, DataSampleFunction},
//!     sampling::DataSample,
//!     scripting::ScriptEngine,
//!     types::DataSampleProperties,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let sample = DataSample::from_row_source(open_cursor(), DataSampleProperties::default())
//!         .expect("cursor");
//!     let clipped = DataClippingFunction::new(None, Some(chrono::Duration::days(30)))
//!         .map_sample(sample)
//!         .await
//!         .expect("clip");
//!
//!     let engine = ScriptEngine::new();
//!     let result = engine
//!         .run_graph_script(
//!             r#"#{ type: "TEXT", text: `${data[0].value}` }"#,
//!             &[("data", &clipped)],
//!         )
//!         .await;
//!     println!("{result:?}");
//! }
//! ```

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod error;
pub mod functions;
pub mod i18n;
pub mod sampling;
pub mod scripting;
pub mod timeutil;
pub mod types;

pub use error::{EngineError, Result};
pub use sampling::DataSample;
pub use scripting::{GraphData, GraphResult, ScriptEngine};
pub use types::{DataPoint, DataSampleProperties, Value, ValueKind};
