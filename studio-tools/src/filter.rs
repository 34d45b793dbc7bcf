//! Per-element validation of generated collections.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::call::CallContext;

/// Structural check applied to each generated element after deserialization.
pub trait ElementCheck {
    /// Returns the reason the element is unusable, if any.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason for rejection.
    fn check(&self) -> Result<(), String>;
}

/// Keeps the elements of `value` that deserialize into `T` and pass
/// [`ElementCheck::check`].
///
/// Rejected elements are logged at warn and dropped; a non-array input yields
/// an empty collection.
pub fn retain_valid<T>(ctx: &CallContext, label: &str, value: Value) -> Vec<T>
where
    T: DeserializeOwned + ElementCheck,
{
    let Value::Array(elements) = value else {
        ctx.warn(&format!("expected an array of {label}, dropping payload"));
        return Vec::new();
    };

    let total = elements.len();
    let kept: Vec<T> = elements
        .into_iter()
        .enumerate()
        .filter_map(|(idx, element)| {
            let parsed = serde_json::from_value::<T>(element)
                .map_err(|err| err.to_string())
                .and_then(|item| item.check().map(|()| item));
            match parsed {
                Ok(item) => Some(item),
                Err(reason) => {
                    ctx.warn(&format!("dropped {label}[{idx}]: {reason}"));
                    None
                }
            }
        })
        .collect();

    if kept.len() < total {
        ctx.info(&format!("kept {} of {total} {label}", kept.len()));
    }
    kept
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;
    use serde_json::json;
    use studio_primitives::TraceId;
    use studio_telemetry::{LogLevel, RecordingCallLog};

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Concept {
        headline: String,
        score: u8,
    }

    impl ElementCheck for Concept {
        fn check(&self) -> Result<(), String> {
            if self.headline.trim().is_empty() {
                return Err("headline is empty".into());
            }
            if self.score > 100 {
                return Err("score above 100".into());
            }
            Ok(())
        }
    }

    #[test]
    fn drops_invalid_elements_and_logs_them() {
        let log = Arc::new(RecordingCallLog::new());
        let ctx = CallContext::new(TraceId::random(), "t", log.clone());
        let value = json!([
            {"headline": "a", "score": 10},
            {"headline": " ", "score": 10},
            {"score": 5},
            {"headline": "b", "score": 99},
        ]);
        let kept: Vec<Concept> = retain_valid(&ctx, "concepts", value);
        let headlines: Vec<_> = kept.iter().map(|c| c.headline.as_str()).collect();
        assert_eq!(headlines, vec!["a", "b"]);
        assert_eq!(log.at_level(LogLevel::Warn).len(), 2);
    }

    #[test]
    fn non_array_is_empty() {
        let ctx = CallContext::new(TraceId::random(), "t", Arc::new(RecordingCallLog::new()));
        let kept: Vec<Concept> = retain_valid(&ctx, "concepts", json!({"headline": "a"}));
        assert!(kept.is_empty());
    }
}
