use crate::storage::Document;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A book review as stored in the `reviews` collection.
///
/// Every field is optional on input; missing text fields stay `null` and a
/// missing or `null` rating reads as `0`. The rating has no enforced range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub id: Option<String>,
    pub username: Option<String>,
    pub book_title: Option<String>,
    #[serde(deserialize_with = "lenient_rating")]
    pub rating: i32,
    pub comment: Option<String>,
}

impl Document for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Accept the loose shapes clients send for an int: `null` is 0, floats are
/// truncated, numeric strings are parsed.
fn lenient_rating<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let out_of_range = || -> D::Error {
        de::Error::custom(format!("rating {} does not fit in i32", value))
    };

    match &value {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map_err(|_| out_of_range())
            } else if let Some(f) = n.as_f64() {
                float_to_rating(f).ok_or_else(out_of_range)
            } else {
                Err(out_of_range())
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i32>() {
                return Ok(i);
            }
            s.parse::<f64>()
                .ok()
                .and_then(float_to_rating)
                .ok_or_else(|| de::Error::custom(format!("rating {:?} is not a number", s)))
        }
        other => Err(de::Error::custom(format!(
            "invalid type for rating: {}, expected an integer",
            other
        ))),
    }
}

fn float_to_rating(f: f64) -> Option<i32> {
    let t = f.trunc();
    (t.is_finite() && t >= i32::MIN as f64 && t <= i32::MAX as f64).then(|| t as i32)
}
