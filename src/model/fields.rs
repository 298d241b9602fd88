//! Serde helpers for station record fields.

/// Optional calendar dates, read from any ISO-8601 date or date-time (see
/// [`crate::utils::parse_utc_date`]) and written back as `YYYY-MM-DD`.
pub mod opt_date {
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use crate::utils::{format_date, parse_utc_date};

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = format_date(*date).map_err(S::Error::custom)?;
                serializer.serialize_str(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse_utc_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid ISO-8601 date '{raw}'"))),
        }
    }
}

/// Variable references, as integer ids or as URIs ending in the id.
pub mod variable_ids {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use crate::model::VariableId;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum VariableRef {
        Id(VariableId),
        Uri(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<VariableId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let refs = Option::<Vec<VariableRef>>::deserialize(deserializer)?.unwrap_or_default();
        refs.into_iter()
            .map(|r| match r {
                VariableRef::Id(id) => Ok(id),
                VariableRef::Uri(uri) => uri
                    .trim_end_matches('/')
                    .rsplit('/')
                    .next()
                    .and_then(|tail| tail.parse().ok())
                    .ok_or_else(|| D::Error::custom(format!("invalid variable reference '{uri}'"))),
            })
            .collect()
    }
}
