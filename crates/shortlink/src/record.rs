use crate::StoreError;
use std::collections::HashMap;

/// Field holding the destination URL. Claimed with a conditional create.
pub const URL_FIELD: &str = "url";

/// Field holding the creation time in Unix seconds.
pub const CREATION_TIME_FIELD: &str = "creationTime";

/// Field holding the access counter.
pub const COUNT_FIELD: &str = "count";

/// A ShortLink record as read back from the store.
///
/// `creation_time` is `None` for a record whose metadata write never landed
/// (see [`AllocError::PartialWriteFailure`]); such a record still resolves.
///
/// [`AllocError::PartialWriteFailure`]: crate::AllocError::PartialWriteFailure
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ShortLink {
    pub url: String,
    pub creation_time: Option<u64>,
    pub count: u64,
}

impl ShortLink {
    /// Builds a record from the raw fields stored under `key`.
    ///
    /// Returns `Ok(None)` when the `url` field is missing. A missing `count`
    /// reads as zero.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if `creationTime` or `count` is not a
    /// non-negative integer.
    pub fn from_fields(
        key: &str,
        mut fields: HashMap<String, String>,
    ) -> Result<Option<Self>, StoreError> {
        let Some(url) = fields.remove(URL_FIELD) else {
            return Ok(None);
        };
        let creation_time = fields
            .get(CREATION_TIME_FIELD)
            .map(|raw| parse_field(key, CREATION_TIME_FIELD, raw))
            .transpose()?;
        let count = fields
            .get(COUNT_FIELD)
            .map(|raw| parse_field(key, COUNT_FIELD, raw))
            .transpose()?
            .unwrap_or(0);
        Ok(Some(Self {
            url,
            creation_time,
            count,
        }))
    }
}

fn parse_field(key: &str, field: &str, raw: &str) -> Result<u64, StoreError> {
    raw.parse().map_err(|_| StoreError::Corrupt {
        key: key.to_owned(),
        field: field.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn parses_complete_record() {
        let link = ShortLink::from_fields(
            "abc123",
            fields(&[
                ("url", "https://example.com"),
                ("creationTime", "1700000000"),
                ("count", "3"),
            ]),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            link,
            ShortLink {
                url: "https://example.com".to_owned(),
                creation_time: Some(1_700_000_000),
                count: 3,
            }
        );
    }

    #[test]
    fn half_written_record_still_parses() {
        let link = ShortLink::from_fields("abc123", fields(&[("url", "https://example.com")]))
            .unwrap()
            .unwrap();
        assert_eq!(link.creation_time, None);
        assert_eq!(link.count, 0);
    }

    #[test]
    fn missing_url_is_absent() {
        assert_eq!(
            ShortLink::from_fields("abc123", fields(&[("count", "1")])).unwrap(),
            None
        );
        assert_eq!(ShortLink::from_fields("abc123", HashMap::new()).unwrap(), None);
    }

    #[test]
    fn negative_count_is_corrupt() {
        let err = ShortLink::from_fields("abc123", fields(&[("url", "u"), ("count", "-1")]))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Corrupt {
                key: "abc123".to_owned(),
                field: "count".to_owned()
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serializes_with_camel_case_fields() {
        let link = ShortLink {
            url: "https://example.com".to_owned(),
            creation_time: Some(1),
            count: 2,
        };
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            serde_json::json!({ "url": "https://example.com", "creationTime": 1, "count": 2 })
        );
    }
}
