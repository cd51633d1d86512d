use chrono::{DateTime, SecondsFormat, Utc};

use crate::sync::SyncError;
use crate::utils::format::join_values;

/// Page size used by the API when the caller does not ask for one
pub const DEFAULT_LIMIT: u32 = 500;

/// Largest page the API accepts
pub const MAX_LIMIT: u32 = 10_000;

/// Filter for `/v1/operations/delegations`.
///
/// Both time bounds are inclusive on the API side.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelegationsFilter {
    /// `timestamp.ge`
    pub from: Option<DateTime<Utc>>,
    /// `timestamp.le`
    pub to: Option<DateTime<Utc>>,
    /// `id.ni`
    pub exclude_ids: Vec<i64>,
    /// `limit`, [`DEFAULT_LIMIT`] when unset
    pub limit: Option<u32>,
    /// `offset`, omitted when zero
    pub offset: u64,
}

impl DelegationsFilter {
    /// Build a filter from operator supplied RFC3339 bounds.
    pub fn from_rfc3339(from: Option<&str>, to: Option<&str>) -> Result<Self, SyncError> {
        let filter = Self {
            from: from.map(|raw| parse_bound("from", raw)).transpose()?,
            to: to.map(|raw| parse_bound("to", raw)).transpose()?,
            ..Self::default()
        };

        filter.validate()?;
        Ok(filter)
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Reject filters the API would refuse or silently misinterpret.
    pub fn validate(&self) -> Result<(), SyncError> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(SyncError::Validation(format!(
                    "field From ({}) must not be after field To ({})",
                    format_timestamp(&from),
                    format_timestamp(&to)
                )));
            }
        }

        let limit = self.effective_limit();
        if limit == 0 || limit > MAX_LIMIT {
            return Err(SyncError::Validation(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, limit
            )));
        }

        Ok(())
    }

    /// Render the filter as query parameters, in a stable order.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);

        if let Some(from) = &self.from {
            params.push(("timestamp.ge", format_timestamp(from)));
        }

        if let Some(to) = &self.to {
            params.push(("timestamp.le", format_timestamp(to)));
        }

        if !self.exclude_ids.is_empty() {
            params.push(("id.ni", join_values(&self.exclude_ids, ",")));
        }

        if self.offset != 0 {
            params.push(("offset", self.offset.to_string()));
        }

        params.push(("limit", self.effective_limit().to_string()));

        params
    }
}

fn parse_bound(field: &str, raw: &str) -> Result<DateTime<Utc>, SyncError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            SyncError::Validation(format!(
                "format of field {} should be RFC3339, got {:?}: {}",
                field, raw, e
            ))
        })
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn default_filter_only_sends_limit() {
        let params = DelegationsFilter::default().query_params();
        assert_eq!(params, vec![("limit", "500".to_string())]);
    }

    #[test]
    fn renders_every_parameter() {
        let filter = DelegationsFilter {
            from: Some(ts(2023, 1, 1, 0, 0, 0)),
            to: Some(ts(2023, 12, 31, 23, 59, 59)),
            exclude_ids: vec![1, 2, 3],
            limit: Some(1000),
            offset: 2000,
        };

        assert_eq!(
            filter.query_params(),
            vec![
                ("timestamp.ge", "2023-01-01T00:00:00Z".to_string()),
                ("timestamp.le", "2023-12-31T23:59:59Z".to_string()),
                ("id.ni", "1,2,3".to_string()),
                ("offset", "2000".to_string()),
                ("limit", "1000".to_string()),
            ]
        );
    }

    #[test]
    fn zero_offset_is_omitted() {
        let filter = DelegationsFilter::default().with_offset(0).with_limit(10);
        assert!(filter.query_params().iter().all(|(key, _)| *key != "offset"));
    }

    #[test]
    fn parses_rfc3339_bounds() {
        let filter =
            DelegationsFilter::from_rfc3339(Some("2024-01-01T10:00:00Z"), Some("2024-01-02T00:00:00+01:00"))
                .unwrap();

        assert_eq!(filter.from, Some(ts(2024, 1, 1, 10, 0, 0)));
        assert_eq!(filter.to, Some(ts(2024, 1, 1, 23, 0, 0)));
    }

    #[test]
    fn rejects_malformed_bounds() {
        let err = DelegationsFilter::from_rfc3339(Some("2024-01-01"), None).unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert!(err.to_string().contains("field from should be RFC3339"));

        let err = DelegationsFilter::from_rfc3339(None, Some("yesterday")).unwrap_err();
        assert!(err.to_string().contains("field to should be RFC3339"));
    }

    #[test]
    fn rejects_inverted_range() {
        let filter = DelegationsFilter {
            from: Some(ts(2024, 2, 1, 0, 0, 0)),
            to: Some(ts(2024, 1, 1, 0, 0, 0)),
            ..DelegationsFilter::default()
        };

        assert!(matches!(filter.validate(), Err(SyncError::Validation(_))));
    }

    #[test]
    fn rejects_out_of_range_limit() {
        assert!(DelegationsFilter::default().with_limit(0).validate().is_err());
        assert!(DelegationsFilter::default().with_limit(MAX_LIMIT + 1).validate().is_err());
        assert!(DelegationsFilter::default().with_limit(MAX_LIMIT).validate().is_ok());
    }
}
