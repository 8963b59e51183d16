//! Indicator Table
//!
//! The fixed list of tracked indicators. Each entry carries everything the
//! update pipeline needs: where to fetch, which chart/tables/link to touch,
//! and how the chart and CSV are labelled.

/// Configuration record for one tracked indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorSpec {
    /// Short key, also used for seed data lookup
    pub key: &'static str,
    /// Endpoint path on the series API
    pub endpoint: &'static str,
    /// Fixed query string (without the leading `?`)
    pub query: &'static str,
    /// Chart canvas element id
    pub chart_id: &'static str,
    /// Dataset label shown in the chart legend
    pub label: &'static str,
    /// Line colour as `#rrggbb`
    pub color: &'static str,
    /// Preview table element ids (several for backward-compatible pages)
    pub table_ids: &'static [&'static str],
    /// CSV and table column names
    pub header: [&'static str; 2],
    /// Download anchor element id
    pub download_id: &'static str,
}

impl IndicatorSpec {
    /// Request path including the query string
    pub fn path_and_query(&self) -> String {
        if self.query.is_empty() {
            self.endpoint.to_string()
        } else {
            format!("{}?{}", self.endpoint, self.query)
        }
    }

    /// Full request URL against the given base
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path_and_query())
    }
}

/// Element id of the "last updated" text
pub const LAST_UPDATED_ID: &str = "last-updated";

/// All tracked indicators, in display order
pub const INDICATORS: &[IndicatorSpec] = &[
    IndicatorSpec {
        key: "selic",
        endpoint: "/selic",
        query: "n=720",
        chart_id: "chart-selic",
        label: "SELIC",
        color: "#2b7bd3",
        table_ids: &["table-selic", "table-bcb"],
        header: ["date", "selic"],
        download_id: "download-selic",
    },
    IndicatorSpec {
        key: "focus",
        endpoint: "/focus",
        query: "n=240",
        chart_id: "chart-focus",
        label: "Expectativa IPCA",
        color: "#ff8c00",
        table_ids: &["table-focus"],
        header: ["date", "focus_ipca"],
        download_id: "download-focus",
    },
    IndicatorSpec {
        key: "sidra",
        endpoint: "/sidra",
        query: "n=240",
        chart_id: "chart-sidra",
        label: "IPCA (SIDRA)",
        color: "#2bd36a",
        table_ids: &["table-ipca", "table-sidra"],
        header: ["date", "ipca"],
        download_id: "download-sidra",
    },
    IndicatorSpec {
        key: "ipea",
        endpoint: "/ipea",
        query: "n=240",
        chart_id: "chart-ipea",
        label: "IPEA (sample)",
        color: "#6a2bd3",
        table_ids: &["table-ipea"],
        header: ["date", "ipea"],
        download_id: "download-ipea",
    },
    IndicatorSpec {
        key: "oecd",
        endpoint: "/wbank",
        query: "country=BR&indicator=NY.GDP.MKTP.CD&start=2000&end=2024",
        chart_id: "chart-oecd",
        label: "PIB (USD)",
        color: "#d3b12b",
        table_ids: &["table-oecd"],
        header: ["date", "value"],
        download_id: "download-oecd",
    },
];

/// Look up an indicator by key
pub fn find(key: &str) -> Option<&'static IndicatorSpec> {
    INDICATORS.iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_urls() {
        let selic = find("selic").unwrap();
        assert_eq!(selic.url("http://127.0.0.1:8000"), "http://127.0.0.1:8000/selic?n=720");
        assert_eq!(selic.url("http://127.0.0.1:8000/"), "http://127.0.0.1:8000/selic?n=720");

        let gdp = find("oecd").unwrap();
        assert_eq!(
            gdp.path_and_query(),
            "/wbank?country=BR&indicator=NY.GDP.MKTP.CD&start=2000&end=2024"
        );
    }

    #[test]
    fn test_element_ids_are_disjoint() {
        let mut seen = HashSet::new();
        for spec in INDICATORS {
            assert!(seen.insert(spec.chart_id));
            assert!(seen.insert(spec.download_id));
            for table in spec.table_ids {
                assert!(seen.insert(*table), "duplicate table id {}", table);
            }
        }
        assert!(!seen.contains(LAST_UPDATED_ID));
    }

    #[test]
    fn test_find_unknown() {
        assert!(find("cdi").is_none());
    }
}
