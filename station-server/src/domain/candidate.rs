//! Raw station records from the upstream price feed.

use serde::{Deserialize, Serialize};

/// One raw record from the price feed's nearby-stations response.
///
/// Every field is optional at the wire level. Records missing coordinates or
/// a price are dropped during ingestion rather than failing the whole batch.
/// The serde renames map the upstream (Italian) schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StationCandidate {
    /// Operator / brand name.
    #[serde(rename = "gestore")]
    pub operator: Option<String>,

    /// Street address.
    #[serde(rename = "indirizzo")]
    pub address: Option<String>,

    /// Price for the requested fuel kind, EUR per litre.
    #[serde(rename = "prezzo")]
    pub price: Option<f64>,

    /// Latitude in degrees.
    #[serde(rename = "latitudine")]
    pub latitude: Option<f64>,

    /// Longitude in degrees.
    #[serde(rename = "longitudine")]
    pub longitude: Option<f64>,

    /// Free-text "last updated" stamp, `dd/MM/yyyy HH:mm:ss`.
    #[serde(rename = "data")]
    pub last_update: Option<String>,

    /// Position of this record in the upstream ranking.
    #[serde(rename = "ranking")]
    pub rank: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_upstream_field_names() {
        let json = r#"{
            "gestore": "Q8",
            "indirizzo": "Via Roma 1, Milano",
            "prezzo": 1.799,
            "latitudine": 45.4642,
            "longitudine": 9.19,
            "data": "01/08/2026 07:30:00",
            "ranking": 2
        }"#;

        let c: StationCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(c.operator.as_deref(), Some("Q8"));
        assert_eq!(c.price, Some(1.799));
        assert_eq!(c.latitude, Some(45.4642));
        assert_eq!(c.rank, Some(2));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let c: StationCandidate = serde_json::from_str("{}").unwrap();
        assert!(c.operator.is_none());
        assert!(c.price.is_none());
        assert!(c.latitude.is_none());
        assert!(c.longitude.is_none());
    }
}
