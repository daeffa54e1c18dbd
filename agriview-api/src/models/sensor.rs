use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lenient;

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SensorType {
    /// Air temperature in Celsius
    Temperature,
    /// Relative humidity percentage
    Humidity,
    /// Soil moisture percentage
    SoilMoisture,
    /// Light intensity percentage
    LightIntensity,
    /// Methane concentration in ppm
    MethaneLevel,
}

impl SensorType {
    /// Every sensor, in evaluation order.
    pub const ALL: [SensorType; 5] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::SoilMoisture,
        SensorType::LightIntensity,
        SensorType::MethaneLevel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::SoilMoisture => "soilMoisture",
            SensorType::LightIntensity => "lightIntensity",
            SensorType::MethaneLevel => "methaneLevel",
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SensorType::ALL
            .into_iter()
            .find(|sensor| sensor.as_str() == value)
            .ok_or_else(|| format!("unknown sensor type: {value}"))
    }
}

/// Point-in-time sensor snapshot pushed by the remote channel.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReadings {
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub light_intensity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub methane_level: Option<f64>,
    /// Device clock in milliseconds since epoch
    #[serde(default, deserialize_with = "lenient::number", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl SensorReadings {
    pub fn get(&self, sensor: SensorType) -> Option<f64> {
        match sensor {
            SensorType::Temperature => self.temperature,
            SensorType::Humidity => self.humidity,
            SensorType::SoilMoisture => self.soil_moisture,
            SensorType::LightIntensity => self.light_intensity,
            SensorType::MethaneLevel => self.methane_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_type_wire_names() {
        for sensor in SensorType::ALL {
            let encoded = serde_json::to_string(&sensor).unwrap();
            assert_eq!(encoded, format!("\"{}\"", sensor.as_str()));
            assert_eq!(sensor.as_str().parse::<SensorType>().unwrap(), sensor);
        }

        assert!("co2".parse::<SensorType>().is_err());
    }

    #[test]
    fn test_readings_lookup() {
        let readings: SensorReadings =
            serde_json::from_str(r#"{"soilMoisture": 41.5, "timestamp": 1700000000000}"#).unwrap();

        assert_eq!(readings.get(SensorType::SoilMoisture), Some(41.5));
        assert_eq!(readings.get(SensorType::Temperature), None);
        assert_eq!(readings.timestamp, Some(1_700_000_000_000.0));
    }
}
