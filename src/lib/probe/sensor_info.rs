//! Hardware sensor probe: temperatures, fan speeds, voltages, and alarm
//! state.

use serde::Deserialize;

use super::Envelope;
use crate::client::FortiClient;
use crate::error::ProbeError;
use crate::metrics::{MetricDesc, Observation};

static SENSOR_TEMPERATURE: MetricDesc = MetricDesc::gauge(
    "fortigate_sensor_temperature_celsius",
    "Temperature reported by the sensor.",
    &["sensor"],
);
static SENSOR_FAN: MetricDesc = MetricDesc::gauge(
    "fortigate_sensor_fan_rpm",
    "Fan speed reported by the sensor.",
    &["sensor"],
);
static SENSOR_VOLTAGE: MetricDesc = MetricDesc::gauge(
    "fortigate_sensor_voltage_volts",
    "Voltage reported by the sensor.",
    &["sensor"],
);
static SENSOR_ALARM: MetricDesc = MetricDesc::gauge(
    "fortigate_sensor_alarm",
    "Whether the sensor is raising an alarm.",
    &["sensor"],
);

#[derive(Debug, Deserialize)]
struct Sensor {
    name: String,
    #[serde(rename = "type", default)]
    sensor_type: String,
    #[serde(default)]
    value: f64,
    #[serde(default)]
    alarm: bool,
}

pub(super) async fn probe(client: &FortiClient) -> Result<Vec<Observation>, ProbeError> {
    let sensors: Envelope<Vec<Sensor>> = client
        .get("api/v2/monitor/system/sensor-info", "scope=global")
        .await?;

    let mut observations = Vec::new();
    for sensor in &sensors.results {
        let labels = [sensor.name.as_str()];
        match sensor.sensor_type.as_str() {
            "temperature" => {
                observations.push(SENSOR_TEMPERATURE.observe(&labels, sensor.value))
            }
            "fan" => observations.push(SENSOR_FAN.observe(&labels, sensor.value)),
            "voltage" => observations.push(SENSOR_VOLTAGE.observe(&labels, sensor.value)),
            // Unknown sensor kinds still report their alarm below.
            _ => {}
        }
        observations.push(SENSOR_ALARM.observe(&labels, if sensor.alarm { 1.0 } else { 0.0 }));
    }
    Ok(observations)
}
