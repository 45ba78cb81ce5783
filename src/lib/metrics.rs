//! Observation data model and Prometheus text rendering.
//!
//! Probes do not write into a shared registry: every scrape is computed
//! fresh, so probes return plain [`Observation`] values and the serving
//! layer turns the final [`Snapshot`] into `prometheus` metric families for
//! the stock [`TextEncoder`].
//!
//! A [`MetricDesc`] is the fixed schema for one metric family — name, help,
//! kind, and label names — declared `static` next to the probe that owns it.
//! An observation is one fully-labeled reading against such a schema.

use prometheus::proto::{self, MetricType};
use prometheus::{Encoder, TextEncoder};
use std::collections::HashMap;

/// Kind of a metric family. The output wire format has no native enum type,
/// which is why probes expand device status enums into one gauge per state
/// instead of a single enum-valued metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

/// Static description of one metric family.
#[derive(Debug)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub labels: &'static [&'static str],
}

impl MetricDesc {
    pub const fn gauge(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Gauge,
            labels,
        }
    }

    pub const fn counter(
        name: &'static str,
        help: &'static str,
        labels: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            help,
            kind: MetricKind::Counter,
            labels,
        }
    }

    /// Build one observation against this schema. The number of label values
    /// must match the declared label names.
    pub fn observe<S: AsRef<str>>(&'static self, label_values: &[S], value: f64) -> Observation {
        assert_eq!(
            label_values.len(),
            self.labels.len(),
            "label arity mismatch for metric {}",
            self.name
        );
        Observation {
            desc: self,
            label_values: label_values.iter().map(|v| v.as_ref().to_owned()).collect(),
            value,
        }
    }
}

/// One fully-labeled numeric reading produced by a probe.
#[derive(Debug)]
pub struct Observation {
    pub desc: &'static MetricDesc,
    pub label_values: Vec<String>,
    pub value: f64,
}

/// The outcome of one probe routine: its name, whether it succeeded, and the
/// observations it contributed. A failed probe contributes none — partial
/// decode output is discarded at the probe boundary.
#[derive(Debug)]
pub struct ProbeReport {
    pub probe: &'static str,
    pub success: bool,
    pub observations: Vec<Observation>,
}

/// The union of every probe's observations for one scrape, plus the
/// aggregate success flag (AND of every probe's flag).
#[derive(Debug, Default)]
pub struct Snapshot {
    pub observations: Vec<Observation>,
    pub success: bool,
}

impl Snapshot {
    pub fn new() -> Self {
        Self {
            observations: Vec::new(),
            success: true,
        }
    }

    /// Fold one probe's report into the snapshot. No cross-probe
    /// deduplication; one probe's failure never suppresses another's output.
    pub fn absorb(&mut self, report: ProbeReport) {
        self.success &= report.success;
        self.observations.extend(report.observations);
    }

    pub fn push(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Group observations into `prometheus` metric families, preserving
    /// first-seen family order so output is deterministic.
    pub fn to_metric_families(&self) -> Vec<proto::MetricFamily> {
        let mut order: Vec<&'static MetricDesc> = Vec::new();
        let mut grouped: HashMap<&'static str, Vec<&Observation>> = HashMap::new();
        for obs in &self.observations {
            grouped
                .entry(obs.desc.name)
                .or_insert_with(|| {
                    order.push(obs.desc);
                    Vec::new()
                })
                .push(obs);
        }

        order
            .into_iter()
            .map(|desc| {
                let mut family = proto::MetricFamily::default();
                family.set_name(desc.name.to_owned());
                family.set_help(desc.help.to_owned());
                family.set_field_type(match desc.kind {
                    MetricKind::Counter => MetricType::COUNTER,
                    MetricKind::Gauge => MetricType::GAUGE,
                });
                for obs in &grouped[desc.name] {
                    let mut metric = proto::Metric::default();
                    for (name, value) in desc.labels.iter().zip(&obs.label_values) {
                        let mut pair = proto::LabelPair::default();
                        pair.set_name((*name).to_owned());
                        pair.set_value(value.clone());
                        metric.mut_label().push(pair);
                    }
                    match desc.kind {
                        MetricKind::Counter => {
                            let mut counter = proto::Counter::default();
                            counter.set_value(obs.value);
                            metric.set_counter(counter);
                        }
                        MetricKind::Gauge => {
                            let mut gauge = proto::Gauge::default();
                            gauge.set_value(obs.value);
                            metric.set_gauge(gauge);
                        }
                    }
                    family.mut_metric().push(metric);
                }
                family
            })
            .collect()
    }

    /// Render the snapshot in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let families = self.to_metric_families();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        Ok(String::from_utf8(buf).expect("text encoder emits UTF-8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_GAUGE: MetricDesc = MetricDesc::gauge(
        "fortigate_test_gauge",
        "A test gauge.",
        &["vdom", "name"],
    );
    static TEST_COUNTER: MetricDesc =
        MetricDesc::counter("fortigate_test_total", "A test counter.", &[]);

    #[test]
    fn observe_builds_labeled_observation() {
        let obs = TEST_GAUGE.observe(&["root", "port1"], 1.0);
        assert_eq!(obs.desc.name, "fortigate_test_gauge");
        assert_eq!(obs.label_values, vec!["root", "port1"]);
        assert_eq!(obs.value, 1.0);
    }

    #[test]
    #[should_panic(expected = "label arity mismatch")]
    fn observe_rejects_wrong_arity() {
        let _ = TEST_GAUGE.observe(&["root"], 1.0);
    }

    #[test]
    fn absorb_ands_success_and_unions_observations() {
        let mut snapshot = Snapshot::new();
        snapshot.absorb(ProbeReport {
            probe: "a",
            success: true,
            observations: vec![TEST_GAUGE.observe(&["root", "port1"], 1.0)],
        });
        snapshot.absorb(ProbeReport {
            probe: "b",
            success: false,
            observations: vec![],
        });
        snapshot.absorb(ProbeReport {
            probe: "c",
            success: true,
            observations: vec![TEST_COUNTER.observe::<&str>(&[], 42.0)],
        });
        assert!(!snapshot.success);
        assert_eq!(snapshot.observations.len(), 2);
    }

    #[test]
    fn text_rendering_groups_by_family() {
        let mut snapshot = Snapshot::new();
        snapshot.push(TEST_GAUGE.observe(&["root", "port1"], 1.0));
        snapshot.push(TEST_COUNTER.observe::<&str>(&[], 7.0));
        snapshot.push(TEST_GAUGE.observe(&["root", "port2"], 0.0));

        let text = snapshot.encode_text().unwrap();
        assert!(text.contains("# HELP fortigate_test_gauge A test gauge."));
        assert!(text.contains("# TYPE fortigate_test_gauge gauge"));
        assert!(text.contains("fortigate_test_gauge{vdom=\"root\",name=\"port1\"} 1"));
        assert!(text.contains("fortigate_test_gauge{vdom=\"root\",name=\"port2\"} 0"));
        assert!(text.contains("# TYPE fortigate_test_total counter"));
        assert!(text.contains("fortigate_test_total 7"));

        // Family header appears once even with two children.
        assert_eq!(text.matches("# TYPE fortigate_test_gauge").count(), 1);
    }
}
