use crate::Result;
use core::fmt::{Debug, Formatter};
use ohno::IntoAppError;
use prometheus::proto::MetricFamily;
use prometheus::{GaugeVec, Opts, Registry};
use std::collections::HashMap;

/// Static description of a gauge family: its name, help text, and label names.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricDesc {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

macro_rules! metric_desc {
    ($name:expr, $help:expr, $labels:expr) => {
        MetricDesc {
            name: $name,
            help: $help,
            labels: $labels,
        }
    };
}

pub(crate) use metric_desc;

/// The gauge families produced by one poll.
///
/// Each poll builds a fresh set, so series for repositories that disappeared
/// since the previous scrape are never reported again.
pub struct MetricSet {
    registry: Registry,
    gauges: HashMap<&'static str, GaugeVec>,
}

impl MetricSet {
    pub fn new<'a>(descs: impl IntoIterator<Item = &'a MetricDesc>) -> Result<Self> {
        let registry = Registry::new();
        let mut gauges = HashMap::new();

        for desc in descs {
            let gauge = GaugeVec::new(Opts::new(desc.name, desc.help), desc.labels)
                .into_app_err_with(|| format!("invalid metric definition '{}'", desc.name))?;

            registry
                .register(Box::new(gauge.clone()))
                .into_app_err_with(|| format!("could not register metric '{}'", desc.name))?;

            let _ = gauges.insert(desc.name, gauge);
        }

        Ok(Self { registry, gauges })
    }

    /// Sets one sample; `label_values` must follow the order of `desc.labels`.
    pub fn set<S: AsRef<str>>(&self, desc: &MetricDesc, label_values: &[S], value: f64) -> Result<()> {
        let gauge = self
            .gauges
            .get(desc.name)
            .into_app_err_with(|| format!("metric '{}' is not part of this set", desc.name))?;

        let values: Vec<&str> = label_values.iter().map(AsRef::as_ref).collect();
        gauge
            .get_metric_with_label_values(&values)
            .into_app_err_with(|| format!("wrong label values for metric '{}'", desc.name))?
            .set(value);

        Ok(())
    }

    #[must_use]
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }
}

impl Debug for MetricSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MetricSet").field("metrics", &self.gauges.keys()).finish_non_exhaustive()
    }
}
